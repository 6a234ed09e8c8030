use maud::{Markup, html};

use crate::enrollment::DialogStep;

/// The enrollment dialog at `step`.
pub fn render(step: &DialogStep) -> Markup {
    html! {
        dialog open class="enrollment" data-step=(step.name()) {
            form method="post" action="/dialog/close" class="dismiss" {
                button type="submit" aria-label="Close" { "×" }
            }
            @match step {
                DialogStep::Warning => {
                    h2 { "Disclaimer" }
                    p {
                        "Having AutoDuo always approving your requests is an "
                        strong { "extremely big security risk" } "."
                        br;
                        "Make sure you have a sufficiently complex password, only for the service you are using AutoDuo with."
                        br;
                        "AutoDuo is " strong { "not" } " responsible for any damages caused by using this service."
                    }
                    p { "By continuing, you understand the risks." }
                    form method="post" action="/dialog/acknowledge" {
                        button type="submit" { "I understand." }
                    }
                }
                DialogStep::Scan => {
                    h2 { "Subscribe to new account" }
                    p {
                        "Import your Duo mobile QR code, you can drag it here or click to upload."
                        br;
                        "You can screenshot the Duo mobile QR code and upload it here."
                    }
                    form method="post" action="/dialog/upload" enctype="multipart/form-data" {
                        input type="hidden" name="source" value="file";
                        input type="file" name="file" accept="image/*";
                        button type="submit" { "Upload QR code" }
                    }
                    form method="post" action="/dialog/upload" enctype="multipart/form-data" {
                        input type="hidden" name="source" value="clipboard";
                        input type="file" name="clipboard" multiple;
                        button type="submit" { "Upload from clipboard" }
                    }
                }
                DialogStep::Upload => {
                    h2 { "Uploading QR code..." }
                    p { "Please wait while we process the QR code image." }
                }
                DialogStep::Error(message) => {
                    h2 { "Error" }
                    p style="white-space: pre-wrap" { (message) }
                }
                DialogStep::Success => {
                    h2 { "Success" }
                    p { "Your account is now added!" }
                }
            }
            @if step.is_finished() {
                (close_button())
            }
        }
    }
}

fn close_button() -> Markup {
    html! {
        form method="post" action="/dialog/close" {
            button type="submit" { "Close" }
        }
    }
}
