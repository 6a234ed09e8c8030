//! Server-rendered HTML.

pub mod dialog;

use maud::{DOCTYPE, Markup, html};

use crate::enrollment::DialogStep;
use crate::types::{Account, Toast, ToastLevel};

const FRONTEND_SOURCE: &str = "https://github.com/shedaniel/autoduo-web/";
const BACKEND_SOURCE: &str = "https://github.com/shedaniel/autoduo-backend/";

/// Everything the management view shows.
pub struct ManagementView<'a> {
    pub username: &'a str,
    pub accounts: &'a [Account],
    pub dialog: Option<&'a DialogStep>,
    pub toast: Option<&'a Toast>,
}

fn layout(toast: Option<&Toast>, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "AutoDuo" }
            }
            body {
                @if let Some(toast) = toast {
                    (toast_banner(toast))
                }
                (body)
            }
        }
    }
}

fn toast_banner(toast: &Toast) -> Markup {
    let class = match toast.level {
        ToastLevel::Success => "toast toast-success",
        ToastLevel::Error => "toast toast-error",
    };
    html! {
        div class=(class) role="status" style="white-space: pre-wrap" { (toast.message) }
    }
}

fn sources() -> Markup {
    html! {
        details class="sources" {
            summary { "Sources" }
            p { "Frontend available at " a href=(FRONTEND_SOURCE) { "github.com" } "." }
            p { "Backend available at " a href=(BACKEND_SOURCE) { "github.com" } "." }
        }
    }
}

pub fn sign_in(toast: Option<&Toast>) -> Markup {
    layout(
        toast,
        html! {
            main class="sign-in" {
                section class="card" {
                    (sources())
                    h1 { "Welcome" }
                    p { "Login or register with Discord." }
                    a class="button discord" href="/api/auth/signin/discord" { "Sign in with Discord" }
                }
            }
        },
    )
}

pub fn management(view: &ManagementView<'_>) -> Markup {
    let count = view.accounts.len();
    layout(
        view.toast,
        html! {
            nav {
                (sources())
                form method="post" action="/api/auth/signout" {
                    button type="submit" { "Logout of " (view.username) }
                }
            }
            main {
                section class="card" {
                    header {
                        h1 { "AutoDuo" }
                        form method="post" action="/dialog/open" {
                            button type="submit" { "New" }
                        }
                    }
                    @if count > 0 {
                        p class="description" {
                            "You have " (count) " account" @if count > 1 { "s" } " active."
                            br;
                            "AutoDuo will keep approving your Duo requests."
                        }
                    }
                    div class="accounts" {
                        @if count == 0 {
                            div class="empty" { "No AutoDuo active." }
                        } @else {
                            @for account in view.accounts {
                                (account_row(account))
                            }
                        }
                    }
                }
            }
            @if let Some(step) = view.dialog {
                (dialog::render(step))
            }
        },
    )
}

fn account_row(account: &Account) -> Markup {
    html! {
        div class="account" data-key=(account.key()) {
            @if let Some(src) = account.logo_data_uri() {
                img class="logo" src=(src) alt="Logo";
            }
            span class="name" { (account.display_name()) }
            form method="post" action="/actions/remove" {
                input type="hidden" name="code" value=(account.code);
                button type="submit" class="destructive" { "Remove" }
            }
        }
    }
}
