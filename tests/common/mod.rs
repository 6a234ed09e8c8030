#![allow(dead_code)]

use autoduo_web::config::Config;
use autoduo_web::session::{ProviderProfile, SessionClaims, SessionToken, store_session};
use autoduo_web::{AutoDuoState, autoduo_router};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header::SET_COOKIE},
    response::IntoResponse,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use chrono::{DateTime, Utc};
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, QrCode};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::net::TcpListener;
use tower::ServiceExt;
use url::Url;

pub const BACKEND_SECRET: &str = "backend-s3cret";

pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn config(backend_uri: &str) -> Config {
    Config {
        backend_url: Url::parse(backend_uri).expect("backend uri"),
        backend_secret: BACKEND_SECRET.to_string(),
        discord_id: "discord-client".to_string(),
        discord_secret: "discord-secret".to_string(),
        session_secret: "0123456789abcdef".repeat(4),
        insecure_cookie: true,
        ..Config::default()
    }
}

pub fn app(cfg: &Config) -> Router {
    let state = AutoDuoState::new(cfg.clone()).expect("state");
    autoduo_router(state)
}

/// `Cookie:` header value for a session issued at `issued_at`.
pub fn session_cookie_at(
    cfg: &Config,
    id: Option<&str>,
    username: Option<&str>,
    issued_at: DateTime<Utc>,
) -> String {
    let jar = PrivateCookieJar::new(cfg.cookie_key().expect("cookie key"));
    let profile = ProviderProfile {
        id: id.map(str::to_string),
        username: username.map(str::to_string),
    };
    let token = SessionToken::issue(
        SessionClaims::from_sign_in(Some("backend-token".into()), Some(profile)),
        issued_at,
    );
    let resp = (store_session(jar, &token, false), ()).into_response();
    let mut browser = Browser::default();
    browser.absorb(&resp);
    browser.cookie_header()
}

pub fn session_cookie(cfg: &Config, id: Option<&str>, username: Option<&str>) -> String {
    session_cookie_at(cfg, id, username, Utc::now())
}

/// Minimal cookie store that follows `Set-Cookie` across requests.
#[derive(Debug, Default, Clone)]
pub struct Browser {
    cookies: BTreeMap<String, String>,
}

impl Browser {
    pub fn with_cookie_header(header: &str) -> Self {
        let mut browser = Self::default();
        for pair in header.split("; ").filter(|p| !p.is_empty()) {
            if let Some((name, value)) = pair.split_once('=') {
                browser.cookies.insert(name.to_string(), value.to_string());
            }
        }
        browser
    }

    pub fn absorb<B>(&mut self, resp: &Response<B>) {
        for value in resp.headers().get_all(SET_COOKIE) {
            let raw = value.to_str().expect("ascii set-cookie");
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            if value.is_empty() || raw.contains("Max-Age=0") {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Send `req` with the stored cookies and keep whatever it sets.
    pub async fn send(&mut self, app: &Router, req: Request<Body>) -> Response<Body> {
        let mut req = req;
        if !self.cookies.is_empty() {
            req.headers_mut().insert(
                axum::http::header::COOKIE,
                self.cookie_header().parse().expect("cookie header"),
            );
        }
        let resp = app.clone().oneshot(req).await.expect("request failed");
        self.absorb(&resp);
        resp
    }
}

/// Length of the full `Set-Cookie` line that sets `name`, if any.
pub fn set_cookie_len<B>(resp: &Response<B>, name: &str) -> Option<usize> {
    let prefix = format!("{name}=");
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .find(|v| v.as_bytes().starts_with(prefix.as_bytes()))
        .map(|v| v.len())
}

/// Browsers drop any cookie line longer than this.
pub const BROWSER_COOKIE_LIMIT: usize = 4096;

pub async fn body_string(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body was not utf-8")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

/// One multipart part: field name, optional (filename, content type), bytes.
pub struct Part<'a> {
    pub name: &'a str,
    pub file: Option<(&'a str, &'a str)>,
    pub data: &'a [u8],
}

pub fn post_multipart(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    const BOUNDARY: &str = "autoduo-test-boundary";
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.file {
            Some((filename, content_type)) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n",
                    part.name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                    .as_bytes(),
            ),
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("failed to build request")
}

/// PNG holding a QR code for `payload`.
pub fn qr_png(payload: &str) -> Vec<u8> {
    let code = QrCode::new(payload.as_bytes()).expect("qr encode");
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let (scale, quiet) = (8u32, 4u32);
    let side = (modules + 2 * quiet) * scale;
    let img = GrayImage::from_fn(side, side, |x, y| {
        let (mx, my) = (x / scale, y / scale);
        let inside = mx >= quiet && my >= quiet && mx < quiet + modules && my < quiet + modules;
        let dark =
            inside && colors[((my - quiet) * modules + (mx - quiet)) as usize] == Color::Dark;
        Luma([if dark { 0 } else { 255 }])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("png encode");
    out.into_inner()
}

/// Plain white PNG with no code in it.
pub fn blank_png() -> Vec<u8> {
    let img = GrayImage::from_pixel(64, 64, Luma([255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("png encode");
    out.into_inner()
}
