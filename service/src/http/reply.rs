//! Response formatting for the submission endpoint.
//!
//! Programmatic clients that send JSON get JSON back. Everything else is
//! assumed to be a plain HTML `<form>` post and gets a small HTML page with a
//! link back to the form.

use axum::{
    Json,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{ALLOW, CONTENT_TYPE},
    },
    response::{Html, IntoResponse, Response},
};
use serde_json::json;

use crate::submission::Rejection;

const JSON_MIME: &str = "application/json";

/// Response encoding, chosen once per request from its declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    Json,
    Html,
}

impl Format {
    /// `application/json` (parameters ignored) selects JSON, anything else HTML.
    pub(crate) fn from_headers(headers: &HeaderMap) -> Self {
        if media_type(headers) == Some(JSON_MIME) {
            Self::Json
        } else {
            Self::Html
        }
    }

    /// The decoding error matching this format's request body.
    pub(crate) const fn malformed(self) -> Rejection {
        match self {
            Self::Json => Rejection::MalformedJson,
            Self::Html => Rejection::MalformedForm,
        }
    }

    pub(crate) fn message(self, status: StatusCode, message: &str) -> Response {
        match self {
            Self::Json => (status, Json(json!({ "message": message }))).into_response(),
            Self::Html => (status, Html(render_page(message))).into_response(),
        }
    }

    pub(crate) fn error(self, err: &Rejection) -> Response {
        let mut response = self.message(err.status(), &err.to_string());
        if matches!(*err, Rejection::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}

/// The `Content-Type` header without parameters such as `charset`.
pub(crate) fn media_type(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    Some(value.split_once(';').map_or(value, |(mime, _)| mime).trim())
}

fn render_page(message: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>Waitlist</title></head>",
            "<body><main><h1>Waitlist</h1><p>{}</p><p><a href=\"/\">Back to form</a></p></main></body></html>",
        ),
        escape_html(message)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
