use core::str;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::post,
};
use serde_json::{Deserializer, Map, Value};
use url::form_urlencoded;

use crate::{
    http::{
        AppState,
        reply::{Format, media_type},
    },
    submission::{self, ACCEPTED, Rejection, Submission},
};

const FORM_MIME: &str = "application/x-www-form-urlencoded";

/// Largest request body read from a client, JSON or form.
pub(crate) const MAX_BODY_BYTES: usize = 10 << 20;

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route(
        "/waitlist",
        post(handle_signup).fallback(handle_wrong_method),
    )
}

/// Accepts a signup as JSON or as a URL-encoded form.
///
/// The declared content type decides both how the body is decoded and how
/// the reply is encoded. A trapped submission is answered exactly like a
/// successful one.
#[axum::debug_handler]
#[tracing::instrument(skip_all)]
async fn handle_signup(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let format = Format::from_headers(&headers);

    let decoded = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => match format {
            Format::Json => decode_json(&body),
            Format::Html => decode_form(media_type(&headers), &body, query.as_deref()),
        },
        Err(err) => {
            tracing::debug!(error = %err, "Failed to read request body");
            Err(format.malformed())
        }
    };

    let outcome = match decoded {
        Ok(submission) => submission::submit(&state.db_pool, &submission).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(_) => format.message(StatusCode::CREATED, ACCEPTED),
        Err(err) => {
            tracing::debug!(error = %err, "Rejected signup");
            format.error(&err)
        }
    }
}

#[axum::debug_handler]
async fn handle_wrong_method(headers: HeaderMap) -> Response {
    Format::from_headers(&headers).error(&Rejection::MethodNotAllowed)
}

/// Decode the first JSON value of the body; anything after it is ignored.
///
/// `null` is an empty submission. Field names match case-insensitively, an
/// exact match taking precedence.
fn decode_json(body: &[u8]) -> Result<Submission, Rejection> {
    let value = Deserializer::from_slice(body)
        .into_iter::<Value>()
        .next()
        .ok_or(Rejection::MalformedJson)?
        .map_err(|_| Rejection::MalformedJson)?;

    match value {
        Value::Null => Ok(Submission::default()),
        Value::Object(fields) => Ok(Submission {
            email: json_field(&fields, "email")?,
            trap: json_field(&fields, "nickname")?,
        }),
        _ => Err(Rejection::MalformedJson),
    }
}

fn json_field(fields: &Map<String, Value>, name: &str) -> Result<String, Rejection> {
    let value = fields.get(name).or_else(|| {
        fields
            .iter()
            .find(|&(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    });
    match value {
        None | Some(&Value::Null) => Ok(String::new()),
        Some(&Value::String(ref text)) => Ok(text.clone()),
        Some(_) => Err(Rejection::MalformedJson),
    }
}

/// Decode form fields from the body (only for URL-encoded bodies) and the
/// query string. Body values win over query values.
fn decode_form(
    content_type: Option<&str>,
    body: &[u8],
    query: Option<&str>,
) -> Result<Submission, Rejection> {
    let mut fields = Vec::new();
    if content_type.is_some_and(|mime| mime.eq_ignore_ascii_case(FORM_MIME)) {
        let body = str::from_utf8(body).map_err(|_| Rejection::MalformedForm)?;
        fields.extend(parse_urlencoded(body)?);
    }
    if let Some(query) = query {
        fields.extend(parse_urlencoded(query)?);
    }

    let first = |name: &str| {
        fields
            .iter()
            .find(|&&(ref key, _)| key == name)
            .map(|&(_, ref value)| value.clone())
            .unwrap_or_default()
    };
    Ok(Submission {
        email: first("email"),
        trap: first("nickname"),
    })
}

fn parse_urlencoded(encoded: &str) -> Result<Vec<(String, String)>, Rejection> {
    if !has_valid_escapes(encoded) {
        return Err(Rejection::MalformedForm);
    }
    Ok(form_urlencoded::parse(encoded.as_bytes())
        .into_owned()
        .collect())
}

/// Every `%` must start a two-digit hex escape.
fn has_valid_escapes(encoded: &str) -> bool {
    let bytes = encoded.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|&(_, &byte)| byte == b'%')
        .all(|(i, _)| {
            matches!(
                (bytes.get(i + 1), bytes.get(i + 2)),
                (Some(hi), Some(lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
            )
        })
}
