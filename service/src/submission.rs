//! Signup processing: validation, honeypot routing and storage outcome mapping.
//!
//! Transport concerns (body decoding, response formatting) live in
//! [`crate::http::api`]; this module only sees already decoded fields.

use axum::http::StatusCode;
use tracing::{error, info};

use crate::{
    db::{self, InsertError, Pool},
    email::Address,
};

/// Message returned for every accepted submission, trapped or not.
pub const ACCEPTED: &str = "email accepted for waitlist";

/// Everything that can go wrong while handling a signup.
///
/// The `Display` text is what the client gets to see.
#[derive(Debug, thiserror::Error)]
pub enum Rejection {
    #[error("invalid JSON body")]
    MalformedJson,
    #[error("invalid form data")]
    MalformedForm,
    #[error("email is required")]
    MissingEmail,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("email already registered")]
    Duplicate,
    #[error("internal server error")]
    Storage(#[source] sqlx::Error),
}

impl Rejection {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        use Rejection as SE;
        match *self {
            SE::MalformedJson | SE::MalformedForm | SE::MissingEmail | SE::InvalidEmail => {
                StatusCode::BAD_REQUEST
            }
            SE::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            SE::Duplicate => StatusCode::CONFLICT,
            SE::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Decoded request fields, before trimming.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Submission {
    pub email: String,
    /// Value of the hidden `nickname` decoy field.
    pub trap: String,
}

/// Where an accepted submission ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepted {
    Waitlist,
    Honeypot,
}

/// Validate and store one submission. Exactly one insert is attempted.
///
/// A non-empty trap value bypasses validation and is stored in the honeypot
/// table; the caller answers it exactly like a genuine signup.
///
/// # Errors
///
/// Returns the [`Rejection`] describing why nothing was stored.
pub async fn submit(pool: &Pool, submission: &Submission) -> Result<Accepted, Rejection> {
    let email = submission.email.trim();
    let trap = submission.trap.trim();

    if !trap.is_empty() {
        db::insert_honeypot(pool, email, trap).await.map_err(|e| {
            error!(error = %e, "Failed to insert honeypot entry");
            Rejection::Storage(e)
        })?;
        info!("Honeypot caught a submission");
        return Ok(Accepted::Honeypot);
    }

    if email.is_empty() {
        return Err(Rejection::MissingEmail);
    }
    let email = Address::parse(email).map_err(|_| Rejection::InvalidEmail)?;

    match db::insert_waitlist(pool, email.as_str()).await {
        Ok(()) => {
            info!("Accepted waitlist signup");
            Ok(Accepted::Waitlist)
        }
        Err(InsertError::Duplicate) => Err(Rejection::Duplicate),
        Err(InsertError::Storage(e)) => {
            error!(error = %e, "Failed to insert email");
            Err(Rejection::Storage(e))
        }
    }
}
