//! Account creation.

use hyper::header::HeaderValue;
use serde::Serialize;
use tracing::{info, warn};

use shared::types::{SignupData, SignupError, UserRecord};

use crate::backend::{BackendClient, BackendError, USERS};
use crate::session::{AuthError, Session, SessionManager};

#[derive(Debug, Serialize)]
struct NewUser<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(rename = "passwordConfirm")]
    password_confirm: &'a str,
    username: &'a str,
}

pub async fn create_user(
    client: &BackendClient,
    data: &SignupData,
) -> Result<UserRecord, BackendError> {
    let body = NewUser {
        email: data.email.trim(),
        password: &data.password,
        password_confirm: &data.password_confirm,
        username: data.username.trim(),
    };
    client.collection(USERS).create(&body).await
}

/// Check the form before anything is sent to the backend.
pub fn validate_signup(data: &SignupData) -> Result<(), SignupError> {
    for (field, value) in [
        ("email", data.email.trim()),
        ("username", data.username.trim()),
        ("password", data.password.as_str()),
    ] {
        if value.is_empty() {
            return Err(SignupError::MissingField(field.to_string()));
        }
    }

    if data.password != data.password_confirm {
        return Err(SignupError::PasswordMismatch);
    }

    Ok(())
}

/// Create the account, then sign in as it.
pub async fn signup(
    client: &BackendClient,
    sessions: &SessionManager,
    data: &SignupData,
) -> Result<(Session, HeaderValue), SignupError> {
    validate_signup(data)?;

    let user = create_user(client, data).await.map_err(|e| {
        warn!("Account creation failed: {}", e);
        rejection(&e)
    })?;
    info!("Account {} created", user.id);

    sessions
        .establish(client, data.email.trim(), &data.password)
        .await
        .map_err(|e| {
            warn!("Sign-in after account creation failed: {}", e);
            match e {
                AuthError::Backend(inner) => rejection(&inner),
                AuthError::InvalidCredentials => SignupError::Rejected(None),
                _ => SignupError::InternalError,
            }
        })
}

/// Prefer the backend's message about the username, then the email.
fn rejection(e: &BackendError) -> SignupError {
    if e.is_unavailable() {
        return SignupError::BackendUnavailable;
    }
    let message = e
        .field_message("username")
        .or_else(|| e.field_message("email"))
        .map(str::to_string);
    SignupError::Rejected(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ApiErrorBody;

    fn data(password: &str, confirm: &str) -> SignupData {
        SignupData {
            email: "a@example.com".into(),
            username: "alice".into(),
            password: password.into(),
            password_confirm: confirm.into(),
        }
    }

    #[test]
    fn mismatched_passwords_are_rejected_locally() {
        assert!(matches!(
            validate_signup(&data("one", "two")),
            Err(SignupError::PasswordMismatch)
        ));
        assert!(validate_signup(&data("same", "same")).is_ok());
    }

    #[test]
    fn blank_fields_are_missing() {
        let mut d = data("p", "p");
        d.username = "  ".into();
        assert!(matches!(
            validate_signup(&d),
            Err(SignupError::MissingField(f)) if f == "username"
        ));
    }

    #[test]
    fn username_message_wins_over_email() {
        let body = ApiErrorBody::from_bytes(
            400,
            br#"{"status":400,"message":"Failed","data":{
                "email":{"code":"c","message":"Email taken."},
                "username":{"code":"c","message":"Username taken."}}}"#,
        );
        let err = BackendError::Status { status: 400, body };
        assert_eq!(rejection(&err).to_message(), "Username taken.");
    }

    #[test]
    fn email_message_is_used_when_alone() {
        let body = ApiErrorBody::from_bytes(
            400,
            br#"{"status":400,"message":"Failed","data":{"email":{"code":"c","message":"Email taken."}}}"#,
        );
        let err = BackendError::Status { status: 400, body };
        assert_eq!(rejection(&err).to_message(), "Email taken.");
    }

    #[test]
    fn generic_message_without_field_errors() {
        let err = BackendError::Status {
            status: 400,
            body: ApiErrorBody::default(),
        };
        assert_eq!(rejection(&err).to_message(), "Failed to create account.");
    }
}
