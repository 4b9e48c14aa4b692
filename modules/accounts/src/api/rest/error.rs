use axum::http::{header::WWW_AUTHENTICATE, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use modkit::{Problem, ProblemResponse, ValidationError};

use crate::domain::error::{DomainError, FieldViolation};

pub const CODE_VALIDATION: &str = "ACCOUNTS_VALIDATION";
pub const CODE_BAD_BODY: &str = "ACCOUNTS_BAD_BODY";
pub const CODE_BAD_IDENTITY_KEY: &str = "ACCOUNTS_BAD_IDENTITY_KEY";
pub const CODE_DUPLICATE_IDENTITY: &str = "ACCOUNTS_DUPLICATE_IDENTITY";
pub const CODE_NOT_FOUND: &str = "ACCOUNTS_NOT_FOUND";
pub const CODE_INTERNAL: &str = "ACCOUNTS_INTERNAL";

/// Request identity used to fill `instance` and `request_id`.
#[derive(Debug, Clone)]
pub struct ProblemTarget {
    pub instance: String,
    pub request_id: Option<String>,
}

impl ProblemTarget {
    pub fn new(path: &str, headers: &HeaderMap) -> Self {
        Self {
            instance: path.to_string(),
            request_id: headers
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
        }
    }
}

pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    target: &ProblemTarget,
) -> ProblemResponse {
    let mut p = Problem::new(status, title, detail)
        .with_code(code)
        .with_instance(target.instance.clone());
    if let Some(rid) = &target.request_id {
        p = p.with_request_id(rid.clone());
    }
    ProblemResponse(p)
}

pub fn bad_body(detail: &str, target: &ProblemTarget) -> ProblemResponse {
    from_parts(StatusCode::BAD_REQUEST, CODE_BAD_BODY, "Bad Request", detail, target)
}

pub fn bad_identity_key(detail: impl Into<String>, target: &ProblemTarget) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        CODE_BAD_IDENTITY_KEY,
        "Bad Request",
        detail,
        target,
    )
}

pub fn validation(violations: &[FieldViolation], target: &ProblemTarget) -> ProblemResponse {
    let ProblemResponse(problem) = from_parts(
        StatusCode::BAD_REQUEST,
        CODE_VALIDATION,
        "Validation Failed",
        format!("{} field(s) failed validation", violations.len()),
        target,
    );
    problem
        .with_errors(
            violations
                .iter()
                .map(|v| ValidationError::for_field(v.field, v.message.clone()))
                .collect(),
        )
        .into()
}

/// The credential verified but its subject is not usable as an account key.
pub fn unusable_identity(target: &ProblemTarget) -> Response {
    let mut resp = from_parts(
        StatusCode::UNAUTHORIZED,
        "AUTH_INVALID_CREDENTIAL",
        "Unauthorized",
        "token subject is not a valid identity key",
        target,
    )
    .into_response();
    resp.headers_mut()
        .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    resp
}

/// Translate a domain failure into a problem response. Storage details are
/// logged, never returned.
pub fn map_domain_error(e: &DomainError, target: &ProblemTarget) -> ProblemResponse {
    match e {
        DomainError::Validation(v) => validation(v, target),
        DomainError::DuplicateIdentity { id } => from_parts(
            StatusCode::BAD_REQUEST,
            CODE_DUPLICATE_IDENTITY,
            "Duplicate Identity",
            format!("account '{id}' already exists"),
            target,
        ),
        DomainError::NotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            CODE_NOT_FOUND,
            "Not Found",
            format!("account '{id}' not found"),
            target,
        ),
        DomainError::DeadlineExceeded => from_parts(
            StatusCode::REQUEST_TIMEOUT,
            "REQUEST_DEADLINE_EXCEEDED",
            "Request Timeout",
            "request deadline exceeded",
            target,
        ),
        DomainError::Cancelled => from_parts(
            StatusCode::REQUEST_TIMEOUT,
            "REQUEST_CANCELLED",
            "Request Timeout",
            "request was cancelled",
            target,
        ),
        DomainError::InsertFailed(_) | DomainError::Repository(_) | DomainError::Integrity(_) => {
            tracing::error!(error = %e, instance = %target.instance, "account operation failed");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                CODE_INTERNAL,
                "Internal Server Error",
                "internal error",
                target,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::AccountId;

    fn target() -> ProblemTarget {
        ProblemTarget {
            instance: "/api/v1/account/create-account".into(),
            request_id: Some("rid-1".into()),
        }
    }

    #[test]
    fn storage_errors_are_opaque() {
        let e = DomainError::InsertFailed("UNIQUE constraint failed: accounts.secret_col".into());
        let p = map_domain_error(&e, &target()).0;
        assert_eq!(p.status, 500);
        assert_eq!(p.code, CODE_INTERNAL);
        assert_eq!(p.detail, "internal error");
        assert_eq!(p.request_id.as_deref(), Some("rid-1"));
    }

    #[test]
    fn status_per_variant() {
        let id = AccountId::parse("U1").unwrap();
        let cases = [
            (DomainError::DuplicateIdentity { id: id.clone() }, 400, CODE_DUPLICATE_IDENTITY),
            (DomainError::NotFound { id }, 404, CODE_NOT_FOUND),
            (DomainError::DeadlineExceeded, 408, "REQUEST_DEADLINE_EXCEEDED"),
            (DomainError::Cancelled, 408, "REQUEST_CANCELLED"),
            (DomainError::Integrity("2 rows".into()), 500, CODE_INTERNAL),
        ];
        for (e, status, code) in cases {
            let p = map_domain_error(&e, &target()).0;
            assert_eq!((p.status, p.code.as_str()), (status, code), "{e}");
        }
    }

    #[test]
    fn validation_lists_pointers() {
        let p = validation(
            &[
                FieldViolation::new("firstname", "firstname is required"),
                FieldViolation::new("gender", "gender is required"),
            ],
            &target(),
        )
        .0;
        let errors = p.errors.unwrap();
        assert_eq!(errors[0].pointer, "/firstname");
        assert_eq!(errors[1].detail, "gender is required");
        assert_eq!(p.code, CODE_VALIDATION);
    }
}
