use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use heck::ToLowerCamelCase;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::model::patch::PatchError;

#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "{} not found with id: {}", entity, id)]
    NotFound { entity: &'static str, id: u64 },

    #[display(fmt = "Field '{}' does not exist in {}", field, entity)]
    InvalidField { entity: &'static str, field: String },

    #[display(fmt = "Field '{}' cannot be updated", field)]
    ReadOnlyField { field: String },

    #[display(fmt = "Invalid value for field '{}': {}", field, reason)]
    InvalidValue { field: String, reason: String },

    #[display(fmt = "Validation failed")]
    ValidationFailed(ValidationErrors),

    #[display(fmt = "{}", _0)]
    BadRequest(String),

    #[display(fmt = "Store error: {}", _0)]
    Store(anyhow::Error),
}

impl std::error::Error for AppError {}

impl From<PatchError> for AppError {
    fn from(err: PatchError) -> Self {
        match err {
            PatchError::UnknownField { entity, field } => AppError::InvalidField { entity, field },
            PatchError::ReadOnlyField { field } => AppError::ReadOnlyField { field },
            PatchError::InvalidValue { field, reason } => AppError::InvalidValue { field, reason },
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ValidationFailed(errors)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Store(err)
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "Department not found with id: 7")]
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "nonexistentField")]
    pub field: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>, example = json!({"title": ["Title must be between 3 and 100 characters"]}))]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorBody {
    fn plain(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
            errors: None,
        }
    }

    fn for_field(message: String, field: &str) -> Self {
        Self {
            message,
            field: Some(field.to_string()),
            errors: None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::InvalidField { field, .. }
            | AppError::ReadOnlyField { field }
            | AppError::InvalidValue { field, .. } => ErrorBody::for_field(self.to_string(), field),
            AppError::ValidationFailed(errors) => ErrorBody {
                message: self.to_string(),
                field: None,
                errors: Some(violation_messages(errors)),
            },
            AppError::Store(err) => {
                error!(error = %err, "Store operation failed");
                ErrorBody::plain("Internal Server Error")
            }
            _ => ErrorBody::plain(self.to_string()),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Flattens validator output to `{camelCaseField: [message, ..]}`.
pub fn violation_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, violations)| {
            let messages = violations
                .iter()
                .map(|v| match &v.message {
                    Some(message) => message.to_string(),
                    None => v.code.to_string(),
                })
                .collect();
            (field.to_lower_camel_case(), messages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use serde_json::Value;
    use validator::ValidationError;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn not_found_maps_to_404() {
        let (status, body) = body_of(AppError::NotFound {
            entity: "Department",
            id: 7,
        })
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Department not found with id: 7");
        assert!(body.get("field").is_none());
    }

    #[actix_web::test]
    async fn invalid_field_names_the_offender() {
        let (status, body) = body_of(AppError::InvalidField {
            entity: "Department",
            field: "nonexistentField".into(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "nonexistentField");
        assert_eq!(
            body["message"],
            "Field 'nonexistentField' does not exist in Department"
        );
    }

    #[actix_web::test]
    async fn validation_failures_are_grouped_per_field() {
        let mut errors = ValidationErrors::new();
        let mut violation = ValidationError::new("length");
        violation.message = Some("Title must be between 3 and 100 characters".into());
        errors.add("title", violation);
        errors.add("is_verified", ValidationError::new("assert_true"));

        let (status, body) = body_of(AppError::ValidationFailed(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(
            body["errors"]["title"][0],
            "Title must be between 3 and 100 characters"
        );
        assert_eq!(body["errors"]["isVerified"][0], "assert_true");
    }

    #[test]
    fn violation_keys_match_transfer_names() {
        let mut errors = ValidationErrors::new();
        errors.add("linked_in_profile", ValidationError::new("url"));
        errors.add("dob", ValidationError::new("past"));

        let keys: Vec<_> = violation_messages(&errors).into_keys().collect();
        assert_eq!(keys, ["dob", "linkedInProfile"]);
    }

    #[actix_web::test]
    async fn store_errors_hide_details() {
        let (status, body) = body_of(AppError::Store(anyhow::anyhow!("connection reset"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal Server Error");
    }
}
