//! JSON body extraction with `validator` rules applied.

use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use gatehouse_core::AppError;

/// Joins every field error into one message, sorted by field name so the
/// output is stable.
fn format_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn body_error(rejection: JsonRejection) -> AppError {
    let message = match &rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Missing 'Content-Type: application/json' header".to_string()
        }
        JsonRejection::JsonDataError(_) => {
            let text = rejection.body_text();
            match text
                .split("missing field `")
                .nth(1)
                .and_then(|rest| rest.split('`').next())
            {
                Some(field) => format!("{} is required", field),
                None => "Invalid field type in request".to_string(),
            }
        }
        _ => "Invalid request body".to_string(),
    };

    AppError::bad_request(anyhow!(message)).with_kind("invalid_body")
}

/// Like [`Json`], but also runs `T::validate`. Malformed bodies are `400`;
/// bodies that parse but fail validation are `422`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(body_error)?;

        value.validate().map_err(|errors| {
            AppError::unprocessable(anyhow!(format_errors(&errors))).with_kind("validation_failed")
        })?;

        Ok(ValidatedJson(value))
    }
}
