//! Request extractors for resource routes
//!
//! - [`ValidatedJson`]: JSON body that must pass [`Validate`] before the
//!   handler runs
//! - [`ResourcePath`]: path identifier parsed into a resource's id type

use std::marker::PhantomData;
use std::str::FromStr;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, Method},
    Json,
};
use serde::de::DeserializeOwned;

use super::error::{ApiError, ApiOperation};
use super::traits::Resource;

/// A single rule broken by an inbound payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Name of the offending field as the caller sent it
    pub field: &'static str,
    /// What is wrong with it
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Declarative checks on an inbound payload
///
/// ```rust
/// use todo_service::handlers::{FieldViolation, Validate};
///
/// struct Rename { name: String }
///
/// impl Validate for Rename {
///     fn validate(&self) -> Result<(), Vec<FieldViolation>> {
///         if self.name.trim().is_empty() {
///             return Err(vec![FieldViolation::new("name", "Name is required")]);
///         }
///         Ok(())
///     }
/// }
///
/// assert!(Rename { name: " ".into() }.validate().is_err());
/// ```
pub trait Validate {
    /// Every violation found, or `Ok` when the payload is acceptable
    fn validate(&self) -> Result<(), Vec<FieldViolation>>;
}

/// Join violation messages into one human-readable line
pub fn describe_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Operation a body-carrying request performs, judged by its method
fn operation_for(method: &Method) -> ApiOperation {
    if method == Method::PUT || method == Method::PATCH {
        ApiOperation::Update
    } else {
        ApiOperation::Create
    }
}

/// JSON body that has passed validation
///
/// Malformed JSON is rejected with 400. A well-formed body with missing or
/// mistyped fields, or one that fails [`Validate`], is rejected with 422.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let operation = operation_for(req.method());

        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| match rejection {
                JsonRejection::JsonDataError(err) => ApiError::validation_failed(err.body_text()),
                other => ApiError::bad_request(other.body_text()),
            })
            .map_err(|err| err.with_operation(operation))?;

        value.validate().map_err(|violations| {
            ApiError::validation_failed(describe_violations(&violations)).with_operation(operation)
        })?;

        Ok(Self(value))
    }
}

/// Path identifier of a resource
///
/// An identifier that does not parse cannot name an existing entity, so it
/// is rejected as not found rather than as a bad request.
pub struct ResourcePath<R: Resource> {
    id: R::Id,
    resource: PhantomData<fn() -> R>,
}

impl<R: Resource> ResourcePath<R> {
    pub fn into_inner(self) -> R::Id {
        self.id
    }
}

impl<R, S> FromRequestParts<S> for ResourcePath<R>
where
    R: Resource,
    R::Id: FromStr,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

        raw.parse::<R::Id>()
            .map(|id| Self {
                id,
                resource: PhantomData,
            })
            .map_err(|_| ApiError::not_found(R::NAME, raw))
    }
}
