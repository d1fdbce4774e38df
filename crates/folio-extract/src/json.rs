//! JSON body extractor.

use crate::{ExtractionContext, ExtractionError, ExtractionSource, FromRequest};
use serde::de::DeserializeOwned;
use std::ops::Deref;

/// Default maximum body size for JSON extraction (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Extractor for JSON request bodies.
///
/// An empty body is a deserialization error. A `Content-Type` other than
/// JSON is rejected, while a missing one is tolerated.
///
/// # Example
///
/// ```rust
/// use folio_extract::{ExtractionContext, FromRequest, Json};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Title {
///     title: String,
/// }
///
/// let ctx = ExtractionContext::builder()
///     .body(r#"{"title": "Employees"}"#)
///     .build();
///
/// let Json(body) = Json::<Title>::from_request(&ctx).unwrap();
/// assert_eq!(body.title, "Employees");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consumes the Json and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromRequest for Json<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        parse_body(ctx, DEFAULT_MAX_BODY_SIZE).map(Json)
    }
}

/// Deserializes the request body as JSON, enforcing `limit` bytes.
pub fn parse_body<T: DeserializeOwned>(
    ctx: &ExtractionContext,
    limit: usize,
) -> Result<T, ExtractionError> {
    let body = ctx.body();

    if body.len() > limit {
        return Err(ExtractionError::payload_too_large(limit, body.len()));
    }

    if let Some(content_type) = ctx.content_type() {
        if !is_json(content_type) {
            return Err(ExtractionError::unsupported_media_type(
                "application/json",
                Some(content_type),
            ));
        }
    }

    if ctx.is_body_empty() {
        return Err(ExtractionError::deserialization_failed(
            ExtractionSource::Body,
            "empty request body",
        ));
    }

    serde_json::from_slice(body)
        .map_err(|e| ExtractionError::deserialization_failed(ExtractionSource::Body, e.to_string()))
}

/// Accepts `application/json` and `+json` suffixed types.
fn is_json(content_type: &str) -> bool {
    content_type.parse::<mime::Mime>().is_ok_and(|m| {
        m.type_() == mime::APPLICATION
            && (m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON))
    })
}
