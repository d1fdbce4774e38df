//! Core extractor trait.
//!
//! The [`FromRequest`] trait is the foundation for all extractors.

use crate::{ExtractionContext, ExtractionError};

/// Trait for types that can be extracted from an HTTP request.
///
/// # Implementing `FromRequest`
///
/// ```rust
/// use folio_extract::{ExtractionContext, ExtractionError, ExtractionSource, FromRequest};
///
/// struct Locale(String);
///
/// impl FromRequest for Locale {
///     fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
///         ctx.path_params()
///             .get("locale")
///             .map(|l| Locale(l.to_string()))
///             .ok_or_else(|| ExtractionError::missing(ExtractionSource::Path, "locale"))
///     }
/// }
/// ```
pub trait FromRequest: Sized {
    /// Extracts this type from the request context.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] if extraction fails.
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError>;
}

// Optional extraction: None if it fails
impl<T: FromRequest> FromRequest for Option<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(T::from_request(ctx).ok())
    }
}

// Lets a handler inspect the extraction error itself
impl<T: FromRequest> FromRequest for Result<T, ExtractionError> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(T::from_request(ctx))
    }
}

macro_rules! impl_from_request_for_tuple {
    ($($T:ident),*) => {
        impl<$($T: FromRequest),*> FromRequest for ($($T,)*) {
            fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
                Ok(($($T::from_request(ctx)?,)*))
            }
        }
    };
}

impl_from_request_for_tuple!(T1, T2);
impl_from_request_for_tuple!(T1, T2, T3);
