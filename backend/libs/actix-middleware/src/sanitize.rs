//! `Sanitized<T>` extractor
//!
//! Wraps JSON body binding so every string field of the bound DTO passes
//! through the sanitizer before the handler runs. Sanitization is
//! unconditional: legitimate input is entity-encoded the same way.

use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use std::ops::{Deref, DerefMut};
use xss_guard::SanitizeStrings;

/// A JSON-bound request argument with its string fields sanitized.
pub struct Sanitized<T>(pub T);

impl<T> Sanitized<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Sanitized<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Sanitized<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> FromRequest for Sanitized<T>
where
    T: DeserializeOwned + SanitizeStrings + 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let json = web::Json::<T>::from_request(req, payload);
        Box::pin(async move {
            let mut inner = json.await?.into_inner();
            inner.sanitize_strings();
            Ok(Sanitized(inner))
        })
    }
}
