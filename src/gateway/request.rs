use reqwest::Method;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::Error;

/// A request issued through the [`Gateway`](super::Gateway).
///
/// Carries everything needed to send it again after a silent refresh. The
/// `retried` flag flips from `false` to `true` at most once.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<JsonValue>,
    retried: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            retried: false,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn body(&self) -> Option<&JsonValue> {
        self.body.as_ref()
    }

    pub(crate) fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    #[must_use]
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Flag the request as retried. Returns `false` if it already was.
    pub(crate) fn mark_retried(&mut self) -> bool {
        !std::mem::replace(&mut self.retried, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retried_flag_flips_once() {
        let mut req = ApiRequest::get("stations");
        assert!(!req.is_retried());
        assert!(req.mark_retried());
        assert!(req.is_retried());
        assert!(!req.mark_retried());
        assert!(req.is_retried());
    }

    #[test]
    fn json_body_is_kept_for_resend() {
        #[derive(Serialize)]
        struct Password<'a> {
            password: &'a str,
        }

        let req = ApiRequest::put("manager/5/change_password")
            .json(&Password { password: "s3cret" })
            .unwrap();
        assert_eq!(*req.method(), Method::PUT);
        assert_eq!(req.body().unwrap()["password"], "s3cret");

        let copy = req.clone();
        assert_eq!(copy.body(), req.body());
    }
}
