//! Remote option sources
//!
//! A field with a remote source is given an [`OptionRequest`]. The resolver
//! calls it with the current parameters merged with the keyword and expects
//! the server to apply keyword filtering itself.
//!
//! ```ignore
//! use blinc_field::request::{request_fn, RequestQuery};
//!
//! let users = request_fn(|query: RequestQuery, _field: &FieldConfig| async move {
//!     let keyword = query.keyword.unwrap_or_default();
//!     api::search_users(&keyword).await.map_err(|e| FetchError::Request(e.to_string()))
//! });
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::FieldConfig;
use crate::error::FetchError;
use crate::option::SelectOption;

/// Boxed future returned by an [`OptionRequest`]
pub type OptionsFuture =
    Pin<Box<dyn Future<Output = Result<Vec<SelectOption>, FetchError>> + Send + 'static>>;

/// Arguments of one option request
#[derive(Clone, Debug, PartialEq)]
pub struct RequestQuery {
    /// Field parameters as configured
    pub params: Value,
    /// Current search keyword
    pub keyword: Option<String>,
}

impl RequestQuery {
    /// Parameters merged with the keyword: `{ ...params, "keyword": keyword }`
    ///
    /// Non-object parameters contribute nothing to the merged object.
    pub fn to_json(&self) -> Value {
        let mut merged = match &self.params {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        merged.insert(
            "keyword".to_string(),
            self.keyword.clone().map(Value::String).unwrap_or(Value::Null),
        );
        Value::Object(merged)
    }
}

/// A remote option source
///
/// Failures are reported through the returned future only.
pub trait OptionRequest: Send + Sync + 'static {
    fn request(&self, query: RequestQuery, field: &FieldConfig) -> OptionsFuture;
}

/// [`OptionRequest`] backed by a closure, see [`request_fn`]
pub struct RequestFn<F> {
    f: F,
}

impl<F, Fut> OptionRequest for RequestFn<F>
where
    F: Fn(RequestQuery, &FieldConfig) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<SelectOption>, FetchError>> + Send + 'static,
{
    fn request(&self, query: RequestQuery, field: &FieldConfig) -> OptionsFuture {
        Box::pin((self.f)(query, field))
    }
}

/// Wrap an async closure as a shareable [`OptionRequest`]
pub fn request_fn<F, Fut>(f: F) -> Arc<dyn OptionRequest>
where
    F: Fn(RequestQuery, &FieldConfig) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<SelectOption>, FetchError>> + Send + 'static,
{
    Arc::new(RequestFn { f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_merges_keyword() {
        let query = RequestQuery {
            params: json!({ "team": "core" }),
            keyword: Some("ad".into()),
        };
        assert_eq!(query.to_json(), json!({ "team": "core", "keyword": "ad" }));

        let bare = RequestQuery {
            params: Value::Null,
            keyword: None,
        };
        assert_eq!(bare.to_json(), json!({ "keyword": null }));
    }

    #[tokio::test]
    async fn test_request_fn() {
        let request = request_fn(|query: RequestQuery, _field: &FieldConfig| async move {
            let keyword = query.keyword.unwrap_or_default();
            Ok::<_, FetchError>(vec![SelectOption::new(keyword.as_str(), keyword.as_str())])
        });
        let query = RequestQuery {
            params: Value::Null,
            keyword: Some("x".into()),
        };
        let options = request.request(query, &FieldConfig::default()).await.unwrap();
        assert_eq!(options, vec![SelectOption::new("x", "x")]);
    }
}
