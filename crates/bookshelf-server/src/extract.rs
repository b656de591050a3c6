//! Request extractors that reject through [`ApiError`].
//!
//! Axum's stock `Path`, `Json` and `Query` rejections answer with plain text
//! and assorted status codes. These wrappers turn every malformed request
//! into a 400 with the usual JSON error body.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use bookshelf_core::{bson::oid::ObjectId, parse_record_id};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Path identifier parsed into a store key.
///
/// Malformed identifiers are rejected here, before the handler (and the
/// store) ever sees them.
#[derive(Debug, Clone, Copy)]
pub struct RecordId(pub ObjectId);

impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        parse_record_id(&raw)
            .map(Self)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid id format: {raw}")))
    }
}

/// JSON object request body.
#[derive(Debug, Clone)]
pub struct Payload(pub Map<String, Value>);

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ApiError::BadRequest(
                "Request body must be a JSON object".to_string(),
            )),
        }
    }
}

/// Query string decoded into `T`.
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(params))
    }
}

/// `page` and `limit` for list endpoints, before range checks.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_default() {
        let query: ListQuery = serde_urlencoded::from_str("").unwrap();
        assert!(query.page.is_none());
        assert!(query.limit.is_none());
    }

    #[test]
    fn test_list_query_values() {
        let query: ListQuery = serde_urlencoded::from_str("page=2&limit=5").unwrap();
        assert_eq!(query.page, Some(2));
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn test_list_query_rejects_negative() {
        assert!(serde_urlencoded::from_str::<ListQuery>("page=-1").is_err());
        assert!(serde_urlencoded::from_str::<ListQuery>("limit=ten").is_err());
    }
}
