//! Reading the storefront API's `{data}` / `{message}` response envelope.

use crate::error::{AppError, Result};
use reqwest::Response;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Returns the raw JSON body of a 2xx response, or the upstream failure.
///
/// `fallback` is used when a failed response carries no `message`.
pub(crate) async fn read_body(response: Response, fallback: &str) -> Result<Value> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        return Err(AppError::api(status, message));
    }

    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|_| AppError::InvalidResponse(format!("{fallback}: malformed response")))
}

/// Deserializes `data` from a 2xx response. A missing or `null` `data`
/// deserializes as `T` from `null`, so `Option`/`Vec` defaults work.
pub(crate) async fn read_data<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T> {
    let body = read_body(response, fallback).await?;
    decode_data(body, fallback)
}

/// Like [`read_data`], but a missing or `null` `data` yields `T::default()`.
pub(crate) async fn read_data_or_default<T: DeserializeOwned + Default>(response: Response, fallback: &str) -> Result<T> {
    let mut body = read_body(response, fallback).await?;
    let data = body.get_mut("data").map(Value::take).unwrap_or_default();
    decode_or_default(data, fallback)
}

/// For writes: a 2xx counts as success whether or not it echoes the saved
/// document. Returns the document when `data` decodes as `T`.
pub(crate) async fn read_saved<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<Option<T>> {
    let body = read_body(response, fallback).await?;
    Ok(decode_saved(body))
}

pub(crate) fn decode_saved<T: DeserializeOwned>(mut body: Value) -> Option<T> {
    let data = body.get_mut("data").map(Value::take).filter(|data| !data.is_null())?;
    serde_json::from_value(data)
        .inspect_err(|e| tracing::debug!(error = %e, "Saved document not echoed in a known shape"))
        .ok()
}

/// Checks for success and discards the body.
pub(crate) async fn expect_success(response: Response, fallback: &str) -> Result<()> {
    read_body(response, fallback).await.map(|_| ())
}

pub(crate) fn decode_data<T: DeserializeOwned>(mut body: Value, fallback: &str) -> Result<T> {
    let data = body.get_mut("data").map(Value::take).unwrap_or(Value::Null);
    decode(data, fallback)
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value, fallback: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        tracing::debug!(error = %e, "Unexpected response shape");
        AppError::InvalidResponse(format!("{fallback}: unexpected response shape"))
    })
}

/// Like `decode`, but an empty value (`null`) becomes `T::default()`.
pub(crate) fn decode_or_default<T: DeserializeOwned + Default>(value: Value, fallback: &str) -> Result<T> {
    if value.is_null() { Ok(T::default()) } else { decode(value, fallback) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_data_extracts_data() {
        let names: Vec<String> = decode_data(json!({ "data": ["a", "b"] }), "Failed").unwrap();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_decode_data_missing_is_null() {
        let value: Option<String> = decode_data(json!({ "message": "ok" }), "Failed").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_decode_shape_mismatch_is_invalid_response() {
        let result: Result<Vec<String>> = decode_data(json!({ "data": 5 }), "Failed to load users");
        assert!(matches!(result, Err(AppError::InvalidResponse(m)) if m.starts_with("Failed to load users")));
    }

    #[test]
    fn test_decode_saved_tolerates_missing_document() {
        #[derive(Debug, serde::Deserialize)]
        struct Doc {
            #[serde(rename = "_id")]
            id: String,
        }

        let saved: Option<Doc> = decode_saved(json!({ "data": { "_id": "p1" } }));
        assert_eq!(saved.unwrap().id, "p1");
        assert!(decode_saved::<Doc>(json!({ "message": "Product created successfully" })).is_none());
        assert!(decode_saved::<Doc>(json!({ "data": { "name": "no id" } })).is_none());
        assert!(decode_saved::<Doc>(Value::Null).is_none());
    }

    #[test]
    fn test_decode_or_default() {
        let empty: Vec<u32> = decode_or_default(Value::Null, "x").unwrap();
        assert!(empty.is_empty());
    }
}
