//! Data-extension rowset fetch.
//!
//! The watched data extensions hold a single row whose first value field is
//! the current contact count, as a string or a number.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::SfmcError;

#[derive(Deserialize)]
struct RowsetResponse {
    #[serde(default)]
    items: Vec<RowsetItem>,
}

#[derive(Deserialize)]
struct RowsetItem {
    #[serde(default)]
    values: serde_json::Map<String, Value>,
}

/// Fetch the contact count for a data extension.
///
/// Non-success status is [`SfmcError::Fetch`]; an empty rowset, an empty
/// value map, or an unparsable count is [`SfmcError::DataFormat`] rather
/// than a default.
pub async fn fetch_contacts_amount(
    client: &Client,
    rest_base: &str,
    de_key: &str,
    access_token: &str,
) -> Result<i64, SfmcError> {
    let url = format!("{rest_base}/data/v1/customobjectdata/key/{de_key}/rowset");

    let resp = client
        .get(&url)
        .header("Authorization", format!("Bearer {access_token}"))
        .send()
        .await
        .map_err(|e| SfmcError::Fetch(format!("rowset request failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        return Err(SfmcError::Fetch(format!(
            "rowset endpoint returned {status}: {body}"
        )));
    }

    let data: RowsetResponse = resp
        .json()
        .await
        .map_err(|e| SfmcError::DataFormat(format!("rowset parse error: {e}")))?;

    let first = data
        .items
        .into_iter()
        .next()
        .ok_or_else(|| SfmcError::DataFormat("rowset has no items".into()))?;

    let value = first
        .values
        .into_iter()
        .next()
        .map(|(_, v)| v)
        .ok_or_else(|| SfmcError::DataFormat("first row has no values".into()))?;

    parse_count(&value)
}

fn parse_count(value: &Value) -> Result<i64, SfmcError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| SfmcError::DataFormat(format!("count is not an integer: {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| SfmcError::DataFormat(format!("count is not an integer: {s:?}"))),
        other => Err(SfmcError::DataFormat(format!(
            "count has unexpected type: {other}"
        ))),
    }
}
