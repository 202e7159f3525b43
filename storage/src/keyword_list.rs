//! The `matched_keywords` cell: a JSON array of strings.

use painpoint_core::{CoreError, KeywordSet, SchemaError};

pub fn encode_keywords(keywords: &KeywordSet) -> Result<String, CoreError> {
    Ok(serde_json::to_string(keywords)?)
}

/// Parses a cell written by [`encode_keywords`]. The list must hold at least
/// one non-empty keyword.
pub fn decode_keywords(value: &str, table: &str, row: u64) -> Result<KeywordSet, SchemaError> {
    let invalid = || SchemaError::InvalidKeywordList {
        table: table.to_string(),
        row,
        value: value.to_string(),
    };

    let keywords: Vec<String> = serde_json::from_str(value).map_err(|_| invalid())?;
    if keywords.is_empty() || keywords.iter().any(|k| k.is_empty()) {
        return Err(invalid());
    }
    Ok(keywords.into_iter().collect())
}
