//! Decode policy shared by the JSON agents: try the provider's response, and
//! on any parse or validation failure discard it and decode the fallback
//! through the same path.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::AppError;
use crate::llm_client::strip_json_fences;
use crate::models::Validate;

/// Parses and validates one candidate payload.
pub fn decode<T>(raw: &str) -> Result<T, String>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_str(strip_json_fences(raw)).map_err(|e| e.to_string())?;
    value.validate()?;
    Ok(value)
}

/// Decodes `response`, substituting the decoded `fallback` when it does not
/// hold up. Returns the value and whether the substitution happened.
///
/// A fallback that fails its own decode is a programming error.
pub fn decode_or_fallback<T>(response: &str, fallback: &str) -> Result<(T, bool), AppError>
where
    T: DeserializeOwned + Validate,
{
    match decode(response) {
        Ok(value) => Ok((value, false)),
        Err(reason) => {
            debug!("Discarding undecodable generation output: {reason}");
            decode(fallback)
                .map(|value| (value, true))
                .map_err(|e| AppError::Configuration(format!("fallback payload does not decode: {e}")))
        }
    }
}
