use crate::core::errors::AnyPayError;
use crate::core::types::RemoteMethodResult;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Code reported when the provider's error code is absent or not numeric
pub const UNKNOWN_ERROR_CODE: i64 = -1;

/// Sort a decoded response body into success, application error or protocol violation.
///
/// A body is successful when it carries a `result` field, even if an `error` field
/// is present alongside it.
pub fn classify(method: &str, body: Value) -> RemoteMethodResult {
    let Value::Object(map) = &body else {
        return Err(AnyPayError::ProtocolViolation(format!(
            "'{}' returned a non-object body: {}",
            method,
            json_kind(&body)
        )));
    };

    if map.contains_key("result") {
        debug!(method, "response classified as success");
        return Ok(body);
    }

    if let Some(error) = map.get("error") {
        let err = api_error(error);
        debug!(method, error = %err, "response classified as application error");
        return Err(err);
    }

    Err(AnyPayError::ProtocolViolation(format!(
        "'{}' response has neither 'result' nor 'error'",
        method
    )))
}

/// Deserialize the `result` member of a successful body into `T`.
pub fn extract_result<T>(method: &str, body: Value) -> Result<T, AnyPayError>
where
    T: DeserializeOwned,
{
    let result = match body {
        Value::Object(mut map) => map.remove("result"),
        _ => None,
    }
    .ok_or_else(|| {
        AnyPayError::ProtocolViolation(format!("'{}' response has no 'result'", method))
    })?;

    serde_json::from_value(result).map_err(|e| {
        AnyPayError::ProtocolViolation(format!("'{}' result has an unexpected shape: {}", method, e))
    })
}

fn api_error(error: &Value) -> AnyPayError {
    let message = match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => match fields.get("message") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        },
        other => other.to_string(),
    };

    let code = error
        .get("code")
        .and_then(numeric_code)
        .unwrap_or(UNKNOWN_ERROR_CODE);

    AnyPayError::ApiError { code, message }
}

#[allow(clippy::cast_possible_truncation)]
fn numeric_code(code: &Value) -> Option<i64> {
    match code {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|value| value as i64)),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
