use crate::core::errors::AnyPayError;
use serde_json::Value;

/// Outcome of one remote call: the full response body when it carries `result`,
/// otherwise the classified failure.
pub type RemoteMethodResult = Result<Value, AnyPayError>;

/// A remote method invocation before it reaches the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMethodRequest {
    pub method: String,
    pub params: Vec<(String, String)>,
}

impl RemoteMethodRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Vec::new(),
        }
    }

    /// Add or replace a parameter, keeping keys unique
    #[must_use]
    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.params.iter_mut().find(|(existing, _)| existing == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key.to_string(), value)),
        }
        self
    }

    #[must_use]
    pub fn optional_param(self, key: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Attach the signature as the `sign` parameter
    #[must_use]
    pub fn signed(self, signature: String) -> Self {
        self.param("sign", signature)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }
}
