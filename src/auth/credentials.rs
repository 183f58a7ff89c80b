//! Opaque credential blobs returned by the token endpoint.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, auth::TokenSecret, store::StoreError};

/// Raw JSON token response, kept verbatim so application code sees every provider field.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(Value);
impl Credentials {
	/// Wraps an already-parsed token response.
	pub fn new(value: Value) -> Self {
		Self(value)
	}

	/// Parses a stored or caller-supplied JSON blob.
	pub fn from_json(raw: &str) -> Result<Self, StoreError> {
		let de = &mut serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(de).map(Self).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse credentials: {e}"),
		})
	}

	/// Serializes the blob back into compact JSON.
	pub fn to_json(&self) -> String {
		self.0.to_string()
	}

	/// Returns the `access_token` field when present as a non-empty string.
	pub fn access_token(&self) -> Option<TokenSecret> {
		self.0
			.get("access_token")
			.and_then(Value::as_str)
			.filter(|token| !token.is_empty())
			.map(TokenSecret::new)
	}

	/// Returns `true` when the blob carries nothing usable.
	///
	/// Mirrors JSON falsiness: `null`, `false`, `0`, `""`, `[]`, and `{}` are all empty.
	pub fn is_empty(&self) -> bool {
		match &self.0 {
			Value::Null => true,
			Value::Bool(flag) => !flag,
			Value::Number(n) => n.as_f64() == Some(0.),
			Value::String(s) => s.is_empty(),
			Value::Array(items) => items.is_empty(),
			Value::Object(fields) => fields.is_empty(),
		}
	}

	/// Borrows the underlying JSON value.
	pub fn as_value(&self) -> &Value {
		&self.0
	}

	/// Consumes the wrapper, returning the underlying JSON value.
	pub fn into_value(self) -> Value {
		self.0
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let fields = match &self.0 {
			Value::Object(map) => map.keys().cloned().collect::<Vec<_>>(),
			_ => Vec::new(),
		};

		f.debug_struct("Credentials").field("fields", &fields).finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn access_token_requires_non_empty_string() {
		let creds = Credentials::new(json!({ "access_token": "tok", "expires_in": 1800 }));

		assert_eq!(creds.access_token().map(|t| t.expose().to_owned()), Some("tok".into()));
		assert!(Credentials::new(json!({ "access_token": "" })).access_token().is_none());
		assert!(Credentials::new(json!({ "access_token": 42 })).access_token().is_none());
		assert!(Credentials::new(json!({ "refresh_token": "r" })).access_token().is_none());
	}

	#[test]
	fn emptiness_follows_json_falsiness() {
		for empty in [json!(null), json!({}), json!([]), json!(""), json!(false), json!(0)] {
			assert!(Credentials::new(empty).is_empty());
		}

		assert!(!Credentials::new(json!({ "access_token": "tok" })).is_empty());
	}

	#[test]
	fn debug_output_hides_values() {
		let creds = Credentials::new(json!({ "access_token": "super-secret" }));
		let rendered = format!("{creds:?}");

		assert!(rendered.contains("access_token"));
		assert!(!rendered.contains("super-secret"));
	}

	#[test]
	fn malformed_json_is_a_serialization_error() {
		let err = Credentials::from_json("{oops").expect_err("Malformed JSON should fail.");

		assert!(matches!(err, StoreError::Serialization { .. }));
	}
}
