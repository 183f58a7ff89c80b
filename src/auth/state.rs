//! Anti-forgery state records round-tripped through the provider redirect.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
// self
use crate::{
	_prelude::*,
	auth::{OrgId, UserId},
	store::StoreError,
};

const STATE_TOKEN_BYTES: usize = 32;

/// State record persisted while the user is on the provider's consent screen.
///
/// The whole record is serialized into the `state` query parameter so the callback can
/// locate the stored copy without any server-side index; only the inner `state` token is
/// secret-ish and must match the stored value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthState {
	/// Random URL-safe token.
	pub state: String,
	/// User that initiated the flow.
	pub user_id: UserId,
	/// Organization that owns the connection.
	pub org_id: OrgId,
}
impl OAuthState {
	/// Generates a fresh record with a 256-bit random token.
	pub fn generate(user_id: UserId, org_id: OrgId) -> Self {
		Self { state: random_token(), user_id, org_id }
	}

	/// Serializes the record into the JSON blob used for both storage and the redirect.
	pub fn encode(&self) -> Result<String, StoreError> {
		serde_json::to_string(self).map_err(|e| StoreError::Serialization {
			message: format!("Failed to encode OAuth state: {e}"),
		})
	}

	/// Parses a JSON blob previously produced by [`OAuthState::encode`].
	pub fn decode(raw: &str) -> Result<Self> {
		let de = &mut serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(de)
			.map_err(|e| Error::InvalidState { reason: e.to_string() })
	}

	/// Returns `true` when `other` carries the same random token.
	pub fn token_matches(&self, other: &OAuthState) -> bool {
		self.state == other.state
	}
}

fn random_token() -> String {
	let mut bytes = [0_u8; STATE_TOKEN_BYTES];

	rand::rng().fill(&mut bytes);

	URL_SAFE_NO_PAD.encode(bytes)
}
