//! Ephemeral key-value store contract and the built-in in-memory implementation.
//!
//! Production deployments back [`EphemeralStore`] with Redis or a similar TTL-aware
//! cache; the connector only needs `set`/`get`/`delete` with per-key expiry.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{KEY_SEPARATOR, OrgId, UserId},
};

/// Boxed future returned by [`EphemeralStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for short-lived connector records.
pub trait EphemeralStore
where
	Self: Send + Sync,
{
	/// Writes `value` under `key`, replacing any previous value, expiring after `ttl`.
	fn set<'a>(&'a self, key: &'a str, value: String, ttl: Duration) -> StoreFuture<'a, ()>;

	/// Reads the live value under `key`, if present.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

	/// Removes `key`; deleting an absent key is not an error.
	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`EphemeralStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced while encoding or decoding stored values.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Record families the connector stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyNamespace {
	/// Pending OAuth state records.
	State,
	/// Freshly exchanged credential blobs.
	Credentials,
}
impl KeyNamespace {
	/// Returns the suffix appended to the provider prefix.
	pub const fn as_str(self) -> &'static str {
		match self {
			KeyNamespace::State => "state",
			KeyNamespace::Credentials => "credentials",
		}
	}
}

/// Fully qualified store key: `{provider}_{namespace}:{org_id}:{user_id}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StoreKey(String);
impl StoreKey {
	/// Builds the key for a provider prefix, namespace, and user/org pair.
	pub fn new(provider: &str, namespace: KeyNamespace, org_id: &OrgId, user_id: &UserId) -> Self {
		Self(format!(
			"{provider}_{}{KEY_SEPARATOR}{org_id}{KEY_SEPARATOR}{user_id}",
			namespace.as_str()
		))
	}

	/// Borrows the key string handed to the store.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for StoreKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
