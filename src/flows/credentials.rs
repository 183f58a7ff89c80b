//! Consume-once credential retrieval.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, OrgId, UserId},
	flows::Connector,
	http::ConnectorHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, ConnectorOp},
	store::KeyNamespace,
};

impl<C, M> Connector<C, M>
where
	C: ?Sized + ConnectorHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns the credentials stashed by the callback and deletes them.
	///
	/// A second call for the same user/org pair fails with [`Error::NoCredentials`] until
	/// another handshake completes.
	pub async fn get_credentials(&self, user_id: &UserId, org_id: &OrgId) -> Result<Credentials> {
		obs::observe(ConnectorOp::Credentials, "get_credentials", async move {
			let key = self.store_key(KeyNamespace::Credentials, org_id, user_id);
			let raw = self.store.get(key.as_str()).await?.ok_or(Error::NoCredentials)?;
			let credentials = Credentials::from_json(&raw)?;

			if credentials.is_empty() {
				return Err(Error::NoCredentials);
			}

			self.store.delete(key.as_str()).await?;

			tracing::debug!(key = %key, "Handed out stashed credentials.");

			Ok(credentials)
		})
		.await
	}
}
