//! Consent URL minting.

// self
use crate::{
	_prelude::*,
	auth::{OAuthState, OrgId, UserId},
	flows::{Connector, STATE_TTL},
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
	/// Mints a state record for the user/org pair and returns the provider consent URL.
	///
	/// The record is stored for [`STATE_TTL`], replacing any pending record for the same pair,
	/// and its JSON encoding travels in the `state` query parameter.
	pub async fn authorize(&self, user_id: &UserId, org_id: &OrgId) -> Result<Url> {
		obs::observe(ConnectorOp::Authorize, "authorize", async move {
			let record = OAuthState::generate(user_id.clone(), org_id.clone());
			let blob = record.encode()?;
			let key = self.store_key(KeyNamespace::State, org_id, user_id);

			self.store.set(key.as_str(), blob.clone(), STATE_TTL).await?;

			tracing::debug!(key = %key, "Stored pending OAuth state.");

			Ok(self.authorize_url(&blob))
		})
		.await
	}

	fn authorize_url(&self, state: &str) -> Url {
		let mut url = self.descriptor.endpoints.authorization.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("client_id", &self.config.client_id);

		if let Some(scope) = self.config.format_scope(self.descriptor.scope_delimiter) {
			pairs.append_pair("scope", &scope);
		}

		pairs.append_pair("redirect_uri", self.config.redirect_uri.as_str());
		pairs.append_pair("state", state);

		drop(pairs);

		url
	}
}
