//! Provider redirect handling: state verification, code exchange, and credential stash.

// crates.io
use futures::future;
use oauth2::HttpResponse;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{Credentials, OAuthState},
	flows::{CREDENTIALS_TTL, Connector},
	http::ConnectorHttpClient,
	oauth::{self, Endpoint, TransportErrorMapper},
	obs::{self, ConnectorOp},
	store::KeyNamespace,
};

const CLOSE_WINDOW_HTML: &str = "<html>\n\t<script>\n\t\twindow.close();\n\t</script>\n</html>\n";

/// Query parameters delivered to the redirect URI.
///
/// Empty values are treated as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackParams {
	/// Authorization code issued by the provider.
	pub code: Option<String>,
	/// JSON-encoded state record minted by `authorize`.
	pub state: Option<String>,
	/// Provider-reported error (for example `access_denied`).
	pub error: Option<String>,
}
impl CallbackParams {
	/// Parses a raw query string, with or without the leading `?`.
	///
	/// Unknown parameters are ignored; when a parameter repeats, the first value wins.
	pub fn from_query(query: &str) -> Self {
		let mut params = Self::default();

		for (name, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
		{
			let slot = match name.as_ref() {
				"code" => &mut params.code,
				"state" => &mut params.state,
				"error" => &mut params.error,
				_ => continue,
			};

			if slot.is_none() && !value.is_empty() {
				*slot = Some(value.into_owned());
			}
		}

		params
	}
}

/// Page returned to the browser once the handshake completes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackPage {
	html: &'static str,
}
impl CallbackPage {
	/// Content type the hosting web layer should answer with.
	pub const CONTENT_TYPE: &'static str = "text/html; charset=utf-8";

	/// Page whose only behavior is closing the popup window.
	pub fn close_window() -> Self {
		Self { html: CLOSE_WINDOW_HTML }
	}

	/// HTML body.
	pub fn html(&self) -> &str {
		self.html
	}
}

impl<C, M> Connector<C, M>
where
	C: ?Sized + ConnectorHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Completes the handshake for a redirect carrying `params`.
	///
	/// Verifies the round-tripped state against the pending record, exchanges the code
	/// while deleting that record, and stashes the token response for
	/// [`Connector::get_credentials`].
	pub async fn oauth_callback(&self, params: CallbackParams) -> Result<CallbackPage> {
		obs::observe(ConnectorOp::Callback, "oauth_callback", async move {
			if let Some(reason) = params.error {
				return Err(Error::ProviderDenied { reason });
			}

			let raw_state = params.state.ok_or(Error::MissingState)?;
			let code = params.code.ok_or(Error::MissingCode)?;
			let returned = OAuthState::decode(&raw_state)?;
			let state_key = self.store_key(KeyNamespace::State, &returned.org_id, &returned.user_id);
			let stored = self.store.get(state_key.as_str()).await?;
			let verified = stored
				.as_deref()
				.and_then(|raw| OAuthState::decode(raw).ok())
				.is_some_and(|pending| pending.token_matches(&returned));

			if !verified {
				return Err(Error::StateMismatch);
			}

			let request =
				oauth::token_exchange_request(&self.descriptor.endpoints.token, &self.config, &code)?;
			let (exchange, deletion) = future::join(
				self.send(Endpoint::Token, request),
				self.store.delete(state_key.as_str()),
			)
			.await;

			if let Err(e) = deletion {
				tracing::warn!(key = %state_key, error = %e, "Failed to delete consumed OAuth state.");
			}

			let (response, meta) = exchange?;
			let credentials = credentials_from_response(&response).inspect_err(|_| {
				tracing::debug!(
					status = ?meta.status,
					retry_after = ?meta.retry_after,
					"Token endpoint rejected the exchange."
				);
			})?;
			let credentials_key =
				self.store_key(KeyNamespace::Credentials, &returned.org_id, &returned.user_id);

			self.store.set(credentials_key.as_str(), credentials.to_json(), CREDENTIALS_TTL).await?;

			tracing::info!(
				user_id = %returned.user_id,
				org_id = %returned.org_id,
				"Stored exchanged credentials."
			);

			Ok(CallbackPage::close_window())
		})
		.await
	}

	/// Same as [`Connector::oauth_callback`] but parses the raw redirect query first.
	pub async fn oauth_callback_query(&self, query: &str) -> Result<CallbackPage> {
		self.oauth_callback(CallbackParams::from_query(query)).await
	}
}

fn credentials_from_response(response: &HttpResponse) -> Result<Credentials> {
	let status = response.status().as_u16();

	if status != 200 {
		return Err(Error::ExchangeFailed {
			status: Some(status),
			reason: format!("token endpoint answered {status}: {}", oauth::body_preview(response)),
		});
	}

	match serde_json::from_slice::<Value>(response.body()) {
		Ok(value @ Value::Object(_)) => Ok(Credentials::new(value)),
		_ => Err(Error::ExchangeFailed {
			status: Some(status),
			reason: "token response is not a JSON object".into(),
		}),
	}
}
