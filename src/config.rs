//! OAuth client configuration owned by a connector for the life of the process.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Environment variable holding the OAuth client id.
pub const ENV_CLIENT_ID: &str = "HUBSPOT_CLIENT_ID";
/// Environment variable holding the OAuth client secret.
pub const ENV_CLIENT_SECRET: &str = "HUBSPOT_CLIENT_SECRET";
/// Environment variable holding the registered redirect URI.
pub const ENV_REDIRECT_URI: &str = "HUBSPOT_REDIRECT_URI";

/// Scopes requested when the caller does not override them.
pub const DEFAULT_SCOPES: &[&str] = &[
	"oauth",
	"crm.schemas.contacts.read",
	"crm.objects.contacts.read",
	"crm.objects.companies.read",
	"crm.objects.deals.read",
	"tickets",
];

/// Client credentials, redirect target, and requested scopes.
#[derive(Clone)]
pub struct ConnectorConfig {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret, sent only to the token endpoint.
	pub client_secret: TokenSecret,
	/// Redirect URI registered with the provider.
	pub redirect_uri: Url,
	/// Scopes requested on the consent screen, in order.
	pub scopes: Vec<String>,
}
impl ConnectorConfig {
	/// Creates a configuration with [`DEFAULT_SCOPES`].
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		redirect_uri: Url,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			redirect_uri,
			scopes: DEFAULT_SCOPES.iter().map(|scope| (*scope).to_owned()).collect(),
		}
	}

	/// Reads `HUBSPOT_CLIENT_ID`, `HUBSPOT_CLIENT_SECRET`, and `HUBSPOT_REDIRECT_URI`.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Same as [`ConnectorConfig::from_env`] but resolves variables through `lookup`.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&'static str) -> Option<String>,
	{
		let require = |name: &'static str| {
			lookup(name)
				.map(|value| value.trim().to_owned())
				.filter(|value| !value.is_empty())
				.ok_or(ConfigError::MissingEnv { name })
		};
		let client_id = require(ENV_CLIENT_ID)?;
		let client_secret = require(ENV_CLIENT_SECRET)?;
		let redirect_uri = Url::parse(&require(ENV_REDIRECT_URI)?)
			.map_err(|source| ConfigError::InvalidRedirect { source })?;

		Ok(Self::new(client_id, client_secret, redirect_uri))
	}

	/// Replaces the requested scopes. Blank entries are dropped.
	pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = scopes
			.into_iter()
			.map(Into::into)
			.filter(|scope: &String| !scope.trim().is_empty())
			.collect();

		self
	}

	/// Joins the scopes with `delimiter`, or `None` when no scopes are configured.
	pub(crate) fn format_scope(&self, delimiter: char) -> Option<String> {
		if self.scopes.is_empty() {
			return None;
		}

		let mut buf = String::new();

		for (idx, value) in self.scopes.iter().enumerate() {
			if idx > 0 {
				buf.push(delimiter);
			}

			buf.push_str(value);
		}

		Some(buf)
	}
}
impl Debug for ConnectorConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConnectorConfig")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.field("redirect_uri", &self.redirect_uri.as_str())
			.field("scopes", &self.scopes)
			.finish()
	}
}
