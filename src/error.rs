//! Connector-level error types shared across flows, transports, and stores.

// self
use crate::_prelude::*;

/// Connector-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical connector error exposed by public APIs.
///
/// Variants split into two classes: client errors (the caller or the provider redirect sent
/// something unusable) and service errors (storage, configuration, transport). Hosting web
/// layers map them onto HTTP statuses through [`Error::status_code`].
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, IO).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Provider redirected back with an `error` parameter.
	#[error("{reason}")]
	ProviderDenied {
		/// Provider-supplied error value.
		reason: String,
	},
	/// Callback arrived without a `state` parameter.
	#[error("Missing state parameter.")]
	MissingState,
	/// Callback arrived without a `code` parameter.
	#[error("Missing code parameter.")]
	MissingCode,
	/// Callback `state` could not be decoded into a state record.
	#[error("Invalid state parameter: {reason}.")]
	InvalidState {
		/// Decoder failure summary.
		reason: String,
	},
	/// Returned state is unknown, expired, already consumed, or forged.
	#[error("State does not match.")]
	StateMismatch,
	/// Token endpoint did not return a usable success response.
	#[error("Failed to exchange code for token: {reason}.")]
	ExchangeFailed {
		/// HTTP status code returned by the token endpoint, when available.
		status: Option<u16>,
		/// Short description of the failure.
		reason: String,
	},
	/// No credential blob is stashed for the user/org pair.
	#[error("No credentials found.")]
	NoCredentials,
	/// Credentials lack an `access_token` field.
	#[error("No access token found.")]
	NoAccessToken,
}
impl Error {
	/// Returns `true` for the client error class (HTTP 400 equivalents).
	pub fn is_client_error(&self) -> bool {
		matches!(
			self,
			Error::ProviderDenied { .. }
				| Error::MissingState
				| Error::MissingCode
				| Error::InvalidState { .. }
				| Error::StateMismatch
				| Error::ExchangeFailed { .. }
				| Error::NoCredentials
				| Error::NoAccessToken
		)
	}

	/// HTTP status a hosting web layer should answer with.
	pub fn status_code(&self) -> u16 {
		if self.is_client_error() { 400 } else { 500 }
	}
}

/// Configuration and validation failures raised by the connector.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Required environment variable is absent or empty.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, malformed upstream payloads).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint label.
		endpoint: &'static str,
		/// HTTP status captured before the failure, if any.
		status: Option<u16>,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request timed out before a response arrived.
	#[error("Request timed out while calling the {endpoint} endpoint.")]
	Timeout {
		/// Endpoint label.
		endpoint: &'static str,
	},
	/// HTTP client failed for a reason it could only describe as text.
	#[error("HTTP client error occurred while calling the {endpoint} endpoint: {message}.")]
	Other {
		/// Endpoint label.
		endpoint: &'static str,
		/// Client-supplied description.
		message: String,
	},
	/// Upstream responded with a body that could not be parsed.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	MalformedBody {
		/// Endpoint label.
		endpoint: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling an upstream endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: &'static str,
		status: Option<u16>,
		src: impl 'static + Send + Sync + StdError,
	) -> Self {
		Self::Network { endpoint, status, source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn client_errors_map_to_bad_request() {
		let denied = Error::ProviderDenied { reason: "access_denied".into() };

		assert!(denied.is_client_error());
		assert_eq!(denied.status_code(), 400);
		assert_eq!(denied.to_string(), "access_denied");
		assert_eq!(Error::NoCredentials.to_string(), "No credentials found.");
		assert_eq!(Error::StateMismatch.status_code(), 400);
	}

	#[test]
	fn service_errors_map_to_internal_error() {
		let storage: Error = StoreError::Backend { message: "redis unreachable".into() }.into();

		assert!(!storage.is_client_error());
		assert_eq!(storage.status_code(), 500);
		assert!(storage.to_string().contains("redis unreachable"));

		let config: Error = ConfigError::MissingEnv { name: "HUBSPOT_CLIENT_ID" }.into();

		assert_eq!(config.status_code(), 500);
	}
}
