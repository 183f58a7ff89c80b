//! OAuth and CRM request construction plus transport error mapping.
//!
//! Requests are built as plain [`HttpRequest`] values so any [`ConnectorHttpClient`] can
//! dispatch them; [`TransportErrorMapper`] turns transport failures into connector errors.

pub use oauth2;

// crates.io
use oauth2::{
	HttpClientError, HttpRequest, HttpResponse,
	http::{
		Method,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
use serde::de::DeserializeOwned;
use url::form_urlencoded::Serializer as FormSerializer;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::ConnectorConfig,
	error::{ConfigError, TransportError},
	http::ResponseMetadata,
};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Upstream endpoints the connector talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	/// OAuth token endpoint.
	Token,
	/// CRM object collection endpoint.
	Collection,
}
impl Endpoint {
	/// Returns a stable label suitable for error messages and log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Endpoint::Token => "token",
			Endpoint::Collection => "collection",
		}
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Maps HTTP transport failures into connector [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a connector error.
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<ReqwestError>,
	) -> Error {
		match error {
			HttpClientError::Reqwest(inner) if inner.is_builder() =>
				ConfigError::from(*inner).into(),
			HttpClientError::Reqwest(inner) if inner.is_timeout() =>
				TransportError::Timeout { endpoint: endpoint.as_str() }.into(),
			other => map_common_transport_error(endpoint, metadata, other),
		}
	}
}

/// Maps the transport-agnostic [`HttpClientError`] variants.
///
/// A status captured before the failure (for example while streaming the body) is kept on
/// network errors.
pub fn map_common_transport_error<E>(
	endpoint: Endpoint,
	metadata: Option<&ResponseMetadata>,
	error: HttpClientError<E>,
) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	let label = endpoint.as_str();

	match error {
		HttpClientError::Reqwest(inner) => {
			let status = metadata.and_then(|meta| meta.status);

			TransportError::network(label, status, *inner).into()
		},
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::Other { endpoint: label, message }.into(),
		_ => TransportError::Other { endpoint: label, message: "unclassified failure".into() }
			.into(),
	}
}

/// Builds the form-encoded authorization-code exchange request.
pub(crate) fn token_exchange_request(
	token_url: &Url,
	config: &ConnectorConfig,
	code: &str,
) -> Result<HttpRequest> {
	let body = FormSerializer::new(String::new())
		.append_pair("grant_type", "authorization_code")
		.append_pair("client_id", &config.client_id)
		.append_pair("client_secret", config.client_secret.expose())
		.append_pair("redirect_uri", config.redirect_uri.as_str())
		.append_pair("code", code)
		.finish();

	oauth2::http::Request::builder()
		.method(Method::POST)
		.uri(token_url.as_str())
		.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
		.header(ACCEPT, "application/json")
		.body(body.into_bytes())
		.map_err(|e| ConfigError::from(e).into())
}

/// Builds one authenticated collection page request.
pub(crate) fn collection_page_request(
	collection_url: &Url,
	access_token: &TokenSecret,
	limit: u32,
	after: Option<&str>,
) -> Result<HttpRequest> {
	let mut url = collection_url.clone();

	{
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("limit", &limit.to_string());

		if let Some(cursor) = after {
			pairs.append_pair("after", cursor);
		}
	}

	oauth2::http::Request::builder()
		.method(Method::GET)
		.uri(url.as_str())
		.header(AUTHORIZATION, format!("Bearer {}", access_token.expose()))
		.header(CONTENT_TYPE, "application/json")
		.body(Vec::new())
		.map_err(|e| ConfigError::from(e).into())
}

/// Parses a JSON response body, naming the failing path on error.
pub(crate) fn parse_json_body<T>(endpoint: Endpoint, response: &HttpResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	let de = &mut serde_json::Deserializer::from_slice(response.body());

	serde_path_to_error::deserialize(de).map_err(|source| {
		TransportError::MalformedBody {
			endpoint: endpoint.as_str(),
			source,
			status: response.status().as_u16(),
		}
		.into()
	})
}

/// Returns at most [`BODY_PREVIEW_LIMIT`] characters of a response body for logs.
pub(crate) fn body_preview(response: &HttpResponse) -> String {
	let body = String::from_utf8_lossy(response.body());

	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body.into_owned();
	}

	let mut buf: String = body.chars().take(BODY_PREVIEW_LIMIT).collect();

	buf.push('…');

	buf
}
