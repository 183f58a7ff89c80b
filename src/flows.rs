//! Connector facade and the four operations a hosting web layer exposes.
//!
//! [`Connector`] owns the transport, the ephemeral store, the provider descriptor, and the
//! client configuration. Each operation lives in its own module and is implemented as an
//! inherent method so callers only ever hold one handle per process.

pub mod authorize;
pub mod callback;
pub mod credentials;
pub mod items;

pub use callback::*;
pub use items::*;

// crates.io
use oauth2::{AsyncHttpClient, HttpRequest, HttpResponse};
// self
use crate::{
	_prelude::*,
	auth::{OrgId, UserId},
	config::ConnectorConfig,
	http::{ConnectorHttpClient, ResponseMetadata, ResponseMetadataSlot},
	oauth::{Endpoint, TransportErrorMapper},
	provider::ProviderDescriptor,
	store::{EphemeralStore, KeyNamespace, StoreKey},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// Lifetime of a pending state record.
pub const STATE_TTL: Duration = Duration::seconds(600);
/// Lifetime of a stashed credential blob.
pub const CREDENTIALS_TTL: Duration = Duration::seconds(600);
/// Page size requested from collection endpoints.
pub const PAGE_LIMIT: u32 = 100;

#[cfg(feature = "reqwest")]
/// Connector specialized for the crate's default reqwest transport stack.
pub type ReqwestConnector = Connector<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Coordinates the OAuth handshake and CRM reads against a single provider descriptor.
///
/// Every piece of per-user state lives in the [`EphemeralStore`], so any number of
/// connector instances (or processes) sharing one store behave as a single connector.
#[derive(Clone)]
pub struct Connector<C, M>
where
	C: ?Sized + ConnectorHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Ephemeral store holding pending states and stashed credentials.
	pub store: Arc<dyn EphemeralStore>,
	/// Provider descriptor that defines endpoints and collections.
	pub descriptor: ProviderDescriptor,
	/// OAuth client configuration.
	pub config: ConnectorConfig,
	/// Shared counters for collection walks.
	pub fetch_metrics: Arc<FetchMetrics>,
}
impl<C, M> Connector<C, M>
where
	C: ?Sized + ConnectorHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a connector that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		store: Arc<dyn EphemeralStore>,
		descriptor: ProviderDescriptor,
		config: ConnectorConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			store,
			descriptor,
			config,
			fetch_metrics: Default::default(),
		}
	}

	pub(crate) fn store_key(
		&self,
		namespace: KeyNamespace,
		org_id: &OrgId,
		user_id: &UserId,
	) -> StoreKey {
		StoreKey::new(&self.descriptor.id, namespace, org_id, user_id)
	}

	/// Dispatches one request and maps transport failures against `endpoint`.
	///
	/// Returns the response together with the metadata the transport captured for it. When
	/// a transport leaves the slot empty, the status is taken from the response itself.
	pub(crate) async fn send(
		&self,
		endpoint: Endpoint,
		request: HttpRequest,
	) -> Result<(HttpResponse, ResponseMetadata)> {
		let slot = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(slot.clone());
		let response = handle.call(request).await.map_err(|e| {
			let meta = slot.take();

			self.transport_mapper.map_transport_error(endpoint, meta.as_ref(), e)
		})?;
		let meta = slot.take().unwrap_or_else(|| ResponseMetadata {
			status: Some(response.status().as_u16()),
			retry_after: None,
		});

		Ok((response, meta))
	}
}
#[cfg(feature = "reqwest")]
impl Connector<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a new connector backed by a default reqwest transport.
	pub fn new(
		store: Arc<dyn EphemeralStore>,
		descriptor: ProviderDescriptor,
		config: ConnectorConfig,
	) -> Self {
		Self::with_http_client(
			store,
			descriptor,
			config,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for Connector<C, M>
where
	C: ?Sized + ConnectorHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Connector")
			.field("descriptor", &self.descriptor)
			.field("config", &self.config)
			.field("fetch_metrics", &self.fetch_metrics)
			.finish()
	}
}
