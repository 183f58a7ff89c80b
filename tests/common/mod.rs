//! Shared fixtures for the connector integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::MockServer;
use parking_lot::Mutex;
use time::Duration;
// self
use hubspot_connector::{
	auth::{OrgId, UserId},
	config::ConnectorConfig,
	flows::{Connector, ReqwestConnector},
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::ProviderDescriptor,
	reqwest::Client as ReqwestClient,
	store::{EphemeralStore, MemoryStore, StoreError, StoreFuture},
	url::Url,
};

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const REDIRECT_URI: &str = "http://localhost:8000/integrations/hubspot/oauth2callback";
pub const TOKEN_PATH: &str = "/oauth/v1/token";
pub const OBJECTS_PATH: &str = "/crm/v3/objects";

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse test URL.")
}

pub fn ids() -> (UserId, OrgId) {
	(
		UserId::new("TestUser").expect("User fixture should be valid."),
		OrgId::new("TestOrg").expect("Org fixture should be valid."),
	)
}

pub fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	ProviderDescriptor::builder("hubspot")
		.label("HubSpot")
		.authorization_endpoint(url(&server.url("/oauth/authorize")))
		.token_endpoint(url(&server.url(TOKEN_PATH)))
		.api_base(url(&server.url(OBJECTS_PATH)))
		.build()
		.expect("Mock descriptor should build successfully.")
}

/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
/// `httpmock`.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

/// Constructs a connector backed by an in-memory store and pointed at `server`.
pub fn build_test_connector(server: &MockServer) -> (ReqwestConnector, Arc<MemoryStore>) {
	let store_backend = Arc::new(MemoryStore::default());
	let connector = build_test_connector_with_store(server, store_backend.clone());

	(connector, store_backend)
}

/// Constructs a connector over a caller-supplied store and pointed at `server`.
pub fn build_test_connector_with_store(
	server: &MockServer,
	store: Arc<dyn EphemeralStore>,
) -> ReqwestConnector {
	let config = ConnectorConfig::new(CLIENT_ID, CLIENT_SECRET, url(REDIRECT_URI));

	Connector::with_http_client(
		store,
		build_descriptor(server),
		config,
		test_reqwest_http_client(),
		Arc::new(ReqwestTransportErrorMapper),
	)
}

/// In-memory store that records every write and can be told to fail deletes.
#[derive(Debug, Default)]
pub struct RecordingStore {
	pub inner: MemoryStore,
	pub writes: Mutex<Vec<(String, Duration)>>,
	pub fail_deletes: bool,
}
impl RecordingStore {
	pub fn failing_deletes() -> Self {
		Self { fail_deletes: true, ..Default::default() }
	}

	pub fn writes(&self) -> Vec<(String, Duration)> {
		self.writes.lock().clone()
	}
}
impl EphemeralStore for RecordingStore {
	fn set<'a>(&'a self, key: &'a str, value: String, ttl: Duration) -> StoreFuture<'a, ()> {
		self.writes.lock().push((key.to_owned(), ttl));

		self.inner.set(key, value, ttl)
	}

	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		self.inner.get(key)
	}

	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
		if self.fail_deletes {
			return Box::pin(async {
				Err::<(), _>(StoreError::Backend { message: "delete unavailable".into() })
			});
		}

		self.inner.delete(key)
	}
}

/// Extracts the `state` query parameter from a consent URL.
pub fn state_param(authorize_url: &Url) -> String {
	authorize_url
		.query_pairs()
		.find(|(name, _)| name == "state")
		.map(|(_, value)| value.into_owned())
		.expect("Consent URL should carry a state parameter.")
}
