//! Walks the whole connector lifecycle against a local mock of the HubSpot APIs.
//!
//! `HUBSPOT_CLIENT_ID`, `HUBSPOT_CLIENT_SECRET`, and `HUBSPOT_REDIRECT_URI` are read from the
//! environment (or a `.env` file) when present; demo values are used otherwise.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use hubspot_connector::{
	auth::{OrgId, UserId},
	config::ConnectorConfig,
	flows::ReqwestConnector,
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::ProviderDescriptor,
	reqwest::Client,
	store::{EphemeralStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	if let Err(e) = dotenvy::dotenv() {
		println!("No .env loaded ({e}); falling back to the process environment.");
	}

	let config = match ConnectorConfig::from_env() {
		Ok(config) => config,
		Err(e) => {
			println!("{e} Using demo client settings.");

			ConnectorConfig::new(
				"demo-client",
				"demo-secret",
				Url::parse("http://localhost:8000/integrations/hubspot/oauth2callback")?,
			)
		},
	};
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v1/token");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "demo-access",
				"refresh_token": "demo-refresh",
				"expires_in": 1800
			}));
		})
		.await;

	for (endpoint, results) in [
		("contacts", json!([{ "id": "1", "properties": { "email": "ada@example.com" } }])),
		("companies", json!([{ "id": "2", "properties": { "name": "Acme" } }])),
		("deals", json!([{ "id": "3", "properties": { "dealname": "Renewal" } }])),
		("tickets", json!([{ "id": "4", "properties": {} }])),
	] {
		server
			.mock_async(|when, then| {
				when.method(GET).path(format!("/crm/v3/objects/{endpoint}"));
				then.status(200).json_body(json!({ "results": results }));
			})
			.await;
	}

	let descriptor = ProviderDescriptor::builder("hubspot")
		.label("HubSpot")
		.authorization_endpoint(Url::parse(&server.url("/oauth/authorize"))?)
		.token_endpoint(Url::parse(&server.url("/oauth/v1/token"))?)
		.api_base(Url::parse(&server.url("/crm/v3/objects"))?)
		.build()?;
	let store: Arc<dyn EphemeralStore> = Arc::new(MemoryStore::default());
	let connector = ReqwestConnector::with_http_client(
		store,
		descriptor,
		config,
		ReqwestHttpClient::with_client(Client::builder().build()?),
		Arc::new(ReqwestTransportErrorMapper),
	);
	let user = UserId::new("demo-user")?;
	let org = OrgId::new("demo-org")?;
	let consent = connector.authorize(&user, &org).await?;

	println!("Consent URL: {consent}");

	// Pretend the browser came back from the consent screen with a code.
	let state = consent
		.query_pairs()
		.find(|(name, _)| name == "state")
		.map(|(_, value)| value.into_owned())
		.unwrap_or_default();
	let query = url::form_urlencoded::Serializer::new(String::new())
		.append_pair("code", "demo-code")
		.append_pair("state", &state)
		.finish();
	let page = connector.oauth_callback_query(&query).await?;

	println!("Callback page:\n{}", page.html());

	token_mock.assert_async().await;

	let credentials = connector.get_credentials(&user, &org).await?;

	for item in connector.get_items(&credentials).await? {
		println!("{} [{}] {}", item.id, item.item_type, item.name);
	}

	Ok(())
}
