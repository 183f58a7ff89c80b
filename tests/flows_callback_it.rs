#![cfg(feature = "reqwest")]

mod common;

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use time::Duration;
// self
use common::*;
use hubspot_connector::{
	auth::OAuthState,
	error::Error,
	flows::{CallbackPage, CallbackParams},
	store::EphemeralStore,
	url::form_urlencoded,
};

const TOKEN_BODY: &str =
	"{\"access_token\":\"access-it\",\"refresh_token\":\"refresh-it\",\"expires_in\":1800}";

fn params(code: &str, state: &str) -> CallbackParams {
	CallbackParams { code: Some(code.into()), state: Some(state.into()), error: None }
}

#[tokio::test]
async fn callback_exchanges_code_and_stashes_credentials() {
	let server = MockServer::start_async().await;
	let (connector, store) = build_test_connector(&server);
	let (user, org) = ids();
	let consent = connector.authorize(&user, &org).await.expect("Authorize should succeed.");
	let state = state_param(&consent);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let page = connector
		.oauth_callback(params("code-123", &state))
		.await
		.expect("Callback should succeed.");

	mock.assert_async().await;

	assert_eq!(page, CallbackPage::close_window());
	assert!(
		store
			.get("hubspot_state:TestOrg:TestUser")
			.await
			.expect("Store read should succeed.")
			.is_none()
	);

	let stashed = store
		.get("hubspot_credentials:TestOrg:TestUser")
		.await
		.expect("Store read should succeed.")
		.expect("Credentials should be stashed.");
	let value: serde_json::Value =
		serde_json::from_str(&stashed).expect("Stashed credentials should be JSON.");

	assert_eq!(value["access_token"], "access-it");
	assert_eq!(value["refresh_token"], "refresh-it");
}

#[tokio::test]
async fn replayed_callback_fails_with_state_mismatch() {
	let server = MockServer::start_async().await;
	let (connector, _store) = build_test_connector(&server);
	let (user, org) = ids();
	let consent = connector.authorize(&user, &org).await.expect("Authorize should succeed.");
	let state = state_param(&consent);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let query = format!(
		"code=code-123&state={}",
		form_urlencoded::byte_serialize(state.as_bytes()).collect::<String>()
	);

	connector.oauth_callback_query(&query).await.expect("First callback should succeed.");

	let err = connector
		.oauth_callback_query(&query)
		.await
		.expect_err("Replayed callback should fail.");

	assert!(matches!(err, Error::StateMismatch));
	assert_eq!(err.status_code(), 400);

	mock.assert_async().await;
}

#[tokio::test]
async fn forged_state_token_is_rejected_without_exchange() {
	let server = MockServer::start_async().await;
	let (connector, store) = build_test_connector(&server);
	let (user, org) = ids();
	let consent = connector.authorize(&user, &org).await.expect("Authorize should succeed.");
	let state = state_param(&consent);
	let mut forged = OAuthState::decode(&state).expect("State parameter should decode.");

	forged.state = "forged-token".into();

	let err = connector
		.oauth_callback(params("code-123", &forged.encode().expect("State should encode.")))
		.await
		.expect_err("Forged state should fail.");

	assert!(matches!(err, Error::StateMismatch));
	assert_eq!(err.to_string(), "State does not match.");
	assert!(
		store
			.get("hubspot_state:TestOrg:TestUser")
			.await
			.expect("Store read should succeed.")
			.is_some()
	);
}

#[tokio::test]
async fn callback_rejects_provider_errors_and_missing_parameters() {
	let server = MockServer::start_async().await;
	let (connector, _store) = build_test_connector(&server);
	let err = connector
		.oauth_callback_query("error=access_denied&state=x")
		.await
		.expect_err("Provider error should fail.");

	assert!(matches!(&err, Error::ProviderDenied { reason } if reason == "access_denied"));
	assert!(err.is_client_error());

	let err = connector
		.oauth_callback_query("code=abc")
		.await
		.expect_err("Missing state should fail.");

	assert!(matches!(err, Error::MissingState));

	let err = connector
		.oauth_callback(CallbackParams { state: Some("{}".into()), ..Default::default() })
		.await
		.expect_err("Missing code should fail.");

	assert!(matches!(err, Error::MissingCode));

	let err = connector
		.oauth_callback(params("abc", "not json"))
		.await
		.expect_err("Unparseable state should fail.");

	assert!(matches!(err, Error::InvalidState { .. }));
}

#[tokio::test]
async fn expired_or_unknown_state_is_a_mismatch() {
	let server = MockServer::start_async().await;
	let (connector, _store) = build_test_connector(&server);
	let (user, org) = ids();
	let never_stored = OAuthState::generate(user, org).encode().expect("State should encode.");
	let err = connector
		.oauth_callback(params("abc", &never_stored))
		.await
		.expect_err("Unknown state should fail.");

	assert!(matches!(err, Error::StateMismatch));
}

#[tokio::test]
async fn failed_exchange_consumes_state_and_stores_nothing() {
	let server = MockServer::start_async().await;
	let (connector, store) = build_test_connector(&server);
	let (user, org) = ids();
	let consent = connector.authorize(&user, &org).await.expect("Authorize should succeed.");
	let state = state_param(&consent);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"status\":\"BAD_AUTH_CODE\"}");
		})
		.await;
	let err = connector
		.oauth_callback(params("bad-code", &state))
		.await
		.expect_err("Rejected exchange should fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::ExchangeFailed { status: Some(400), .. }));
	assert!(err.is_client_error());
	assert!(store.is_empty());
}

#[tokio::test]
async fn failed_state_delete_does_not_block_the_callback() {
	let server = MockServer::start_async().await;
	let store = Arc::new(RecordingStore::failing_deletes());
	let connector = build_test_connector_with_store(&server, store.clone());
	let (user, org) = ids();
	let consent = connector.authorize(&user, &org).await.expect("Authorize should succeed.");
	let state = state_param(&consent);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let page = connector
		.oauth_callback(params("code-123", &state))
		.await
		.expect("Callback should succeed despite the delete failure.");

	mock.assert_async().await;

	assert_eq!(page, CallbackPage::close_window());

	let stashed = store
		.get("hubspot_credentials:TestOrg:TestUser")
		.await
		.expect("Store read should succeed.")
		.expect("Credentials should be stashed.");

	assert!(stashed.contains("access-it"));
}

#[tokio::test]
async fn state_and_credentials_expire_after_ten_minutes() {
	let server = MockServer::start_async().await;
	let store = Arc::new(RecordingStore::default());
	let connector = build_test_connector_with_store(&server, store.clone());
	let (user, org) = ids();
	let consent = connector.authorize(&user, &org).await.expect("Authorize should succeed.");
	let state = state_param(&consent);

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	connector.oauth_callback(params("code-123", &state)).await.expect("Callback should succeed.");

	assert_eq!(
		store.writes(),
		vec![
			("hubspot_state:TestOrg:TestUser".to_owned(), Duration::seconds(600)),
			("hubspot_credentials:TestOrg:TestUser".to_owned(), Duration::seconds(600)),
		]
	);
}
