// std
use std::sync::Arc;
// crates.io
use time::Duration;
// self
use hubspot_connector::{
	auth::{OrgId, UserId},
	store::{EphemeralStore, KeyNamespace, MemoryStore, StoreKey},
};

fn key(namespace: KeyNamespace) -> StoreKey {
	let org = OrgId::new("TestOrg").expect("Org fixture should be valid.");
	let user = UserId::new("TestUser").expect("User fixture should be valid.");

	StoreKey::new("hubspot", namespace, &org, &user)
}

#[tokio::test]
async fn clones_share_one_backing_map() {
	let backend = MemoryStore::default();
	let store: Arc<dyn EphemeralStore> = Arc::new(backend.clone());
	let state = key(KeyNamespace::State);

	assert_eq!(state.as_str(), "hubspot_state:TestOrg:TestUser");

	store
		.set(state.as_str(), "pending".into(), Duration::seconds(600))
		.await
		.expect("Set through the trait object should succeed.");

	assert_eq!(
		backend.get(state.as_str()).await.expect("Get should succeed."),
		Some("pending".into())
	);
	assert_eq!(
		backend
			.get(key(KeyNamespace::Credentials).as_str())
			.await
			.expect("Get should succeed."),
		None
	);
}

#[tokio::test]
async fn entries_expire_after_their_ttl() {
	let store = MemoryStore::default();
	let credentials = key(KeyNamespace::Credentials);

	store
		.set(credentials.as_str(), "{}".into(), Duration::milliseconds(50))
		.await
		.expect("Set should succeed.");

	assert!(store.get(credentials.as_str()).await.expect("Get should succeed.").is_some());

	tokio::time::sleep(std::time::Duration::from_millis(120)).await;

	assert!(store.get(credentials.as_str()).await.expect("Get should succeed.").is_none());
	assert!(store.is_empty());
}

#[tokio::test]
async fn set_replaces_previous_value_and_ttl() {
	let store = MemoryStore::default();
	let state = key(KeyNamespace::State);

	store.set(state.as_str(), "old".into(), Duration::ZERO).await.expect("Set should succeed.");
	store
		.set(state.as_str(), "new".into(), Duration::seconds(600))
		.await
		.expect("Set should succeed.");

	assert_eq!(store.purge_expired(), 0);
	assert_eq!(store.get(state.as_str()).await.expect("Get should succeed."), Some("new".into()));
}
