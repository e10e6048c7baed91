// std
use std::{sync::Arc, time::Duration};
// self
use oauth2_singleflight::{
	lock::LockManager,
	store::{KvStore, MemoryStore},
};

fn build_manager(ttl: Duration) -> (LockManager, Arc<MemoryStore>) {
	let backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn KvStore> = backend.clone();

	(LockManager::new(store, ttl), backend)
}

#[tokio::test]
async fn acquisition_is_exclusive_until_released() {
	let (manager, _backend) = build_manager(Duration::from_secs(5));
	let key = LockManager::derive_key("tok-A");

	assert!(manager.try_acquire(&key).await.expect("First acquisition should succeed."));
	assert!(
		!manager.try_acquire(&key).await.expect("Second acquisition should succeed."),
		"A held lease must not be acquirable."
	);
	assert!(manager.exists(&key).await.expect("Exists probe should succeed."));

	manager.release(&key).await.expect("Release should succeed.");

	assert!(!manager.exists(&key).await.expect("Exists probe should succeed."));
	assert!(
		manager.try_acquire(&key).await.expect("Re-acquisition should succeed."),
		"A released lease must be acquirable again."
	);
}

#[tokio::test]
async fn release_is_idempotent_and_scoped() {
	let (manager, _backend) = build_manager(Duration::from_secs(5));
	let held = LockManager::derive_key("tok-A");
	let absent = LockManager::derive_key("tok-B");

	assert!(manager.try_acquire(&held).await.expect("Acquisition should succeed."));

	manager.release(&absent).await.expect("Releasing an absent lease should not error.");
	manager.release(&absent).await.expect("Repeated release should not error.");

	assert!(
		manager.exists(&held).await.expect("Exists probe should succeed."),
		"Releasing an unrelated lease must not affect a held one."
	);
}

#[tokio::test(start_paused = true)]
async fn leases_expire_naturally_at_their_ttl() {
	let (manager, _backend) = build_manager(Duration::from_secs(2));
	let key = LockManager::derive_key("tok-A");

	assert!(manager.try_acquire(&key).await.expect("Acquisition should succeed."));

	tokio::time::sleep(Duration::from_secs(3)).await;

	assert!(
		!manager.exists(&key).await.expect("Exists probe should succeed."),
		"An expired lease must read as absent."
	);
	assert!(
		manager.try_acquire(&key).await.expect("Re-acquisition should succeed."),
		"Expiry must make the lease acquirable without an explicit release."
	);
}
