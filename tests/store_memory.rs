// std
use std::time::Duration;
// self
use oauth2_singleflight::store::{AtomicOp, KvStore, MemoryStore};

#[tokio::test]
async fn set_if_absent_is_exclusive() {
	let store = MemoryStore::default();

	assert!(
		store
			.set_if_absent("rt_lock:abc", "1", 5)
			.await
			.expect("First conditional set should succeed.")
	);
	assert!(
		!store
			.set_if_absent("rt_lock:abc", "2", 5)
			.await
			.expect("Second conditional set should succeed."),
		"A live entry must not be replaced."
	);
	assert_eq!(
		store.get("rt_lock:abc").await.expect("Get should succeed.").as_deref(),
		Some("1"),
		"The losing write must not clobber the stored value."
	);
}

#[tokio::test(start_paused = true)]
async fn entries_expire_after_their_ttl() {
	let store = MemoryStore::default();

	store
		.set_if_absent("rt_lock:abc", "1", 1)
		.await
		.expect("Conditional set should succeed.");

	assert!(store.exists("rt_lock:abc").await.expect("Exists probe should succeed."));

	tokio::time::sleep(Duration::from_secs(2)).await;

	assert!(
		!store.exists("rt_lock:abc").await.expect("Exists probe should succeed."),
		"Expired entries must read as absent."
	);
	assert_eq!(store.get("rt_lock:abc").await.expect("Get should succeed."), None);
	assert!(
		store
			.set_if_absent("rt_lock:abc", "2", 1)
			.await
			.expect("Conditional set should succeed."),
		"An expired entry must not block re-acquisition."
	);
}

#[tokio::test]
async fn delete_is_idempotent_and_scoped() {
	let store = MemoryStore::default();

	store.set_if_absent("key-a", "1", 60).await.expect("Seeding key-a should succeed.");
	store.set_if_absent("key-b", "1", 60).await.expect("Seeding key-b should succeed.");

	store.delete("key-a").await.expect("First delete should succeed.");
	store.delete("key-a").await.expect("Deleting an absent key should not error.");

	assert!(!store.exists("key-a").await.expect("Exists probe should succeed."));
	assert!(
		store.exists("key-b").await.expect("Exists probe should succeed."),
		"Unrelated keys must be untouched."
	);
}

#[tokio::test]
async fn atomic_batch_pairs_set_with_delete() {
	let store = MemoryStore::default();

	store
		.set_if_absent("rt_lock:abc", "1", 60)
		.await
		.expect("Seeding the lease should succeed.");
	store
		.execute_atomic(vec![
			AtomicOp::SetWithTtl {
				key: "cache_rt_lock:abc".into(),
				value: "{\"access_token\":\"a\"}".into(),
				ttl_secs: 60,
			},
			AtomicOp::Delete { key: "rt_lock:abc".into() },
		])
		.await
		.expect("Atomic batch should succeed.");

	assert!(!store.exists("rt_lock:abc").await.expect("Exists probe should succeed."));
	assert_eq!(
		store
			.get("cache_rt_lock:abc")
			.await
			.expect("Get should succeed.")
			.as_deref(),
		Some("{\"access_token\":\"a\"}")
	);
	assert_eq!(store.len(), 1);
}
