use crate::identity::IdentityProvider;
use crate::local_store::LocalStore;
use crate::remote::RemoteStore;
use moviemuse_models::UserIdentity;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Observable state of the watchlist engine.
///
/// `loading` tracks an in-flight reconciliation and `saving` an in-flight
/// mutation push; the two are independent and may be true simultaneously.
#[derive(Debug, Clone, Default)]
pub struct WatchlistState {
    pub ids: Vec<u64>,
    pub loading: bool,
    pub saving: bool,
    pub error: Option<String>,
}

struct WatchlistInner {
    state: Mutex<WatchlistState>,
    local: LocalStore,
    remote: Arc<dyn RemoteStore>,
    identity: Arc<dyn IdentityProvider>,
    // Bumped on every identity transition; a reconciliation that resumes with
    // a stale generation abandons instead of clobbering newer state.
    generation: AtomicU64,
}

/// Merged per-user watchlist with local-first persistence.
///
/// Mutations apply to the in-memory list and the local slot synchronously;
/// the remote record is pushed in the background when a user is signed in,
/// and failures surface through [`WatchlistState::error`] rather than
/// rolling anything back. On sign-in (or an identity switch) the local and
/// remote lists are reconciled to their union.
///
/// Concurrent writers to the same remote record resolve last-write-wins;
/// there is no version check (single-user, single-device usage pattern).
///
/// Must be constructed inside a tokio runtime: the engine spawns an
/// identity watcher and the background remote writes.
pub struct Watchlist {
    inner: Arc<WatchlistInner>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    watcher: JoinHandle<()>,
}

impl Watchlist {
    pub fn new(
        local: LocalStore,
        remote: Arc<dyn RemoteStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let ids = local.read();
        debug!(count = ids.len(), "Seeded watchlist from local slot");

        let inner = Arc::new(WatchlistInner {
            state: Mutex::new(WatchlistState {
                ids,
                ..Default::default()
            }),
            local,
            remote,
            identity: identity.clone(),
            generation: AtomicU64::new(0),
        });

        // Watch for sign-in and identity-switch transitions. The task holds
        // only a Weak handle: once the engine is dropped, the next wakeup
        // exits instead of touching freed state.
        let weak = Arc::downgrade(&inner);
        let mut rx = identity.subscribe();
        let watcher = tokio::spawn(async move {
            let mut previous = rx.borrow().as_ref().map(|u| u.uid.clone());
            loop {
                if rx.changed().await.is_err() {
                    break;
                }
                let current = rx.borrow().clone();
                let Some(inner) = weak.upgrade() else { break };
                let uid = current.as_ref().map(|u| u.uid.clone());
                if uid == previous {
                    continue;
                }
                previous = uid;
                if let Some(user) = current {
                    let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
                    let weak = Arc::downgrade(&inner);
                    drop(inner);
                    WatchlistInner::reconcile(weak, user, generation).await;
                }
            }
        });

        let watchlist = Self {
            inner,
            tasks: Mutex::new(Vec::new()),
            watcher,
        };

        // A user already present at construction counts as an
        // absent -> present transition
        if let Some(user) = identity.current_user() {
            let generation = watchlist.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            let weak = Arc::downgrade(&watchlist.inner);
            let handle =
                tokio::spawn(async move { WatchlistInner::reconcile(weak, user, generation).await });
            watchlist.tasks.lock().unwrap().push(handle);
        }

        watchlist
    }

    /// Current merged, de-duplicated identifier list
    pub fn ids(&self) -> Vec<u64> {
        self.inner.state.lock().unwrap().ids.clone()
    }

    pub fn has(&self, id: u64) -> bool {
        self.inner.state.lock().unwrap().ids.contains(&id)
    }

    pub fn loading(&self) -> bool {
        self.inner.state.lock().unwrap().loading
    }

    pub fn saving(&self) -> bool {
        self.inner.state.lock().unwrap().saving
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.lock().unwrap().error.clone()
    }

    pub fn snapshot(&self) -> WatchlistState {
        self.inner.state.lock().unwrap().clone()
    }

    /// Append `id` if absent. The in-memory list and the local slot are
    /// updated before this returns; the remote push (when signed in) runs in
    /// the background.
    pub fn add(&self, id: u64) {
        let next = {
            let mut state = self.inner.state.lock().unwrap();
            if state.ids.contains(&id) {
                return;
            }
            state.ids.push(id);
            state.ids.clone()
        };
        debug!(id, "Added to watchlist");
        self.persist(next);
    }

    /// Remove `id` if present; a miss leaves both the in-memory list and the
    /// local slot untouched.
    pub fn remove(&self, id: u64) {
        let next = {
            let mut state = self.inner.state.lock().unwrap();
            let Some(position) = state.ids.iter().position(|&x| x == id) else {
                return;
            };
            state.ids.remove(position);
            state.ids.clone()
        };
        debug!(id, "Removed from watchlist");
        self.persist(next);
    }

    fn persist(&self, next: Vec<u64>) {
        if let Err(e) = self.inner.local.write(&next) {
            warn!("Failed to persist watchlist locally: {}", e);
        }

        // Local-only until sign-in
        let Some(user) = self.inner.identity.current_user() else {
            return;
        };

        {
            let mut state = self.inner.state.lock().unwrap();
            state.saving = true;
            state.error = None;
        }

        let weak = Arc::downgrade(&self.inner);
        let remote = self.inner.remote.clone();
        let handle =
            tokio::spawn(async move { WatchlistInner::push(weak, remote, user, next).await });
        self.tasks.lock().unwrap().push(handle);
    }

    /// Reconcile with the current identity's remote record now; no-op when
    /// signed out.
    pub async fn reconcile(&self) {
        let Some(user) = self.inner.identity.current_user() else {
            debug!("Reconcile requested while signed out; nothing to do");
            return;
        };
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        WatchlistInner::reconcile(Arc::downgrade(&self.inner), user, generation).await;
    }

    /// Await background remote writes. Local state never depends on this;
    /// it exists so a short-lived process (or a test) doesn't race its own
    /// exit against an in-flight push.
    pub async fn flush(&self) {
        loop {
            let handles: Vec<_> = self.tasks.lock().unwrap().drain(..).collect();
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                let _ = handle.await;
            }
        }
    }
}

impl Drop for Watchlist {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

impl WatchlistInner {
    async fn reconcile(weak: Weak<WatchlistInner>, user: UserIdentity, generation: u64) {
        let Some(remote) = weak.upgrade().map(|inner| {
            let mut state = inner.state.lock().unwrap();
            state.loading = true;
            state.error = None;
            inner.remote.clone()
        }) else {
            return;
        };

        info!(uid = %user.uid, "Reconciling watchlist with remote record");
        let fetched = remote.fetch(&user.uid).await;

        let Some(inner) = weak.upgrade() else {
            debug!("Watchlist dropped during reconciliation; abandoning");
            return;
        };
        if inner.generation.load(Ordering::SeqCst) != generation {
            debug!("Identity changed during reconciliation; abandoning");
            return;
        }

        let (record_exists, remote_len, merged) = match fetched {
            Ok(record) => {
                let remote_ids = record.as_ref().map(|r| r.ids.clone()).unwrap_or_default();
                let merged = {
                    let mut state = inner.state.lock().unwrap();
                    let merged = union_ids(&remote_ids, &state.ids);
                    state.ids = merged.clone();
                    merged
                };
                if let Err(e) = inner.local.write(&merged) {
                    warn!("Failed to persist merged watchlist locally: {}", e);
                }
                (record.is_some(), remote_ids.len(), merged)
            }
            Err(e) => {
                warn!(uid = %user.uid, "Failed to fetch remote watchlist: {}", e);
                let mut state = inner.state.lock().unwrap();
                state.error = Some(format!("Failed to load watchlist: {}", e));
                state.loading = false;
                return;
            }
        };
        drop(inner);

        // Create the record on first authenticated use; update it when the
        // merge picked up local-only entries; skip the write when local and
        // remote were already consistent.
        let result = if !record_exists {
            Some(remote.create(&user.uid, &merged).await)
        } else if merged.len() != remote_len {
            Some(remote.update(&user.uid, &merged).await)
        } else {
            debug!(uid = %user.uid, "Remote record already consistent; skipping write");
            None
        };

        let Some(inner) = weak.upgrade() else { return };
        let mut state = inner.state.lock().unwrap();
        if let Some(Err(e)) = result {
            warn!(uid = %user.uid, "Failed to push merged watchlist: {}", e);
            state.error = Some(format!("Failed to save watchlist: {}", e));
        } else {
            info!(uid = %user.uid, count = merged.len(), "Watchlist reconciled");
        }
        state.loading = false;
    }

    async fn push(
        weak: Weak<WatchlistInner>,
        remote: Arc<dyn RemoteStore>,
        user: UserIdentity,
        ids: Vec<u64>,
    ) {
        let mut result = remote.update(&user.uid, &ids).await;
        if matches!(result, Err(ref e) if e.is_not_found()) {
            debug!(uid = %user.uid, "Remote record missing on update; creating it");
            result = remote.create(&user.uid, &ids).await;
        }

        let Some(inner) = weak.upgrade() else {
            debug!("Watchlist dropped during remote push; abandoning");
            return;
        };
        let mut state = inner.state.lock().unwrap();
        if let Err(e) = result {
            warn!(uid = %user.uid, "Failed to push watchlist mutation: {}", e);
            state.error = Some(format!("Failed to save watchlist: {}", e));
        }
        state.saving = false;
    }
}

/// Union with remote entries first, then local-only entries, preserving
/// first-seen order within each side
fn union_ids(remote: &[u64], local: &[u64]) -> Vec<u64> {
    let mut seen = HashSet::new();
    remote
        .iter()
        .chain(local.iter())
        .filter(|id| seen.insert(**id))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SessionIdentity;
    use crate::remote::{RemoteStore, RemoteStoreError};
    use async_trait::async_trait;
    use chrono::Utc;
    use moviemuse_models::WatchlistRecord;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Default)]
    struct MemoryRemoteStore {
        records: Mutex<HashMap<String, Vec<u64>>>,
        fail_fetch: AtomicBool,
        fail_update: AtomicBool,
        create_calls: AtomicUsize,
        update_calls: AtomicUsize,
    }

    impl MemoryRemoteStore {
        fn with_record(uid: &str, ids: &[u64]) -> Self {
            let store = Self::default();
            store
                .records
                .lock()
                .unwrap()
                .insert(uid.to_string(), ids.to_vec());
            store
        }

        fn record(&self, uid: &str) -> Option<Vec<u64>> {
            self.records.lock().unwrap().get(uid).cloned()
        }
    }

    #[async_trait]
    impl RemoteStore for MemoryRemoteStore {
        async fn fetch(&self, user_id: &str) -> Result<Option<WatchlistRecord>, RemoteStoreError> {
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(RemoteStoreError::Api {
                    status: 500,
                    message: "fetch unavailable".to_string(),
                });
            }
            Ok(self.record(user_id).map(|ids| WatchlistRecord {
                ids,
                updated_at: Utc::now(),
            }))
        }

        async fn create(&self, user_id: &str, ids: &[u64]) -> Result<(), RemoteStoreError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            self.records
                .lock()
                .unwrap()
                .insert(user_id.to_string(), ids.to_vec());
            Ok(())
        }

        async fn update(&self, user_id: &str, ids: &[u64]) -> Result<(), RemoteStoreError> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_update.load(Ordering::SeqCst) {
                return Err(RemoteStoreError::Api {
                    status: 503,
                    message: "update unavailable".to_string(),
                });
            }
            let mut records = self.records.lock().unwrap();
            match records.get_mut(user_id) {
                Some(existing) => {
                    *existing = ids.to_vec();
                    Ok(())
                }
                None => Err(RemoteStoreError::NotFound),
            }
        }
    }

    struct Fixture {
        _dir: TempDir,
        remote: Arc<MemoryRemoteStore>,
        identity: Arc<SessionIdentity>,
        watchlist: Watchlist,
    }

    fn user(uid: &str) -> UserIdentity {
        UserIdentity::new(uid)
    }

    fn fixture(
        local_ids: &[u64],
        remote: MemoryRemoteStore,
        identity: SessionIdentity,
    ) -> Fixture {
        let dir = TempDir::new().unwrap();
        let local = LocalStore::new(dir.path().join("watchlist.json"));
        if !local_ids.is_empty() {
            local.write(local_ids).unwrap();
        }
        let remote = Arc::new(remote);
        let identity = Arc::new(identity);
        let watchlist = Watchlist::new(
            local,
            remote.clone() as Arc<dyn RemoteStore>,
            identity.clone() as Arc<dyn IdentityProvider>,
        );
        Fixture {
            _dir: dir,
            remote,
            identity,
            watchlist,
        }
    }

    fn read_slot(watchlist: &Watchlist) -> Vec<u64> {
        LocalStore::new(watchlist.inner.local.path()).read()
    }

    async fn wait_until(deadline: Duration, mut predicate: impl FnMut() -> bool) {
        let start = std::time::Instant::now();
        while !predicate() {
            if start.elapsed() > deadline {
                panic!("condition not reached within {:?}", deadline);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_add_and_remove_locally_when_signed_out() {
        let f = fixture(&[], MemoryRemoteStore::default(), SessionIdentity::signed_out());

        f.watchlist.add(42);
        // Synchronous visibility: no await between the mutation and the read
        assert!(f.watchlist.has(42));
        assert_eq!(read_slot(&f.watchlist), vec![42]);

        f.watchlist.remove(42);
        assert!(!f.watchlist.has(42));
        assert_eq!(read_slot(&f.watchlist), Vec::<u64>::new());

        f.watchlist.flush().await;
        assert_eq!(f.remote.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.remote.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let f = fixture(&[], MemoryRemoteStore::default(), SessionIdentity::signed_out());

        f.watchlist.add(7);
        f.watchlist.add(7);
        assert_eq!(f.watchlist.ids(), vec![7]);
        assert_eq!(read_slot(&f.watchlist), vec![7]);
    }

    #[tokio::test]
    async fn test_remove_absent_is_a_noop() {
        let f = fixture(&[], MemoryRemoteStore::default(), SessionIdentity::signed_out());

        f.watchlist.add(1);
        f.watchlist.remove(99);
        assert_eq!(f.watchlist.ids(), vec![1]);
        assert_eq!(read_slot(&f.watchlist), vec![1]);
    }

    #[tokio::test]
    async fn test_unauthenticated_sequence_matches_set_semantics() {
        let f = fixture(&[], MemoryRemoteStore::default(), SessionIdentity::signed_out());

        for id in [3, 1, 4, 1, 5, 9, 2, 6] {
            f.watchlist.add(id);
        }
        f.watchlist.remove(4);
        f.watchlist.remove(4);

        assert_eq!(f.watchlist.ids(), vec![3, 1, 5, 9, 2, 6]);
        assert_eq!(read_slot(&f.watchlist), f.watchlist.ids());
    }

    #[tokio::test]
    async fn test_reconcile_merges_remote_first_then_local_only() {
        let f = fixture(
            &[1, 2],
            MemoryRemoteStore::with_record("u1", &[2, 3]),
            SessionIdentity::new(Some(user("u1"))),
        );
        f.watchlist.flush().await;

        assert_eq!(f.watchlist.ids(), vec![2, 3, 1]);
        assert_eq!(read_slot(&f.watchlist), vec![2, 3, 1]);
        assert!(!f.watchlist.loading());
        assert_eq!(f.watchlist.error(), None);

        // 2 remote ids grew to 3, so the record was updated
        assert_eq!(f.remote.record("u1"), Some(vec![2, 3, 1]));
        assert_eq!(f.remote.update_calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.remote.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reconcile_creates_record_when_absent() {
        let f = fixture(
            &[5, 6],
            MemoryRemoteStore::default(),
            SessionIdentity::new(Some(user("u1"))),
        );
        f.watchlist.flush().await;

        assert_eq!(f.remote.record("u1"), Some(vec![5, 6]));
        assert_eq!(f.remote.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.remote.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reconcile_skips_write_when_already_consistent() {
        let f = fixture(
            &[7, 8],
            MemoryRemoteStore::with_record("u1", &[7, 8]),
            SessionIdentity::new(Some(user("u1"))),
        );
        f.watchlist.flush().await;

        assert_eq!(f.watchlist.ids(), vec![7, 8]);
        assert_eq!(f.remote.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.remote.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reconcile_fetch_failure_keeps_local_state() {
        let remote = MemoryRemoteStore::default();
        remote.fail_fetch.store(true, Ordering::SeqCst);
        let f = fixture(&[1], remote, SessionIdentity::new(Some(user("u1"))));
        f.watchlist.flush().await;

        assert_eq!(f.watchlist.ids(), vec![1]);
        assert!(!f.watchlist.loading());
        let error = f.watchlist.error().expect("fetch failure should surface");
        assert!(error.starts_with("Failed to load watchlist"));
    }

    #[tokio::test]
    async fn test_mutation_push_updates_remote_record() {
        let f = fixture(
            &[1],
            MemoryRemoteStore::with_record("u1", &[1]),
            SessionIdentity::new(Some(user("u1"))),
        );
        f.watchlist.flush().await;

        f.watchlist.add(2);
        assert!(f.watchlist.has(2));
        f.watchlist.flush().await;

        assert_eq!(f.remote.record("u1"), Some(vec![1, 2]));
        assert!(!f.watchlist.saving());
        assert_eq!(f.watchlist.error(), None);
    }

    #[tokio::test]
    async fn test_mutation_push_falls_back_to_create_on_missing_record() {
        let f = fixture(
            &[1],
            MemoryRemoteStore::with_record("u1", &[1]),
            SessionIdentity::new(Some(user("u1"))),
        );
        f.watchlist.flush().await;

        // The record vanished server-side between reconciliation and the push
        f.remote.records.lock().unwrap().clear();

        f.watchlist.add(9);
        f.watchlist.flush().await;

        assert_eq!(f.remote.record("u1"), Some(vec![1, 9]));
        assert_eq!(f.remote.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.watchlist.error(), None);
    }

    #[tokio::test]
    async fn test_mutation_push_failure_leaves_local_state_mutated() {
        let f = fixture(
            &[1],
            MemoryRemoteStore::with_record("u1", &[1]),
            SessionIdentity::new(Some(user("u1"))),
        );
        f.watchlist.flush().await;

        f.remote.fail_update.store(true, Ordering::SeqCst);
        f.watchlist.add(2);
        f.watchlist.flush().await;

        // No rollback: local state is the source of truth for the UI
        assert!(f.watchlist.has(2));
        assert_eq!(read_slot(&f.watchlist), vec![1, 2]);
        assert!(!f.watchlist.saving());
        let error = f.watchlist.error().expect("push failure should surface");
        assert!(error.starts_with("Failed to save watchlist"));
        assert_eq!(f.remote.record("u1"), Some(vec![1]));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_sign_in_triggers_reconciliation() {
        let f = fixture(
            &[1],
            MemoryRemoteStore::with_record("u1", &[2, 3]),
            SessionIdentity::signed_out(),
        );
        assert_eq!(f.watchlist.ids(), vec![1]);

        f.identity.sign_in(user("u1"));
        wait_until(Duration::from_secs(2), || f.watchlist.ids().len() == 3).await;

        assert_eq!(f.watchlist.ids(), vec![2, 3, 1]);
        assert_eq!(read_slot(&f.watchlist), vec![2, 3, 1]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_identity_switch_reconciles_against_new_record() {
        let remote = MemoryRemoteStore::with_record("alice", &[10]);
        remote
            .records
            .lock()
            .unwrap()
            .insert("bob".to_string(), vec![20]);
        let f = fixture(&[], remote, SessionIdentity::new(Some(user("alice"))));
        f.watchlist.flush().await;
        assert_eq!(f.watchlist.ids(), vec![10]);

        f.identity.sign_in(user("bob"));
        wait_until(Duration::from_secs(2), || f.watchlist.has(20)).await;

        // Bob's record merges with what the session already held
        assert_eq!(f.watchlist.ids(), vec![20, 10]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_teardown_abandons_in_flight_work() {
        let identity = Arc::new(SessionIdentity::signed_out());
        let dir = TempDir::new().unwrap();
        let local = LocalStore::new(dir.path().join("watchlist.json"));
        let remote: Arc<MemoryRemoteStore> = Arc::new(MemoryRemoteStore::default());
        let watchlist = Watchlist::new(
            local,
            remote.clone() as Arc<dyn RemoteStore>,
            identity.clone() as Arc<dyn IdentityProvider>,
        );
        drop(watchlist);

        // Sign-in after teardown must not create a record for the dead engine
        identity.sign_in(user("u1"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(remote.record("u1"), None);
    }

    #[test]
    fn test_union_order_is_remote_first_then_local_only() {
        assert_eq!(union_ids(&[2, 3], &[1, 2]), vec![2, 3, 1]);
        assert_eq!(union_ids(&[], &[1, 1, 2]), vec![1, 2]);
        assert_eq!(union_ids(&[4, 4, 5], &[]), vec![4, 5]);
        assert_eq!(union_ids(&[], &[]), Vec::<u64>::new());
    }
}
