//! Integration tests for the session registry.
//!
//! These tests drive the public API end to end:
//! 1. Per-user cap with oldest-first eviction
//! 2. Idle expiry, both manual and via the background reaper
//! 3. Termination observers, including failing ones
//! 4. Concurrent access from threads and tasks
//! 5. Shutdown, drop and scoped lifetimes

use proptest::prelude::*;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use session_registry::adapters::RecordingObserver;
use session_registry::{
    ObserverError, RegistryConfig, RegistryError, Session, SessionId, SessionRegistry,
    TerminationObserver, UserId,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn manual_config() -> RegistryConfig {
    RegistryConfig::default()
        .with_inactive_timeout(1)
        .with_cleanup_interval(1)
        .with_max_sessions_per_user(3)
        .with_auto_cleanup(false)
}

fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

/// Observer that counts calls and records the order it ran in.
struct OrderedObserver {
    label: &'static str,
    log: Arc<parking_lot::Mutex<Vec<&'static str>>>,
}

impl TerminationObserver for OrderedObserver {
    fn on_terminated(&self, _session: &Session) -> Result<(), ObserverError> {
        self.log.lock().push(self.label);
        Ok(())
    }

    fn name(&self) -> &str {
        self.label
    }
}

// =============================================================================
// Cap and eviction
// =============================================================================

#[test]
fn fourth_session_evicts_first() {
    let registry = SessionRegistry::new(manual_config()).unwrap();
    let audit = Arc::new(RecordingObserver::new());
    registry.register_termination_callback(audit.clone());
    let alice = user("alice");

    let s1 = registry.create_session(&alice, None);
    let s2 = registry.create_session(&alice, None);
    let s3 = registry.create_session(&alice, None);
    let s4 = registry.create_session(&alice, None);

    let mut live: Vec<SessionId> = registry
        .get_user_sessions(&alice)
        .iter()
        .map(|s| s.id().clone())
        .collect();
    live.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    let mut expected = vec![s2.id().clone(), s3.id().clone(), s4.id().clone()];
    expected.sort_by(|a, b| a.as_str().cmp(b.as_str()));

    assert_eq!(live, expected);
    assert!(registry.get_session(s1.id()).is_none());
    assert_eq!(audit.terminated_ids(), vec![s1.id().clone()]);
}

#[test]
fn cap_of_one_replaces_session() {
    let registry = SessionRegistry::new(manual_config().with_max_sessions_per_user(1)).unwrap();
    let alice = user("alice");

    let first = registry.create_session(&alice, None);
    let second = registry.create_session(&alice, None);

    assert!(registry.get_session(first.id()).is_none());
    assert!(registry.get_session(second.id()).is_some());
    assert_eq!(registry.get_user_sessions(&alice).len(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn cap_holds_and_newest_survive(cap in 1usize..6, creates in 1usize..20) {
        let registry = SessionRegistry::new(manual_config().with_max_sessions_per_user(cap)).unwrap();
        let alice = user("alice");

        let ids: Vec<SessionId> = (0..creates)
            .map(|_| registry.create_session(&alice, None).id().clone())
            .collect();

        let live = registry.get_user_sessions(&alice);
        prop_assert_eq!(live.len(), creates.min(cap));

        let survivors = &ids[creates.saturating_sub(cap)..];
        for id in survivors {
            prop_assert!(registry.get_session(id).is_some());
        }
        for id in &ids[..creates.saturating_sub(cap)] {
            prop_assert!(registry.get_session(id).is_none());
        }
    }
}

// =============================================================================
// Expiry
// =============================================================================

#[test]
fn manual_cleanup_after_timeout() {
    let registry = SessionRegistry::new(manual_config()).unwrap();
    let audit = Arc::new(RecordingObserver::new());
    registry.register_termination_callback(audit.clone());
    let session = registry.create_session(&user("alice"), None);

    std::thread::sleep(Duration::from_millis(1500));

    assert_eq!(registry.cleanup_inactive_sessions(), 1);
    assert!(registry.get_session(session.id()).is_none());
    assert!(audit.has_session(session.id()));
}

#[test]
fn activity_keeps_session_alive() {
    let registry = SessionRegistry::new(manual_config()).unwrap();
    let session = registry.create_session(&user("alice"), None);

    for _ in 0..3 {
        std::thread::sleep(Duration::from_millis(500));
        assert!(registry.update_session_activity(session.id()));
    }

    assert_eq!(registry.cleanup_inactive_sessions(), 0);
    assert!(registry.get_session(session.id()).is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reaper_expires_idle_sessions() {
    let registry = SessionRegistry::new(manual_config().with_auto_cleanup(true)).unwrap();
    let audit = Arc::new(RecordingObserver::new());
    registry.register_termination_callback(audit.clone());
    let session = registry.create_session(&user("alice"), None);

    assert!(registry.is_auto_cleanup_running());
    tokio::time::sleep(Duration::from_millis(3500)).await;

    assert!(registry.get_session(session.id()).is_none());
    assert_eq!(audit.terminated_ids(), vec![session.id().clone()]);

    registry.shutdown().await;
    assert!(!registry.is_auto_cleanup_running());
}

// =============================================================================
// Observers
// =============================================================================

#[test]
fn observers_run_in_registration_order() {
    let registry = SessionRegistry::new(manual_config()).unwrap();
    let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
    for label in ["first", "second"] {
        registry.register_termination_callback(Arc::new(OrderedObserver {
            label,
            log: Arc::clone(&log),
        }));
    }
    let session = registry.create_session(&user("alice"), None);

    assert!(registry.terminate_session(session.id()));

    assert_eq!(*log.lock(), vec!["first", "second"]);
}

#[test]
fn panicking_observer_is_contained() {
    let registry = SessionRegistry::new(manual_config()).unwrap();
    registry.on_termination("panics", |_: &Session| panic!("observer exploded"));
    let audit = Arc::new(RecordingObserver::new());
    registry.register_termination_callback(audit.clone());
    let session = registry.create_session(&user("alice"), None);

    assert!(registry.terminate_session(session.id()));
    assert!(registry.get_session(session.id()).is_none());
    assert_eq!(audit.count(), 1);
}

#[test]
fn observer_may_call_back_into_registry() {
    let registry = Arc::new(SessionRegistry::new(manual_config()).unwrap());
    let weak = Arc::downgrade(&registry);
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    registry.on_termination("reentrant", move |session: &Session| {
        if let Some(registry) = weak.upgrade() {
            counter.store(registry.get_user_sessions(session.user_id()).len(), Ordering::SeqCst);
        }
        Ok(())
    });
    let alice = user("alice");
    let doomed = registry.create_session(&alice, None);
    registry.create_session(&alice, None);

    assert!(registry.terminate_session(doomed.id()));
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn concurrent_creates_respect_cap() {
    let registry = Arc::new(SessionRegistry::new(manual_config()).unwrap());
    let evictions = Arc::new(RecordingObserver::new());
    registry.register_termination_callback(evictions.clone());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for _ in 0..25 {
                    registry.create_session(&user("alice"), None);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.get_user_sessions(&user("alice")).len(), 3);
    assert_eq!(evictions.count(), 8 * 25 - 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_terminations_notify_once() {
    let registry = Arc::new(
        SessionRegistry::new(manual_config().with_max_sessions_per_user(100)).unwrap(),
    );
    let audit = Arc::new(RecordingObserver::new());
    registry.register_termination_callback(audit.clone());
    let ids: Vec<SessionId> = (0..50)
        .map(|_| registry.create_session(&user("alice"), None).id().clone())
        .collect();
    let ids = Arc::new(ids);

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let ids = Arc::clone(&ids);
            tokio::task::spawn_blocking(move || {
                ids.iter().filter(|id| registry.terminate_session(id)).count()
            })
        })
        .collect();

    let mut total = 0;
    for task in tasks {
        total += task.await.unwrap();
    }

    assert_eq!(total, 50);
    assert_eq!(audit.count(), 50);
}

// =============================================================================
// Lifetime
// =============================================================================

#[tokio::test]
async fn shutdown_terminates_everything_once() {
    let registry = SessionRegistry::new(manual_config().with_auto_cleanup(true)).unwrap();
    let audit = Arc::new(RecordingObserver::new());
    registry.register_termination_callback(audit.clone());
    registry.create_session(&user("alice"), None);
    registry.create_session(&user("bob"), None);

    assert_eq!(registry.shutdown().await, 2);
    assert_eq!(registry.shutdown().await, 0);
    drop(registry);

    assert_eq!(audit.count(), 2);
}

#[tokio::test]
async fn dropping_registry_cleans_up() {
    let audit = Arc::new(RecordingObserver::new());
    {
        let registry = SessionRegistry::new(manual_config().with_auto_cleanup(true)).unwrap();
        registry.register_termination_callback(audit.clone());
        registry.create_session(&user("alice"), None);
    }
    assert_eq!(audit.count(), 1);
}

#[tokio::test]
async fn scope_returns_body_output() {
    let audit = Arc::new(RecordingObserver::new());
    let observer = audit.clone();

    let stats = SessionRegistry::scope(manual_config(), |registry| async move {
        registry.register_termination_callback(observer);
        let session = registry.create_session(&user("alice"), None);
        registry.set_session_data(session.id(), "cart", json!(["book"]));
        registry.get_stats()
    })
    .await
    .unwrap();

    assert_eq!(stats.total_active_sessions, 1);
    assert_eq!(audit.count(), 1);
    assert_eq!(audit.recorded()[0].data.get("cart"), Some(&json!(["book"])));
}

#[tokio::test]
async fn scope_rejects_invalid_config() {
    let result = SessionRegistry::scope(manual_config().with_inactive_timeout(0), |_| async {}).await;
    assert!(matches!(result, Err(RegistryError::InvalidConfig(_))));
}
