//! Single-instance guarantees of the holder, local and process-wide.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use proptest::prelude::*;
use serial_test::serial;

use switchboard::capabilities::LoginApi;
use switchboard::features::Credentials;
use switchboard::testing::{RecordingTransport, json_response, test_client};
use switchboard::{Holder, HolderState, holder};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_concurrent_caller_sees_one_instance(threads in 1usize..24, calls_per_thread in 1usize..8) {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let holder = Holder::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::yield_now();
            String::from("executor")
        });
        let barrier = Barrier::new(threads);

        let seen: Vec<Arc<String>> = thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        (0..calls_per_thread).map(|_| holder.get()).collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        prop_assert_eq!(built.load(Ordering::SeqCst), 1);
        prop_assert_eq!(holder.constructions(), 1);
        prop_assert_eq!(seen.len(), threads * calls_per_thread);
        prop_assert!(seen.iter().all(|s| Arc::ptr_eq(s, &seen[0])));
    }
}

#[test]
fn untouched_holder_never_constructs() {
    let holder: Holder<String> = Holder::new(|| panic!("constructed without access"));
    assert_eq!(holder.state(), HolderState::Uninitialized);
    assert_eq!(holder.constructions(), 0);
}

#[test]
#[serial]
fn global_holder_returns_same_executor() {
    let a = holder::shared();
    let b = holder::shared();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(holder::global().is_initialized());
    assert_eq!(holder::global().state(), HolderState::Ready);
}

#[tokio::test]
#[serial]
async fn global_substitute_is_scoped_to_the_guard() {
    let production = holder::shared();

    let transport = Arc::new(RecordingTransport::with_fallback(json_response(
        &serde_json::json!({"id": "u1"}),
    )));
    {
        let _guard = holder::global().install(Arc::new(test_client(transport.clone())));
        let substitute = holder::shared();
        assert!(!Arc::ptr_eq(&production, &substitute));

        let user = substitute.login(Credentials::new("a", "b")).await.unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(transport.request_count(), 1);
    }

    // The production executor is back, untouched by the substitute.
    let restored = holder::shared();
    assert!(Arc::ptr_eq(&production, &restored));
    assert_eq!(transport.request_count(), 1);
}

#[test]
#[serial]
fn shared_or_init_does_not_rebuild() {
    let existing = holder::shared();
    let again = holder::shared_or_init(|| panic!("global executor rebuilt"));
    assert!(Arc::ptr_eq(&existing, &again));
}
