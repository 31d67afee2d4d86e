//! End-to-end flows over the PIN component with mock collaborators.

use haven_auth::{
    DuressAlertSink, DuressPolicy, LockManager, MemoryLastExitStore, MemoryPinStorage,
    PinComponent, PinLevelStore, PinSetEvent, Result, SecureWipe,
};
use haven_core::Level;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct RecordingWipe {
    calls: Mutex<u32>,
    fail: bool,
}

impl RecordingWipe {
    fn failing() -> Self {
        Self {
            calls: Mutex::new(0),
            fail: true,
        }
    }
}

#[async_trait::async_trait]
impl SecureWipe for RecordingWipe {
    async fn reset_all_data(&self) -> Result<()> {
        *self.calls.lock() += 1;
        if self.fail {
            Err(haven_auth::Error::Wipe("storage unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

struct NoopPolicy;

impl DuressPolicy for NoopPolicy {
    fn revoke_account_filters(&self) {}
}

#[derive(Default)]
struct RecordingSink {
    entries: Mutex<Vec<Level>>,
}

impl DuressAlertSink for RecordingSink {
    fn on_duress_entered(&self, entered: Level) {
        self.entries.lock().push(entered);
    }
}

fn build(wipe: Arc<RecordingWipe>) -> (Arc<PinComponent>, Arc<RecordingSink>) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let store = Arc::new(PinLevelStore::new(Arc::new(MemoryPinStorage::new())).unwrap());
    let lock = Arc::new(LockManager::new(Arc::new(MemoryLastExitStore::new())));
    let sink = Arc::new(RecordingSink::default());
    let component = Arc::new(PinComponent::new(
        store,
        lock,
        wipe,
        Arc::new(NoopPolicy),
        sink.clone(),
    ));
    (component, sink)
}

#[tokio::test]
async fn secure_reset_rearms_entered_pin_at_primary() {
    let wipe = Arc::new(RecordingWipe::default());
    let (component, _) = build(wipe.clone());

    component.set_pin("1234").unwrap();
    component.set_secure_reset_pin("9999").unwrap();
    component.lock();

    assert!(component.unlock("9999").await);

    assert_eq!(*wipe.calls.lock(), 1);
    assert_eq!(component.active_level(), Level::PRIMARY);
    assert!(!component.is_secure_reset_pin_set());
    assert!(!component.is_locked());

    // The entered pin is now the primary pin
    component.lock();
    assert!(component.unlock("9999").await);
    assert_eq!(component.active_level(), Level::PRIMARY);
}

#[tokio::test]
async fn failed_wipe_preserves_previous_state() {
    let wipe = Arc::new(RecordingWipe::failing());
    let (component, _) = build(wipe.clone());

    component.set_pin("1234").unwrap();
    component.set_secure_reset_pin("9999").unwrap();
    component.lock();

    assert!(!component.unlock("9999").await);

    assert_eq!(*wipe.calls.lock(), 1);
    // Old secure-reset pin still armed, still locked
    assert!(component.is_secure_reset_pin_set());
    assert!(component.is_locked());
}

#[tokio::test]
async fn set_pin_unlocks_first_when_locked() {
    let wipe = Arc::new(RecordingWipe::default());
    let (component, _) = build(wipe);

    component.set_pin("1234").unwrap();
    component.lock();
    assert!(component.is_locked());

    component.set_pin("4321").unwrap();
    assert!(!component.is_locked());

    component.lock();
    assert!(component.unlock("4321").await);
    assert!(!component.unlock("1234").await);
}

#[tokio::test]
async fn duress_chain_levels_increase_by_depth() {
    let wipe = Arc::new(RecordingWipe::default());
    let (component, sink) = build(wipe);

    component.set_pin("1111").unwrap();
    component.set_duress_pin("2222").unwrap();

    // Enter the first duress level, then arm the next one from there
    assert!(component.unlock("2222").await);
    assert_eq!(component.active_level(), Level::new(1).unwrap());
    assert_eq!(component.duress_level(), Level::new(2).unwrap());

    component.set_duress_pin("3333").unwrap();
    assert!(component.unlock("3333").await);
    assert_eq!(component.active_level(), Level::new(2).unwrap());

    assert_eq!(
        sink.entries.lock().as_slice(),
        &[Level::new(1).unwrap(), Level::new(2).unwrap()]
    );
}

#[tokio::test]
async fn pin_events_are_broadcast() {
    let wipe = Arc::new(RecordingWipe::default());
    let (component, _) = build(wipe);

    let mut events = component.subscribe_pin_events();
    component.set_pin("1234").unwrap();
    component.disable_pin().unwrap();

    assert_eq!(events.recv().await.unwrap(), PinSetEvent::Set(Level::PRIMARY));
    assert_eq!(
        events.recv().await.unwrap(),
        PinSetEvent::Disabled(Level::PRIMARY)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn unlocked_state_never_exposes_previous_level() {
    let wipe = Arc::new(RecordingWipe::default());
    let (component, _) = build(wipe);

    component.set_pin("1111").unwrap();
    component.set_duress_pin("2222").unwrap();
    component.lock();

    // Concurrent reader: whenever the component reports unlocked, the
    // active level must already be the one the unlock entered.
    let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let observer = {
        let component = component.clone();
        let stop = stop.clone();
        std::thread::spawn(move || {
            let mut seen = Vec::new();
            while !stop.load(std::sync::atomic::Ordering::Relaxed) {
                if !component.is_locked() {
                    seen.push(component.active_level());
                }
            }
            seen
        })
    };

    assert!(component.unlock("2222").await);
    stop.store(true, std::sync::atomic::Ordering::Relaxed);

    let duress = Level::new(1).unwrap();
    let seen = observer.join().unwrap();
    assert!(seen.iter().all(|level| *level == duress));
}

#[tokio::test]
async fn duress_pin_must_differ_from_primary() {
    let wipe = Arc::new(RecordingWipe::default());
    let (component, _) = build(wipe);

    component.set_pin("1234").unwrap();
    assert!(!component.is_unique("1234", true));
    assert!(component.set_duress_pin("1234").is_err());
    assert!(component.set_duress_pin("5678").is_ok());
}
