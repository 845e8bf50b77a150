//! Fallback protocol integration tests
//!
//! Exercises the library through its public surface: custom drivers
//! implementing the `Driver` trait, closure-built drivers through
//! `define`, and the rotation protocol end to end.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use clipbind::{
    BindingSet, ClipEvent, Clipbind, Driver, DriverError, DriverSpec, EventBus, EventKind,
    FaultKind, Settings, Target, ValueSource, DEBOUNCE_WINDOW,
};

/// A driver whose support and commit behavior can be flipped mid-test,
/// reporting outcomes on the bus the way the built-in drivers do.
struct ScriptedDriver {
    name: &'static str,
    bus: EventBus,
    bindings: BindingSet,
    supported: AtomicBool,
    commit_ok: AtomicBool,
    commits: AtomicUsize,
}

impl ScriptedDriver {
    fn new(name: &'static str, bus: EventBus) -> Arc<Self> {
        Arc::new(Self {
            name,
            bus,
            bindings: BindingSet::new(),
            supported: AtomicBool::new(true),
            commit_ok: AtomicBool::new(true),
            commits: AtomicUsize::new(0),
        })
    }

    fn set_supported(&self, supported: bool) {
        self.supported.store(supported, Ordering::SeqCst);
    }

    fn set_commit_ok(&self, ok: bool) {
        self.commit_ok.store(ok, Ordering::SeqCst);
    }

    fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Driver for ScriptedDriver {
    fn name(&self) -> &str {
        self.name
    }

    async fn check_support(&self) -> bool {
        self.supported.load(Ordering::SeqCst)
    }

    async fn bind(&self, targets: &[Target], source: &ValueSource) -> Result<(), DriverError> {
        self.bindings.bind(targets, source);
        Ok(())
    }

    async fn interact(&self, target: &Target) -> Result<(), DriverError> {
        let Some(source) = self.bindings.source_for(target) else {
            return Err(DriverError::NotBound(target.id().to_string()));
        };
        if !self.commit_ok.load(Ordering::SeqCst) {
            self.bus.trigger(ClipEvent::failed(
                FaultKind::Support,
                "mechanism gone",
                Some(target.clone()),
                Some(self.name.to_string()),
            ));
            return Err(DriverError::Unsupported("mechanism gone".into()));
        }
        let text = source.resolve(target, Some(self.name));
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.bus
            .trigger(ClipEvent::copied(Some(target.clone()), self.name, text));
        Ok(())
    }

    async fn destroy(&self) {
        self.bindings.clear();
    }
}

fn settings(base: &str) -> Settings {
    Settings {
        base_driver: Some(base.to_string()),
        ..Default::default()
    }
}

fn record(binder: &Clipbind, kind: EventKind) -> Arc<Mutex<Vec<ClipEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    binder.on(kind, move |event| {
        sink.lock().unwrap().push(event.clone());
    });
    seen
}

async fn settle() {
    tokio::time::sleep(DEBOUNCE_WINDOW + Duration::from_millis(50)).await;
}

#[tokio::test(start_paused = true)]
async fn literal_copy_through_a_custom_trait_driver() {
    let binder = Clipbind::with_settings(settings("scripted"));
    let driver = ScriptedDriver::new("scripted", binder.bus());
    binder.register(driver.clone()).unwrap();

    let copies = record(&binder, EventKind::Copy);

    let target = Target::new("share-link");
    binder.copy(target.clone(), "https://example.com").await.unwrap();
    binder.interact(&target).await.unwrap();
    settle().await;

    assert_eq!(binder.using().as_deref(), Some("scripted"));
    assert_eq!(driver.commits(), 1);

    let copies = copies.lock().unwrap();
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].text(), Some("https://example.com"));
    assert_eq!(copies[0].driver(), Some("scripted"));
    assert_eq!(copies[0].target().unwrap().id(), "share-link");
}

#[tokio::test(start_paused = true)]
async fn support_failure_rotates_to_the_next_registered_driver() {
    let binder = Clipbind::with_settings(settings("first"));
    let first = ScriptedDriver::new("first", binder.bus());
    let second = ScriptedDriver::new("second", binder.bus());
    first.set_commit_ok(false);
    binder.register(first).unwrap();
    binder.register(second.clone()).unwrap();

    let copies = record(&binder, EventKind::Copy);

    let target = Target::new("button");
    binder.copy(target.clone(), "payload").await.unwrap();
    binder.interact(&target).await.unwrap();

    // Fault dispatch, rotation, then the replayed commit's dispatch.
    settle().await;
    settle().await;
    settle().await;

    assert!(!binder.has("first"));
    assert_eq!(binder.using().as_deref(), Some("second"));
    assert_eq!(second.commits(), 1);

    let copies = copies.lock().unwrap();
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].driver(), Some("second"));
    assert_eq!(copies[0].text(), Some("payload"));
}

#[tokio::test(start_paused = true)]
async fn rotation_skips_unsupported_candidates_and_ends_quietly() {
    let binder = Clipbind::with_settings(settings("first"));
    let first = ScriptedDriver::new("first", binder.bus());
    let second = ScriptedDriver::new("second", binder.bus());
    first.set_commit_ok(false);
    second.set_supported(false);
    binder.register(first).unwrap();
    binder.register(second).unwrap();

    let copies = record(&binder, EventKind::Copy);

    let target = Target::new("button");
    binder.copy(target.clone(), "payload").await.unwrap();
    binder.interact(&target).await.unwrap();

    settle().await;
    settle().await;
    settle().await;

    // The failed base is gone, the unsupported candidate was never
    // activated, and nothing was copied.
    assert!(!binder.has("first"));
    assert!(binder.using().is_none());
    assert!(copies.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn defined_driver_with_missing_operation_reports_and_registers_nothing() {
    let binder = Clipbind::new();
    let errors = record(&binder, EventKind::Error);

    let spec = DriverSpec::new().check_support(|| true).copy(|_, _| Ok(()));
    assert!(!binder.define("bridge", spec).unwrap());
    assert!(!binder.has("bridge"));

    settle().await;
    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    let fault = errors[0].fault().unwrap();
    assert_eq!(fault.kind(), &FaultKind::DriverError);
    assert!(fault.message().contains("destroy"));
}

#[tokio::test(start_paused = true)]
async fn defined_driver_participates_in_fallback() {
    let binder = Clipbind::with_settings(settings("first"));
    let first = ScriptedDriver::new("first", binder.bus());
    first.set_commit_ok(false);
    binder.register(first).unwrap();

    let committed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&committed);
    let spec = DriverSpec::new()
        .check_support(|| true)
        .copy(move |_, text| {
            sink.lock().unwrap().push(text.to_string());
            Ok(())
        })
        .destroy(|| {});
    assert!(binder.define("bridge", spec).unwrap());

    let target = Target::new("button");
    binder.copy(target.clone(), "bridged").await.unwrap();
    binder.interact(&target).await.unwrap();

    settle().await;
    settle().await;
    settle().await;

    assert_eq!(binder.using().as_deref(), Some("bridge"));
    assert_eq!(*committed.lock().unwrap(), vec!["bridged"]);
}

#[tokio::test(start_paused = true)]
async fn burst_of_triggers_delivers_only_the_last_event() {
    let binder = Clipbind::new();
    let copies = record(&binder, EventKind::Copy);

    binder.trigger(ClipEvent::copied(None, "scripted", "first"));
    binder.trigger(ClipEvent::copied(None, "scripted", "second"));

    settle().await;
    let copies = copies.lock().unwrap();
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].text(), Some("second"));
}

#[tokio::test(start_paused = true)]
async fn destroy_tears_down_drivers_and_subscriptions() {
    let binder = Clipbind::with_settings(settings("scripted"));
    let driver = ScriptedDriver::new("scripted", binder.bus());
    binder.register(driver.clone()).unwrap();

    let copies = record(&binder, EventKind::Copy);

    let target = Target::new("button");
    binder.copy(target.clone(), "payload").await.unwrap();
    binder.destroy().await;
    binder.destroy().await;

    assert!(binder.names().is_empty());
    assert!(binder.using().is_none());

    // The binding state is gone and the old subscription hears nothing.
    assert!(binder.interact(&target).await.is_err());
    binder.trigger(ClipEvent::copied(None, "scripted", "late"));
    settle().await;
    assert!(copies.lock().unwrap().is_empty());
}
