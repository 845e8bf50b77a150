//! CLI application wiring

use std::process::ExitCode;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::application::bus::DEBOUNCE_WINDOW;
use crate::cli::presenter::Presenter;
use crate::domain::config::Settings;
use crate::domain::event::EventKind;
use crate::domain::target::Target;
use crate::infrastructure::create_binder_with;
use crate::infrastructure::config::XdgSettingsStore;

pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// How long to wait for further outcome events after the last one.
/// Rotation replays an interaction after its own debounce window, so one
/// window is not enough silence to call the outcome final.
const QUIET_PERIOD: Duration = Duration::from_millis(DEBOUNCE_WINDOW.as_millis() as u64 * 3);

#[derive(Debug, Clone)]
enum Outcome {
    Copied { driver: String },
    Failed { kind: String, message: String },
}

/// Assemble settings from defaults, the settings file, and CLI flags,
/// in ascending precedence
pub async fn load_merged_settings(
    store: &XdgSettingsStore,
    flags: Settings,
    presenter: &Presenter,
) -> Settings {
    let from_file = match store.load().await {
        Ok(settings) => settings,
        Err(error) => {
            presenter.warn(&format!("settings file ignored: {error}"));
            Settings::empty()
        }
    };
    Settings::defaults().merge(from_file).merge(flags)
}

/// Bind one target, run the interaction, and report the debounced outcome
pub async fn run_copy(settings: Settings, text: String, presenter: &Presenter) -> ExitCode {
    let binder = create_binder_with(settings);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let copy_tx = tx.clone();
    binder.on(EventKind::Copy, move |event| {
        let _ = copy_tx.send(Outcome::Copied {
            driver: event.driver().unwrap_or("?").to_string(),
        });
    });
    binder.on(EventKind::Error, move |event| {
        if let Some(fault) = event.fault() {
            let _ = tx.send(Outcome::Failed {
                kind: fault.kind().to_string(),
                message: fault.message().to_string(),
            });
        }
    });

    let target = Target::new("cli");
    if let Err(error) = binder.copy(target.clone(), text).await {
        presenter.error(&error.to_string());
        return ExitCode::from(EXIT_ERROR);
    }
    if let Err(error) = binder.interact(&target).await {
        presenter.error(&error.to_string());
        return ExitCode::from(EXIT_ERROR);
    }

    // Outcomes arrive debounced, and a support failure may be followed by
    // a successful fallback commit; keep draining until things go quiet
    // and judge the last word.
    let mut last = None;
    while let Ok(Some(outcome)) = timeout(QUIET_PERIOD, rx.recv()).await {
        last = Some(outcome);
    }

    let code = match last {
        Some(Outcome::Copied { driver }) => {
            presenter.success(&format!("copied via the {driver} driver"));
            ExitCode::SUCCESS
        }
        Some(Outcome::Failed { kind, message }) => {
            presenter.error(&format!("copy failed ({kind}): {message}"));
            ExitCode::from(EXIT_ERROR)
        }
        None => {
            presenter.error("no copy outcome reported");
            ExitCode::from(EXIT_ERROR)
        }
    };

    binder.destroy().await;
    code
}

/// List registered drivers with live support status
pub async fn run_drivers(settings: Settings, presenter: &Presenter) -> ExitCode {
    let binder = create_binder_with(settings.clone());
    let base = settings.base_driver_or_default().to_string();

    for name in binder.names() {
        let Some(driver) = binder.get(&name) else {
            continue;
        };
        let supported = driver.check_support().await;
        let status = if supported { "supported" } else { "unsupported" };
        let role = if name == base { " (base)" } else { "" };
        presenter.line(&format!("{name}{role}: {status}"));
    }

    binder.destroy().await;
    ExitCode::SUCCESS
}
