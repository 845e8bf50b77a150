//! clipbind CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tokio::io::AsyncReadExt;

use clipbind::cli::{
    app::{load_merged_settings, run_copy, run_drivers, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    presenter::Presenter,
};
use clipbind::domain::config::Settings;
use clipbind::infrastructure::XdgSettingsStore;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let presenter = Presenter::new();

    let store = match cli.config {
        Some(path) => XdgSettingsStore::with_path(path),
        None => XdgSettingsStore::new(),
    };
    let flags = Settings {
        base_driver: cli.driver.clone(),
        command_tool: cli.tool.clone(),
        ..Default::default()
    };
    let settings = load_merged_settings(&store, flags, &presenter).await;

    match cli.command {
        Some(Commands::Drivers) => run_drivers(settings, &presenter).await,
        None => {
            let text = match cli.text {
                Some(text) => text,
                None => {
                    let mut buffer = String::new();
                    if let Err(error) = tokio::io::stdin().read_to_string(&mut buffer).await {
                        presenter.error(&format!("failed to read stdin: {error}"));
                        return ExitCode::from(EXIT_USAGE_ERROR);
                    }
                    buffer
                }
            };

            if text.is_empty() {
                presenter.error("nothing to copy");
                return ExitCode::from(EXIT_USAGE_ERROR);
            }

            run_copy(settings, text, &presenter).await
        }
    }
}
