//! External clipboard tool driver
//!
//! Pipes text to a platform clipboard tool (wl-copy, xclip, xsel, pbcopy,
//! clip) over stdin. Serves as the fallback when the in-process clipboard
//! is unavailable, and as the base driver where an external tool is
//! preferred.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::OnceCell;

use crate::application::bus::EventBus;
use crate::application::ports::{BindingSet, Driver, DriverError};
use crate::domain::config::Settings;
use crate::domain::event::{ClipEvent, FaultKind};
use crate::domain::target::Target;
use crate::domain::value_source::ValueSource;

/// Name the command driver registers under
pub const COMMAND_DRIVER: &str = "command";

/// An external program that accepts clipboard text on stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTool {
    program: String,
    args: Vec<String>,
}

impl CopyTool {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Platform candidates in probe order
    pub fn candidates() -> Vec<CopyTool> {
        #[cfg(target_os = "linux")]
        {
            vec![
                CopyTool::new("wl-copy", &[]),
                CopyTool::new("xclip", &["-selection", "clipboard"]),
                CopyTool::new("xsel", &["--clipboard", "--input"]),
            ]
        }

        #[cfg(target_os = "macos")]
        {
            vec![CopyTool::new("pbcopy", &[])]
        }

        #[cfg(target_os = "windows")]
        {
            vec![CopyTool::new("clip", &[])]
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            Vec::new()
        }
    }
}

enum PipeFault {
    /// The binary disappeared between probing and use
    Missing(String),
    Failed(String),
}

/// Clipboard driver backed by an external tool.
///
/// Detection runs once and memoizes: either the configured override or
/// the first platform candidate found on PATH. The tool is still spawned
/// fresh per interaction, and a binary missing at that point is reported
/// as a support fault so the facade rotates away.
pub struct CommandDriver {
    bus: EventBus,
    bindings: BindingSet,
    override_tool: Option<String>,
    resolved: OnceCell<Option<CopyTool>>,
}

impl CommandDriver {
    pub fn new(bus: EventBus) -> Self {
        Self::with_tool(bus, None)
    }

    /// Create with an explicit tool instead of PATH detection
    pub fn with_tool(bus: EventBus, tool: Option<String>) -> Self {
        Self {
            bus,
            bindings: BindingSet::new(),
            override_tool: tool,
            resolved: OnceCell::new(),
        }
    }

    /// Check if a tool binary is available using `which`
    async fn is_tool_available(program: &str) -> bool {
        Command::new("which")
            .arg(program)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    async fn resolve(&self) -> Option<CopyTool> {
        self.resolved
            .get_or_init(|| async {
                if let Some(program) = &self.override_tool {
                    if Self::is_tool_available(program).await {
                        return Some(CopyTool::new(program.clone(), &[]));
                    }
                    log::debug!("configured clipboard tool '{program}' not found on PATH");
                    return None;
                }

                for tool in CopyTool::candidates() {
                    if Self::is_tool_available(&tool.program).await {
                        log::debug!("using clipboard tool '{}'", tool.program);
                        return Some(tool);
                    }
                }
                None
            })
            .await
            .clone()
    }

    async fn pipe(tool: &CopyTool, text: &str) -> Result<(), PipeFault> {
        let mut child = Command::new(&tool.program)
            .args(&tool.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PipeFault::Missing(format!("'{}' not found", tool.program))
                } else {
                    PipeFault::Failed(e.to_string())
                }
            })?;

        // Write text to stdin; dropping the handle closes the pipe
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| PipeFault::Failed(e.to_string()))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|e| PipeFault::Failed(e.to_string()))?;

        if !status.success() {
            return Err(PipeFault::Failed(format!(
                "{} exited with status: {}",
                tool.program, status
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Driver for CommandDriver {
    fn name(&self) -> &str {
        COMMAND_DRIVER
    }

    async fn check_support(&self) -> bool {
        self.resolve().await.is_some()
    }

    async fn bind(&self, targets: &[Target], source: &ValueSource) -> Result<(), DriverError> {
        self.bindings.bind(targets, source);
        Ok(())
    }

    async fn interact(&self, target: &Target) -> Result<(), DriverError> {
        let Some(source) = self.bindings.source_for(target) else {
            return Err(DriverError::NotBound(target.id().to_string()));
        };

        let Some(tool) = self.resolve().await else {
            let reason = "no clipboard tool available".to_string();
            self.bus.trigger(ClipEvent::failed(
                FaultKind::Support,
                reason.clone(),
                Some(target.clone()),
                Some(COMMAND_DRIVER.to_string()),
            ));
            return Err(DriverError::Unsupported(reason));
        };

        let text = source.resolve(target, Some(COMMAND_DRIVER));
        match Self::pipe(&tool, &text).await {
            Ok(()) => {
                self.bus
                    .trigger(ClipEvent::copied(Some(target.clone()), COMMAND_DRIVER, text));
                Ok(())
            }
            Err(PipeFault::Missing(reason)) => {
                self.bus.trigger(ClipEvent::failed(
                    FaultKind::Support,
                    reason.clone(),
                    Some(target.clone()),
                    Some(COMMAND_DRIVER.to_string()),
                ));
                Err(DriverError::Unsupported(reason))
            }
            Err(PipeFault::Failed(reason)) => {
                self.bus.trigger(ClipEvent::failed(
                    FaultKind::CopyFailed,
                    reason.clone(),
                    Some(target.clone()),
                    Some(COMMAND_DRIVER.to_string()),
                ));
                Err(DriverError::CommitFailed(reason))
            }
        }
    }

    async fn destroy(&self) {
        self.bindings.clear();
    }

    fn settings(&self) -> Settings {
        Settings {
            command_tool: self.override_tool.clone(),
            ..Default::default()
        }
    }
}
