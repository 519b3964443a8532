//! Desktop notification sink.

use std::process::Stdio;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, info};

/// How long a notification helper may run before it is killed
const HELPER_TIMEOUT: Duration = Duration::from_secs(10);

/// Best-effort notification sink. Failures are swallowed.
pub trait Notifier: Send + Sync {
    /// Show a notification
    fn notify(&self, title: &str, body: &str);
}

/// Sends notifications through the platform's notification tool
pub struct DesktopNotifier {
    /// Application name shown as the notification title prefix
    app_name: String,
    enabled: bool,
}

impl DesktopNotifier {
    /// Create a notifier; a disabled one only logs
    pub fn new(app_name: String, enabled: bool) -> Self {
        Self { app_name, enabled }
    }

    /// Command line for the current platform, if one is supported
    fn command(&self, title: &str, body: &str) -> Option<(&'static str, Vec<String>)> {
        let full_title = format!("{}: {}", self.app_name, title);
        if cfg!(target_os = "macos") {
            let script = format!(
                "display notification \"{}\" with title \"{}\" sound name \"Glass\"",
                escape_applescript(body),
                escape_applescript(&full_title)
            );
            Some(("osascript", vec!["-e".to_string(), script]))
        } else if cfg!(target_os = "linux") {
            Some(("notify-send", vec![full_title, body.to_string()]))
        } else if cfg!(windows) {
            Some(("msg", vec!["*".to_string(), format!("{} {}", full_title, body)]))
        } else {
            None
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        info!("Notification: {} - {}", title, body);
        if !self.enabled {
            return;
        }
        let Some((program, args)) = self.command(title, body) else {
            return;
        };
        launch(program, &args);
    }
}

/// Start a notification helper and return without waiting for it.
///
/// Inside a tokio runtime the child is reaped by a background task and
/// killed after [`HELPER_TIMEOUT`]. Outside one a plain thread reaps it.
fn launch(program: &str, args: &[String]) {
    if let Ok(handle) = Handle::try_current() {
        let spawned = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                debug!("Failed to run {}: {}", program, e);
                return;
            }
        };

        let program = program.to_string();
        handle.spawn(async move {
            match tokio::time::timeout(HELPER_TIMEOUT, child.wait()).await {
                Ok(Ok(status)) if !status.success() => {
                    debug!("{} exited with {}", program, status)
                }
                Ok(Err(e)) => debug!("Failed to wait for {}: {}", program, e),
                // Dropping the child kills it
                Err(_) => debug!("{} timed out", program),
                _ => {}
            }
        });
        return;
    }

    let spawned = std::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    match spawned {
        Ok(mut child) => {
            std::thread::spawn(move || child.wait());
        }
        Err(e) => debug!("Failed to run {}: {}", program, e),
    }
}

fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
