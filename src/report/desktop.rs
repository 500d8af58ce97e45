//! Desktop notifications through the platform's notification tool.

use crate::constants::{APP_NAME, NOTIFICATION_TITLE};
use tokio::process::Command;
use tracing::{debug, warn};

/// Shows a desktop notification with the given body.
///
/// Delivery is best-effort: failures to spawn the notification tool are logged and otherwise
/// ignored.
pub async fn show(body: &str) {
    let Some(mut command) = notification_command(NOTIFICATION_TITLE, body) else {
        warn!("desktop notifications are not supported on this platform");
        return;
    };

    match command.status().await {
        Ok(status) if status.success() => debug!("desktop notification shown"),
        Ok(status) => warn!(%status, "notification tool exited unsuccessfully"),
        Err(e) => warn!(error = %e, "failed to run notification tool"),
    }
}

#[cfg(target_os = "macos")]
fn notification_command(title: &str, body: &str) -> Option<Command> {
    let script = format!(
        "display notification {} with title {}",
        applescript_string(body),
        applescript_string(title)
    );
    let mut command = Command::new("osascript");
    command.args(["-e", script.as_str()]);
    Some(command)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn notification_command(title: &str, body: &str) -> Option<Command> {
    let mut command = Command::new("notify-send");
    command.args(["--app-name", APP_NAME, title, body]);
    Some(command)
}

#[cfg(not(unix))]
fn notification_command(_title: &str, _body: &str) -> Option<Command> {
    None
}

/// Quotes `s` as an AppleScript string literal.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn applescript_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
