pub mod add;
pub mod completions;
pub mod init;
pub mod list;
pub mod man_pages;
pub mod sync_registry;

use dskit_remote::http::HttpBackend;
use dskit_remote::RemoteConfig;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{stderr, stdin, IsTerminal};
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_REGISTRY_ERROR: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Prompts are only shown when both stdin and stderr are terminals.
pub fn is_interactive() -> bool {
    stdin().is_terminal() && stderr().is_terminal()
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

pub fn warning(msg: &str) -> String {
    console::Style::new()
        .yellow()
        .apply_to(format!("warning: {msg}"))
        .to_string()
}

pub fn make_backend(registry_url: Option<&str>) -> Result<HttpBackend, String> {
    let config =
        RemoteConfig::resolve(registry_url).map_err(|e| format!("config error: {e}"))?;
    tracing::debug!("registry: {}", config.url);
    Ok(HttpBackend::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_pretty_serializes_object() {
        let val = serde_json::json!({"key": "value"});
        let result = json_pretty(&val).unwrap();
        assert!(result.contains("\"key\""));
        assert!(result.contains("\"value\""));
    }

    #[test]
    fn exit_codes_are_distinct() {
        assert_ne!(EXIT_SUCCESS, EXIT_FAILURE);
        assert_ne!(EXIT_FAILURE, EXIT_CONFIG_ERROR);
        assert_ne!(EXIT_CONFIG_ERROR, EXIT_REGISTRY_ERROR);
    }

    #[test]
    fn make_backend_with_flag_uses_flag() {
        let backend = make_backend(Some("http://localhost:8321/")).unwrap();
        assert_eq!(backend.config().url, "http://localhost:8321");
    }

    #[test]
    fn warning_keeps_message() {
        assert!(warning("button.tsx missing").contains("button.tsx missing"));
    }

    #[test]
    fn spinner_creates_progress_bar() {
        let pb = spinner("testing...");
        spin_ok(&pb, "done");
    }

    #[test]
    fn spinner_fail_creates_progress_bar() {
        let pb = spinner("testing...");
        spin_fail(&pb, "failed");
    }
}
