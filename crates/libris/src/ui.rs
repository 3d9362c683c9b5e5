//! Terminal stand-ins for the app's UI collaborators.

use std::io::{BufRead, Write};

use async_trait::async_trait;
use console::{Style, style};
use libris_client::{Error, LoginCodeProvider, UiHooks};

/// Notifications go to stderr so `--json` output on stdout stays clean.
#[derive(Debug, Default)]
pub struct ConsoleHooks;

impl UiHooks for ConsoleHooks {
    fn notify(&self, message: &str) {
        let yellow = Style::new().yellow();
        eprintln!("{} {}", yellow.apply_to("!"), message);
    }

    fn redirect_to_login(&self) {
        let dim = Style::new().dim();
        eprintln!("{} Session expired.", style("!").yellow());
        eprintln!("{}", dim.apply_to("Run 'libris auth login' to sign in again."));
    }
}

/// Login codes from `--code`, or typed at a prompt.
///
/// An empty answer declines the login.
#[derive(Debug)]
pub struct PromptCodeProvider {
    code: Option<String>,
}

impl PromptCodeProvider {
    pub fn new(code: Option<String>) -> Self {
        Self { code }
    }
}

#[async_trait]
impl LoginCodeProvider for PromptCodeProvider {
    async fn login_code(&self) -> libris_client::Result<String> {
        if let Some(code) = &self.code {
            return Ok(code.clone());
        }

        eprint!("login code> ");
        let _ = std::io::stderr().flush();

        let mut input = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut input)
            .map_err(|e| Error::AuthProviderDenied(format!("could not read code: {}", e)))?;

        let code = input.trim();
        if code.is_empty() {
            return Err(Error::AuthProviderDenied("no code entered".to_string()));
        }
        Ok(code.to_string())
    }
}

/// True when the client already told the user about this failure.
pub fn already_reported(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<Error>(),
        Some(Error::Server { .. } | Error::Transport(_) | Error::Unauthenticated)
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Formatting
// ─────────────────────────────────────────────────────────────────────────────

pub fn heading(title: &str) {
    let dim = Style::new().dim();
    println!("{}", style(title).bold());
    println!("{}", dim.apply_to("─".repeat(50)));
}

pub fn success(message: impl std::fmt::Display) {
    let green = Style::new().green();
    println!("{} {}", green.apply_to("✓"), message);
}

pub fn empty(message: &str) {
    let dim = Style::new().dim();
    println!("{}", dim.apply_to(message));
}

pub fn truncate(s: &str, max_len: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max_len {
        s
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// First ten characters of a server timestamp (the date).
pub fn date(ts: &str) -> &str {
    ts.get(..10).unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("深入理解计算机系统第三版", 8), "深入理解计...");
        assert_eq!(truncate("a\nb", 10), "a b");
    }

    #[test]
    fn test_date_prefix() {
        assert_eq!(date("2024-03-01T10:00:00"), "2024-03-01");
        assert_eq!(date("soon"), "soon");
    }

    #[test]
    fn test_client_failures_are_already_reported() {
        let shown = anyhow::Error::new(Error::Unauthenticated);
        assert!(already_reported(&shown));

        let local = anyhow::Error::new(Error::Config("bad".to_string()));
        assert!(!already_reported(&local));
        assert!(!already_reported(&anyhow::anyhow!("plain")));
    }
}
