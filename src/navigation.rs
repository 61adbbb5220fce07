//! Where the user is sent when the session cannot be recovered.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Capability to send the user back to the sign-in entry point.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Terminal front-end: tells the user to sign in again.
#[derive(Debug, Clone)]
pub struct TerminalNavigator {
    login_path: String,
}

impl TerminalNavigator {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
        }
    }

    pub fn message(&self) -> String {
        format!(
            "Session expired ({}). Run `taskboard login` to sign in again.",
            self.login_path
        )
    }
}

impl Navigator for TerminalNavigator {
    fn redirect_to_login(&self) {
        eprintln!(
            "{} {}",
            console::style("⚠").yellow(),
            console::style(self.message()).yellow()
        );
    }
}

/// Counts redirects instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}
