//! Terminal plumbing: line prompts, the delete confirmation, and a navigator
//! the page loop polls after every action.

use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use client_core::{Confirmer, Navigator, Route, UiStatus};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin},
    sync::Mutex,
};

pub struct Terminal {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl Default for Terminal {
    fn default() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Terminal {
    /// Prints `label` and reads one line. `None` means stdin is closed.
    pub async fn prompt(&self, label: &str) -> anyhow::Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(label.as_bytes()).await?;
        stdout.flush().await?;
        let line = self.lines.lock().await.next_line().await?;
        Ok(line.map(|line| line.trim_end_matches('\r').to_string()))
    }
}

#[async_trait]
impl Confirmer for Terminal {
    async fn confirm(&self, prompt: &str) -> bool {
        match self.prompt(&format!("{prompt} [y/N] ")).await {
            Ok(Some(answer)) => is_yes(&answer),
            Ok(None) => false,
            Err(err) => {
                tracing::warn!("confirmation prompt failed: {err}");
                false
            }
        }
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Remembers the last route a page asked for until the loop picks it up.
#[derive(Default)]
pub struct ConsoleNavigator {
    next: StdMutex<Option<Route>>,
}

impl ConsoleNavigator {
    pub fn take(&self) -> Option<Route> {
        self.next.lock().ok().and_then(|mut next| next.take())
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(%route, "navigation requested");
        if let Ok(mut next) = self.next.lock() {
            *next = Some(route);
        }
    }
}

pub fn print_status(status: Option<&UiStatus>) {
    if let Some(status) = status {
        println!("{status}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigator_hands_out_the_latest_route_once() {
        let navigator = ConsoleNavigator::default();
        assert_eq!(navigator.take(), None);

        navigator.navigate(Route::Login);
        navigator.navigate(Route::Profile);

        assert_eq!(navigator.take(), Some(Route::Profile));
        assert_eq!(navigator.take(), None);
    }

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }
}
