//! Terminal stand-ins for system notifications and new browser tabs.

use std::process::Command;

use engine_logging::{engine_debug, engine_warn};
use minomize_engine::{Notifier, TabOpener};

pub struct TerminalPresenter {
    open_command: Option<String>,
}

impl TerminalPresenter {
    pub fn new(open_command: Option<String>) -> Self {
        Self { open_command }
    }
}

impl Notifier for TerminalPresenter {
    fn show(&self, notification_id: &str, title: &str, message: &str, action_url: Option<&str>) {
        engine_debug!("Showing notification {}", notification_id);
        match action_url {
            Some(url) => println!("🔔 {title}: {message} ({url})"),
            None => println!("🔔 {title}: {message}"),
        }
    }

    fn clear(&self, notification_id: &str) {
        engine_debug!("Cleared notification {}", notification_id);
    }

    /// Printed lines cannot be clicked.
    fn is_interactive(&self) -> bool {
        false
    }
}

impl TabOpener for TerminalPresenter {
    fn open(&self, url: &str) {
        let Some(program) = self.open_command.as_deref() else {
            println!("→ {url}");
            return;
        };
        match Command::new(program).arg(url).spawn() {
            Ok(_) => engine_debug!("Launched {} {}", program, url),
            Err(err) => {
                engine_warn!("Failed to launch {} for {}: {}", program, url, err);
                println!("→ {url}");
            }
        }
    }
}
