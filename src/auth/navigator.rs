//! Navigation side effects issued by the session layer

use colored::Colorize;
use parking_lot::Mutex;

/// Receives forced navigations, e.g. the login redirect after a 401
pub trait Navigator: Send + Sync {
    fn redirect(&self, route: &str);
}

/// Records every redirect it receives
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of redirects issued so far
    pub fn count(&self) -> usize {
        self.routes.lock().len()
    }

    pub fn last(&self) -> Option<String> {
        self.routes.lock().last().cloned()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, route: &str) {
        self.routes.lock().push(route.to_string());
    }
}

/// Tells the terminal user to log in again
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn redirect(&self, route: &str) {
        eprintln!(
            "{} Session ended ({}). Run 'attendify login' to sign in again.",
            "⚠".yellow(),
            route
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_navigator() {
        let nav = RecordingNavigator::new();
        assert_eq!(nav.count(), 0);
        nav.redirect("/login");
        nav.redirect("/login");
        assert_eq!(nav.count(), 2);
        assert_eq!(nav.last().as_deref(), Some("/login"));
    }
}
