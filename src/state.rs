//! Shared application state.
//!
//! [`AppState`] is created once at startup and handed to every command. The
//! editor sits behind a [`RwLock`] so snapshot reads do not block each other;
//! it is `None` until a lot has been opened.

use std::sync::RwLock;

use crate::config::AppConfig;
use crate::editor::Editor;

pub struct AppState {
    /// Settings loaded at startup; read-only afterwards.
    pub config: AppConfig,
    /// The open layout editor, if any.
    pub editor: RwLock<Option<Editor>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            editor: RwLock::new(None),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_state_starts_without_an_editor() {
        let state = AppState::default();
        let editor = state.editor.read().expect("read editor lock");
        assert!(editor.is_none());
    }

    #[test]
    fn app_state_keeps_given_config() {
        let mut config = AppConfig::default();
        config.editor.erase_size = 25.0;
        let state = AppState::new(config);
        assert_eq!(state.config.editor.erase_size, 25.0);
    }
}
