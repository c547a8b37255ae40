//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling the terminal.

use std::env;

use arrrg_derive::CommandLine;
use utf8path::Path;

use crate::client::API_URL_ENV;

/// Directory under the platform data dir holding custodian's state.
const STATE_DIR: &str = "custodian";

/// File inside [`STATE_DIR`] holding persisted key/value state.
const STATE_FILE: &str = "state.json";

/// Command-line arguments for the custodian tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the chat endpoint.
    #[arrrg(optional, "Base URL of the chat endpoint (default: $CUSTODIAN_API_URL)", "URL")]
    pub api_url: Option<String>,

    /// Skip the boot animation.
    #[arrrg(flag, "Skip the boot sequence and start at the prompt")]
    pub skip_boot: bool,

    /// Where the client identifier is persisted.
    #[arrrg(optional, "State file holding the client id", "PATH")]
    pub state_file: Option<String>,

    /// Where request logs are appended.
    #[arrrg(optional, "Append JSON-lines request logs to this file", "PATH")]
    pub log_file: Option<String>,
}

/// Configuration for a custodian session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL of the chat endpoint.
    pub base_url: Option<String>,

    /// Whether to go straight to the prompt.
    pub skip_boot: bool,

    /// State file for the client id; `None` when no data dir is known.
    pub state_file: Option<Path<'static>>,

    /// Optional JSON-lines log destination.
    pub log_file: Option<Path<'static>>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: none
    /// - Boot sequence: shown
    /// - State file: `<data dir>/custodian/state.json`
    /// - Logging: disabled
    pub fn new() -> Self {
        Self {
            base_url: None,
            skip_boot: false,
            state_file: default_state_file(),
            log_file: None,
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Skips the boot sequence.
    pub fn without_boot(mut self) -> Self {
        self.skip_boot = true;
        self
    }

    /// Sets the state file.
    pub fn with_state_file(mut self, path: Path<'static>) -> Self {
        self.state_file = Some(path);
        self
    }

    /// Sets the log file.
    pub fn with_log_file(mut self, path: Path<'static>) -> Self {
        self.log_file = Some(path);
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            base_url: args.api_url.or_else(|| env::var(API_URL_ENV).ok()),
            skip_boot: args.skip_boot,
            state_file: args
                .state_file
                .map(|p| Path::from(p.as_str()).into_owned())
                .or(defaults.state_file),
            log_file: args.log_file.map(|p| Path::from(p.as_str()).into_owned()),
        }
    }
}

/// `<data dir>/custodian/state.json`, if the platform has a data dir.
pub fn default_state_file() -> Option<Path<'static>> {
    let path = dirs::data_dir()?.join(STATE_DIR).join(STATE_FILE);
    path.to_str().map(|p| Path::from(p).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert!(config.base_url.is_none());
        assert!(!config.skip_boot);
        assert!(config.log_file.is_none());
        if let Some(state_file) = &config.state_file {
            assert!(state_file.as_str().ends_with("state.json"));
        }
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::from(ChatArgs::default());
        assert_eq!(config.base_url, env::var(API_URL_ENV).ok());
        assert!(!config.skip_boot);
        assert_eq!(config.state_file, default_state_file());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            api_url: Some("http://localhost:3000".to_string()),
            skip_boot: true,
            state_file: Some("/tmp/custodian.json".to_string()),
            log_file: Some("/tmp/custodian.jsonl".to_string()),
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:3000"));
        assert!(config.skip_boot);
        assert_eq!(
            config.state_file.as_ref().map(|p| p.as_str()),
            Some("/tmp/custodian.json")
        );
        assert_eq!(
            config.log_file.as_ref().map(|p| p.as_str()),
            Some("/tmp/custodian.jsonl")
        );
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_base_url("https://chat.example")
            .without_boot()
            .with_state_file(Path::from("state.json").into_owned())
            .with_log_file(Path::from("log.jsonl").into_owned());
        assert_eq!(config.base_url.as_deref(), Some("https://chat.example"));
        assert!(config.skip_boot);
        assert_eq!(config.state_file.unwrap().as_str(), "state.json");
        assert_eq!(config.log_file.unwrap().as_str(), "log.jsonl");
    }
}
