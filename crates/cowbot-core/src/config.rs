use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::types::ResponseScope;

/// Character that distinguishes a command from ordinary chat text.
pub const COMMAND_MARKER: char = '!';
pub const DEFAULT_RENDERER_PATH: &str = "/usr/bin/cowsay";
pub const DEFAULT_NICK: &str = "CowSayBot";
pub const DEFAULT_CHANNEL: &str = "#testcow";
pub const DEFAULT_COOLDOWN_SECS: u64 = 5;
pub const DEFAULT_MAX_LINE_BYTES: usize = 4096;

/// Top-level config (cowbot.toml + COWBOT_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CowbotConfig {
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub channels: ChannelsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Absolute path of the renderer executable.
    #[serde(default = "default_renderer_path")]
    pub path: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            path: default_renderer_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_nick")]
    pub nick: String,
    /// Seconds during which further triggers are ignored after one is accepted.
    /// `0` disables the cooldown.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Which message sources the render handler answers.
    #[serde(default)]
    pub respond_to: ResponseScope,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            nick: default_nick(),
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            respond_to: ResponseScope::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// Line-oriented console channel: stdin lines in, rendered text out on stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Channel name stamped on every incoming line.
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Longest accepted input line; longer lines are discarded by the codec.
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

fn default_renderer_path() -> String {
    DEFAULT_RENDERER_PATH.to_string()
}

fn default_nick() -> String {
    DEFAULT_NICK.to_string()
}

fn default_cooldown_secs() -> u64 {
    DEFAULT_COOLDOWN_SECS
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

fn default_max_line_bytes() -> usize {
    DEFAULT_MAX_LINE_BYTES
}

impl CowbotConfig {
    /// Load config from TOML file, then overlay COWBOT_* env vars.
    ///
    /// A missing file is not an error; every field has a default.
    /// Nested keys in env vars are separated by a double underscore,
    /// e.g. `COWBOT_RENDERER__PATH=/usr/games/cowsay`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);
        tracing::debug!(path = %path, "loading config");

        let config: CowbotConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("COWBOT_").split("__"))
            .extract()
            .map_err(|e| crate::error::CowbotError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Reject values that would leave the bot unable to run.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::CowbotError;

        if self.renderer.path.trim().is_empty() {
            return Err(CowbotError::Config("renderer.path is empty".to_string()));
        }
        if self.bot.nick.trim().is_empty() {
            return Err(CowbotError::Config("bot.nick is empty".to_string()));
        }
        if self.channels.console.channel.trim().is_empty() {
            return Err(CowbotError::Config(
                "channels.console.channel is empty".to_string(),
            ));
        }
        if self.channels.console.max_line_bytes == 0 {
            return Err(CowbotError::Config(
                "channels.console.max_line_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.cowbot/cowbot.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_bot() {
        let config = CowbotConfig::default();
        assert_eq!(config.renderer.path, "/usr/bin/cowsay");
        assert_eq!(config.bot.nick, "CowSayBot");
        assert_eq!(config.bot.cooldown_secs, 5);
        assert_eq!(config.bot.respond_to, ResponseScope::Channel);
        assert_eq!(config.channels.console.channel, "#testcow");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = CowbotConfig::load(path.to_str()).unwrap();
        assert_eq!(config.bot.nick, DEFAULT_NICK);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r##"
[renderer]
path = "/usr/games/cowsay"

[bot]
cooldown_secs = 0
respond_to = "both"

[channels.console]
channel = "#moo"
"##
        )
        .unwrap();

        let config = CowbotConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.renderer.path, "/usr/games/cowsay");
        assert_eq!(config.bot.cooldown_secs, 0);
        assert_eq!(config.bot.respond_to, ResponseScope::Both);
        assert_eq!(config.channels.console.channel, "#moo");
        // untouched sections keep their defaults
        assert_eq!(config.bot.nick, DEFAULT_NICK);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bot]\ncooldown_secs = \"soon\"").unwrap();
        let err = CowbotConfig::load(file.path().to_str()).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn empty_values_fail_validation() {
        let mut config = CowbotConfig::default();
        config.renderer.path = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = CowbotConfig::default();
        config.channels.console.channel = String::new();
        assert!(config.validate().is_err());

        let mut config = CowbotConfig::default();
        config.channels.console.max_line_bytes = 0;
        assert!(config.validate().is_err());
    }
}
