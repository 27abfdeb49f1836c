//! Startup wiring: config resolution, handler construction, logging.

use std::sync::Arc;
use std::time::Duration;

use cowbot_commands::{HandlerSet, RenderHandler};
use cowbot_core::{CowbotConfig, CowbotError};
use cowbot_render::Renderer;

use crate::cli::Cli;

const DEFAULT_LOG_FILTER: &str =
    "cowbot=info,cowbot_render=info,cowbot_commands=info,cowbot_channels=info";

/// Resolve and validate the effective config.
///
/// Path precedence: `--config` > `COWBOT_CONFIG` > `~/.cowbot/cowbot.toml`.
/// `--renderer` wins over both the file and `COWBOT_RENDERER__PATH`.
pub fn load_config(cli: &Cli) -> Result<CowbotConfig, CowbotError> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var("COWBOT_CONFIG").ok());
    let mut config = CowbotConfig::load(path.as_deref())?;

    if let Some(renderer) = &cli.renderer {
        config.renderer.path = renderer.clone();
    }

    config.validate()?;
    Ok(config)
}

/// The handler collection the bot dispatches to. Validated before return.
pub fn build_handlers(
    config: &CowbotConfig,
    renderer: Arc<dyn Renderer>,
) -> Result<HandlerSet, CowbotError> {
    let render = RenderHandler::new(renderer)
        .with_scope(config.bot.respond_to)
        .with_cooldown(Duration::from_secs(config.bot.cooldown_secs));

    let handlers = HandlerSet::new().with(Box::new(render));
    handlers.validate()?;
    Ok(handlers)
}

/// Logs go to stderr so stdout stays reserved for channel output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cowbot_core::ResponseScope;
    use cowbot_render::{RenderRequest, Rendered};

    struct NullRenderer;

    #[async_trait]
    impl Renderer for NullRenderer {
        async fn render(&self, _request: &RenderRequest) -> cowbot_render::Result<Rendered> {
            Ok(Rendered {
                text: String::new(),
                elapsed: Duration::ZERO,
            })
        }
    }

    fn cli_with(config: &std::path::Path, renderer: Option<&str>) -> Cli {
        Cli {
            config: Some(config.to_string_lossy().into_owned()),
            renderer: renderer.map(String::from),
            check: false,
        }
    }

    #[test]
    fn renderer_flag_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cowbot.toml");
        std::fs::write(&path, "[renderer]\npath = \"/usr/games/cowsay\"\n").unwrap();

        let config = load_config(&cli_with(&path, None)).unwrap();
        assert_eq!(config.renderer.path, "/usr/games/cowsay");

        let config = load_config(&cli_with(&path, Some("/opt/cowsay"))).unwrap();
        assert_eq!(config.renderer.path, "/opt/cowsay");
    }

    #[test]
    fn empty_renderer_flag_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&cli_with(&dir.path().join("absent.toml"), Some(""))).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn builds_a_single_render_handler() {
        let mut config = CowbotConfig::default();
        config.bot.respond_to = ResponseScope::Both;

        let handlers = build_handlers(&config, Arc::new(NullRenderer)).unwrap();
        assert_eq!(handlers.len(), 1);
        assert_eq!(handlers.names(), vec!["render"]);
    }
}
