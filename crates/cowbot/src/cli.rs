use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "cowbot")]
#[command(about = "Chat bot that answers !cowsay-style triggers with rendered ASCII art", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to cowbot.toml (default: $COWBOT_CONFIG, then ~/.cowbot/cowbot.toml)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Renderer executable, overriding renderer.path from the config
    #[arg(long)]
    pub renderer: Option<String>,

    /// Validate config, renderer and handlers, then exit
    #[arg(long)]
    pub check: bool,
}
