// src/config.rs
use clap::Parser;

use crate::services::backend::DEFAULT_ASK_URL;

pub const DEFAULT_TITLE: &str = "Ask IDC";

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal chat widget for the IDC Q&A service", long_about = None)]
pub struct Cli {
    /// Q&A endpoint that receives `{query, user}` posts
    #[arg(long, env = "CHAT_BACKEND_URL", default_value = DEFAULT_ASK_URL)]
    pub backend_url: String,

    /// Panel title
    #[arg(long, env = "CHAT_WIDGET_TITLE", default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Start with the panel open
    #[arg(long)]
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub backend_url: String,
    pub title: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_ASK_URL.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl From<&Cli> for WidgetConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            backend_url: cli.backend_url.clone(),
            title: cli.title.clone(),
        }
    }
}

impl WidgetConfig {
    /// Load `.env` (if any) and parse the command line.
    pub fn load() -> (Cli, Self) {
        dotenvy::dotenv().ok();
        let cli = Cli::parse();
        let config = Self::from(&cli);
        (cli, config)
    }
}
