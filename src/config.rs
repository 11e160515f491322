use clap::Parser;
use std::time::Duration;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "gemini-quota-proxy")]
#[command(about = "Quota-gated proxy in front of the Gemini text-generation API")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Base url of the provider
    #[arg(long, default_value = "https://generativelanguage.googleapis.com")]
    pub upstream_url: String,

    // Model used for generateContent
    #[arg(short, long, default_value = "gemini-2.0-flash")]
    pub model: String,

    // Provider credential, normally taken from the environment
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // Rate limit max requests per window
    #[arg(long, default_value_t = 50)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 24 * 60 * 60)]
    pub rate_window: u64,

    // Upstream call timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub upstream_timeout: u64,

    // Background sweep interval in seconds
    #[arg(long, default_value_t = 300)]
    pub sweep_interval: u64,
}

impl Args {
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}
