use std::path::PathBuf;

use checker::CheckerConfig;
use clap::Parser;

/// Command line and environment overrides, applied on top of the config file
#[derive(Debug, Parser)]
#[command(version, about = "Synthetic monitoring check runner")]
pub struct Args {
    #[arg(long, value_name = "PATH", env = "CHECKER_CONFIG", help = "Path to the TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "REGION", help = "Region this instance executes in")]
    pub region: Option<String>,

    #[arg(long, env = "CLOUD_PROVIDER", help = "Set to `fly` to enable region forwarding")]
    pub cloud_provider: Option<String>,

    #[arg(long, env = "CRON_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    #[arg(long, env = "ANALYTICS_TOKEN", hide_env_values = true)]
    pub analytics_token: Option<String>,

    #[arg(long, env = "STATUS_STORE_SECRET", hide_env_values = true)]
    pub status_store_secret: Option<String>,
}

impl Args {
    pub fn apply(self, config: &mut CheckerConfig) {
        if let Some(region) = self.region {
            config.region.name = region;
        }
        if let Some(provider) = self.cloud_provider {
            config.region.cloud_provider = provider;
        }
        if let Some(secret) = self.secret {
            config.secret = secret;
        }
        if self.analytics_token.is_some() {
            config.analytics.token = self.analytics_token;
        }
        if self.status_store_secret.is_some() {
            config.status_store.secret = self.status_store_secret;
        }
    }
}
