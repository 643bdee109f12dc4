use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub config_dir: String,
    pub instagram_username: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN environment variable is required"))?;

        let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let instagram_username =
            env::var("INSTAGRAM_USERNAME").unwrap_or_else(|_| "xenon.otakus".to_string());

        Ok(Config {
            discord_token,
            config_dir,
            instagram_username,
        })
    }
}
