pub mod commands;
pub mod handlers;

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;

use crate::config::Config;
use crate::poller::Pollers;
use crate::store::ConfigStore;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

#[derive(Clone)]
pub struct Data {
    pub store: Arc<ConfigStore>,
    pub http: reqwest::Client,
    pub config: Config,
    pub pollers: Arc<Pollers>,
    pub launch_time: DateTime<Utc>,
}

pub async fn create_bot(config: Config) -> Result<serenity::Client> {
    let store = Arc::new(ConfigStore::open(&config.config_dir)?);
    let pollers = Arc::new(Pollers::new(&store));

    let data = Data {
        store,
        http: reqwest::Client::new(),
        config: config.clone(),
        pollers,
        launch_time: Utc::now(),
    };

    let intents = serenity::GatewayIntents::non_privileged();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::admin::setchannel(),
                commands::admin::channelstatus(),
                commands::admin::setadminrole(),
                commands::admin::adminrole(),
                commands::admin::removeadminrole(),
                commands::admin::uptime(),
                commands::autopost::startautopost(),
                commands::autopost::stopautopost(),
                commands::autopost::setinterval(),
                commands::autopost::autopoststatus(),
                commands::autopost::refresh(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    Ok(client)
}
