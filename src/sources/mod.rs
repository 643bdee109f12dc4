pub mod instagram;
pub mod manga;
pub mod meme;
pub mod quote;

use crate::config::Config;
use serde::de::DeserializeOwned;

/// Static registry of every content feed the bot can poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, poise::ChoiceParameter)]
pub enum Source {
    #[name = "meme"]
    Meme,
    #[name = "quote"]
    Quote,
    #[name = "insta"]
    Insta,
    #[name = "manga_chapter"]
    MangaChapter,
}

impl Source {
    pub const ALL: [Source; 4] = [
        Source::Meme,
        Source::Quote,
        Source::Insta,
        Source::MangaChapter,
    ];

    /// Stable key used in config files and log lines.
    pub fn key(self) -> &'static str {
        match self {
            Source::Meme => "meme",
            Source::Quote => "quote",
            Source::Insta => "insta",
            Source::MangaChapter => "manga_chapter",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Source::Meme => "Meme",
            Source::Quote => "Quote",
            Source::Insta => "Instagram",
            Source::MangaChapter => "Manga chapter",
        }
    }

    pub fn default_interval_secs(self) -> u64 {
        match self {
            Source::Meme | Source::Quote => 21_600,
            Source::Insta => 43_200,
            Source::MangaChapter => 1_800,
        }
    }
}

/// One feed entry, normalized to the shape the embed renderer understands.
#[derive(Debug, Clone)]
pub struct Item {
    /// Unique within its source; what the dedup cursor stores.
    pub id: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
    pub image_urls: Vec<String>,
    pub footer: Option<String>,
}

/// Latest entries for a source, newest first. Fails closed: any transport,
/// status, or payload problem yields an empty batch so one feed outage never
/// disturbs the other pollers.
pub async fn fetch_latest_batch(
    source: Source,
    http: &reqwest::Client,
    config: &Config,
) -> Vec<Item> {
    match source {
        Source::Meme => meme::fetch_latest(http).await,
        Source::Quote => quote::fetch_latest(http).await,
        Source::Insta => instagram::fetch_latest(http, &config.instagram_username).await,
        Source::MangaChapter => manga::fetch_latest(http).await,
    }
}

pub(crate) async fn get_json<T>(http: &reqwest::Client, url: &str) -> Option<T>
where
    T: DeserializeOwned,
{
    let resp = match http.get(url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!(%url, error = %e, "request failed");
            return None;
        }
    };
    let status = resp.status();
    if !status.is_success() {
        tracing::warn!(%url, %status, "upstream returned non-success status");
        return None;
    }
    match resp.json::<T>().await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(%url, error = %e, "failed to decode payload");
            None
        }
    }
}
