use crate::sources::{Item, Source};
use poise::serenity_prelude as serenity;

pub fn format_error_message(error: &str) -> String {
    format!("❌ **Error**: {}", error)
}

pub fn format_success_message(message: &str) -> String {
    format!("✅ {}", message)
}

pub fn format_info_message(message: &str) -> String {
    format!("ℹ️ {}", message)
}

fn source_color(source: Source) -> u32 {
    match source {
        Source::Meme => 0x9b59b6,         // Purple
        Source::Quote => 0xf1c40f,        // Gold
        Source::Insta => 0xe67e22,        // Orange
        Source::MangaChapter => 0x1abc9c, // Teal
    }
}

pub fn feed_embed(source: Source, item: &Item) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .color(source_color(source))
        .timestamp(chrono::Utc::now());

    if let Source::Quote = source {
        // Quotes render as a single styled description, no footer or image.
        let quote = item.body.as_deref().unwrap_or("No quote found.");
        let author = item.footer.as_deref().unwrap_or("Unknown");
        return embed.description(format!("📜 *\"{}\"*\n\n**{}**", quote, author));
    }

    if let Some(title) = &item.title {
        embed = embed.title(truncate(title, 256));
    }
    if let Some(body) = &item.body {
        embed = embed.description(truncate(body, 1024));
    }
    if let Some(url) = &item.url {
        embed = embed.url(url);
    }
    if let Some(image) = item.image_urls.first() {
        embed = embed.image(image);
    }
    if let Some(footer) = &item.footer {
        embed = embed.footer(serenity::CreateEmbedFooter::new(footer));
    }
    embed
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let kept: String = text.chars().take(limit.saturating_sub(3)).collect();
    format!("{}...", kept)
}
