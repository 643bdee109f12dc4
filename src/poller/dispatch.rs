use poise::serenity_prelude as serenity;

use crate::sources::{Item, Source};
use crate::store::ConfigStore;
use crate::utils::embeds;

/// Fans one new item out to every guild with a channel configured for this
/// source. Guilds without a configuration are skipped silently; a failure to
/// reach one guild never stops delivery to the rest. Returns the number of
/// channels notified.
pub async fn deliver(
    ctx: &serenity::Context,
    store: &ConfigStore,
    source: Source,
    item: &Item,
) -> usize {
    // Sorted for a stable fan-out order across ticks.
    let mut guilds = ctx.cache.guilds();
    guilds.sort();

    let mut delivered = 0;
    for guild_id in guilds {
        let channel_id = match store.channel_for(guild_id, source) {
            Ok(Some(channel_id)) => channel_id,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(guild = %guild_id, error = %e, "channel lookup failed");
                continue;
            }
        };
        match send_to_channel(ctx, channel_id, source, item).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                tracing::warn!(
                    source = source.key(),
                    guild = %guild_id,
                    channel = %channel_id,
                    error = %e,
                    "failed to deliver item"
                );
            }
        }
    }
    delivered
}

async fn send_to_channel(
    ctx: &serenity::Context,
    channel_id: serenity::ChannelId,
    source: Source,
    item: &Item,
) -> Result<(), serenity::Error> {
    let embed = embeds::feed_embed(source, item);
    channel_id
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await?;

    // An embed carries a single image; the rest go out as bare links.
    for extra in item.image_urls.iter().skip(1) {
        channel_id.say(&ctx.http, extra.as_str()).await?;
    }
    Ok(())
}
