use std::time::Duration;

use crate::bot::{Context, Error};
use crate::poller::{self, TickResult};
use crate::sources::Source;
use crate::utils::embeds::{format_error_message, format_info_message, format_success_message};

fn ephemeral(content: String) -> poise::CreateReply {
    poise::CreateReply::default().content(content).ephemeral(true)
}

/// Resume all auto-post loops
#[poise::command(slash_command, guild_only, check = "crate::utils::checks::admin_check")]
pub async fn startautopost(ctx: Context<'_>) -> Result<(), Error> {
    for &source in Source::ALL.iter() {
        ctx.data().pollers.handle(source).set_enabled(true);
    }
    ctx.send(ephemeral("▶️ Autopost loops started.".to_string()))
        .await?;
    Ok(())
}

/// Pause all auto-post loops
#[poise::command(slash_command, guild_only, check = "crate::utils::checks::admin_check")]
pub async fn stopautopost(ctx: Context<'_>) -> Result<(), Error> {
    for &source in Source::ALL.iter() {
        ctx.data().pollers.handle(source).set_enabled(false);
    }
    ctx.send(ephemeral("⏸️ Auto-posting paused.".to_string()))
        .await?;
    Ok(())
}

/// Set how often a source auto-posts
#[poise::command(slash_command, guild_only, check = "crate::utils::checks::admin_check")]
pub async fn setinterval(
    ctx: Context<'_>,
    #[description = "Content source"] source: Source,
    #[description = "Hours between posts"]
    #[min = 0]
    #[max = 720]
    hours: Option<u32>,
    #[description = "Minutes between posts"]
    #[min = 0]
    #[max = 59]
    minutes: Option<u32>,
) -> Result<(), Error> {
    let hours = hours.unwrap_or(0);
    let minutes = minutes.unwrap_or(0);
    let seconds = interval_seconds(hours, minutes);

    if seconds == 0 {
        let msg = format_error_message("Interval must be longer than zero.");
        ctx.send(ephemeral(msg)).await?;
        return Ok(());
    }

    match ctx.data().store.set_interval(source, seconds) {
        Ok(()) => {
            ctx.data()
                .pollers
                .handle(source)
                .set_period(Duration::from_secs(seconds));
            let msg = format_success_message(&format!(
                "`{}` now posts every {}h {}m.",
                source.key(),
                hours,
                minutes
            ));
            ctx.send(ephemeral(msg)).await?;
        }
        Err(e) => {
            let msg = format_error_message(&format!("Failed to save interval: {}", e));
            ctx.send(ephemeral(msg)).await?;
        }
    }

    Ok(())
}

/// Show per-source auto-post loop status
#[poise::command(slash_command, guild_only, check = "crate::utils::checks::admin_check")]
pub async fn autopoststatus(ctx: Context<'_>) -> Result<(), Error> {
    let lines: Vec<String> = Source::ALL
        .iter()
        .map(|&source| {
            let handle = ctx.data().pollers.handle(source);
            let light = if handle.is_enabled() { "🟢" } else { "🔴" };
            format!(
                "{} **{}** every {}",
                light,
                source.label(),
                format_period(handle.period())
            )
        })
        .collect();

    ctx.say(format!("🔧 **Loop Status**:\n{}", lines.join("\n")))
        .await?;
    Ok(())
}

/// Fetch and post the latest content for a source right now
#[poise::command(slash_command, guild_only, check = "crate::utils::checks::admin_check")]
pub async fn refresh(
    ctx: Context<'_>,
    #[description = "Content source to refresh"] source: Source,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let result = poller::tick(source, ctx.serenity_context(), ctx.data()).await;
    let msg = match result {
        TickResult::Delivered(0) => format_info_message("Already posted. No new content."),
        TickResult::Delivered(count) => {
            format_success_message(&format!("Posted latest content to {} channel(s).", count))
        }
        TickResult::InFlight => {
            format_info_message("A refresh for this source is already running.")
        }
        TickResult::Failed => format_error_message("Refresh failed. Check the logs for details."),
    };
    ctx.send(ephemeral(msg)).await?;
    Ok(())
}

fn interval_seconds(hours: u32, minutes: u32) -> u64 {
    u64::from(hours) * 3600 + u64::from(minutes) * 60
}

fn format_period(period: Duration) -> String {
    let total_minutes = period.as_secs() / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
