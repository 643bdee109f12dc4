use crate::bot::{Context, Error};
use crate::sources::Source;
use crate::utils::embeds::{format_error_message, format_info_message, format_success_message};
use poise::serenity_prelude as serenity;
use poise::serenity_prelude::Mentionable;

fn ephemeral(content: String) -> poise::CreateReply {
    poise::CreateReply::default().content(content).ephemeral(true)
}

/// Set the channel a content source posts into
#[poise::command(slash_command, guild_only, check = "crate::utils::checks::admin_check")]
pub async fn setchannel(
    ctx: Context<'_>,
    #[description = "Content source to configure"] source: Source,
    #[description = "Channel to post into"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    match ctx.data().store.set_channel(guild_id, source, channel.id) {
        Ok(()) => {
            let msg = format_success_message(&format!(
                "`{}` channel set to {}",
                source.key(),
                channel.id.mention()
            ));
            ctx.send(ephemeral(msg)).await?;
        }
        Err(e) => {
            let msg = format_error_message(&format!("Failed to save channel config: {}", e));
            ctx.send(ephemeral(msg)).await?;
        }
    }

    Ok(())
}

/// Show this server's configured autopost channels
#[poise::command(slash_command, guild_only, check = "crate::utils::checks::admin_check")]
pub async fn channelstatus(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    match ctx.data().store.guild_channels(guild_id) {
        Ok(channels) if channels.is_empty() => {
            let msg = format_info_message("No channels configured yet.");
            ctx.send(ephemeral(msg)).await?;
        }
        Ok(channels) => {
            let lines: Vec<String> = channels
                .iter()
                .map(|(source, channel_id)| format!("• **{}** → <#{}>", source, channel_id))
                .collect();
            ctx.send(ephemeral(lines.join("\n"))).await?;
        }
        Err(e) => {
            let msg = format_error_message(&format!("Failed to read channel config: {}", e));
            ctx.send(ephemeral(msg)).await?;
        }
    }

    Ok(())
}

/// Set the admin role for this server
#[poise::command(slash_command, guild_only, check = "crate::utils::checks::admin_check")]
pub async fn setadminrole(
    ctx: Context<'_>,
    #[description = "Role allowed to use admin commands"] role: serenity::Role,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    match ctx.data().store.set_admin_role(guild_id, role.id) {
        Ok(()) => {
            let msg = format_success_message(&format!("Admin role set to {}", role.mention()));
            ctx.send(ephemeral(msg)).await?;
        }
        Err(e) => {
            let msg = format_error_message(&format!("Failed to save admin role: {}", e));
            ctx.send(ephemeral(msg)).await?;
        }
    }

    Ok(())
}

/// Show the current admin role
#[poise::command(slash_command, guild_only, check = "crate::utils::checks::admin_check")]
pub async fn adminrole(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    match ctx.data().store.admin_role(guild_id) {
        Ok(Some(role_id)) => {
            let known = ctx
                .guild()
                .map(|guild| guild.roles.contains_key(&role_id))
                .unwrap_or(false);
            let msg = if known {
                format!("🛡️ Admin role: {}", role_id.mention())
            } else {
                format!("🛡️ Admin role ID: `{}` (not found in this server)", role_id)
            };
            ctx.send(ephemeral(msg)).await?;
        }
        Ok(None) => {
            let msg = format_info_message("No admin role has been set for this server.");
            ctx.send(ephemeral(msg)).await?;
        }
        Err(e) => {
            let msg = format_error_message(&format!("Failed to read admin role: {}", e));
            ctx.send(ephemeral(msg)).await?;
        }
    }

    Ok(())
}

/// Remove the admin role restriction
#[poise::command(slash_command, guild_only, check = "crate::utils::checks::admin_check")]
pub async fn removeadminrole(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    match ctx.data().store.remove_admin_role(guild_id) {
        Ok(true) => {
            let msg = format_success_message("Admin role removed.");
            ctx.send(ephemeral(msg)).await?;
        }
        Ok(false) => {
            let msg = format_info_message("No admin role was set for this server.");
            ctx.send(ephemeral(msg)).await?;
        }
        Err(e) => {
            let msg = format_error_message(&format!("Failed to update admin role: {}", e));
            ctx.send(ephemeral(msg)).await?;
        }
    }

    Ok(())
}

/// Show how long the bot has been online
#[poise::command(slash_command, guild_only, check = "crate::utils::checks::admin_check")]
pub async fn uptime(ctx: Context<'_>) -> Result<(), Error> {
    let elapsed = chrono::Utc::now().signed_duration_since(ctx.data().launch_time);
    let hours = elapsed.num_hours();
    let minutes = elapsed.num_minutes() % 60;
    let seconds = elapsed.num_seconds() % 60;
    ctx.say(format!("🕒 Uptime: {}h {}m {}s", hours, minutes, seconds))
        .await?;
    Ok(())
}
