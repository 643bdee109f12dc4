use crate::bot::{Context, Error};
use poise::serenity_prelude as serenity;

/// Command check: allow members holding this guild's configured admin role,
/// or members with the Administrator permission. Without the permission
/// fallback a fresh guild could never run `/setadminrole` in the first
/// place. Denial is reported to the invoking user only.
pub async fn admin_check(ctx: Context<'_>) -> Result<bool, Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(false);
    };
    let Some(member) = ctx.author_member().await else {
        return Ok(false);
    };

    let configured_role = match ctx.data().store.admin_role(guild_id) {
        Ok(role) => role,
        Err(e) => {
            tracing::error!(guild = %guild_id, error = %e, "failed to load admin role config");
            None
        }
    };

    let allowed = match configured_role {
        Some(role_id) => member.roles.contains(&role_id) || has_admin_permission(&ctx, &member),
        None => has_admin_permission(&ctx, &member),
    };

    if !allowed {
        ctx.send(
            poise::CreateReply::default()
                .content("⛔ You don't have permission to use this command.")
                .ephemeral(true),
        )
        .await?;
    }

    Ok(allowed)
}

fn has_admin_permission(ctx: &Context<'_>, member: &serenity::Member) -> bool {
    member
        .permissions(&ctx.serenity_context().cache)
        .map(|perms| perms.administrator())
        .unwrap_or(false)
}
