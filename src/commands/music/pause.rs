use super::*;
use crate::commands::music::utils::controller;

/// Pause the current track
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let guild_id = command_guild(ctx)?;
    let result = controller::pause(ctx.data().players.as_ref(), guild_id).await;
    reply(ctx, result).await
}
