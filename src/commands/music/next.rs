use super::*;
use crate::commands::music::utils::controller;

/// Skip to the next track in the queue
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    aliases("skip"),
    category = "Music"
)]
pub async fn next(ctx: Context<'_>) -> CommandResult {
    let guild_id = command_guild(ctx)?;
    let result = controller::next(ctx.data().players.as_ref(), guild_id).await;
    reply(ctx, result).await
}
