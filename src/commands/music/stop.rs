use super::*;
use crate::commands::music::utils::controller;

/// Stop the music, clear the queue, and leave the voice channel
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let guild_id = command_guild(ctx)?;
    let result = controller::stop(ctx.data().players.as_ref(), guild_id).await;
    reply(ctx, result).await
}
