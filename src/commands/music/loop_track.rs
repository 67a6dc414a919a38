use super::*;
use crate::commands::music::utils::controller;

/// Toggle repeating the current track
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    rename = "loop",
    category = "Music"
)]
pub async fn loop_track(ctx: Context<'_>) -> CommandResult {
    let guild_id = command_guild(ctx)?;
    let result = controller::toggle_loop(ctx.data().players.as_ref(), guild_id).await;
    reply(ctx, result).await
}
