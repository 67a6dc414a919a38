use super::*;
use crate::commands::music::utils::{
    controller::{self, PlayRequest},
    music_manager::user_voice_channel,
};
use tracing::info;

/// Play a song from YouTube or a direct URL
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "URL or search query"]
    #[rest]
    query: Option<String>,
) -> CommandResult {
    info!("Received play command with query: {:?}", query);
    let guild_id = command_guild(ctx)?;
    let voice_channel = user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id);

    // Searching and joining can take longer than the slash command deadline
    ctx.defer().await?;

    let requester = ctx.author().name.clone();
    let request = PlayRequest {
        guild_id,
        voice_channel,
        text_channel: ctx.channel_id(),
        requester: &requester,
        query: query.as_deref(),
    };

    let result = controller::play(ctx.data().players.as_ref(), request).await;
    reply(ctx, result).await
}
