pub mod loop_track;
pub mod next;
pub mod pause;
pub mod play;
pub mod resume;
pub mod stop;

pub mod utils;

use poise::serenity_prelude::GuildId;
use tracing::debug;

use crate::{CommandResult, Context, Error};
use utils::{
    controller::Notice,
    embedded_messages,
    music_manager::{MusicError, MusicResult},
};

/// The guild a command was invoked in
fn command_guild(ctx: Context<'_>) -> Result<GuildId, Error> {
    ctx.guild_id()
        .ok_or_else(|| Box::new(MusicError::NotInGuild) as Error)
}

/// Send the embed for a command's outcome back to the channel
async fn reply(ctx: Context<'_>, result: MusicResult<Notice>) -> CommandResult {
    if let Err(e) = &result {
        debug!("{} by {} failed: {}", ctx.command().name, ctx.author().name, e);
    }
    ctx.send(embedded_messages::command_reply(&result)).await?;
    Ok(())
}
