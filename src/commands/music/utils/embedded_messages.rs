use poise::{CreateReply, serenity_prelude as serenity};
use serenity::all::CreateEmbed;

use super::{
    button_controls::Control,
    controller::Notice,
    format_duration,
    music_manager::{MusicError, MusicResult},
    track_metadata::TrackMetadata,
};

/// Colour shared by every music embed
pub const EMBED_COLOR: u32 = 0x95a5a6;

/// Title and body of the embed answering a successful command
pub fn notice_text(notice: &Notice) -> (String, String) {
    let (title, description) = match notice {
        Notice::Queued { title } => ("🎵 Added to Queue", format!("**{}**", title)),
        Notice::Stopped => ("⏹️ Stopped", "Music has been stopped.".to_string()),
        Notice::Paused => ("⏸️ Paused", "Music is paused.".to_string()),
        Notice::Resumed => ("▶️ Resumed", "Music is resumed.".to_string()),
        Notice::Skipped => ("⏭️ Skipped", "Skipped to the next track.".to_string()),
        Notice::Loop { enabled } => (
            "🔁 Loop",
            format!("Loop is now **{}**", if *enabled { "enabled" } else { "disabled" }),
        ),
    };
    (title.to_string(), description)
}

pub fn notice(notice: &Notice) -> CreateEmbed {
    let (title, description) = notice_text(notice);
    CreateEmbed::new()
        .title(title)
        .description(description)
        .color(EMBED_COLOR)
}

pub fn error(err: &MusicError) -> CreateEmbed {
    CreateEmbed::new()
        .title("❌ Error")
        .description(err.to_string())
        .color(EMBED_COLOR)
}

/// The reply to a chat command; failures are only shown to the invoking user on slash commands
pub fn command_reply(result: &MusicResult<Notice>) -> CreateReply {
    match result {
        Ok(outcome) => CreateReply::default().embed(notice(outcome)),
        Err(err) => CreateReply::default().embed(error(err)).ephemeral(true),
    }
}

/// Ephemeral text sent back for a button press, led by that button's emoji
pub fn button_notice(notice: &Notice) -> String {
    match notice {
        Notice::Skipped => format!("{} Skipped!", Control::Skip.emoji()),
        Notice::Paused => format!("{} Music Paused!", Control::Pause.emoji()),
        Notice::Resumed => format!("{} Music Resumed!", Control::Resume.emoji()),
        Notice::Stopped => format!("{} Music Stopped!", Control::Stop.emoji()),
        Notice::Loop { enabled } => format!(
            "{} Loop **{}**",
            Control::Loop.emoji(),
            if *enabled { "Enabled" } else { "Disabled" }
        ),
        Notice::Queued { title } => format!("🎵 Added **{}** to the queue", title),
    }
}

pub fn button_error(err: &MusicError) -> String {
    format!("❌ {}", err)
}

/// Create an embed for when a song is now playing, used when the card can't be rendered
pub fn now_playing(metadata: &TrackMetadata) -> CreateEmbed {
    let url = metadata.url.as_deref().unwrap_or("#");
    let duration = metadata
        .duration
        .map(format_duration)
        .unwrap_or_else(|| "Unknown duration".to_string());

    let mut embed = CreateEmbed::new()
        .title("🎵 Now Playing")
        .description(format!("[{}]({})", metadata.title, url))
        .field("Duration", format!("`{}`", duration), true)
        .color(EMBED_COLOR);

    if let Some(requester) = &metadata.requested_by {
        embed = embed.field("Requested by", requester, true);
    }
    if let Some(thumbnail) = &metadata.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }
    embed
}
