use poise::serenity_prelude::{self as serenity, Context};
use serenity::{ComponentInteraction, CreateInteractionResponse, CreateInteractionResponseMessage};
use tracing::{error, info};

use super::{
    button_controls::Control,
    controller, embedded_messages,
    music_manager::{MusicError, PlayerManager},
};

type ButtonInteractionResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Handle a press on one of the now-playing buttons
pub async fn handle_interaction(
    ctx: &Context,
    interaction: &ComponentInteraction,
    players: &dyn PlayerManager,
) -> ButtonInteractionResult {
    let custom_id = interaction.data.custom_id.as_str();

    let content = match (Control::from_custom_id(custom_id), interaction.guild_id) {
        (None, _) => {
            error!("Unknown button ID: {}", custom_id);
            "Unknown button action.".to_string()
        }
        (Some(_), None) => embedded_messages::button_error(&MusicError::NotInGuild),
        (Some(control), Some(guild_id)) => {
            info!(
                "{} pressed {:?} in guild {}",
                interaction.user.name, control, guild_id
            );
            match controller::press(players, guild_id, control).await {
                Ok(notice) => embedded_messages::button_notice(&notice),
                Err(e) => embedded_messages::button_error(&e),
            }
        }
    };

    respond(ctx, interaction, content).await
}

/// Answer the interaction with a message only the presser can see
async fn respond(
    ctx: &Context,
    interaction: &ComponentInteraction,
    content: String,
) -> ButtonInteractionResult {
    interaction
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}
