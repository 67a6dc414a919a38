use poise::serenity_prelude::{self as serenity, FullEvent, Interaction};
use tracing::{error, info};

use crate::commands::music::utils::{button_controls::CONTROL_PREFIX, button_handlers};
use crate::{Data, Error};

/// Gateway events the framework hands through to us
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot } => {
            info!("{} is online!", data_about_bot.user.tag());
        }
        FullEvent::InteractionCreate {
            interaction: Interaction::Component(component),
        } if component.data.custom_id.starts_with(CONTROL_PREFIX) => {
            if let Err(e) =
                button_handlers::handle_interaction(ctx, component, data.players.as_ref()).await
            {
                error!("Error handling component interaction: {}", e);
            }
        }
        _ => {}
    }
    Ok(())
}
