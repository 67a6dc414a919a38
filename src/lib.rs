//! tunecard: a Discord music bot that relays chat commands and button presses
//! to songbird and posts a rendered "now playing" card for every track.

use std::sync::{Arc, LazyLock};

use futures::future::BoxFuture;
use poise::serenity_prelude as serenity;
use tracing::error;

pub mod commands;
pub mod config;
pub mod events;
pub mod utils;

use commands::music::{
    loop_track::*, next::*, pause::*, play::*, resume::*, stop::*,
    utils::music_manager::PlayerManager,
};
use config::BotConfig;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// Shared HTTP client, used by songbird's yt-dlp inputs and for thumbnail downloads.
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

/// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub config: BotConfig,
    pub players: Arc<dyn PlayerManager>,
}

#[poise::command(prefix_command, slash_command, category = "General")]
async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
async fn register(ctx: Context<'_>) -> CommandResult {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}

/// Owners may issue commands without the prefix: the whole message is the command.
fn owner_prefix<'a>(
    _ctx: &'a serenity::Context,
    msg: &'a serenity::Message,
    data: &'a Data,
) -> BoxFuture<'a, Result<Option<(&'a str, &'a str)>, Error>> {
    Box::pin(async move {
        if data.config.is_owner(msg.author.id) {
            Ok(Some(("", msg.content.as_str())))
        } else {
            Ok(None)
        }
    })
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        // Owners chat without a prefix, so most of their messages are not commands.
        poise::FrameworkError::UnknownCommand { .. } => {}
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Build the poise options: commands, prefix handling, error and event hooks.
pub fn framework_options(config: &BotConfig) -> poise::FrameworkOptions<Data, Error> {
    poise::FrameworkOptions {
        commands: vec![
            // Default commands
            register(),
            help(),
            // Music commands
            play(),
            stop(),
            pause(),
            resume(),
            next(),
            loop_track(),
        ],
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(config.prefix.clone()),
            stripped_dynamic_prefix: Some(owner_prefix),
            case_insensitive_commands: true,
            ..Default::default()
        },
        on_error: |error| Box::pin(on_error(error)),
        event_handler: |ctx, event, framework, data| {
            Box::pin(events::event_handler(ctx, event, framework, data))
        },
        ..Default::default()
    }
}
