use std::sync::Arc;

use ::serenity::all::ClientBuilder;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use songbird::{SerenityInit, Songbird};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tunecard::{
    Data, Error,
    commands::music::utils::music_manager::SongbirdPlayers,
    config::BotConfig,
    utils::music_card::{CardAssets, CardRenderer},
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tunecard=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let config = BotConfig::from_env()?;
    let token = config.token.clone();

    // Backgrounds and font are read once; the renderer only ever borrows them.
    let assets = CardAssets::load(&config.card.backgrounds_dir, &config.card.font);
    let renderer = Arc::new(CardRenderer::new(
        Arc::new(assets),
        config.card.output.clone(),
    ));

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_VOICE_STATES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let voice = Songbird::serenity();
    let options = tunecard::framework_options(&config);

    let framework = poise::Framework::builder()
        .options(options)
        .setup({
            let voice = voice.clone();
            move |ctx, _ready, framework| {
                Box::pin(async move {
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    let players = SongbirdPlayers::new(
                        voice,
                        ctx.http.clone(),
                        renderer,
                        config.audio.clone(),
                    );
                    Ok(Data {
                        config,
                        players: Arc::new(players),
                    })
                })
            }
        });

    let mut client = ClientBuilder::new(token, intents)
        .framework(framework.build())
        .register_songbird_with(voice)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received, shutting down...");
                shard_manager.shutdown_all().await;
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    client.start().await.map_err(Into::into)
}
