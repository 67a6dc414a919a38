use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use serenity::async_trait;
use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::Http;
use songbird::input::YoutubeDl;
use songbird::tracks::{LoopState, PlayMode, Track, TrackHandle};
use songbird::{Event, Songbird, TrackEvent};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::event_handlers::{NowPlayingSlot, TrackEndNotifier, TrackStartNotifier};
use super::track_metadata::{self, TrackMetadata};
use crate::HTTP_CLIENT;
use crate::config::AudioConfig;
use crate::utils::music_card::CardRenderer;

/// How much of a track must have played before its now-playing card is sent.
/// Timed events count play time, so a queued track waits until it actually starts.
const TRACK_START_DELAY: Duration = Duration::from_millis(250);

/// Errors that can occur during music operations.
///
/// The first group are the user-facing messages shown in chat.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MusicError {
    #[error("Provide a song name or link!")]
    MissingQuery,

    #[error("You need to be in a voice channel!")]
    UserNotInVoiceChannel,

    #[error("No results found!")]
    NoResults,

    #[error("Nothing is playing!")]
    NothingPlaying,

    #[error("No music is playing!")]
    NoMusicPlaying,

    #[error("Music is already playing!")]
    AlreadyPlaying,

    #[error("No music to skip!")]
    NothingToSkip,

    #[error("Not in a guild")]
    NotInGuild,

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Audio source error: {0}")]
    AudioSourceError(String),

    #[error("Playback control error: {0}")]
    ControlError(String),
}

impl From<songbird::error::ControlError> for MusicError {
    fn from(err: songbird::error::ControlError) -> Self {
        MusicError::ControlError(err.to_string())
    }
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Snapshot of a guild's player, as reported by the playback library
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStatus {
    pub paused: bool,
    pub has_current: bool,
    pub looping: bool,
}

/// The player-management surface the command router talks to.
///
/// All playback state lives behind this trait; callers only read it through
/// [`PlayerManager::status`]. `status` returns `None` when the guild has no player.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerManager: Send + Sync {
    async fn status(&self, guild_id: GuildId) -> Option<PlayerStatus>;

    /// Whether the guild's player holds a live voice connection.
    async fn is_connected(&self, guild_id: GuildId) -> bool;

    /// Create the guild's player if needed and join `voice_channel`, rejoining
    /// when an existing player has lost its connection.
    async fn connect(
        &self,
        guild_id: GuildId,
        voice_channel: ChannelId,
        text_channel: ChannelId,
    ) -> MusicResult<()>;

    /// Resolve a URL or search query to its first match.
    async fn search(&self, query: &str, requester: &str) -> MusicResult<Option<TrackMetadata>>;

    /// Queue a track; playback starts on its own when the queue was empty.
    async fn enqueue(&self, guild_id: GuildId, track: TrackMetadata) -> MusicResult<()>;

    async fn set_paused(&self, guild_id: GuildId, paused: bool) -> MusicResult<()>;

    async fn skip(&self, guild_id: GuildId) -> MusicResult<()>;

    async fn set_track_repeat(&self, guild_id: GuildId, enabled: bool) -> MusicResult<()>;

    /// Stop playback, drop the queue and leave the voice channel.
    async fn destroy(&self, guild_id: GuildId) -> MusicResult<()>;
}

/// [`PlayerManager`] backed by songbird's built-in queue, with yt-dlp as the resolver.
pub struct SongbirdPlayers {
    songbird: Arc<Songbird>,
    http: Arc<Http>,
    renderer: Arc<CardRenderer>,
    audio: AudioConfig,
    // Text channel each guild's player was created from
    text_channels: DashMap<GuildId, ChannelId>,
}

impl SongbirdPlayers {
    pub fn new(
        songbird: Arc<Songbird>,
        http: Arc<Http>,
        renderer: Arc<CardRenderer>,
        audio: AudioConfig,
    ) -> Self {
        Self {
            songbird,
            http,
            renderer,
            audio,
            text_channels: DashMap::new(),
        }
    }

    async fn current_track(&self, guild_id: GuildId) -> MusicResult<Option<TrackHandle>> {
        let call = self.songbird.get(guild_id).ok_or(MusicError::NotConnected)?;
        let handler = call.lock().await;
        Ok(handler.queue().current())
    }

    fn attach_notifiers(&self, guild_id: GuildId, handle: &TrackHandle, metadata: TrackMetadata) {
        let Some(channel_id) = self.text_channels.get(&guild_id).map(|entry| *entry) else {
            warn!(
                "No text channel stored for guild {}, skipping now playing message",
                guild_id
            );
            return;
        };

        let now_playing = NowPlayingSlot::default();

        let start = TrackStartNotifier {
            http: self.http.clone(),
            renderer: self.renderer.clone(),
            guild_id,
            channel_id,
            metadata,
            now_playing: now_playing.clone(),
        };
        if let Err(e) = handle.add_event(Event::Delayed(TRACK_START_DELAY), start) {
            warn!("Failed to add track start event for guild {}: {}", guild_id, e);
        }

        let end = TrackEndNotifier {
            http: self.http.clone(),
            guild_id,
            channel_id,
            now_playing,
        };
        if let Err(e) = handle.add_event(Event::Track(TrackEvent::End), end) {
            warn!("Failed to add track end event for guild {}: {}", guild_id, e);
        }
    }
}

#[async_trait]
impl PlayerManager for SongbirdPlayers {
    async fn status(&self, guild_id: GuildId) -> Option<PlayerStatus> {
        let call = self.songbird.get(guild_id)?;
        let current = call.lock().await.queue().current();

        let Some(track) = current else {
            return Some(PlayerStatus::default());
        };

        match track.get_info().await {
            Ok(info) => Some(PlayerStatus {
                paused: info.playing == PlayMode::Pause,
                has_current: true,
                looping: matches!(info.loops, LoopState::Infinite),
            }),
            Err(e) => {
                // The track finished between the queue read and the state query
                debug!("Current track in guild {} is gone: {}", guild_id, e);
                Some(PlayerStatus::default())
            }
        }
    }

    async fn is_connected(&self, guild_id: GuildId) -> bool {
        match self.songbird.get(guild_id) {
            Some(call) => call.lock().await.current_connection().is_some(),
            None => false,
        }
    }

    async fn connect(
        &self,
        guild_id: GuildId,
        voice_channel: ChannelId,
        text_channel: ChannelId,
    ) -> MusicResult<()> {
        self.text_channels.insert(guild_id, text_channel);

        // A failed join leaves its Call behind; drop it so `status` sees no player
        let call = match self.songbird.join(guild_id, voice_channel).await {
            Ok(call) => call,
            Err(e) => {
                self.text_channels.remove(&guild_id);
                if let Err(remove_err) = self.songbird.remove(guild_id).await {
                    debug!("No call to clean up in guild {}: {}", guild_id, remove_err);
                }
                return Err(MusicError::JoinError(e.to_string()));
            }
        };

        if self.audio.self_deafen {
            if let Err(e) = call.lock().await.deafen(true).await {
                warn!("Failed to self-deafen in guild {}: {}", guild_id, e);
            }
        }

        info!(
            "Joined voice channel {} in guild {}",
            voice_channel, guild_id
        );
        Ok(())
    }

    async fn search(&self, query: &str, requester: &str) -> MusicResult<Option<TrackMetadata>> {
        track_metadata::resolve(query, &self.audio.search_prefix, requester).await
    }

    async fn enqueue(&self, guild_id: GuildId, track: TrackMetadata) -> MusicResult<()> {
        let call = self.songbird.get(guild_id).ok_or(MusicError::NotConnected)?;
        let url = track.url.clone().ok_or_else(|| {
            MusicError::AudioSourceError(format!("Track '{}' has no playable URL", track.title))
        })?;

        let input = YoutubeDl::new(HTTP_CLIENT.clone(), url);
        let handle = {
            let mut handler = call.lock().await;
            handler.enqueue(Track::from(input)).await
        };

        info!("Queued '{}' in guild {}", track.title, guild_id);
        self.attach_notifiers(guild_id, &handle, track);
        Ok(())
    }

    async fn set_paused(&self, guild_id: GuildId, paused: bool) -> MusicResult<()> {
        let track = self
            .current_track(guild_id)
            .await?
            .ok_or(MusicError::NoMusicPlaying)?;

        if paused {
            track.pause()?;
        } else {
            track.play()?;
        }
        Ok(())
    }

    async fn skip(&self, guild_id: GuildId) -> MusicResult<()> {
        let call = self.songbird.get(guild_id).ok_or(MusicError::NotConnected)?;
        call.lock().await.queue().skip()?;
        Ok(())
    }

    async fn set_track_repeat(&self, guild_id: GuildId, enabled: bool) -> MusicResult<()> {
        let track = self
            .current_track(guild_id)
            .await?
            .ok_or(MusicError::NoMusicPlaying)?;

        if enabled {
            track.enable_loop()?;
        } else {
            track.disable_loop()?;
        }
        Ok(())
    }

    async fn destroy(&self, guild_id: GuildId) -> MusicResult<()> {
        if let Some(call) = self.songbird.get(guild_id) {
            call.lock().await.queue().stop();
        }
        self.text_channels.remove(&guild_id);

        self.songbird
            .remove(guild_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;

        info!("Destroyed player for guild {}", guild_id);
        Ok(())
    }
}

/// Get the voice channel the user is currently in, from the cache
pub fn user_voice_channel(ctx: &Context, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
    let guild = ctx.cache.guild(guild_id)?;
    guild
        .voice_states
        .get(&user_id)
        .and_then(|voice_state| voice_state.channel_id)
}
