use std::sync::Arc;

use poise::serenity_prelude as serenity;
use serenity::async_trait;
use serenity::{ChannelId, CreateMessage, EditMessage, GuildId, Http, MessageId};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::{button_controls, embedded_messages, track_metadata::TrackMetadata};
use crate::Error;
use crate::utils::music_card::CardRenderer;

/// Where a track's now-playing message stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NowPlaying {
    #[default]
    Pending,
    Sent(MessageId),
    Ended,
}

impl NowPlaying {
    /// Record the sent message. Returns it back when the track already ended,
    /// since nothing else will strip its buttons.
    pub fn sent(&mut self, message_id: MessageId) -> Option<MessageId> {
        match self {
            NowPlaying::Ended => Some(message_id),
            _ => {
                *self = NowPlaying::Sent(message_id);
                None
            }
        }
    }

    /// Mark the track finished, handing back the message to strip if one was sent.
    pub fn ended(&mut self) -> Option<MessageId> {
        match std::mem::replace(self, NowPlaying::Ended) {
            NowPlaying::Sent(message_id) => Some(message_id),
            _ => None,
        }
    }
}

/// The now-playing message sent for one track, shared by its start and end handlers
pub type NowPlayingSlot = Arc<Mutex<NowPlaying>>;

/// Remove the control buttons from a now-playing message
async fn strip_controls(http: &Http, channel_id: ChannelId, message_id: MessageId) {
    if let Err(e) = channel_id
        .edit_message(http, message_id, EditMessage::new().components(vec![]))
        .await
    {
        error!("Failed to edit message: {}", e);
    }
}

/// Event handler for when a track starts playing: sends the card and the controls
pub struct TrackStartNotifier {
    pub http: Arc<Http>,
    pub renderer: Arc<CardRenderer>,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub metadata: TrackMetadata,
    pub now_playing: NowPlayingSlot,
}

#[async_trait]
impl songbird::EventHandler for TrackStartNotifier {
    async fn act(&self, _ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        info!(
            "Track '{}' started in guild {}",
            self.metadata.title, self.guild_id
        );

        match self.announce().await {
            Ok(message_id) => {
                let finished = self.now_playing.lock().await.sent(message_id);
                if let Some(message_id) = finished {
                    debug!("Track ended while announcing in guild {}", self.guild_id);
                    strip_controls(&self.http, self.channel_id, message_id).await;
                }
            }
            Err(e) => error!(
                "Failed to send now playing message in guild {}: {}",
                self.guild_id, e
            ),
        }
        None
    }
}

impl TrackStartNotifier {
    async fn announce(&self) -> Result<MessageId, Error> {
        let requester = self.metadata.requested_by.as_deref().unwrap_or("Unknown");

        let card = match self.metadata.thumbnail.as_deref() {
            Some(thumbnail) => {
                self.renderer
                    .render_attachment(&self.metadata.title, requester, thumbnail)
                    .await
            }
            None => {
                warn!("Track '{}' has no thumbnail", self.metadata.title);
                None
            }
        };

        let message =
            CreateMessage::new().components(button_controls::create_music_control_buttons());
        // Without a card the message still goes out, as a plain embed
        let message = match card {
            Some(attachment) => message.add_file(attachment),
            None => message.embed(embedded_messages::now_playing(&self.metadata)),
        };

        let sent = self.channel_id.send_message(&self.http, message).await?;
        Ok(sent.id)
    }
}

/// Event handler for when a track ends: strips the controls from its now-playing message
pub struct TrackEndNotifier {
    pub http: Arc<Http>,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub now_playing: NowPlayingSlot,
}

#[async_trait]
impl songbird::EventHandler for TrackEndNotifier {
    async fn act(&self, _ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        info!("Track ended for guild {}", self.guild_id);

        let sent = self.now_playing.lock().await.ended();
        if let Some(message_id) = sent {
            strip_controls(&self.http, self.channel_id, message_id).await;
        }
        None
    }
}
