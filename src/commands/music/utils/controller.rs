//! Routes chat commands and button presses to the player manager.
//!
//! Each operation checks the player's state first and returns a user-facing
//! [`MusicError`] without touching the player when the guard trips. The
//! outcome is a [`Notice`] that the chat layer renders.

use poise::serenity_prelude::{ChannelId, GuildId};

use super::button_controls::Control;
use super::music_manager::{MusicError, MusicResult, PlayerManager};

/// What a successful command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Queued { title: String },
    Stopped,
    Paused,
    Resumed,
    Skipped,
    Loop { enabled: bool },
}

/// Everything `play` needs from the invoking message
#[derive(Debug, Clone, Copy)]
pub struct PlayRequest<'a> {
    pub guild_id: GuildId,
    /// The requester's current voice channel, if any
    pub voice_channel: Option<ChannelId>,
    pub text_channel: ChannelId,
    pub requester: &'a str,
    pub query: Option<&'a str>,
}

/// Join the requester's channel unless already connected, search, and queue the first match.
pub async fn play<P: PlayerManager + ?Sized>(
    players: &P,
    request: PlayRequest<'_>,
) -> MusicResult<Notice> {
    let query = request
        .query
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .ok_or(MusicError::MissingQuery)?;
    let voice_channel = request
        .voice_channel
        .ok_or(MusicError::UserNotInVoiceChannel)?;

    if !players.is_connected(request.guild_id).await {
        players
            .connect(request.guild_id, voice_channel, request.text_channel)
            .await?;
    }

    let track = players
        .search(query, request.requester)
        .await?
        .ok_or(MusicError::NoResults)?;
    let title = track.title.clone();

    players.enqueue(request.guild_id, track).await?;
    Ok(Notice::Queued { title })
}

pub async fn stop<P: PlayerManager + ?Sized>(players: &P, guild_id: GuildId) -> MusicResult<Notice> {
    players
        .status(guild_id)
        .await
        .ok_or(MusicError::NothingPlaying)?;

    players.destroy(guild_id).await?;
    Ok(Notice::Stopped)
}

pub async fn pause<P: PlayerManager + ?Sized>(players: &P, guild_id: GuildId) -> MusicResult<Notice> {
    match players.status(guild_id).await {
        Some(status) if !status.paused => {
            players.set_paused(guild_id, true).await?;
            Ok(Notice::Paused)
        }
        _ => Err(MusicError::NoMusicPlaying),
    }
}

pub async fn resume<P: PlayerManager + ?Sized>(players: &P, guild_id: GuildId) -> MusicResult<Notice> {
    match players.status(guild_id).await {
        Some(status) if status.paused => {
            players.set_paused(guild_id, false).await?;
            Ok(Notice::Resumed)
        }
        _ => Err(MusicError::AlreadyPlaying),
    }
}

pub async fn next<P: PlayerManager + ?Sized>(players: &P, guild_id: GuildId) -> MusicResult<Notice> {
    match players.status(guild_id).await {
        Some(status) if status.has_current => {
            players.skip(guild_id).await?;
            Ok(Notice::Skipped)
        }
        _ => Err(MusicError::NothingToSkip),
    }
}

pub async fn toggle_loop<P: PlayerManager + ?Sized>(
    players: &P,
    guild_id: GuildId,
) -> MusicResult<Notice> {
    let status = players
        .status(guild_id)
        .await
        .ok_or(MusicError::NoMusicPlaying)?;

    let enabled = !status.looping;
    players.set_track_repeat(guild_id, enabled).await?;
    Ok(Notice::Loop { enabled })
}

/// Button presses only require a player to exist; they skip the per-command state checks.
pub async fn press<P: PlayerManager + ?Sized>(
    players: &P,
    guild_id: GuildId,
    control: Control,
) -> MusicResult<Notice> {
    let status = players
        .status(guild_id)
        .await
        .ok_or(MusicError::NoMusicPlaying)?;

    match control {
        Control::Skip => {
            players.skip(guild_id).await?;
            Ok(Notice::Skipped)
        }
        Control::Pause => {
            players.set_paused(guild_id, true).await?;
            Ok(Notice::Paused)
        }
        Control::Resume => {
            players.set_paused(guild_id, false).await?;
            Ok(Notice::Resumed)
        }
        Control::Loop => {
            let enabled = !status.looping;
            players.set_track_repeat(guild_id, enabled).await?;
            Ok(Notice::Loop { enabled })
        }
        Control::Stop => {
            players.destroy(guild_id).await?;
            Ok(Notice::Stopped)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::music::utils::music_manager::{MockPlayerManager, PlayerStatus};
    use crate::commands::music::utils::track_metadata::TrackMetadata;
    use assert_matches::assert_matches;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn guild() -> GuildId {
        GuildId::new(4242)
    }

    fn playing() -> PlayerStatus {
        PlayerStatus {
            paused: false,
            has_current: true,
            looping: false,
        }
    }

    fn paused() -> PlayerStatus {
        PlayerStatus {
            paused: true,
            ..playing()
        }
    }

    fn request<'a>(query: Option<&'a str>, voice: Option<ChannelId>) -> PlayRequest<'a> {
        PlayRequest {
            guild_id: guild(),
            voice_channel: voice,
            text_channel: ChannelId::new(2),
            requester: "alice",
            query,
        }
    }

    fn with_status(status: Option<PlayerStatus>) -> MockPlayerManager {
        let mut players = MockPlayerManager::new();
        players
            .expect_status()
            .with(eq(guild()))
            .returning(move |_| status);
        players
    }

    /// Tests that stop without a player reports the error and never destroys anything.
    #[tokio::test]
    async fn test_stop_without_player() {
        let mut players = with_status(None);
        players.expect_destroy().never();

        assert_eq!(stop(&players, guild()).await, Err(MusicError::NothingPlaying));
    }

    #[tokio::test]
    async fn test_stop_destroys_player() {
        let mut players = with_status(Some(playing()));
        players
            .expect_destroy()
            .with(eq(guild()))
            .times(1)
            .returning(|_| Ok(()));

        assert_eq!(stop(&players, guild()).await, Ok(Notice::Stopped));
    }

    #[rstest]
    #[case::no_player(None)]
    #[case::already_paused(Some(paused()))]
    #[tokio::test]
    async fn test_pause_guard(#[case] status: Option<PlayerStatus>) {
        let mut players = with_status(status);
        players.expect_set_paused().never();

        assert_eq!(pause(&players, guild()).await, Err(MusicError::NoMusicPlaying));
    }

    #[tokio::test]
    async fn test_pause_playing_track() {
        let mut players = with_status(Some(playing()));
        players
            .expect_set_paused()
            .with(eq(guild()), eq(true))
            .times(1)
            .returning(|_, _| Ok(()));

        assert_eq!(pause(&players, guild()).await, Ok(Notice::Paused));
    }

    #[rstest]
    #[case::no_player(None)]
    #[case::not_paused(Some(playing()))]
    #[tokio::test]
    async fn test_resume_guard(#[case] status: Option<PlayerStatus>) {
        let mut players = with_status(status);
        players.expect_set_paused().never();

        assert_eq!(resume(&players, guild()).await, Err(MusicError::AlreadyPlaying));
    }

    #[tokio::test]
    async fn test_resume_paused_track() {
        let mut players = with_status(Some(paused()));
        players
            .expect_set_paused()
            .with(eq(guild()), eq(false))
            .times(1)
            .returning(|_, _| Ok(()));

        assert_eq!(resume(&players, guild()).await, Ok(Notice::Resumed));
    }

    #[rstest]
    #[case::no_player(None)]
    #[case::idle_player(Some(PlayerStatus::default()))]
    #[tokio::test]
    async fn test_next_guard(#[case] status: Option<PlayerStatus>) {
        let mut players = with_status(status);
        players.expect_skip().never();

        assert_eq!(next(&players, guild()).await, Err(MusicError::NothingToSkip));
    }

    #[tokio::test]
    async fn test_next_skips() {
        let mut players = with_status(Some(playing()));
        players
            .expect_skip()
            .with(eq(guild()))
            .times(1)
            .returning(|_| Ok(()));

        assert_eq!(next(&players, guild()).await, Ok(Notice::Skipped));
    }

    #[tokio::test]
    async fn test_loop_without_player() {
        let mut players = with_status(None);
        players.expect_set_track_repeat().never();

        assert_eq!(
            toggle_loop(&players, guild()).await,
            Err(MusicError::NoMusicPlaying)
        );
    }

    #[rstest]
    #[case::enable(false, true)]
    #[case::disable(true, false)]
    #[tokio::test]
    async fn test_loop_toggles(#[case] looping: bool, #[case] expected: bool) {
        let mut players = with_status(Some(PlayerStatus {
            looping,
            ..playing()
        }));
        players
            .expect_set_track_repeat()
            .with(eq(guild()), eq(expected))
            .times(1)
            .returning(|_, _| Ok(()));

        assert_eq!(
            toggle_loop(&players, guild()).await,
            Ok(Notice::Loop { enabled: expected })
        );
    }

    #[rstest]
    #[case::missing(None)]
    #[case::empty(Some(""))]
    #[case::whitespace(Some("   "))]
    #[tokio::test]
    async fn test_play_requires_query(#[case] query: Option<&'static str>) {
        let mut players = MockPlayerManager::new();
        players.expect_connect().never();
        players.expect_search().never();

        let result = play(&players, request(query, Some(ChannelId::new(9)))).await;
        assert_eq!(result, Err(MusicError::MissingQuery));
    }

    #[tokio::test]
    async fn test_play_requires_voice_channel() {
        let mut players = MockPlayerManager::new();
        players.expect_connect().never();

        let result = play(&players, request(Some("song"), None)).await;
        assert_eq!(result, Err(MusicError::UserNotInVoiceChannel));
    }

    fn disconnected() -> MockPlayerManager {
        let mut players = MockPlayerManager::new();
        players.expect_is_connected().returning(|_| false);
        players
    }

    #[tokio::test]
    async fn test_play_no_results() {
        let mut players = disconnected();
        players.expect_connect().times(1).returning(|_, _, _| Ok(()));
        players.expect_search().times(1).returning(|_, _| Ok(None));
        players.expect_enqueue().never();

        let result = play(&players, request(Some("nothing matches"), Some(ChannelId::new(9)))).await;
        assert_eq!(result, Err(MusicError::NoResults));
    }

    #[tokio::test]
    async fn test_play_join_failure_stops_early() {
        let mut players = disconnected();
        players
            .expect_connect()
            .times(1)
            .returning(|_, _, _| Err(MusicError::JoinError("timed out".to_string())));
        players.expect_search().never();

        let result = play(&players, request(Some("song"), Some(ChannelId::new(9)))).await;
        assert_matches!(result, Err(MusicError::JoinError(_)));
    }

    /// Tests the happy path: connect, search with the trimmed query, enqueue the match.
    #[tokio::test]
    async fn test_play_queues_first_match() {
        let mut players = disconnected();
        players
            .expect_connect()
            .with(eq(guild()), eq(ChannelId::new(9)), eq(ChannelId::new(2)))
            .times(1)
            .returning(|_, _, _| Ok(()));
        players
            .expect_search()
            .withf(|query, requester| query == "never gonna" && requester == "alice")
            .times(1)
            .returning(|_, requester| {
                Ok(Some(TrackMetadata {
                    title: "Never Gonna Give You Up".to_string(),
                    url: Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()),
                    requested_by: Some(requester.to_string()),
                    ..Default::default()
                }))
            });
        players
            .expect_enqueue()
            .withf(|guild_id, track| *guild_id == guild() && track.title == "Never Gonna Give You Up")
            .times(1)
            .returning(|_, _| Ok(()));

        let result = play(&players, request(Some("  never gonna "), Some(ChannelId::new(9)))).await;
        assert_eq!(
            result,
            Ok(Notice::Queued {
                title: "Never Gonna Give You Up".to_string()
            })
        );
    }

    /// Tests that a live connection is reused instead of joining again.
    #[tokio::test]
    async fn test_play_reuses_live_connection() {
        let mut players = MockPlayerManager::new();
        players
            .expect_is_connected()
            .with(eq(guild()))
            .times(1)
            .returning(|_| true);
        players.expect_connect().never();
        players.expect_search().times(1).returning(|_, _| {
            Ok(Some(TrackMetadata {
                title: "Song".to_string(),
                ..Default::default()
            }))
        });
        players.expect_enqueue().times(1).returning(|_, _| Ok(()));

        let result = play(&players, request(Some("song"), Some(ChannelId::new(9)))).await;
        assert_eq!(
            result,
            Ok(Notice::Queued {
                title: "Song".to_string()
            })
        );
    }

    /// Tests that a player which lost its voice connection joins again before queueing.
    #[tokio::test]
    async fn test_play_rejoins_lost_connection() {
        let mut players = with_status(Some(playing()));
        players.expect_is_connected().times(1).returning(|_| false);
        players
            .expect_connect()
            .with(eq(guild()), eq(ChannelId::new(9)), eq(ChannelId::new(2)))
            .times(1)
            .returning(|_, _, _| Ok(()));
        players.expect_search().times(1).returning(|_, _| {
            Ok(Some(TrackMetadata {
                title: "Song".to_string(),
                ..Default::default()
            }))
        });
        players.expect_enqueue().times(1).returning(|_, _| Ok(()));

        let result = play(&players, request(Some("song"), Some(ChannelId::new(9)))).await;
        assert!(result.is_ok());
    }

    #[rstest]
    #[case(Control::Skip)]
    #[case(Control::Pause)]
    #[case(Control::Resume)]
    #[case(Control::Loop)]
    #[case(Control::Stop)]
    #[tokio::test]
    async fn test_press_without_player(#[case] control: Control) {
        let mut players = with_status(None);
        players.expect_skip().never();
        players.expect_set_paused().never();
        players.expect_set_track_repeat().never();
        players.expect_destroy().never();

        assert_eq!(
            press(&players, guild(), control).await,
            Err(MusicError::NoMusicPlaying)
        );
    }

    #[tokio::test]
    async fn test_press_skip() {
        let mut players = with_status(Some(playing()));
        players.expect_skip().times(1).returning(|_| Ok(()));

        assert_eq!(press(&players, guild(), Control::Skip).await, Ok(Notice::Skipped));
    }

    /// Tests that the pause button does not check whether the track is already paused.
    #[tokio::test]
    async fn test_press_pause_while_paused() {
        let mut players = with_status(Some(paused()));
        players
            .expect_set_paused()
            .with(eq(guild()), eq(true))
            .times(1)
            .returning(|_, _| Ok(()));

        assert_eq!(press(&players, guild(), Control::Pause).await, Ok(Notice::Paused));
    }

    #[tokio::test]
    async fn test_press_resume() {
        let mut players = with_status(Some(paused()));
        players
            .expect_set_paused()
            .with(eq(guild()), eq(false))
            .times(1)
            .returning(|_, _| Ok(()));

        assert_eq!(press(&players, guild(), Control::Resume).await, Ok(Notice::Resumed));
    }

    #[tokio::test]
    async fn test_press_loop() {
        let mut players = with_status(Some(PlayerStatus {
            looping: true,
            ..playing()
        }));
        players
            .expect_set_track_repeat()
            .with(eq(guild()), eq(false))
            .times(1)
            .returning(|_, _| Ok(()));

        assert_eq!(
            press(&players, guild(), Control::Loop).await,
            Ok(Notice::Loop { enabled: false })
        );
    }

    #[tokio::test]
    async fn test_press_stop() {
        let mut players = with_status(Some(PlayerStatus::default()));
        players.expect_destroy().times(1).returning(|_| Ok(()));

        assert_eq!(press(&players, guild(), Control::Stop).await, Ok(Notice::Stopped));
    }

    #[tokio::test]
    async fn test_backend_error_is_passed_through() {
        let mut players = with_status(Some(playing()));
        players
            .expect_skip()
            .returning(|_| Err(MusicError::ControlError("track finished".to_string())));

        assert_matches!(
            press(&players, guild(), Control::Skip).await,
            Err(MusicError::ControlError(_))
        );
    }
}
