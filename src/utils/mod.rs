//! This module aggregates various utility submodules used throughout the application.

/// Rendering of the "now playing" image card.
pub mod music_card;
