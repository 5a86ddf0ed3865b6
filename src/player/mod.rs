//! Host playback queries.

pub mod mpris;

pub use mpris::MprisPlayer;
