//! # Audio Module
//!
//! Everything between a resolved stream URL and sound in a voice channel.
//!
//! ### [`voice`] - Voice sessions
//! - [`voice::VoiceGateway`] abstracts the voice platform (join, leave, play)
//! - [`voice::VoiceSession`] implements connect/switch and best-effort cleanup
//!
//! ### [`store`] - Active sources
//! - One [`store::AudioSource`] per voice channel, replaced on every `play`
//!
//! ### [`player`] - Songbird backend
//! - [`player::SongbirdGateway`] drives songbird calls and tracks
//!
//! ### [`transcode`] - ffmpeg
//! - Spawns the transcoder whose stdout feeds the voice driver

pub mod player;
pub mod store;
pub mod transcode;
pub mod voice;
