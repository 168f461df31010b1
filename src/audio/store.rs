use anyhow::Result;
use dashmap::DashMap;
use serenity::model::id::ChannelId;
use std::fmt;
use std::sync::Arc;

use super::voice::PlaybackControl;

pub const MIN_VOLUME: f32 = 0.01;
pub const MAX_VOLUME: f32 = 1.0;

/// Fuente de audio activa: URL de stream, volumen y control de la pista
pub struct AudioSource {
    stream_url: String,
    volume: f32,
    control: Arc<dyn PlaybackControl>,
}

impl AudioSource {
    pub fn new(stream_url: String, volume: f32, control: Arc<dyn PlaybackControl>) -> Self {
        Self {
            stream_url,
            volume: volume.clamp(MIN_VOLUME, MAX_VOLUME),
            control,
        }
    }

    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn control(&self) -> Arc<dyn PlaybackControl> {
        self.control.clone()
    }

    /// Updates the multiplier, clamped to `[MIN_VOLUME, MAX_VOLUME]`, and pushes
    /// it to the playing track.
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        let clamped = volume.clamp(MIN_VOLUME, MAX_VOLUME);
        self.control.set_volume(clamped)?;
        self.volume = clamped;
        Ok(())
    }
}

impl fmt::Debug for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioSource")
            .field("stream_url", &self.stream_url)
            .field("volume", &self.volume)
            .finish()
    }
}

/// Fuentes activas por canal de voz.
///
/// Entries live for the whole process: they are overwritten by the next
/// `play` in the same channel and never removed, not even on disconnect.
#[derive(Default)]
pub struct PlayerStore {
    players: DashMap<ChannelId, AudioSource>,
}

impl PlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `source` for `channel_id`, returning the source it replaced.
    pub fn insert(&self, channel_id: ChannelId, source: AudioSource) -> Option<AudioSource> {
        self.players.insert(channel_id, source)
    }

    #[cfg(test)]
    pub fn contains(&self, channel_id: ChannelId) -> bool {
        self.players.contains_key(&channel_id)
    }

    /// Control de la pista del canal; el guard del mapa no sale de aquí
    pub fn control(&self, channel_id: ChannelId) -> Option<Arc<dyn PlaybackControl>> {
        self.players.get(&channel_id).map(|source| source.control())
    }

    #[cfg(test)]
    pub fn volume(&self, channel_id: ChannelId) -> Option<f32> {
        self.players.get(&channel_id).map(|source| source.volume())
    }

    #[cfg(test)]
    pub fn stream_url(&self, channel_id: ChannelId) -> Option<String> {
        self.players
            .get(&channel_id)
            .map(|source| source.stream_url().to_string())
    }

    /// Returns `Ok(false)` when the channel has no stored source.
    pub fn set_volume(&self, channel_id: ChannelId, volume: f32) -> Result<bool> {
        match self.players.get_mut(&channel_id) {
            Some(mut source) => {
                source.set_volume(volume)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// `(channel, stream url, volume)` per entry, ordered by channel id, for
    /// the debug report.
    pub fn snapshot(&self) -> Vec<(ChannelId, String, f32)> {
        let mut entries: Vec<_> = self
            .players
            .iter()
            .map(|entry| {
                let source = entry.value();
                (*entry.key(), source.stream_url().to_string(), source.volume())
            })
            .collect();
        entries.sort_by_key(|(channel_id, _, _)| *channel_id);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::voice::PlaybackState;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingControl {
        volumes: Mutex<Vec<f32>>,
    }

    #[async_trait]
    impl PlaybackControl for RecordingControl {
        fn pause(&self) -> Result<()> {
            Ok(())
        }
        fn resume(&self) -> Result<()> {
            Ok(())
        }
        fn stop(&self) -> Result<()> {
            Ok(())
        }
        fn set_volume(&self, volume: f32) -> Result<()> {
            self.volumes.lock().push(volume);
            Ok(())
        }
        async fn state(&self) -> PlaybackState {
            PlaybackState::Playing
        }
    }

    fn source(url: &str, control: &Arc<RecordingControl>) -> AudioSource {
        AudioSource::new(url.to_string(), 0.5, control.clone())
    }

    #[test]
    fn test_insert_replaces_only_same_channel() {
        let store = PlayerStore::new();
        let control = Arc::new(RecordingControl::default());
        let first = ChannelId::new(1);
        let second = ChannelId::new(2);

        assert!(store.insert(first, source("https://a", &control)).is_none());
        assert!(store.insert(second, source("https://b", &control)).is_none());

        let replaced = store.insert(first, source("https://c", &control)).unwrap();
        assert_eq!(replaced.stream_url(), "https://a");

        assert_eq!(store.len(), 2);
        assert_eq!(store.stream_url(first).as_deref(), Some("https://c"));
        assert_eq!(store.stream_url(second).as_deref(), Some("https://b"));
    }

    #[test]
    fn test_set_volume_updates_track_and_clamps() {
        let store = PlayerStore::new();
        let control = Arc::new(RecordingControl::default());
        let channel = ChannelId::new(7);
        store.insert(channel, source("https://a", &control));

        assert!(store.set_volume(channel, 0.42).unwrap());
        assert!(store.set_volume(channel, 3.0).unwrap());

        assert_eq!(store.volume(channel), Some(MAX_VOLUME));
        assert_eq!(*control.volumes.lock(), vec![0.42, MAX_VOLUME]);
    }

    #[test]
    fn test_set_volume_without_source() {
        let store = PlayerStore::new();
        assert!(!store.set_volume(ChannelId::new(9), 0.3).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let store = PlayerStore::new();
        let control = Arc::new(RecordingControl::default());
        store.insert(ChannelId::new(30), source("https://c", &control));
        store.insert(ChannelId::new(10), source("https://a", &control));

        assert_eq!(
            store.snapshot(),
            vec![
                (ChannelId::new(10), "https://a".to_string(), 0.5),
                (ChannelId::new(30), "https://c".to_string(), 0.5),
            ]
        );
    }
}
