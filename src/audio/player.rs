use anyhow::Result;
use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use songbird::{
    tracks::{PlayMode, TrackHandle},
    Songbird,
};
use std::sync::Arc;
use tracing::{debug, info};

use super::{
    transcode,
    voice::{PlaybackControl, PlaybackState, VoiceGateway},
};

/// Pista de songbird vista como [`PlaybackControl`]
pub struct SongbirdTrack {
    handle: TrackHandle,
}

impl SongbirdTrack {
    pub fn new(handle: TrackHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl PlaybackControl for SongbirdTrack {
    fn pause(&self) -> Result<()> {
        self.handle
            .pause()
            .map_err(|e| anyhow::anyhow!("Error al pausar: {}", e))?;
        info!("⏸️ Reproducción pausada");
        Ok(())
    }

    fn resume(&self) -> Result<()> {
        self.handle
            .play()
            .map_err(|e| anyhow::anyhow!("Error al reanudar: {}", e))?;
        info!("▶️ Reproducción reanudada");
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.handle
            .stop()
            .map_err(|e| anyhow::anyhow!("Error al detener: {}", e))?;
        Ok(())
    }

    fn set_volume(&self, volume: f32) -> Result<()> {
        self.handle
            .set_volume(volume)
            .map_err(|e| anyhow::anyhow!("Error al ajustar volumen: {}", e))?;
        info!("🔊 Volumen ajustado a {}%", (volume * 100.0).round() as u32);
        Ok(())
    }

    async fn state(&self) -> PlaybackState {
        match self.handle.get_info().await {
            Ok(info) => match info.playing {
                PlayMode::Play => PlaybackState::Playing,
                PlayMode::Pause => PlaybackState::Paused,
                _ => PlaybackState::Stopped,
            },
            // La pista ya terminó y su driver la soltó
            Err(_) => PlaybackState::Stopped,
        }
    }
}

/// Backend de voz sobre el manager de songbird
pub struct SongbirdGateway {
    manager: Arc<Songbird>,
    ffmpeg: String,
}

impl SongbirdGateway {
    pub fn new(manager: Arc<Songbird>, ffmpeg: impl Into<String>) -> Self {
        Self {
            manager,
            ffmpeg: ffmpeg.into(),
        }
    }
}

#[async_trait]
impl VoiceGateway for SongbirdGateway {
    async fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        let call = self.manager.get(guild_id)?;
        let call = call.lock().await;
        call.current_channel().map(|channel| ChannelId::from(channel.0))
    }

    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<()> {
        self.manager
            .join(guild_id, channel_id)
            .await
            .map_err(|e| anyhow::anyhow!("Error al conectar al canal de voz: {:?}", e))?;

        info!("🔊 Conectado al canal de voz en guild {}", guild_id);
        Ok(())
    }

    async fn leave(&self, guild_id: GuildId) -> Result<()> {
        self.manager
            .leave(guild_id)
            .await
            .map_err(|e| anyhow::anyhow!("Error al salir del canal de voz: {:?}", e))?;
        info!("👋 Desconectado del canal de voz en guild {}", guild_id);
        Ok(())
    }

    async fn cleanup(&self, guild_id: GuildId) -> Result<()> {
        self.manager
            .remove(guild_id)
            .await
            .map_err(|e| anyhow::anyhow!("Error al eliminar la call: {:?}", e))?;
        debug!("🧹 Call eliminada para guild {}", guild_id);
        Ok(())
    }

    async fn play(
        &self,
        guild_id: GuildId,
        stream_url: &str,
        volume: f32,
    ) -> Result<Arc<dyn PlaybackControl>> {
        let call = self
            .manager
            .get(guild_id)
            .ok_or_else(|| anyhow::anyhow!("Sin conexión de voz en guild {}", guild_id))?;

        let input = transcode::spawn(&self.ffmpeg, stream_url)?;

        let handle = {
            let mut call = call.lock().await;
            call.stop();
            info!("Stopping song that is playing currently.");
            call.play_input(input)
        };
        handle
            .set_volume(volume)
            .map_err(|e| anyhow::anyhow!("Error al ajustar volumen: {}", e))?;

        Ok(Arc::new(SongbirdTrack::new(handle)))
    }
}
