use anyhow::Result;
use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;
use tracing::{debug, info};

/// Estado de reproducción de una fuente
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
}

/// Control sobre una pista que ya está sonando
#[async_trait]
pub trait PlaybackControl: Send + Sync {
    fn pause(&self) -> Result<()>;

    fn resume(&self) -> Result<()>;

    fn stop(&self) -> Result<()>;

    /// Sets the linear volume multiplier of the track.
    fn set_volume(&self, volume: f32) -> Result<()>;

    async fn state(&self) -> PlaybackState;
}

/// Voice platform operations the bot needs, one connection per guild.
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    /// Channel the bot is currently connected to in `guild_id`, if any.
    async fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId>;

    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<()>;

    /// Disconnects from voice, keeping the call object around.
    async fn leave(&self, guild_id: GuildId) -> Result<()>;

    /// Drops the call object and its driver.
    async fn cleanup(&self, guild_id: GuildId) -> Result<()>;

    /// Replaces whatever the guild's call is playing with `stream_url` at
    /// `volume` and returns the new track's control handle.
    ///
    /// Stopping the old tracks and starting the new one happen under a single
    /// lock of the call.
    async fn play(
        &self,
        guild_id: GuildId,
        stream_url: &str,
        volume: f32,
    ) -> Result<Arc<dyn PlaybackControl>>;
}

/// Conexión del bot a los canales de voz
#[derive(Clone)]
pub struct VoiceSession {
    gateway: Arc<dyn VoiceGateway>,
}

impl VoiceSession {
    pub fn new(gateway: Arc<dyn VoiceGateway>) -> Self {
        Self { gateway }
    }

    pub async fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.gateway.current_channel(guild_id).await
    }

    pub async fn is_connected(&self, guild_id: GuildId) -> bool {
        self.current_channel(guild_id).await.is_some()
    }

    /// Ensures the bot sits in `requested` within `guild_id`.
    ///
    /// Connected elsewhere in the guild means a full disconnect first, then a
    /// join of the requested channel. Already there is a no-op.
    pub async fn connect_or_switch(&self, guild_id: GuildId, requested: ChannelId) -> Result<()> {
        match self.current_channel(guild_id).await {
            Some(current) if current == requested => Ok(()),
            Some(current) => {
                info!("🔀 Cambiando de canal {} a {} en guild {}", current, requested, guild_id);
                self.disconnect_and_cleanup(guild_id).await;
                self.connect(guild_id, requested).await
            }
            None => self.connect(guild_id, requested).await,
        }
    }

    async fn connect(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<()> {
        info!("🔊 Conectando al canal {} en guild {}", channel_id, guild_id);
        self.gateway.join(guild_id, channel_id).await
    }

    /// Best-effort disconnect followed by best-effort cleanup. Never fails.
    pub async fn disconnect_and_cleanup(&self, guild_id: GuildId) {
        debug!("Invoking cleanup");

        if let Err(e) = self.gateway.leave(guild_id).await {
            debug!("disconnect failed: {:?}", e);
        }

        if let Err(e) = self.gateway.cleanup(guild_id).await {
            debug!("cleanup failed: {:?}", e);
        }

        debug!("Finished cleanup");
    }
}
