use anyhow::Result;
use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    audio::{
        store::{AudioSource, PlayerStore},
        voice::{PlaybackControl, PlaybackState, VoiceGateway, VoiceSession},
    },
    bot::commands::{help_text, Command},
    config::Config,
    sources::{MediaExtractor, Resolver},
};

/// Quién invocó un comando y desde dónde
#[derive(Debug, Clone)]
pub struct Invocation {
    pub guild_id: GuildId,
    /// Display name used in replies.
    pub author: String,
    /// Voice channel the author sits in, if any.
    pub voice_channel: Option<ChannelId>,
}

/// Respuesta de texto que se borra pasado `ttl`
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub content: String,
    pub ttl: Duration,
}

/// Ejecuta los comandos de música contra la sesión de voz y el store
pub struct MusicPlayer {
    store: PlayerStore,
    session: VoiceSession,
    gateway: Arc<dyn VoiceGateway>,
    resolver: Resolver,
    /// Serializa el reemplazo de pista + escritura en el store por guild
    play_locks: DashMap<GuildId, Arc<Mutex<()>>>,
    prefix: String,
    default_volume: f32,
    reply_ttl: Duration,
    debug_reply_ttl: Duration,
}

impl MusicPlayer {
    pub fn new(
        config: &Config,
        gateway: Arc<dyn VoiceGateway>,
        extractor: Arc<dyn MediaExtractor>,
    ) -> Self {
        Self {
            store: PlayerStore::new(),
            session: VoiceSession::new(gateway.clone()),
            gateway,
            resolver: Resolver::new(extractor),
            play_locks: DashMap::new(),
            prefix: config.command_prefix.clone(),
            default_volume: config.default_volume,
            reply_ttl: config.reply_ttl,
            debug_reply_ttl: config.debug_reply_ttl,
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &PlayerStore {
        &self.store
    }

    /// Runs `command` for `invocation`, returning the reply to post, if any.
    ///
    /// Resolution and voice errors propagate to the caller.
    pub async fn execute(&self, invocation: &Invocation, command: &Command) -> Result<Option<Reply>> {
        info!(
            "📝 Comando {} usado por {} en guild {}",
            command.name(),
            invocation.author,
            invocation.guild_id
        );

        match command {
            Command::Play(term) => self.play(invocation, term).await,
            Command::Volume(term) => self.volume(invocation, term).await,
            Command::Pause => self.pause(invocation).await,
            Command::Resume => self.resume(invocation).await,
            Command::Stop => {
                self.session.disconnect_and_cleanup(invocation.guild_id).await;
                Ok(None)
            }
            Command::Debug => Ok(Some(self.debug_report(invocation.guild_id).await)),
            Command::Help => Ok(Some(self.reply(help_text(&self.prefix)))),
        }
    }

    async fn play(&self, invocation: &Invocation, term: &str) -> Result<Option<Reply>> {
        let Some(channel_id) = invocation.voice_channel else {
            return Ok(Some(self.not_in_voice(invocation)));
        };
        let guild_id = invocation.guild_id;

        self.session.connect_or_switch(guild_id, channel_id).await?;

        // `play` sin término continúa la canción pausada
        if term.is_empty() {
            if let Some(control) = self.store.control(channel_id) {
                if self.session.is_connected(guild_id).await
                    && control.state().await == PlaybackState::Paused
                {
                    control.resume()?;
                    return Ok(None);
                }
            }

            return Ok(Some(self.reply(format!(
                "**{}**, what do you want me to play dude?",
                invocation.author
            ))));
        }

        let stream_url = self.resolver.resolve(term).await?;

        // La resolución puede tardar; la conexión pudo caerse entretanto
        if !self.session.is_connected(guild_id).await {
            self.session.connect_or_switch(guild_id, channel_id).await?;
        }

        // Reemplazo de pista y escritura en el store bajo el mismo lock:
        // dos `play` concurrentes no pueden dejar dos pistas sonando
        let lock = self.play_lock(guild_id);
        let _guard = lock.lock().await;

        let control = self
            .gateway
            .play(guild_id, &stream_url, self.default_volume)
            .await?;
        self.store.insert(
            channel_id,
            AudioSource::new(stream_url, self.default_volume, control),
        );

        info!("Playing: {}", term);
        Ok(Some(self.reply(format!("Playing: **{}**", term))))
    }

    fn play_lock(&self, guild_id: GuildId) -> Arc<Mutex<()>> {
        self.play_locks.entry(guild_id).or_default().clone()
    }

    /// Control of the channel's source, unless it is missing or already ended.
    async fn live_control(&self, channel_id: ChannelId) -> Option<Arc<dyn PlaybackControl>> {
        let control = self.store.control(channel_id)?;
        if control.state().await == PlaybackState::Stopped {
            debug!("Pista del canal {} ya terminada", channel_id);
            return None;
        }
        Some(control)
    }

    async fn volume(&self, invocation: &Invocation, term: &str) -> Result<Option<Reply>> {
        let Some(channel_id) = invocation.voice_channel else {
            return Ok(Some(self.not_in_voice(invocation)));
        };
        if self.live_control(channel_id).await.is_none() {
            return Ok(Some(self.not_playing(invocation)));
        }

        let Some(volume) = parse_volume(term) else {
            return Ok(Some(self.reply(format!(
                "**{}**, volume must be between 1 and 100",
                invocation.author
            ))));
        };

        self.store.set_volume(channel_id, f32::from(volume) / 100.0)?;

        Ok(Some(self.reply(format!(
            "**{}**, volume is set to **{}**",
            invocation.author, volume
        ))))
    }

    async fn pause(&self, invocation: &Invocation) -> Result<Option<Reply>> {
        let Some(channel_id) = invocation.voice_channel else {
            return Ok(Some(self.not_in_voice(invocation)));
        };
        match self.live_control(channel_id).await {
            Some(control) => {
                control.pause()?;
                Ok(None)
            }
            None => Ok(Some(self.not_playing(invocation))),
        }
    }

    async fn resume(&self, invocation: &Invocation) -> Result<Option<Reply>> {
        let Some(channel_id) = invocation.voice_channel else {
            return Ok(Some(self.not_in_voice(invocation)));
        };
        match self.live_control(channel_id).await {
            Some(control) => {
                control.resume()?;
                Ok(None)
            }
            None => Ok(Some(self.not_playing(invocation))),
        }
    }

    async fn debug_report(&self, guild_id: GuildId) -> Reply {
        let players = if self.store.is_empty() {
            "no players".to_string()
        } else {
            self.store
                .snapshot()
                .iter()
                .map(|(channel_id, stream_url, volume)| {
                    format!(
                        "{}: volume {} <{}>",
                        channel_id,
                        (volume * 100.0).round() as u32,
                        stream_url
                    )
                })
                .collect::<Vec<_>>()
                .join(", ")
        };

        let current = self.session.current_channel(guild_id).await;
        let playing = match current.and_then(|channel_id| self.store.control(channel_id)) {
            Some(control) => control.state().await == PlaybackState::Playing,
            None => false,
        };

        let content = format!(
            "```\nPlayers: {}\nClient: {}\nisPlaying: {}\n```",
            players,
            if current.is_some() { "connected" } else { "not connected" },
            if playing { "yes" } else { "not playing" },
        );

        Reply {
            content,
            ttl: self.debug_reply_ttl,
        }
    }

    fn reply(&self, content: String) -> Reply {
        Reply {
            content,
            ttl: self.reply_ttl,
        }
    }

    fn not_playing(&self, invocation: &Invocation) -> Reply {
        self.reply(format!(
            "**{}**, music is not playing right now",
            invocation.author
        ))
    }

    fn not_in_voice(&self, invocation: &Invocation) -> Reply {
        self.reply(format!(
            "**{}**, you need to be in a voice channel",
            invocation.author
        ))
    }
}

/// Accepts integers strictly between 1 and 100.
pub fn parse_volume(term: &str) -> Option<u8> {
    let volume: i64 = term.trim().parse().ok()?;
    if 1 < volume && volume < 100 {
        u8::try_from(volume).ok()
    } else {
        None
    }
}
