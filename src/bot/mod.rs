//! # Bot Module
//!
//! Discord-facing side of the bot:
//! - [`commands`]: parsing of prefixed chat messages
//! - [`handlers`]: execution of each command against voice and store
//!
//! [`JukeboxBot`] implements Serenity's [`EventHandler`]. Every incoming
//! message is parsed, executed by the shared [`MusicPlayer`], and the reply (if
//! any) is posted and deleted again after its time-to-live.

use anyhow::Result;
use serenity::{
    all::{ChannelId, Context, EventHandler, GuildId, Message, Ready, UserId},
    async_trait,
};
use std::sync::Arc;
use tracing::{debug, error, info};

pub mod commands;
pub mod handlers;

use crate::config::Config;
use commands::Command;
use handlers::{Invocation, MusicPlayer, Reply};

/// Main Discord event handler.
pub struct JukeboxBot {
    config: Arc<Config>,
    player: Arc<MusicPlayer>,
}

impl JukeboxBot {
    pub fn new(config: Config, player: Arc<MusicPlayer>) -> Self {
        Self {
            config: Arc::new(config),
            player,
        }
    }
}

#[async_trait]
impl EventHandler for JukeboxBot {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🤖 {} está en línea!", ready.user.name);
        info!("📊 Conectado a {} servidores", ready.guilds.len());
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(command) = Command::parse(&msg.content, &self.config.command_prefix) else {
            return;
        };
        // Sólo en servidores: los DMs no tienen canales de voz
        let Some(guild_id) = msg.guild_id else {
            return;
        };

        let invocation = Invocation {
            guild_id,
            author: msg.author.name.clone(),
            voice_channel: user_voice_channel(&ctx, guild_id, msg.author.id),
        };

        match self.player.execute(&invocation, &command).await {
            Ok(Some(reply)) => {
                if let Err(e) = send_reply(&ctx, msg.channel_id, reply).await {
                    error!("Error enviando respuesta: {:?}", e);
                }
            }
            Ok(None) => {}
            Err(e) => {
                error!("Error manejando comando {}: {:?}", command.name(), e);
            }
        }
    }
}

/// Canal de voz en el que está el usuario, según la caché
fn user_voice_channel(ctx: &Context, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
    let guild = guild_id.to_guild_cached(&ctx.cache)?;
    guild
        .voice_states
        .get(&user_id)
        .and_then(|voice_state| voice_state.channel_id)
}

/// Publica la respuesta y programa su borrado
async fn send_reply(ctx: &Context, channel_id: ChannelId, reply: Reply) -> Result<()> {
    let sent = channel_id.say(&ctx.http, &reply.content).await?;

    let http = ctx.http.clone();
    tokio::spawn(async move {
        tokio::time::sleep(reply.ttl).await;
        if let Err(e) = http.delete_message(sent.channel_id, sent.id, None).await {
            debug!("No se pudo borrar la respuesta {}: {:?}", sent.id, e);
        }
    });

    Ok(())
}
