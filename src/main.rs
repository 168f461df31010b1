use anyhow::Result;
use serenity::{model::gateway::GatewayIntents, Client};
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tracing::{error, info};

mod audio;
mod bot;
mod config;
mod sources;

use crate::audio::player::SongbirdGateway;
use crate::bot::{handlers::MusicPlayer, JukeboxBot};
use crate::config::Config;
use crate::sources::YtDlp;

#[tokio::main]
async fn main() -> Result<()> {
    // Inicializar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jukebox_cog=debug".parse()?)
                .add_directive("serenity=info".parse()?)
                .add_directive("songbird=info".parse()?),
        )
        .init();

    info!("🎵 Starting bot v{}", env!("CARGO_PKG_VERSION"));

    // Cargar configuración
    let config = Config::load()?;
    info!("{}", config.summary());

    if std::env::args().any(|arg| arg == "--health-check") {
        return health_check(&config).await;
    }

    // Intents: mensajes con contenido para los comandos, estados de voz para
    // saber en qué canal está quien invoca
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let songbird = Songbird::serenity();
    let gateway = Arc::new(SongbirdGateway::new(songbird.clone(), config.ffmpeg_path.clone()));
    let extractor = Arc::new(YtDlp::new(config.ytdlp_path.clone()));
    let player = Arc::new(MusicPlayer::new(&config, gateway, extractor));

    let handler = JukeboxBot::new(config.clone(), player);

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .register_songbird_with(songbird)
        .await?;

    // Manejar shutdown graceful
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("⚠️ Señal de shutdown recibida, cerrando...");
                shard_manager.shutdown_all().await;
            }
            Err(e) => error!("Error al registrar Ctrl+C: {:?}", e),
        }
    });

    info!("🚀 Bot iniciado exitosamente");
    if let Err(why) = client.start().await {
        error!("Error al ejecutar cliente: {:?}", why);
    }

    Ok(())
}

async fn health_check(config: &Config) -> Result<()> {
    // Verificar dependencias críticas
    YtDlp::new(config.ytdlp_path.clone()).verify().await?;

    let ffmpeg = async_process::Command::new(&config.ffmpeg_path)
        .arg("-version")
        .output()
        .await?;

    if ffmpeg.status.success() {
        println!("OK");
        Ok(())
    } else {
        anyhow::bail!("Dependencias faltantes: {}", config.ffmpeg_path);
    }
}
