use anyhow::{Context, Result};
use songbird::input::{ChildContainer, Input};
use std::process::{Command, Stdio};
use tracing::debug;

/// Opciones previas a `-i`: reconexión automática del stream HTTP
pub const BEFORE_OPTIONS: &[&str] = &[
    "-nostdin",
    "-reconnect",
    "1",
    "-reconnect_streamed",
    "1",
    "-reconnect_delay_max",
    "5",
];

/// Opciones de salida: sin video
pub const OPTIONS: &[&str] = &["-vn"];

/// Full ffmpeg argument list: read `stream_url`, write 48 kHz stereo WAV to stdout.
pub fn ffmpeg_args(stream_url: &str) -> Vec<String> {
    let mut args: Vec<String> = BEFORE_OPTIONS.iter().map(|arg| arg.to_string()).collect();
    args.extend(["-i".to_string(), stream_url.to_string()]);
    args.extend(OPTIONS.iter().map(|arg| arg.to_string()));
    args.extend(
        [
            "-loglevel", "error", "-f", "wav", "-acodec", "pcm_s16le", "-ac", "2", "-ar", "48000",
            "pipe:1",
        ]
        .iter()
        .map(|arg| arg.to_string()),
    );
    args
}

/// Lanza ffmpeg y envuelve su stdout como input de songbird
pub fn spawn(ffmpeg: &str, stream_url: &str) -> Result<Input> {
    debug!("🎛️ Lanzando {} para stream", ffmpeg);

    let child = Command::new(ffmpeg)
        .args(ffmpeg_args(stream_url))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("no se pudo lanzar {ffmpeg}"))?;

    Ok(ChildContainer::from(child).into())
}
