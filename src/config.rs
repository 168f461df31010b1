use anyhow::Result;
use std::time::Duration;
use thiserror::Error;

/// Errores de configuración que impiden arrancar el bot.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    // Discord
    pub discord_token: String,
    pub command_prefix: String,

    // Audio
    pub default_volume: f32,

    // Herramientas externas
    pub ytdlp_path: String,
    pub ffmpeg_path: String,

    // Mensajes efímeros
    pub reply_ttl: Duration,
    pub debug_reply_ttl: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Validate configuration before returning
        config.validate()?;

        Ok(config)
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// `load` feeds it the process environment; tests feed it a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let discord_token = lookup("DISCORD_BOT_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("DISCORD_BOT_TOKEN"))?;

        let default_volume = match lookup("DEFAULT_VOLUME") {
            Some(raw) => raw.trim().parse().map_err(|e: std::num::ParseFloatError| {
                ConfigError::Invalid {
                    key: "DEFAULT_VOLUME",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => defaults.default_volume,
        };

        Ok(Self {
            discord_token,
            command_prefix: lookup("COMMAND_PREFIX").unwrap_or(defaults.command_prefix),
            default_volume,
            ytdlp_path: lookup("YTDLP_PATH").unwrap_or(defaults.ytdlp_path),
            ffmpeg_path: lookup("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            reply_ttl: parse_ttl("REPLY_TTL", lookup("REPLY_TTL"), defaults.reply_ttl)?,
            debug_reply_ttl: parse_ttl(
                "DEBUG_REPLY_TTL",
                lookup("DEBUG_REPLY_TTL"),
                defaults.debug_reply_ttl,
            )?,
        })
    }

    /// Validates configuration values for correctness.
    ///
    /// # Validation Rules
    ///
    /// - Default volume must be within `0.01..=1.0`, the range accepted by `!volume`
    /// - The command prefix must not be empty or contain whitespace
    /// - Tool paths must not be empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.01..=1.0).contains(&self.default_volume) {
            return Err(ConfigError::Invalid {
                key: "DEFAULT_VOLUME",
                value: self.default_volume.to_string(),
                reason: "must be between 0.01 and 1.0".to_string(),
            });
        }

        if self.command_prefix.is_empty() || self.command_prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                key: "COMMAND_PREFIX",
                value: self.command_prefix.clone(),
                reason: "must be non-empty and contain no whitespace".to_string(),
            });
        }

        if self.ytdlp_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "YTDLP_PATH",
                value: self.ytdlp_path.clone(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.ffmpeg_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "FFMPEG_PATH",
                value: self.ffmpeg_path.clone(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Returns a summary of the current configuration for logging.
    ///
    /// The Discord token is never included.
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            Commands: prefix {:?}\n  \
            Audio: {}% default volume\n  \
            Tools: yt-dlp={}, ffmpeg={}\n  \
            Replies: {} ttl, {} debug ttl",
            self.command_prefix,
            (self.default_volume * 100.0).round() as u32,
            self.ytdlp_path,
            self.ffmpeg_path,
            humantime::format_duration(self.reply_ttl),
            humantime::format_duration(self.debug_reply_ttl),
        )
    }
}

fn parse_ttl(key: &'static str, raw: Option<String>, fallback: Duration) -> Result<Duration, ConfigError> {
    match raw {
        Some(raw) => humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(fallback),
    }
}

/// Default configuration values.
///
/// Used as fallbacks when environment variables are not provided.
impl Default for Config {
    fn default() -> Self {
        Self {
            // Discord (el token no tiene valor por defecto)
            discord_token: String::new(),
            command_prefix: "!".to_string(),

            // Volumen moderado para no saturar el canal
            default_volume: 0.5,

            ytdlp_path: "yt-dlp".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),

            reply_ttl: Duration::from_secs(5),
            debug_reply_ttl: Duration::from_secs(3),
        }
    }
}
