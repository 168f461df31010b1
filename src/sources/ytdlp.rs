use anyhow::Result;
use async_trait::async_trait;
use std::process::Command;
use tracing::{debug, error, info};

use super::{ExtractedInfo, MediaExtractor, ResolveError};

/// Plantilla de salida; yt-dlp la exige aunque aquí nunca se descargue nada
const OUTPUT_TEMPLATE: &str = "downloads/%(extractor)s-%(id)s-%(title)s.%(ext)s";

/// Cliente que invoca yt-dlp como proceso hijo y parsea su JSON
pub struct YtDlp {
    binary: String,
}

impl YtDlp {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Argumentos fijos de extracción para `target`
    pub fn args(target: &str) -> Vec<String> {
        let mut args: Vec<String> = [
            "--dump-single-json",
            "--format",
            "bestaudio/best",
            "--output",
            OUTPUT_TEMPLATE,
            "--restrict-filenames",
            "--no-playlist",
            "--no-check-certificates",
            "--quiet",
            "--no-warnings",
            "--default-search",
            "auto",
            // IPv6 da problemas con algunos CDNs
            "--source-address",
            "0.0.0.0",
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect();

        // `--` para que una búsqueda que empiece por '-' no se tome como flag
        args.push("--".to_string());
        args.push(target.to_string());
        args
    }

    /// Verifica que yt-dlp esté disponible y devuelve su versión
    pub async fn verify(&self) -> Result<String> {
        let output = async_process::Command::new(&self.binary)
            .arg("--version")
            .output()
            .await?;

        if !output.status.success() {
            error!("❌ yt-dlp no disponible en {}", self.binary);
            anyhow::bail!("yt-dlp no disponible");
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!("✅ yt-dlp versión: {}", version);
        Ok(version)
    }
}

/// Parsea el JSON impreso por `--dump-single-json`
pub fn parse_output(target: &str, stdout: &[u8]) -> Result<ExtractedInfo, ResolveError> {
    serde_json::from_slice(stdout).map_err(|e| ResolveError::Extraction {
        target: target.to_string(),
        message: format!("invalid yt-dlp output: {e}"),
    })
}

/// Ejecución bloqueante; sólo se llama desde el pool de `spawn_blocking`
fn run_extraction(binary: &str, target: &str) -> Result<ExtractedInfo, ResolveError> {
    let output = Command::new(binary)
        .args(YtDlp::args(target))
        .output()
        .map_err(|e| ResolveError::Extraction {
            target: target.to_string(),
            message: format!("yt-dlp process error: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ResolveError::Extraction {
            target: target.to_string(),
            message: stderr.trim().to_string(),
        });
    }

    parse_output(target, &output.stdout)
}

#[async_trait]
impl MediaExtractor for YtDlp {
    async fn extract_info(&self, target: &str) -> Result<ExtractedInfo, ResolveError> {
        debug!("🔍 yt-dlp extrayendo: {}", target);

        let binary = self.binary.clone();
        let owned_target = target.to_string();

        tokio::task::spawn_blocking(move || run_extraction(&binary, &owned_target))
            .await
            .map_err(|e| ResolveError::Extraction {
                target: target.to_string(),
                message: format!("yt-dlp task join error: {e}"),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_args_carry_fixed_options_and_target_last() {
        let args = YtDlp::args("-weird query");

        for flag in [
            "--no-playlist",
            "--no-check-certificates",
            "--quiet",
            "--no-warnings",
            "--dump-single-json",
        ] {
            assert!(args.iter().any(|a| a == flag), "missing {flag}");
        }

        let format_at = args.iter().position(|a| a == "--format").unwrap();
        assert_eq!(args[format_at + 1], "bestaudio/best");

        let source_at = args.iter().position(|a| a == "--source-address").unwrap();
        assert_eq!(args[source_at + 1], "0.0.0.0");

        assert_eq!(&args[args.len() - 2..], &["--".to_string(), "-weird query".to_string()]);
    }

    #[test]
    fn test_parse_search_output() {
        let json = br#"{
            "title": "way back home",
            "entries": [
                {"title": "Way Back Home", "webpage_url": "https://www.youtube.com/watch?v=abc", "url": "https://cdn/first"},
                {"title": "Other", "webpage_url": "https://www.youtube.com/watch?v=def"}
            ]
        }"#;

        let info = parse_output("way back home", json).unwrap();
        let entries = info.entries.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].webpage_url.as_deref(),
            Some("https://www.youtube.com/watch?v=abc")
        );
        assert_eq!(entries[1].url, None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_output("x", b"ERROR: not json").unwrap_err();
        assert!(matches!(err, ResolveError::Extraction { .. }));
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_extraction_error() {
        let extractor = YtDlp::new("/nonexistent/yt-dlp-binary");
        let err = extractor.extract_info("anything").await.unwrap_err();

        assert!(matches!(err, ResolveError::Extraction { .. }));
    }
}
