//! Input resolution: turn a user-supplied path or URL into extracted text.
//!
//! Local files are read from disk; HTTP(S) URLs are downloaded with a
//! timeout. Either way the bytes must be UTF-8. Extraction from images and
//! PDFs belongs to the upstream extractor, which hands over an
//! [`ExtractedText`] directly.

use crate::error::BrailleError;
use crate::output::ExtractedText;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve `input` (local path or URL) to its text.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ExtractedText, BrailleError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(Path::new(input)).await
    }
}

/// Decode `bytes` as UTF-8, reporting the first bad byte.
pub fn decode_utf8(bytes: Vec<u8>, source_name: &str) -> Result<String, BrailleError> {
    String::from_utf8(bytes).map_err(|e| BrailleError::NotUtf8 {
        source_name: source_name.to_string(),
        offset: e.utf8_error().valid_up_to(),
    })
}

async fn read_local(path: &Path) -> Result<ExtractedText, BrailleError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => BrailleError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => BrailleError::FileNotFound {
            path: PathBuf::from(path),
        },
    })?;
    let text = decode_utf8(bytes, &path.display().to_string())?;
    debug!("Read {} bytes from {}", text.len(), path.display());
    Ok(ExtractedText::new(text))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ExtractedText, BrailleError> {
    info!("Downloading text from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| BrailleError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_err = |e: reqwest::Error| {
        if e.is_timeout() {
            BrailleError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            BrailleError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(map_err)?;
    if !response.status().is_success() {
        return Err(BrailleError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(map_err)?;
    let text = decode_utf8(bytes.to_vec(), url)?;
    info!("Downloaded {} bytes", text.len());
    Ok(ExtractedText::new(text))
}
