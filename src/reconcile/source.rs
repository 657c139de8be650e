//! Resolving a package source to a readable local file

use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use crate::reconcile::{context::ReconcileContext, error::ValidationError};
use crate::resource::PackageSource;

/// A source artifact available on local disk. Downloads live in
/// `download_dir`, which is removed when this value is dropped.
#[derive(Debug)]
pub struct ResolvedSource {
    pub path: PathBuf,
    pub download_dir: Option<TempDir>,
}

pub async fn resolve(
    source: &PackageSource,
    ctx: &ReconcileContext,
) -> Result<ResolvedSource, ValidationError> {
    match source {
        PackageSource::LocalPath(path) => {
            check_local(path).await?;
            Ok(ResolvedSource {
                path: path.clone(),
                download_dir: None,
            })
        }
        PackageSource::Remote {
            uri,
            sha256_checksum,
        } => download(uri, sha256_checksum.as_deref(), ctx).await,
    }
}

/// The path must be valid UTF-8 and name a regular file this process can
/// open. The path is passed to the installer verbatim, so a lossy rendering
/// would name a different file.
pub async fn check_local(path: &Path) -> Result<(), ValidationError> {
    if path.to_str().is_none() {
        return Err(ValidationError::SourceNotUtf8 {
            path: path.display().to_string(),
        });
    }

    let unreadable = |error| ValidationError::SourceUnreadable {
        path: path.display().to_string(),
        error,
    };

    let metadata = tokio::fs::metadata(path).await.map_err(unreadable)?;
    if !metadata.is_file() {
        return Err(ValidationError::SourceNotAFile {
            path: path.display().to_string(),
        });
    }
    tokio::fs::File::open(path).await.map_err(unreadable)?;
    Ok(())
}

async fn download(
    uri: &Url,
    expected_sha256: Option<&str>,
    ctx: &ReconcileContext,
) -> Result<ResolvedSource, ValidationError> {
    match uri.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ValidationError::UnsupportedScheme {
                uri: uri.to_string(),
                scheme: other.to_string(),
            })
        }
    }

    let failed = |error: String| ValidationError::Download {
        uri: uri.to_string(),
        error,
    };

    let dir = tempfile::Builder::new()
        .prefix("rustle-pkg-")
        .tempdir()
        .map_err(|e| failed(e.to_string()))?;
    let path = dir.path().join(artifact_file_name(uri));

    let fetch = fetch_to_file(uri, &path, ctx);
    let actual = tokio::select! {
        biased;
        _ = ctx.cancel_token().cancelled() => {
            return Err(ValidationError::Cancelled {
                uri: uri.to_string(),
            })
        }
        result = fetch => result?,
    };

    if let Some(expected) = expected_sha256 {
        verify_checksum(uri, expected, &actual)?;
    }

    info!("Downloaded {} to {}", uri, path.display());
    Ok(ResolvedSource {
        path,
        download_dir: Some(dir),
    })
}

/// Stream the body to `path`, returning the hex SHA-256 of what was written.
async fn fetch_to_file(
    uri: &Url,
    path: &Path,
    ctx: &ReconcileContext,
) -> Result<String, ValidationError> {
    let limit = ctx.config().max_download_bytes;
    let failed = |error: String| ValidationError::Download {
        uri: uri.to_string(),
        error,
    };
    let too_large = || ValidationError::DownloadTooLarge {
        uri: uri.to_string(),
        limit,
    };

    debug!("Fetching {}", uri);
    let response = ctx
        .http()
        .get(uri.clone())
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| failed(e.to_string()))?;

    if response.content_length().is_some_and(|len| len > limit) {
        return Err(too_large());
    }

    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| failed(e.to_string()))?;
    let mut hasher = Sha256::new();
    let mut written: u64 = 0;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| failed(e.to_string()))?;
        written += chunk.len() as u64;
        if written > limit {
            return Err(too_large());
        }
        hasher.update(&chunk);
        file.write_all(&chunk)
            .await
            .map_err(|e| failed(e.to_string()))?;
    }
    file.flush().await.map_err(|e| failed(e.to_string()))?;

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn verify_checksum(uri: &Url, expected: &str, actual: &str) -> Result<(), ValidationError> {
    let expected = expected.trim().to_ascii_lowercase();
    if expected == actual {
        Ok(())
    } else {
        Err(ValidationError::ChecksumMismatch {
            uri: uri.to_string(),
            expected,
            actual: actual.to_string(),
        })
    }
}

/// Installers key off the file name (msiexec needs the `.msi` extension), so
/// keep the last path segment of the URI when there is one.
fn artifact_file_name(uri: &Url) -> String {
    uri.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .filter(|name| *name != "." && *name != "..")
        .map(str::to_string)
        .unwrap_or_else(|| "package".to_string())
}
