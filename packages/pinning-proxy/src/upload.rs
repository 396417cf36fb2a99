//! Multipart uploads staged on disk before they are forwarded.
//!
//! The staged file lives exactly as long as its [`TempUpload`]; dropping the
//! guard deletes it, whichever way the forward ended.

use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// RAII handle to a staged upload.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Streaming request body over the staged file.
    pub async fn body(&self) -> Result<reqwest::Body, crate::Error> {
        let file = tokio::fs::File::open(&self.path).await?;
        Ok(reqwest::Body::wrap_stream(
            tokio_util::io::ReaderStream::new(file),
        ))
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed staged upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove staged upload"),
        }
    }
}

fn temp_path(dir: &Path) -> PathBuf {
    use rand::Rng;
    let id: u64 = rand::thread_rng().gen();
    dir.join(format!("pin-upload-{id:016x}.part"))
}

/// Stream a multipart field to a temp file under `dir`, failing with
/// `PayloadTooLarge` once more than `limit` bytes have been written.
pub async fn stage_field(
    mut field: Field<'_>,
    dir: &Path,
    limit: usize,
) -> Result<TempUpload, crate::Error> {
    let file_name = field
        .file_name()
        .filter(|n| !n.is_empty())
        .unwrap_or("upload")
        .to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    tokio::fs::create_dir_all(dir).await?;

    // Guard exists before the first write so partial files are cleaned up too.
    let mut staged = TempUpload {
        path: temp_path(dir),
        file_name,
        content_type,
        size: 0,
    };
    let mut file = tokio::fs::File::create(&staged.path).await?;

    while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, limit))? {
        staged.size += chunk.len();
        if staged.size > limit {
            return Err(crate::Error::PayloadTooLarge { limit });
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(staged)
}

/// Map an axum multipart failure; body-limit hits become `PayloadTooLarge`.
pub(crate) fn multipart_error(e: MultipartError, limit: usize) -> crate::Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        crate::Error::PayloadTooLarge { limit }
    } else {
        crate::Error::BadRequest(format!("Invalid multipart body: {}", e.body_text()))
    }
}
