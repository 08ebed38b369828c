//! Async API for non-blocking document output.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! docweave = { version = "0.1", features = ["async"] }
//! ```

use crate::error::{Error, Result};
use crate::model::SealedDocument;
use std::path::PathBuf;
use tokio::io::{AsyncWrite, AsyncWriteExt};

fn join_error(e: tokio::task::JoinError) -> Error {
    Error::Io(std::io::Error::other(e.to_string()))
}

/// Asynchronously saves a sealed document as DOCX.
///
/// Encoding and the atomic file replacement run on a blocking task. The
/// document is handed back so it can be serialized again.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> docweave::Result<()> {
/// let mut doc = docweave::Document::new();
/// doc.add_heading(0, "Title")?;
/// let sealed = docweave::async_api::save_async(doc.seal(), "out.docx").await?;
/// println!("Blocks: {}", sealed.len());
/// # Ok(())
/// # }
/// ```
pub async fn save_async(
    document: SealedDocument,
    path: impl Into<PathBuf>,
) -> Result<SealedDocument> {
    let path = path.into();
    tokio::task::spawn_blocking(move || -> Result<SealedDocument> {
        crate::save(&document, &path)?;
        Ok(document)
    })
    .await
    .map_err(join_error)?
}

/// Asynchronously encodes a sealed document as DOCX bytes.
pub async fn to_bytes_async(document: &SealedDocument) -> Result<Vec<u8>> {
    // CPU-bound, so it runs on a blocking task
    let document = document.clone();
    tokio::task::spawn_blocking(move || crate::to_bytes(&document))
        .await
        .map_err(join_error)?
}

/// Asynchronously writes a sealed document as DOCX into `writer`.
///
/// The package is fully encoded before the first byte is written, then
/// written with a single `write_all`.
pub async fn write_to_async<W: AsyncWrite + Unpin>(
    document: &SealedDocument,
    writer: &mut W,
) -> Result<()> {
    let bytes = to_bytes_async(document).await?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}
