//! Serialization of sealed documents to DOCX and Markdown.

mod docx;
mod markdown;
mod numbering;
mod options;
mod package;

pub use docx::DocxSerializer;
pub use markdown::{MarkdownRenderer, MarkdownSerializer};
pub use numbering::{NumInstance, NumberingPlan};
pub use options::{Compression, DocxOptions, RenderOptions};
pub use package::paths;

use crate::error::Result;
use crate::model::{Document, SealedDocument};
use std::io::Write;
use std::path::Path;

/// A backend that turns a sealed document into a complete byte artifact.
///
/// Implementations encode the whole artifact before returning, so callers
/// never observe partial output.
pub trait Serializer {
    /// Encodes the document.
    fn serialize(&self, document: &SealedDocument) -> Result<Vec<u8>>;

    /// File extension of the produced artifact, without the dot.
    fn extension(&self) -> &str;
}

/// Serializes `document` and atomically replaces `path` with the result.
///
/// The artifact is written to a temporary file in the destination directory
/// and renamed onto `path`. On any failure the temporary file is removed and
/// an existing file at `path` is left untouched. A replaced file keeps its
/// permissions; a new file gets the usual umask-adjusted mode.
pub fn save_with<S: Serializer + ?Sized>(
    serializer: &S,
    document: &SealedDocument,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let bytes = serializer.serialize(document)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Same mode a plain file create would get, after the umask.
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    let mut file = builder.tempfile_in(dir)?;
    if let Ok(existing) = std::fs::metadata(path) {
        file.as_file().set_permissions(existing.permissions())?;
    }
    file.write_all(&bytes)?;
    file.as_file().sync_all()?;
    file.persist(path)?;

    log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Serializes `document` and writes it to `writer` with a single `write_all`.
pub fn write_with<S: Serializer + ?Sized, W: Write>(
    serializer: &S,
    document: &SealedDocument,
    writer: &mut W,
) -> Result<()> {
    let bytes = serializer.serialize(document)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Renders a document to Markdown.
pub fn render_markdown(document: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(document)
}
