//! Adapter configuration files
//!
//! Rendered configuration is always written in full. The return value tells
//! the caller whether the engine needs a reload.

use crate::error::Result;
use std::io::ErrorKind;
use std::path::Path;

/// Write `rendered` to `path` and report whether the content changed
///
/// - `None` or empty render: nothing is written, returns `false`
/// - missing file: compared as empty content
/// - otherwise the file is overwritten and the byte-for-byte comparison with
///   the previous content is returned
pub async fn reconcile(path: &Path, rendered: Option<&str>) -> Result<bool> {
    let new_content = match rendered {
        Some(content) if !content.is_empty() => content,
        _ => return Ok(false),
    };

    let current = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, new_content).await?;

    Ok(current != new_content.as_bytes())
}
