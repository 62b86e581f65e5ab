//! Reading piped input and filling the user prompt template.

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Placeholder in the user prompt that receives the piped input.
pub const PLACEHOLDER: &str = "{{contents}}";

/// Read all of `reader` and trim surrounding whitespace.
pub async fn read_input<R>(mut reader: R) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .await
        .context("Failed to read standard input")?;
    Ok(buf.trim().to_string())
}

/// Substitute every `{{contents}}` in `template` with `contents`, in one pass.
///
/// Inserted text is never expanded again. A template without the
/// placeholder is returned as is.
pub fn render(template: &str, contents: &str) -> String {
    template.replace(PLACEHOLDER, contents)
}
