//! File export and clipboard copy.

use crate::convert::markdown::to_markdown;
use crate::export::registry::ExportRegistry;
use crate::model::document::DEFAULT_TITLE;
use crate::model::node::Node;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug)]
pub enum ExportError {
    /// No format matches the destination and no fallback is registered.
    NoFormat(PathBuf),
    Io { path: PathBuf, source: io::Error },
    Clipboard(io::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFormat(path) => write!(f, "no export format for `{}`", path.display()),
            Self::Io { path, source } => {
                write!(f, "failed to write export `{}`: {source}", path.display())
            }
            Self::Clipboard(err) => write!(f, "failed to write clipboard: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoFormat(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Clipboard(err) => Some(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported(PathBuf),
    Cancelled,
}

/// System clipboard port.
pub trait TextClipboard {
    fn write_text(&mut self, text: &str) -> io::Result<()>;
}

/// Clipboard that keeps the last written text.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl TextClipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// Suggested export file name (without extension) for a title.
///
/// Keeps ASCII letters, digits, whitespace and `-`, then joins words with `-`.
pub fn derive_filename(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();
    let joined = kept.split_whitespace().collect::<Vec<_>>().join("-");
    if joined.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        joined
    }
}

/// Writes `content` to `destination` in the format its extension selects.
///
/// `None` means the user dismissed the save dialog.
pub fn export_to_file(
    registry: &ExportRegistry,
    destination: Option<&Path>,
    content: &Node,
    raw_html: &str,
) -> ExportResult<ExportOutcome> {
    let Some(path) = destination else {
        return Ok(ExportOutcome::Cancelled);
    };
    let format = registry
        .for_path(path)
        .ok_or_else(|| ExportError::NoFormat(path.to_path_buf()))?;

    let output = format.convert(content, raw_html);
    fs::write(path, output.as_bytes()).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "event=export module=export status=ok format={} bytes={}",
        format.extension(),
        output.len()
    );
    Ok(ExportOutcome::Exported(path.to_path_buf()))
}

/// Places the Markdown rendering of `content` on the clipboard.
pub fn copy_as_markdown(content: &Node, clipboard: &mut dyn TextClipboard) -> ExportResult<()> {
    let markdown = to_markdown(content);
    clipboard
        .write_text(&markdown)
        .map_err(ExportError::Clipboard)?;
    info!(
        "event=copy_markdown module=export status=ok bytes={}",
        markdown.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{copy_as_markdown, derive_filename, MemoryClipboard};
    use crate::model::node::Node;

    #[test]
    fn derives_filenames() {
        assert_eq!(derive_filename("My First Post!"), "My-First-Post");
        assert_eq!(derive_filename("  spaced   out  "), "spaced-out");
        assert_eq!(derive_filename("re-run"), "re-run");
        assert_eq!(derive_filename("???"), "Untitled");
        assert_eq!(derive_filename("Crème brûlée"), "Crme-brle");
    }

    #[test]
    fn copies_markdown() {
        let doc = Node::doc(vec![Node::heading(2, vec![Node::text("Hi")])]);
        let mut clipboard = MemoryClipboard::default();
        copy_as_markdown(&doc, &mut clipboard).expect("memory clipboard");
        assert_eq!(clipboard.contents.as_deref(), Some("## Hi"));
    }
}
