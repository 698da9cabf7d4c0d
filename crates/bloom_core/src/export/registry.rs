//! Export format registry.

use crate::export::format::{ExportFormat, HtmlExport, MarkdownExport};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;

/// Extension used when a destination names no registered format.
pub const FALLBACK_EXTENSION: &str = "md";

/// Format registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportRegistryError {
    InvalidExtension(String),
    DuplicateExtension(String),
}

impl Display for ExportRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidExtension(value) => write!(f, "export extension is invalid: `{value}`"),
            Self::DuplicateExtension(value) => {
                write!(f, "export extension already registered: `{value}`")
            }
        }
    }
}

impl Error for ExportRegistryError {}

/// Save-dialog filter entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

/// Ordered set of export formats keyed by extension.
#[derive(Default)]
pub struct ExportRegistry {
    formats: Vec<Arc<dyn ExportFormat>>,
}

impl ExportRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding Markdown then HTML.
    pub fn with_defaults() -> Self {
        Self {
            formats: vec![Arc::new(MarkdownExport), Arc::new(HtmlExport)],
        }
    }

    /// Appends one format.
    pub fn register(&mut self, format: Arc<dyn ExportFormat>) -> Result<(), ExportRegistryError> {
        let extension = format.extension();
        if !is_valid_extension(extension) {
            return Err(ExportRegistryError::InvalidExtension(extension.to_string()));
        }
        if self.find_by_extension(extension).is_some() {
            return Err(ExportRegistryError::DuplicateExtension(
                extension.to_string(),
            ));
        }
        self.formats.push(format);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Formats in registration order.
    pub fn formats(&self) -> &[Arc<dyn ExportFormat>] {
        &self.formats
    }

    pub fn find_by_extension(&self, extension: &str) -> Option<Arc<dyn ExportFormat>> {
        self.formats
            .iter()
            .find(|format| format.extension().eq_ignore_ascii_case(extension))
            .cloned()
    }

    /// Format for `path`'s extension, falling back to Markdown.
    ///
    /// Returns `None` only when neither the extension nor the fallback is
    /// registered.
    pub fn for_path(&self, path: &Path) -> Option<Arc<dyn ExportFormat>> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.find_by_extension(ext))
            .or_else(|| self.find_by_extension(FALLBACK_EXTENSION))
    }

    /// One save-dialog filter per format.
    pub fn file_filters(&self) -> Vec<FileFilter> {
        self.formats
            .iter()
            .map(|format| FileFilter {
                name: format.name().to_string(),
                extensions: vec![format.extension().to_string()],
            })
            .collect()
    }
}

fn is_valid_extension(extension: &str) -> bool {
    !extension.is_empty()
        && !extension.starts_with('.')
        && extension
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::{ExportRegistry, ExportRegistryError};
    use crate::export::format::{ExportFormat, MarkdownExport};
    use crate::model::node::Node;
    use std::path::Path;
    use std::sync::Arc;

    struct PlainText(&'static str);

    impl ExportFormat for PlainText {
        fn name(&self) -> &str {
            "Plain text"
        }

        fn extension(&self) -> &str {
            self.0
        }

        fn convert(&self, content: &Node, _raw_html: &str) -> String {
            content.flatten_text()
        }
    }

    #[test]
    fn rejects_empty_and_duplicate_extensions() {
        let mut registry = ExportRegistry::with_defaults();
        assert_eq!(
            registry.register(Arc::new(PlainText(""))),
            Err(ExportRegistryError::InvalidExtension(String::new()))
        );
        assert_eq!(
            registry.register(Arc::new(MarkdownExport)),
            Err(ExportRegistryError::DuplicateExtension("md".to_string()))
        );
        registry
            .register(Arc::new(PlainText("txt")))
            .expect("new extension registers");
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn unknown_extension_falls_back_to_markdown() {
        let registry = ExportRegistry::with_defaults();
        let pick = |path: &str| {
            registry
                .for_path(Path::new(path))
                .map(|format| format.extension().to_string())
        };
        assert_eq!(pick("out/post.html").as_deref(), Some("html"));
        assert_eq!(pick("out/post.HTML").as_deref(), Some("html"));
        assert_eq!(pick("out/post.txt").as_deref(), Some("md"));
        assert_eq!(pick("out/post").as_deref(), Some("md"));
        assert!(ExportRegistry::empty().for_path(Path::new("a.md")).is_none());
    }
}
