//! Serialization options for DOCX and Markdown output.

/// ZIP compression used for package parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Deflate every part.
    #[default]
    Deflated,
    /// Store parts uncompressed (larger output, easier to inspect).
    Stored,
}

impl From<Compression> for zip::CompressionMethod {
    fn from(compression: Compression) -> Self {
        match compression {
            Compression::Deflated => zip::CompressionMethod::Deflated,
            Compression::Stored => zip::CompressionMethod::Stored,
        }
    }
}

/// Options for DOCX serialization.
#[derive(Debug, Clone)]
pub struct DocxOptions {
    /// Compression for package parts.
    pub compression: Compression,

    /// Default font for the document.
    /// Default: "Calibri"
    pub font_name: String,

    /// Default font size in half-points.
    /// Default: 22 (11pt)
    pub font_size: u32,

    /// Application name written to the extended properties.
    pub application: String,

    /// Whether to NFC-normalize all text before writing it.
    pub normalize_unicode: bool,
}

impl Default for DocxOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Deflated,
            font_name: "Calibri".to_string(),
            font_size: 22,
            application: format!("docweave {}", env!("CARGO_PKG_VERSION")),
            normalize_unicode: true,
        }
    }
}

impl DocxOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression method.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Sets the default font name.
    pub fn with_font(mut self, name: impl Into<String>) -> Self {
        self.font_name = name.into();
        self
    }

    /// Sets the default font size in points.
    pub fn with_font_size_pt(mut self, points: u32) -> Self {
        self.font_size = points.clamp(1, 1638) * 2;
        self
    }

    /// Sets the application name recorded in `docProps/app.xml`.
    pub fn with_application(mut self, name: impl Into<String>) -> Self {
        self.application = name.into();
        self
    }

    /// Writes text exactly as given, without Unicode normalization.
    pub fn without_normalization(mut self) -> Self {
        self.normalize_unicode = false;
        self
    }
}

/// Options for Markdown rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Maximum heading level to use (1-6).
    /// Headings beyond this level will use this level.
    pub max_heading_level: u8,

    /// Whether to include metadata as YAML frontmatter.
    pub include_frontmatter: bool,

    /// Character to use for unordered lists.
    /// Default: '-'
    pub list_marker: char,

    /// Whether to add blank lines between paragraphs.
    pub paragraph_spacing: bool,

    /// Whether to escape special Markdown characters in text.
    pub escape_special_chars: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_heading_level: 6,
            include_frontmatter: false,
            list_marker: '-',
            paragraph_spacing: true,
            escape_special_chars: false,
        }
    }
}

impl RenderOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables YAML frontmatter output.
    pub fn with_frontmatter(mut self) -> Self {
        self.include_frontmatter = true;
        self
    }

    /// Sets the maximum heading level, clamped to 1-6.
    pub fn with_max_heading_level(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Sets the bullet marker.
    pub fn with_list_marker(mut self, marker: char) -> Self {
        self.list_marker = marker;
        self
    }

    /// Enables escaping of Markdown special characters.
    pub fn with_escaping(mut self) -> Self {
        self.escape_special_chars = true;
        self
    }

    /// Disables paragraph spacing.
    pub fn without_paragraph_spacing(mut self) -> Self {
        self.paragraph_spacing = false;
        self
    }
}
