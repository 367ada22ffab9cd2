use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract page structure: {0}")]
    StructureError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One positioned text run on a page, as produced by the extraction backend.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Vertical position in page space (PDF convention: origin bottom-left,
    /// larger y is higher on the page).
    pub y: f32,
    /// Effective font size in points.
    pub font_size: f32,
}

/// The extractable text of a single page plus the height needed to
/// normalize run positions.
#[derive(Debug, Clone, Default)]
pub struct PageText {
    pub runs: Vec<TextRun>,
    /// Page height in points. Zero or negative heights are treated as
    /// "position unknown" by the scanner.
    pub height: f32,
}

/// A node of the outline/bookmark tree with its destination already resolved
/// to a 0-based page index. `None` means the destination could not be
/// resolved and the node only contributes its children.
#[derive(Debug, Clone, Default)]
pub struct OutlineNode {
    pub destination: Option<usize>,
    pub children: Vec<OutlineNode>,
}

/// Trait for PDF structure extraction backends.
///
/// Implementors supply the raw per-page evidence; the detection pipeline
/// (probes, scanner, scorer, document builder) lives in `cleaver-detect`.
/// Everything beyond `page_count`/`page_text` is optional structure: a
/// backend that cannot read outlines or page labels returns empty values
/// rather than failing.
pub trait PdfStructure: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Positioned text runs of the page at the given 0-based index.
    /// A page with no extractable text yields empty `runs`.
    fn page_text(&self, page_index: usize) -> Result<PageText, BackendError>;

    /// Root nodes of the outline/bookmark tree, destinations resolved to
    /// 0-based page indices. Empty when the document has no outline.
    fn outline(&self) -> Vec<OutlineNode>;

    /// Display labels, one per page in document order, or `None` when the
    /// document defines no page labels.
    fn page_labels(&self) -> Option<Vec<String>>;
}
