//! Document decoding seam.
//!
//! Pixel rendering belongs to the host; the viewer only needs to know how
//! many pages a paginated document has.

use std::sync::LazyLock;

use regex::bytes::Regex;

use fireguide_core::Error;

/// Decodes paginated documents for the viewer.
pub trait Renderer: Send + Sync {
    /// Number of pages in the document. Zero pages is a render failure.
    fn page_count(&self, document: &[u8]) -> Result<u32, Error>;
}

/// Leaf page objects (`/Type /Page`, not the `/Pages` tree nodes).
static PAGE_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Type\s*/Page\b").expect("page object pattern is valid"));

/// Counts PDF page objects without decoding content streams.
///
/// Pages stored inside compressed object streams are not visible to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfPageCounter;

impl Renderer for PdfPageCounter {
    fn page_count(&self, document: &[u8]) -> Result<u32, Error> {
        if !document.starts_with(b"%PDF-") {
            return Err(Error::RenderFailed("not a PDF document".into()));
        }

        let count = PAGE_OBJECT.find_iter(document).count();
        if count == 0 {
            return Err(Error::RenderFailed("no pages found".into()));
        }

        u32::try_from(count).map_err(|_| Error::RenderFailed(format!("too many pages: {count}")))
    }
}
