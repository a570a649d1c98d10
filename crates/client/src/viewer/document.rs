//! Open document state.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_SCALE: f32 = 1.5;
pub const SCALE_STEP: f32 = 0.25;
pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 3.0;

/// How a document is displayed, decided once when it is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Shown whole.
    Image,
    /// Rendered one page at a time.
    Paginated,
}

impl DocumentKind {
    /// `.pdf` paths are paginated, everything else is an image.
    /// Case-insensitive; query strings and fragments are ignored.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        if path.to_ascii_lowercase().ends_with(".pdf") { DocumentKind::Paginated } else { DocumentKind::Image }
    }
}

/// Page position and zoom of a paginated document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based current page.
    pub page: u32,
    pub page_count: u32,
    pub scale: f32,
}

impl Pagination {
    pub fn new(page_count: u32) -> Self {
        Self { page: 1, page_count, scale: DEFAULT_SCALE }
    }

    /// Advance one page; stays on the last page.
    pub fn next(&mut self) -> u32 {
        if self.page < self.page_count {
            self.page += 1;
        }
        self.page
    }

    /// Go back one page; stays on the first page.
    pub fn previous(&mut self) -> u32 {
        if self.page > 1 {
            self.page -= 1;
        }
        self.page
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.scale = (self.scale + SCALE_STEP).min(MAX_SCALE);
        self.scale
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.scale = (self.scale - SCALE_STEP).max(MIN_SCALE);
        self.scale
    }
}

/// Display state of the open document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentView {
    Image,
    Paginated(Pagination),
}

/// A document loaded into the viewer.
#[derive(Debug, Clone)]
pub struct OpenDocument {
    pub path: String,
    pub title: String,
    pub url: Url,
    pub content_type: Option<String>,
    pub body: Bytes,
    pub view: DocumentView,
}

impl OpenDocument {
    pub fn kind(&self) -> DocumentKind {
        match self.view {
            DocumentView::Image => DocumentKind::Image,
            DocumentView::Paginated(_) => DocumentKind::Paginated,
        }
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        match &self.view {
            DocumentView::Paginated(p) => Some(p),
            DocumentView::Image => None,
        }
    }
}
