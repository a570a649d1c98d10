//! Page controller for the guide shell.
//!
//! [`ViewController`] owns everything the shell shows: which named page is
//! visible, the page to return to, and the open document with its
//! pagination. Every document request goes through the fetch path handed
//! in at construction, which is the caching worker once it is registered.

pub mod document;
pub mod render;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::fetch::{Network, Request, resolve};
use fireguide_core::Error;

pub use document::{DocumentKind, DocumentView, OpenDocument, Pagination};
pub use render::{PdfPageCounter, Renderer};

/// Page id shown while a document is open.
pub const VIEWER_PAGE: &str = "viewer";

/// Serializable snapshot of the open document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentState {
    pub path: String,
    pub title: String,
    pub url: String,
    pub kind: DocumentKind,
    pub content_type: Option<String>,
    pub size: usize,
    pub pagination: Option<Pagination>,
}

/// Serializable snapshot of the shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub current_page: String,
    pub previous_page: Option<String>,
    pub document: Option<DocumentState>,
}

/// Shell state and document viewer.
pub struct ViewController {
    origin: Url,
    pages: Vec<String>,
    home_page: String,
    current_page: String,
    previous_page: Option<String>,
    document: Option<OpenDocument>,
    fetcher: Arc<dyn Network>,
    renderer: Arc<dyn Renderer>,
}

impl ViewController {
    /// Create a controller showing `home_page`.
    ///
    /// # Errors
    ///
    /// Returns `UNKNOWN_PAGE` if `home_page` is not one of `pages`.
    pub fn new(
        origin: Url, pages: Vec<String>, home_page: String, fetcher: Arc<dyn Network>, renderer: Arc<dyn Renderer>,
    ) -> Result<Self, Error> {
        if !pages.contains(&home_page) {
            return Err(Error::UnknownPage(home_page));
        }
        Ok(Self {
            origin,
            pages,
            current_page: home_page.clone(),
            home_page,
            previous_page: None,
            document: None,
            fetcher,
            renderer,
        })
    }

    pub fn current_page(&self) -> &str {
        &self.current_page
    }

    pub fn document(&self) -> Option<&OpenDocument> {
        self.document.as_ref()
    }

    /// Switch to a named page. An open document is closed without
    /// returning to the page it was opened from.
    pub fn show_page(&mut self, page: &str) -> Result<ViewState, Error> {
        if !self.pages.iter().any(|p| p == page) {
            return Err(Error::UnknownPage(page.to_string()));
        }

        if self.document.take().is_some() {
            tracing::debug!(page, "navigation closed open document");
        }
        self.previous_page = None;
        self.current_page = page.to_string();

        Ok(self.state())
    }

    /// Fetch and open a document in the viewer.
    ///
    /// The kind is decided from the path before fetching. On any failure
    /// the controller is left exactly as it was.
    ///
    /// # Errors
    ///
    /// - `INVALID_INPUT` / `INVALID_URL` for an unusable path
    /// - `NETWORK_FAILED` / `FETCH_TIMEOUT` when offline with no cached copy
    /// - `HTTP_ERROR` for a non-success status
    /// - `RENDER_FAILED` if a paginated document cannot be decoded
    pub async fn open_document(&mut self, path: &str, title: Option<&str>) -> Result<ViewState, Error> {
        let path = path.trim();
        if path.is_empty() {
            return Err(Error::InvalidInput("document path must not be empty".into()));
        }

        let kind = DocumentKind::from_path(path);
        let url = resolve(&self.origin, path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))?;

        let response = self.fetcher.fetch(&Request::get(url.clone())).await?;
        if !response.status.is_success() {
            return Err(Error::HttpError(format!("{path}: status {}", response.status.as_u16())));
        }

        let view = match kind {
            DocumentKind::Image => DocumentView::Image,
            DocumentKind::Paginated => {
                let page_count = self.renderer.page_count(&response.body).map_err(|e| {
                    tracing::warn!(path, error = %e, "document failed to render");
                    e
                })?;
                DocumentView::Paginated(Pagination::new(page_count))
            }
        };

        let document = OpenDocument {
            path: path.to_string(),
            title: title.map(str::to_string).unwrap_or_else(|| path.to_string()),
            url,
            content_type: response.content_type().map(str::to_string),
            body: response.body,
            view,
        };

        tracing::info!(path, kind = ?document.kind(), bytes = document.body.len(), "document opened");

        if self.document.is_none() {
            self.previous_page = Some(std::mem::replace(&mut self.current_page, VIEWER_PAGE.to_string()));
        }
        self.document = Some(document);

        Ok(self.state())
    }

    fn pagination_mut(&mut self) -> Result<&mut Pagination, Error> {
        match self.document.as_mut().map(|d| &mut d.view) {
            None => Err(Error::NoDocument),
            Some(DocumentView::Image) => Err(Error::InvalidInput("image documents have no pages".into())),
            Some(DocumentView::Paginated(p)) => Ok(p),
        }
    }

    pub fn next_page(&mut self) -> Result<u32, Error> {
        Ok(self.pagination_mut()?.next())
    }

    pub fn previous_page(&mut self) -> Result<u32, Error> {
        Ok(self.pagination_mut()?.previous())
    }

    pub fn zoom_in(&mut self) -> Result<f32, Error> {
        Ok(self.pagination_mut()?.zoom_in())
    }

    pub fn zoom_out(&mut self) -> Result<f32, Error> {
        Ok(self.pagination_mut()?.zoom_out())
    }

    /// Close the document, reset its pagination and return to the page it
    /// was opened from.
    pub fn close_document(&mut self) -> Result<ViewState, Error> {
        let document = self.document.take().ok_or(Error::NoDocument)?;
        self.current_page = self.previous_page.take().unwrap_or_else(|| self.home_page.clone());

        tracing::debug!(path = %document.path, page = %self.current_page, "document closed");

        Ok(self.state())
    }

    pub fn state(&self) -> ViewState {
        ViewState {
            current_page: self.current_page.clone(),
            previous_page: self.previous_page.clone(),
            document: self.document.as_ref().map(|d| DocumentState {
                path: d.path.clone(),
                title: d.title.clone(),
                url: d.url.to_string(),
                kind: d.kind(),
                content_type: d.content_type.clone(),
                size: d.body.len(),
                pagination: d.pagination().copied(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedNetwork, origin, url};

    const PDF: &[u8] = b"%PDF-1.4
3 0 obj << /Type /Page >> endobj
4 0 obj << /Type /Page >> endobj
5 0 obj << /Type /Page >> endobj";

    fn network() -> Arc<ScriptedNetwork> {
        Arc::new(
            ScriptedNetwork::new()
                .route(url("/docs/pump.pdf"), 200, PDF, "application/pdf")
                .route(url("/docs/corrupt.pdf"), 200, b"<html>login</html>", "text/html")
                .route(url("/img/hydrant.png"), 200, b"\x89PNG", "image/png"),
        )
    }

    fn controller(network: Arc<ScriptedNetwork>) -> ViewController {
        ViewController::new(
            origin(),
            vec!["home".into(), "guides".into(), "documents".into()],
            "home".into(),
            network,
            Arc::new(PdfPageCounter),
        )
        .unwrap()
    }

    #[test]
    fn test_new_requires_known_home_page() {
        let result = ViewController::new(
            origin(),
            vec!["home".into()],
            "settings".into(),
            network(),
            Arc::new(PdfPageCounter),
        );
        assert!(matches!(result, Err(Error::UnknownPage(_))));
    }

    #[test]
    fn test_show_page() {
        let mut view = controller(network());
        let state = view.show_page("guides").unwrap();
        assert_eq!(state.current_page, "guides");
        assert!(matches!(view.show_page("viewer"), Err(Error::UnknownPage(_))));
        assert_eq!(view.current_page(), "guides");
    }

    #[tokio::test]
    async fn test_open_pdf_then_close_returns_to_previous_page() {
        let mut view = controller(network());
        view.show_page("documents").unwrap();

        let state = view.open_document("/docs/pump.pdf", Some("Pump operations")).await.unwrap();
        assert_eq!(state.current_page, VIEWER_PAGE);
        assert_eq!(state.previous_page.as_deref(), Some("documents"));
        let doc = state.document.unwrap();
        assert_eq!(doc.kind, DocumentKind::Paginated);
        assert_eq!(doc.title, "Pump operations");
        assert_eq!(doc.pagination, Some(Pagination::new(3)));

        let state = view.close_document().unwrap();
        assert_eq!(state.current_page, "documents");
        assert!(state.previous_page.is_none());
        assert!(state.document.is_none());
    }

    #[tokio::test]
    async fn test_paging_and_zoom() {
        let mut view = controller(network());
        view.open_document("/docs/pump.pdf", None).await.unwrap();

        assert_eq!(view.next_page().unwrap(), 2);
        assert_eq!(view.next_page().unwrap(), 3);
        assert_eq!(view.next_page().unwrap(), 3);
        assert_eq!(view.previous_page().unwrap(), 2);
        assert_eq!(view.zoom_in().unwrap(), 1.75);
        assert_eq!(view.zoom_out().unwrap(), 1.5);
    }

    #[tokio::test]
    async fn test_reopen_resets_pagination() {
        let mut view = controller(network());
        view.open_document("/docs/pump.pdf", None).await.unwrap();
        view.next_page().unwrap();
        view.zoom_in().unwrap();
        view.close_document().unwrap();

        let state = view.open_document("/docs/pump.pdf", None).await.unwrap();
        let pagination = state.document.unwrap().pagination.unwrap();
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.scale, document::DEFAULT_SCALE);
    }

    #[tokio::test]
    async fn test_image_has_no_pages() {
        let mut view = controller(network());
        let state = view.open_document("/img/hydrant.png", None).await.unwrap();

        let doc = state.document.unwrap();
        assert_eq!(doc.kind, DocumentKind::Image);
        assert_eq!(doc.content_type.as_deref(), Some("image/png"));
        assert!(matches!(view.next_page(), Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_opening_second_document_keeps_return_page() {
        let mut view = controller(network());
        view.show_page("guides").unwrap();
        view.open_document("/docs/pump.pdf", None).await.unwrap();
        view.open_document("/img/hydrant.png", None).await.unwrap();

        let state = view.close_document().unwrap();
        assert_eq!(state.current_page, "guides");
    }

    #[tokio::test]
    async fn test_render_failure_leaves_state_unchanged() {
        let mut view = controller(network());
        let before = view.state();

        let result = view.open_document("/docs/corrupt.pdf", None).await;

        assert!(matches!(result, Err(Error::RenderFailed(_))));
        assert_eq!(view.state(), before);
    }

    #[tokio::test]
    async fn test_missing_document_is_http_error() {
        let mut view = controller(network());
        let result = view.open_document("/docs/nope.pdf", None).await;
        assert!(matches!(result, Err(Error::HttpError(msg)) if msg.contains("404")));
    }

    #[tokio::test]
    async fn test_offline_without_cache_fails() {
        let network = network();
        network.set_offline(true);
        let mut view = controller(network);

        let result = view.open_document("/docs/pump.pdf", None).await;
        assert!(matches!(result, Err(Error::NetworkFailed(_))));
        assert_eq!(view.current_page(), "home");
    }

    #[tokio::test]
    async fn test_empty_path_rejected() {
        let mut view = controller(network());
        assert!(matches!(view.open_document("  ", None).await, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_close_without_document() {
        let mut view = controller(network());
        assert!(matches!(view.close_document(), Err(Error::NoDocument)));
        assert!(matches!(view.zoom_in(), Err(Error::NoDocument)));
    }

    #[tokio::test]
    async fn test_state_json_shape() {
        let mut view = controller(network());
        let state = view.open_document("/docs/pump.pdf", None).await.unwrap();

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["current_page"], "viewer");
        assert_eq!(json["previous_page"], "home");
        assert_eq!(json["document"]["kind"], "paginated");
        assert_eq!(json["document"]["url"], "http://127.0.0.1:8080/docs/pump.pdf");
        assert_eq!(json["document"]["pagination"]["page"], 1);

        let restored: ViewState = serde_json::from_value(json).unwrap();
        assert_eq!(restored, state);
    }

    #[tokio::test]
    async fn test_navigation_closes_document() {
        let mut view = controller(network());
        view.open_document("/docs/pump.pdf", None).await.unwrap();

        let state = view.show_page("guides").unwrap();
        assert!(state.document.is_none());
        assert!(state.previous_page.is_none());
        assert_eq!(state.current_page, "guides");
    }
}
