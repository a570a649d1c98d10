//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CacheMatchParams, CacheStoresParams, match_impl, stores_impl};
use crate::tools::document::{
    CloseDocumentParams, OpenDocumentParams, TurnPageParams, ZoomParams, close_impl, open_impl, turn_page_impl,
    zoom_impl,
};
use crate::tools::navigation::{ShowPageParams, ViewStateParams, show_page_impl, view_state_impl};

use fireguide_client::ViewController;
use fireguide_core::CacheDb;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use tokio::sync::Mutex;
use url::Url;

/// The main MCP server handler for the guide.
#[derive(Clone)]
pub struct GuideServer {
    tool_router: ToolRouter<Self>,
    view: Arc<Mutex<ViewController>>,
    cache: CacheDb,
    cache_name: String,
    origin: Url,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl GuideServer {
    /// Create a new server handler around a page controller and the worker's cache.
    pub fn new(view: ViewController, cache: CacheDb, cache_name: String, origin: Url) -> Self {
        Self { tool_router: Self::tool_router(), view: Arc::new(Mutex::new(view)), cache, cache_name, origin }
    }

    #[tool(description = "Show a named page of the guide (e.g. home, guides, documents). Closes any open document.")]
    async fn show_page(&self, params: Parameters<ShowPageParams>) -> Result<CallToolResult, McpError> {
        let mut view = self.view.lock().await;
        show_page_impl(&mut view, params.0)
    }

    /// Open a document in the viewer.
    ///
    /// The request goes through the caching worker, so previously viewed
    /// documents open while offline.
    #[tool(
        description = "Open a document by root-relative path. PDFs are paginated starting at page 1; other files are shown as images."
    )]
    async fn open_document(&self, params: Parameters<OpenDocumentParams>) -> Result<CallToolResult, McpError> {
        let mut view = self.view.lock().await;
        open_impl(&mut view, params.0).await
    }

    #[tool(description = "Turn the page of the open PDF. direction: next (default) or previous. Stops at the first and last page.")]
    async fn turn_page(&self, params: Parameters<TurnPageParams>) -> Result<CallToolResult, McpError> {
        let mut view = self.view.lock().await;
        turn_page_impl(&mut view, params.0)
    }

    #[tool(description = "Zoom the open PDF. direction: in or out. Scale is clamped between 0.5 and 3.0.")]
    async fn zoom(&self, params: Parameters<ZoomParams>) -> Result<CallToolResult, McpError> {
        let mut view = self.view.lock().await;
        zoom_impl(&mut view, params.0)
    }

    #[tool(description = "Close the open document and return to the page it was opened from.")]
    async fn close_document(&self, params: Parameters<CloseDocumentParams>) -> Result<CallToolResult, McpError> {
        let mut view = self.view.lock().await;
        close_impl(&mut view, params.0)
    }

    #[tool(description = "Report the current page, the page to return to, and the open document.")]
    async fn view_state(&self, params: Parameters<ViewStateParams>) -> Result<CallToolResult, McpError> {
        let view = self.view.lock().await;
        view_state_impl(&view, params.0)
    }

    #[tool(description = "List offline cache stores with entry counts. The current store is marked.")]
    async fn cache_stores(&self, params: Parameters<CacheStoresParams>) -> Result<CallToolResult, McpError> {
        stores_impl(&self.cache, &self.cache_name, params.0).await
    }

    #[tool(description = "Look up the cached response for a root-relative path in the current store. The body is not returned.")]
    async fn cache_match(&self, params: Parameters<CacheMatchParams>) -> Result<CallToolResult, McpError> {
        match_impl(&self.cache, &self.cache_name, &self.origin, params.0).await
    }
}

impl ServerHandler for GuideServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "fire-guide".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
