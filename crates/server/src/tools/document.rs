//! Document viewer tool implementations.
//!
//! Opens documents through the caching worker, pages and zooms paginated
//! documents, and closes the viewer back to the page it was opened from.

use fireguide_client::ViewController;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::ToolError;

/// Parameters for the open_document tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OpenDocumentParams {
    /// Root-relative path of the document (e.g. "/docs/pump.pdf").
    /// Paths ending in ".pdf" are paginated; anything else is shown as an image.
    pub path: String,

    /// Title shown in the viewer (defaults to the path).
    #[serde(default)]
    pub title: Option<String>,
}

/// Parameters for the turn_page tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TurnPageParams {
    /// "next" (default) or "previous".
    #[serde(default = "default_turn")]
    pub direction: String,
}

fn default_turn() -> String {
    "next".into()
}

/// Parameters for the zoom tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ZoomParams {
    /// "in" or "out".
    pub direction: String,
}

/// Parameters for the close_document tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CloseDocumentParams {}

/// Output from the turn_page tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TurnPageOutput {
    /// 1-based page now shown.
    pub page: u32,
    pub page_count: u32,
}

/// Output from the zoom tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ZoomOutput {
    pub scale: f32,
}

/// Implementation of the open_document tool.
pub async fn open_impl(view: &mut ViewController, params: OpenDocumentParams) -> Result<CallToolResult, McpError> {
    let state = view.open_document(&params.path, params.title.as_deref()).await?;
    json_result(&state)
}

/// Implementation of the turn_page tool.
pub fn turn_page_impl(view: &mut ViewController, params: TurnPageParams) -> Result<CallToolResult, McpError> {
    let page = match params.direction.as_str() {
        "next" => view.next_page()?,
        "previous" | "prev" => view.previous_page()?,
        _ => {
            return Err(ToolError::InvalidDirection {
                param: "direction",
                expected: "next, previous",
                value: params.direction,
            }
            .into());
        }
    };

    let page_count = view
        .document()
        .and_then(|d| d.pagination())
        .map(|p| p.page_count)
        .unwrap_or(page);

    json_result(&TurnPageOutput { page, page_count })
}

/// Implementation of the zoom tool.
pub fn zoom_impl(view: &mut ViewController, params: ZoomParams) -> Result<CallToolResult, McpError> {
    let scale = match params.direction.as_str() {
        "in" => view.zoom_in()?,
        "out" => view.zoom_out()?,
        _ => {
            return Err(
                ToolError::InvalidDirection { param: "direction", expected: "in, out", value: params.direction }.into()
            );
        }
    };

    json_result(&ZoomOutput { scale })
}

/// Implementation of the close_document tool.
pub fn close_impl(view: &mut ViewController, _params: CloseDocumentParams) -> Result<CallToolResult, McpError> {
    let state = view.close_document()?;
    json_result(&state)
}
