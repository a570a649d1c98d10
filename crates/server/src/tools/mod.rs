//! MCP tool implementations.
//!
//! This module contains all tools exposed by the guide server.

pub mod cache;
pub mod document;
pub mod navigation;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

/// Wrap a serializable value as pretty JSON tool output.
pub(crate) fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| ToolError::Output(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for tool tests.

    use std::sync::Arc;

    use async_trait::async_trait;
    use bytes::Bytes;
    use fireguide_client::{HeaderMap, Network, PdfPageCounter, Request, Response, StatusCode, ViewController};
    use fireguide_core::{Error, ResponseType};
    use rmcp::model::CallToolResult;
    use url::Url;

    pub const ORIGIN: &str = "http://127.0.0.1:8080";

    /// Serves a three-page PDF at `/docs/pump.pdf`, 404 elsewhere.
    pub struct StaticSite;

    #[async_trait]
    impl Network for StaticSite {
        async fn fetch(&self, request: &Request) -> Result<Response, Error> {
            let (status, body): (StatusCode, &'static [u8]) = match request.url.path() {
                "/docs/pump.pdf" => (
                    StatusCode::OK,
                    b"%PDF-1.4 /Type /Page /Type /Page /Type /Page",
                ),
                _ => (StatusCode::NOT_FOUND, b""),
            };
            Ok(Response {
                url: request.url.clone(),
                status,
                response_type: ResponseType::Basic,
                headers: HeaderMap::new(),
                body: Bytes::from_static(body),
            })
        }
    }

    pub fn controller() -> ViewController {
        ViewController::new(
            Url::parse(ORIGIN).unwrap(),
            vec!["home".into(), "guides".into()],
            "home".into(),
            Arc::new(StaticSite),
            Arc::new(PdfPageCounter),
        )
        .unwrap()
    }

    /// Parse the JSON text of a tool result.
    pub fn output_json(result: &CallToolResult) -> serde_json::Value {
        let content = serde_json::to_value(&result.content[0]).unwrap();
        let text = content
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
