//! show_page and view_state tool implementations.
//!
//! Switches the visible page of the guide shell and reports shell state.

use fireguide_client::ViewController;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the show_page tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShowPageParams {
    /// Id of the page to show (e.g. "home").
    pub page: String,
}

/// Parameters for the view_state tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ViewStateParams {}

/// Implementation of the show_page tool.
pub fn show_page_impl(view: &mut ViewController, params: ShowPageParams) -> Result<CallToolResult, McpError> {
    let state = view.show_page(params.page.trim())?;
    json_result(&state)
}

/// Implementation of the view_state tool.
pub fn view_state_impl(view: &ViewController, _params: ViewStateParams) -> Result<CallToolResult, McpError> {
    json_result(&view.state())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{controller, output_json};

    #[test]
    fn test_show_page() {
        let mut view = controller();
        let result = show_page_impl(&mut view, ShowPageParams { page: " guides ".into() }).unwrap();

        let output = output_json(&result);
        assert_eq!(output["current_page"], "guides");
        assert!(output["document"].is_null());
    }

    #[test]
    fn test_show_unknown_page() {
        let mut view = controller();
        let err = show_page_impl(&mut view, ShowPageParams { page: "settings".into() }).unwrap_err();
        assert_eq!(err.code.0, -32012);
    }

    #[test]
    fn test_view_state() {
        let view = controller();
        let result = view_state_impl(&view, ViewStateParams::default()).unwrap();
        assert_eq!(output_json(&result)["current_page"], "home");
    }
}
