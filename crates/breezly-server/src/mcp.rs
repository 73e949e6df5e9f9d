//! MCP server exposing the Breezeway tools
//!
//! Serves the [`Toolbox`] over stdio (one client, e.g. a desktop
//! assistant) or over streamable HTTP mounted at `/mcp`.

use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    model::{
        CallToolRequestParam, CallToolResult, Content, ListToolsResult, PaginatedRequestParam,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager},
};
use serde_json::Value;
use tracing::{info, warn};

use crate::tools::{ToolError, Toolbox, tool_definitions};

/// MCP handler backed by a shared toolbox.
#[derive(Clone)]
pub struct BreezlyMcpServer {
    toolbox: Toolbox,
}

impl BreezlyMcpServer {
    pub fn new(toolbox: Toolbox) -> Self {
        Self { toolbox }
    }
}

impl ServerHandler for BreezlyMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Breezeway property-management tools. Use search to find properties, \
                 tasks and reservations, fetch or get_property for details, and the \
                 list_* tools to browse."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: tool_definitions(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let name = request.name.as_ref();
        let args = request
            .arguments
            .map(Value::Object)
            .unwrap_or(Value::Object(serde_json::Map::new()));

        match self.toolbox.call(name, args).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e @ (ToolError::UnknownTool(_) | ToolError::InvalidArguments { .. })) => {
                Err(McpError::invalid_params(e.to_string(), None))
            }
            Err(e) => {
                warn!(tool = name, error = %e, "tool failed");
                Ok(CallToolResult::error(vec![Content::text(e.tool_message(name))]))
            }
        }
    }
}

/// Serve MCP over stdin/stdout until the client disconnects.
///
/// Logging must already be routed to stderr; stdout carries the protocol.
pub async fn serve_stdio(toolbox: Toolbox) -> anyhow::Result<()> {
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let service = BreezlyMcpServer::new(toolbox).serve(transport).await?;

    info!("MCP server running on stdio");
    let _quit_reason = service.waiting().await?;
    Ok(())
}

/// Streamable-HTTP MCP service, to be nested under `/mcp`.
pub fn http_service(toolbox: Toolbox) -> StreamableHttpService<BreezlyMcpServer, LocalSessionManager> {
    StreamableHttpService::new(
        move || Ok(BreezlyMcpServer::new(toolbox.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    )
}
