//! MCP (Model Context Protocol) server over stdio.
//!
//! A thin presentation layer: every tool delegates to the same [`Engine`]
//! the CLI and HTTP server use.

use std::sync::Arc;

use food_lookup_core::{Classification, Engine, SubmitOutcome};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

/// Parameters for the `get_info` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetInfoParams {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "text".to_string()
}

/// Parameters for the `lookup_food` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct LookupFoodParams {
    /// Food name to look up. Misspellings are tolerated.
    pub query: String,
}

/// Parameters for the `suggest_food` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SuggestFoodParams {
    /// Proposed food name (3 to 50 characters).
    pub text: String,
    /// Whether the food should be allowed.
    pub allowed: bool,
}

/// MCP server exposing lookup and suggestion tools.
#[derive(Clone)]
pub struct FoodServer {
    engine: Arc<Engine>,
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))
}

#[tool_router]
impl FoodServer {
    /// Create a server backed by `engine`.
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Get server name, version, and catalog size")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn get_info(
        &self,
        Parameters(params): Parameters<GetInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "get_info", format = %params.format, "executing MCP tool");

        let catalog = self.engine.catalog();
        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "entries": catalog.len(),
            "allowed": catalog.count(Classification::Allowed),
            "not_allowed": catalog.count(Classification::NotAllowed),
        });

        let text = if params.format == "json" {
            to_json(&info)?
        } else {
            format!(
                "{} v{}\n{}\n{} catalogued foods",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION"),
                catalog.len(),
            )
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        description = "Look up a food. Returns possible_allowed and possible_disallowed name lists; misspellings fall back to phonetic matches."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn lookup_food(
        &self,
        Parameters(params): Parameters<LookupFoodParams>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.engine.lookup(&params.query);
        tracing::info!(
            tool = "lookup_food",
            allowed = response.possible_allowed.len(),
            disallowed = response.possible_disallowed.len(),
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(to_json(
            &response,
        )?)]))
    }

    #[tool(description = "Suggest a food that is missing from the catalog.")]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn suggest_food(
        &self,
        Parameters(params): Parameters<SuggestFoodParams>,
    ) -> Result<CallToolResult, McpError> {
        let classification = Classification::from_allowed(params.allowed);
        match self.engine.suggest(&params.text, classification) {
            Ok(outcome) => {
                let message = match outcome {
                    SubmitOutcome::Recorded => format!("recorded as {classification}"),
                    SubmitOutcome::AlreadyKnown => "already known".to_string(),
                };
                Ok(CallToolResult::success(vec![Content::text(message)]))
            }
            Err(err) if err.is_client_error() => Err(McpError::invalid_params(err.to_string(), None)),
            Err(err) => {
                tracing::error!(error = %err, "failed to record suggestion");
                Err(McpError::internal_error(err.to_string(), None))
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for FoodServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "{} MCP server. Use lookup_food to check whether a food is allowed and suggest_food to propose missing foods.",
                env!("CARGO_PKG_NAME"),
            )),
        }
    }
}
