//! MCP Server for bookshelf-mcp
//!
//! MCP Protocol (stdio) <-> application::BookForm / Dispatcher / BookStore
//!
//! 10 tools: view, draft, submit, toggle_list, close_list, select, update, delete, refresh, search

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rmcp::{
    handler::server::{tool::ToolCallContext, tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::application::dispatch::{Dispatcher, Intent};
use crate::application::error::AppError;
use crate::application::form::BookForm;
use crate::application::store::BookStore;
use crate::domain::error::DomainError;
use crate::domain::model::book::{BookList, SearchField};
use crate::infra::config::ClientConfig;
use crate::infra::http_api::HttpBookApi;

// =============================================================================
// Public entry point
// =============================================================================

/// MCP Serverを起動する。一覧の初回取得は待たずに裏で走らせる。
pub async fn run(config: ClientConfig) -> anyhow::Result<()> {
    let api = HttpBookApi::new(&config)?;
    tracing::info!(base_url = %api.base_url(), "starting bookshelf MCP server");

    let dispatcher = Dispatcher::new(Arc::new(BookStore::new(api)));
    let _initial_fetch = dispatcher.spawn(Intent::Refresh);

    let server = BookshelfMcpServer::new(dispatcher);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

// =============================================================================
// MCP Server
// =============================================================================

#[derive(Clone)]
struct BookshelfMcpServer {
    dispatcher: Dispatcher<HttpBookApi>,
    form: Arc<RwLock<BookForm>>,
    tool_router: ToolRouter<Self>,
}

impl BookshelfMcpServer {
    fn new(dispatcher: Dispatcher<HttpBookApi>) -> Self {
        Self {
            dispatcher,
            form: Arc::new(RwLock::new(BookForm::new())),
            tool_router: Self::tool_router(),
        }
    }

    fn store(&self) -> &BookStore<HttpBookApi> {
        self.dispatcher.store()
    }

    fn form_read(&self) -> Result<RwLockReadGuard<'_, BookForm>, McpError> {
        self.form
            .read()
            .map_err(|_| McpError::internal_error("Lock poisoned", None))
    }

    fn form_write(&self) -> Result<RwLockWriteGuard<'_, BookForm>, McpError> {
        self.form
            .write()
            .map_err(|_| McpError::internal_error("Lock poisoned", None))
    }

    /// 現在のフォーム・一覧・ステータスを描画する。
    fn render(&self) -> Result<String, McpError> {
        let books = self.store().books();
        let status = self.store().status();
        let form = self.form_read()?;
        Ok(form.render(&books, status.as_deref()))
    }

    /// Intentを実行し、見出し + 最新の描画を返す。
    async fn dispatch(&self, intent: Intent, headline: String) -> Result<CallToolResult, McpError> {
        self.dispatcher
            .run(intent)
            .await
            .map_err(Self::to_mcp_error)?;
        let view = self.render()?;
        Ok(CallToolResult::success(vec![Content::text(format!(
            "{headline}\n\n{view}"
        ))]))
    }

    fn to_mcp_error(e: AppError) -> McpError {
        match e {
            AppError::Domain(d) => McpError::invalid_params(format!("{d}"), None),
            other => McpError::internal_error(format!("{other}"), None),
        }
    }
}

// =============================================================================
// ServerHandler impl
// =============================================================================

impl ServerHandler for BookshelfMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "bookshelf-mcp".to_string(),
                title: Some("Bookshelf MCP — Book list form".to_string()),
                description: Some(
                    "Create, list, update and delete books on a REST backend. \
                     Every change re-fetches the whole list."
                        .to_string(),
                ),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "A single form with a toggleable book list.\n\
                 \n\
                 Create: `draft` (title, author) → `submit`.\n\
                 Edit/remove: `toggle_list` → `select` (position or id) → `update`/`delete`.\n\
                 `view` shows the current screen; `refresh` re-fetches; `search` queries by title or author."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool_ctx = ToolCallContext::new(self, request, context);
        self.tool_router.call(tool_ctx).await
    }
}

// =============================================================================
// Request types
// =============================================================================

/// クリック失敗時に次の操作を添えて返す。
fn click_error(e: DomainError) -> McpError {
    let hint = match e {
        DomainError::ListHidden => "Use `toggle_list` first.",
        _ => "Run `view` to see the list.",
    };
    McpError::invalid_params(format!("{e}. {hint}"), None)
}

fn format_search_results(field: SearchField, query: &str, results: &BookList) -> String {
    if results.is_empty() {
        return format!("No books with {} \"{}\".", field.as_str(), query);
    }
    let mut output = format!(
        "Search {} \"{}\" ({} hits)\n\n",
        field.as_str(),
        query,
        results.len()
    );
    for (i, book) in results.iter().enumerate() {
        output.push_str(&format!(
            "{}. Title: {} / Author: {} ({})\n",
            i + 1,
            book.title(),
            book.author(),
            book.id()
        ));
    }
    output
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpNoParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpDraftRequest {
    #[schemars(description = "Title field content (omit to keep current)")]
    pub title: Option<String>,
    #[schemars(description = "Author field content (omit to keep current)")]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpSelectRequest {
    #[schemars(description = "1-based position in the list shown by `view` (e.g. 2)")]
    pub position: Option<usize>,
    #[schemars(description = "Book id as returned by the backend. Use instead of position.")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpSearchRequest {
    #[schemars(description = "Field to search: title or author")]
    pub field: String,
    #[schemars(description = "Exact value to match (must not be empty)")]
    pub query: String,
}

// =============================================================================
// Tool implementations
// =============================================================================

#[tool_router]
impl BookshelfMcpServer {
    #[tool(
        name = "view",
        description = "Show the form (draft title/author), the selected book, and the book list if it is shown. Does not contact the backend.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn view(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpNoParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(self.render()?)]))
    }

    #[tool(
        name = "draft",
        description = "Type into the create form. Only the given fields change. Empty strings are allowed.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn draft(
        &self,
        Parameters(req): Parameters<McpDraftRequest>,
    ) -> Result<CallToolResult, McpError> {
        {
            let mut form = self.form_write()?;
            if let Some(title) = req.title {
                form.set_title(title);
            }
            if let Some(author) = req.author {
                form.set_author(author);
            }
        }
        Ok(CallToolResult::success(vec![Content::text(self.render()?)]))
    }

    #[tool(
        name = "submit",
        description = "Press \"Create Book\": send the draft to the backend, clear the form, then re-fetch the list.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    async fn submit(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpNoParams>,
    ) -> Result<CallToolResult, McpError> {
        let intent = self.form_write()?.submit();
        let headline = match &intent {
            Intent::Create(draft) => format!("Created: \"{}\" by {}", draft.title, draft.author),
            _ => String::from("Created"),
        };
        self.dispatch(intent, headline).await
    }

    #[tool(
        name = "toggle_list",
        description = "Press \"List\": show or hide the book list. Does not contact the backend.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn toggle_list(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpNoParams>,
    ) -> Result<CallToolResult, McpError> {
        self.form_write()?.toggle_list();
        Ok(CallToolResult::success(vec![Content::text(self.render()?)]))
    }

    #[tool(
        name = "close_list",
        description = "Press \"Close\": hide the book list.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn close_list(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpNoParams>,
    ) -> Result<CallToolResult, McpError> {
        self.form_write()?.close_list();
        Ok(CallToolResult::success(vec![Content::text(self.render()?)]))
    }

    #[tool(
        name = "select",
        description = "Click a book in the shown list, by 1-based position or by id. Replaces any previous selection.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn select(
        &self,
        Parameters(req): Parameters<McpSelectRequest>,
    ) -> Result<CallToolResult, McpError> {
        let books = self.store().books();
        self.form_write()?
            .click(&books, req.position, req.id.as_deref())
            .map_err(click_error)?;
        Ok(CallToolResult::success(vec![Content::text(self.render()?)]))
    }

    #[tool(
        name = "update",
        description = "Press \"Update\": re-send the selected book unchanged, clear the selection, then re-fetch. No-op without a selection.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    async fn update(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpNoParams>,
    ) -> Result<CallToolResult, McpError> {
        let intent = self.form_write()?.update_selected();
        match intent {
            Some(intent) => {
                let headline = match &intent {
                    Intent::Update { id, book } => format!("Updated: \"{}\" ({})", book.title(), id),
                    _ => String::from("Updated"),
                };
                self.dispatch(intent, headline).await
            }
            None => Ok(CallToolResult::success(vec![Content::text(
                "Nothing selected. No request sent.",
            )])),
        }
    }

    #[tool(
        name = "delete",
        description = "Press \"Delete\": remove the selected book on the backend, clear the selection, then re-fetch. No-op without a selection.",
        annotations(
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    async fn delete(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpNoParams>,
    ) -> Result<CallToolResult, McpError> {
        let intent = self.form_write()?.delete_selected();
        match intent {
            Some(intent) => {
                let headline = match &intent {
                    Intent::Delete(id) => format!("Deleted: {id}"),
                    _ => String::from("Deleted"),
                };
                self.dispatch(intent, headline).await
            }
            None => Ok(CallToolResult::success(vec![Content::text(
                "Nothing selected. No request sent.",
            )])),
        }
    }

    #[tool(
        name = "refresh",
        description = "Re-fetch the whole book list from the backend.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    async fn refresh(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpNoParams>,
    ) -> Result<CallToolResult, McpError> {
        let headline = String::from("Refreshed");
        self.dispatch(Intent::Refresh, headline).await
    }

    #[tool(
        name = "search",
        description = "Ask the backend for books whose title or author equals the query. Results are shown here only; the list is not changed.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    async fn search(
        &self,
        Parameters(req): Parameters<McpSearchRequest>,
    ) -> Result<CallToolResult, McpError> {
        let field: SearchField = req
            .field
            .parse()
            .map_err(|e: DomainError| Self::to_mcp_error(e.into()))?;
        let results = self
            .store()
            .search(field, &req.query)
            .await
            .map_err(Self::to_mcp_error)?;
        Ok(CallToolResult::success(vec![Content::text(
            format_search_results(field, &req.query, &results),
        )]))
    }
}
