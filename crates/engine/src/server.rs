// crates/engine/src/server.rs
//! Single-threaded debug HTTP server.
//!
//! Routing is a pure function from [`RouteRequest`] to [`RouteResponse`] so it
//! can be exercised without a socket; [`DebugServer`] only moves bytes between
//! `tiny_http` and the router, one request at a time.

use crate::error::{EngineError, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tiny_http::{Header, Method, Response, Server};

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>ytdiag debug server</title></head>
<body>
    <h1>✅ ytdiag debug server working</h1>
    <ul>
        <li><a href="/health">Health</a></li>
        <li><a href="/api/test">Test API</a></li>
        <li><a href="/api/projects">Projects API</a></li>
        <li><a href="/api/svg_meta?project=test-project">SVG metadata</a></li>
    </ul>
    <pre id="status">checking...</pre>
    <script src="/main.js"></script>
</body>
</html>
"#;

const MAIN_JS: &str = r#"fetch('/health')
  .then((r) => r.json())
  .then((body) => { document.getElementById('status').textContent = JSON.stringify(body); })
  .catch((err) => { document.getElementById('status').textContent = 'error: ' + err; });
"#;

const SAMPLE_MARKDOWN: &str = "title: Test Project\ndate: 2025-01-15\ntheme: default\n\n# Test Content\n\nThis is test markdown content for validation testing.";

const MIN_PROJECT_LEN: usize = 3;
const MIN_MARKDOWN_LEN: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
    pub projects_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            projects_dir: PathBuf::from("output/projects"),
        }
    }
}

/// Transport-independent view of an incoming request.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub method: Method,
    /// Path plus optional `?query`.
    pub url: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl RouteResponse {
    fn json(status: u16, value: &Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string(),
        }
    }

    fn text(status: u16, content_type: &'static str, body: &str) -> Self {
        Self {
            status,
            content_type,
            body: body.to_string(),
        }
    }
}

/// Dispatch one request.
#[must_use]
pub fn route(request: &RouteRequest, config: &ServerConfig) -> RouteResponse {
    let (path, query) = request
        .url
        .split_once('?')
        .unwrap_or((request.url.as_str(), ""));

    let allowed = match path {
        "/" | "/main.js" | "/health" | "/api/test" | "/api/projects" | "/api/svg_meta" => Method::Get,
        "/api/generate" => Method::Post,
        _ => return RouteResponse::json(404, &json!({"error": "Not found"})),
    };
    if request.method != allowed {
        return RouteResponse::json(405, &json!({"error": "Method not allowed"}));
    }

    match path {
        "/" => RouteResponse::text(200, "text/html; charset=utf-8", INDEX_HTML),
        "/main.js" => RouteResponse::text(200, "application/javascript", MAIN_JS),
        "/health" => RouteResponse::json(200, &json!({"status": "ok"})),
        "/api/test" => RouteResponse::json(200, &json!({"status": "ok", "message": "API working"})),
        "/api/projects" => RouteResponse::json(
            200,
            &json!({"projects": list_projects(&config.projects_dir)}),
        ),
        "/api/svg_meta" => svg_meta(&form_value(query, "project")),
        _ => generate(&request.body),
    }
}

fn form_value(encoded: &str, key: &str) -> String {
    url::form_urlencoded::parse(encoded.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectEntry {
    pub name: String,
    pub svg: Option<String>,
    pub has_video: bool,
    pub created: Option<String>,
}

/// Sub-directories of `dir`, sorted by name. A missing directory is empty.
#[must_use]
pub fn list_projects(dir: &Path) -> Vec<ProjectEntry> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut projects: Vec<_> = entries
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_ok_and(|ft| ft.is_dir()))
        .map(|e| project_entry(&e.path()))
        .collect();
    projects.sort_by(|a, b| a.name.cmp(&b.name));
    projects
}

fn project_entry(dir: &Path) -> ProjectEntry {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut svgs: Vec<String> = std::fs::read_dir(dir)
        .into_iter()
        .flatten()
        .filter_map(std::result::Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".svg"))
        .collect();
    svgs.sort();

    let created = std::fs::metadata(dir)
        .and_then(|m| m.modified())
        .ok()
        .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d").to_string());

    ProjectEntry {
        name,
        svg: svgs.into_iter().next(),
        has_video: dir.join("video.mp4").is_file(),
        created,
    }
}

fn svg_meta(project: &str) -> RouteResponse {
    if project.is_empty() {
        return RouteResponse::json(400, &json!({"error": "No project specified"}));
    }
    RouteResponse::json(
        200,
        &json!({
            "project": project,
            "title": "Test Project Title",
            "markdown": SAMPLE_MARKDOWN,
            "markdown_content": SAMPLE_MARKDOWN,
            "theme": "default",
            "template": "modern",
            "voice": "en-US",
            "font_size": "medium",
        }),
    )
}

fn generate(body: &str) -> RouteResponse {
    let project = form_value(body, "project");
    let markdown = form_value(body, "markdown");
    tracing::debug!(project = %project, markdown_len = markdown.chars().count(), "generate request");

    let invalid = if project.chars().count() < MIN_PROJECT_LEN {
        Some(format!("Project name must be at least {MIN_PROJECT_LEN} characters"))
    } else if markdown.chars().count() < MIN_MARKDOWN_LEN {
        Some(format!("Content must be at least {MIN_MARKDOWN_LEN} characters"))
    } else {
        None
    };

    match invalid {
        Some(message) => RouteResponse::json(
            400,
            &json!({"error": message, "validation_errors": [message]}),
        ),
        None => RouteResponse::json(
            200,
            &json!({
                "message": format!("Project \"{project}\" generated successfully"),
                "project": project,
            }),
        ),
    }
}

/// Bound listener. Requests are served sequentially on the calling thread.
pub struct DebugServer {
    server: Server,
    config: ServerConfig,
}

impl DebugServer {
    /// # Errors
    /// Returns [`EngineError::Bind`] when the address cannot be bound.
    pub fn bind(config: ServerConfig) -> Result<Self> {
        let server = Server::http(&config.bind).map_err(|e| EngineError::Bind {
            addr: config.bind.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { server, config })
    }

    /// Actual bound address (useful with port 0).
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve until the listener closes, or until `limit` requests were handled.
    ///
    /// # Errors
    /// Returns an error when receiving a request fails.
    pub fn serve(&self, limit: Option<usize>) -> Result<()> {
        let mut handled = 0usize;
        while limit.is_none_or(|max| handled < max) {
            let mut request = self.server.recv()?;
            handled += 1;

            let mut body = String::new();
            if let Err(e) = request.as_reader().read_to_string(&mut body) {
                tracing::warn!("failed to read request body: {e}");
            }

            let routed = route(
                &RouteRequest {
                    method: request.method().clone(),
                    url: request.url().to_string(),
                    body,
                },
                &self.config,
            );
            tracing::info!(
                method = %request.method(),
                url = request.url(),
                status = routed.status,
                "request"
            );

            let mut response = Response::from_string(routed.body).with_status_code(routed.status);
            if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], routed.content_type.as_bytes()) {
                response.add_header(header);
            }
            if let Err(e) = request.respond(response) {
                tracing::warn!("failed to send response: {e}");
            }
        }
        Ok(())
    }
}
