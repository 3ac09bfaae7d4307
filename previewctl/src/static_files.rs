//! HTTP handler for serving the build output directory.

use axum::{
    body::Body,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};

/// File-resolution base for every request.
///
/// The root is carried in handler state and joined per request; the process
/// working directory is never changed.
#[derive(Debug, Clone)]
pub struct ServeRoot {
    root: PathBuf,
}

impl ServeRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a request path onto a file under the root.
    ///
    /// Directory paths resolve to their `index.html`. Anything that escapes
    /// the root after canonicalization, or that is not an existing file,
    /// resolves to `None`.
    // TODO: percent-decode request paths before resolution
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let relative = request_path.trim_start_matches('/');
        let mut full_path = self.root.join(relative);

        if full_path.is_dir() {
            full_path = full_path.join("index.html");
        }

        let canonical_full = full_path.canonicalize().ok()?;
        let canonical_root = self.root.canonicalize().ok()?;

        if !canonical_full.starts_with(&canonical_root) {
            return None;
        }

        canonical_full.is_file().then_some(canonical_full)
    }
}

/// Serve a file from the build output directory.
pub async fn serve_asset(State(root): State<Arc<ServeRoot>>, uri: Uri) -> Response {
    let path = uri.path();

    let Some(file_path) = root.resolve(path) else {
        debug!("no asset for {path}");
        return StatusCode::NOT_FOUND.into_response();
    };

    let body = match tokio::fs::read(&file_path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!("failed to read {}: {err}", file_path.display());
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mime = mime_guess::from_path(&file_path).first_or_octet_stream();

    // Vite hashed assets can be cached indefinitely; everything else
    // (index.html in particular) must be revalidated
    let cache_control = if path.trim_start_matches('/').starts_with("assets/") {
        "public, max-age=31536000, immutable"
    } else {
        "no-cache"
    };

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, cache_control)
        .body(Body::from(body))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::get};
    use axum_test::TestServer;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn build_output() -> TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>ok</h1>").unwrap();
        fs::write(dir.path().join("main.js"), "console.log('ok');").unwrap();
        fs::write(dir.path().join("style.css"), "body { margin: 0; }").unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/app.4f2a1c.js"), "export {};").unwrap();
        dir
    }

    fn test_server(dir: &TempDir) -> TestServer {
        let app = Router::new()
            .fallback(get(serve_asset))
            .with_state(Arc::new(ServeRoot::new(dir.path())));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn root_serves_index_html() {
        let dir = build_output();
        let server = test_server(&dir);

        let response = server.get("/").await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").map(|v| v.to_str().unwrap()),
            Some("text/html")
        );
        assert!(response.text().contains("<h1>ok</h1>"));
    }

    #[tokio::test]
    async fn missing_file_returns_not_found() {
        let dir = build_output();
        let server = test_server(&dir);

        let response = server.get("/missing.txt").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn js_and_css_get_their_mime_types() {
        let dir = build_output();
        let server = test_server(&dir);

        let js = server.get("/main.js").await;
        js.assert_status(StatusCode::OK);
        let js_type = js.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(js_type.contains("javascript"));

        let css = server.get("/style.css").await;
        css.assert_status(StatusCode::OK);
        assert_eq!(
            css.headers().get("content-type").map(|v| v.to_str().unwrap()),
            Some("text/css")
        );
    }

    #[tokio::test]
    async fn hashed_assets_are_cached_immutably() {
        let dir = build_output();
        let server = test_server(&dir);

        let response = server.get("/assets/app.4f2a1c.js").await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.headers().get("cache-control").map(|v| v.to_str().unwrap()),
            Some("public, max-age=31536000, immutable")
        );

        let index = server.get("/index.html").await;
        assert_eq!(
            index.headers().get("cache-control").map(|v| v.to_str().unwrap()),
            Some("no-cache")
        );
    }

    #[tokio::test]
    async fn directory_without_index_returns_not_found() {
        let dir = build_output();
        fs::create_dir(dir.path().join("images")).unwrap();
        let server = test_server(&dir);

        let response = server.get("/images").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[test]
    fn resolve_blocks_path_traversal() {
        let dir = build_output();
        let outside = dir.path().parent().unwrap().join("outside.txt");
        fs::write(&outside, "NOPE").unwrap();

        let root = ServeRoot::new(dir.path());

        assert!(root.resolve("/index.html").is_some());
        assert!(root.resolve("/../outside.txt").is_none());

        fs::remove_file(&outside).unwrap();
    }

    #[test]
    fn resolve_maps_directories_to_index() {
        let dir = build_output();
        let root = ServeRoot::new(dir.path());

        let resolved = root.resolve("/").unwrap();
        assert!(resolved.ends_with("index.html"));
    }
}
