use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::{
    error::{QuizError, QuizResult},
    model::{ExportDocument, Question, Quiz, Style},
};

/// Name of the rendered artifact inside `out_dir`; also the GET route that
/// serves it.
pub const VIDEO_FILENAME: &str = "video.mp4";
/// Props document handed to the renderer subprocess.
pub const PROPS_FILENAME: &str = "inputProps.json";

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory holding the props document and the rendered artifact.
    pub out_dir: PathBuf,
    /// Renderer executable, invoked as
    /// `<renderer> render --props <props> --out <artifact>`.
    pub renderer: PathBuf,
    /// Base URL advertised in download links.
    pub public_base_url: String,
    /// Server-side cap on a single render; the subprocess is killed past it.
    pub render_timeout: Duration,
}

impl ServerConfig {
    pub fn new(port: u16, out_dir: impl Into<PathBuf>, renderer: impl Into<PathBuf>) -> Self {
        Self {
            port,
            out_dir: out_dir.into(),
            renderer: renderer.into(),
            public_base_url: format!("http://localhost:{port}"),
            render_timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.out_dir.join(VIDEO_FILENAME)
    }

    pub fn props_path(&self) -> PathBuf {
        self.out_dir.join(PROPS_FILENAME)
    }
}

#[derive(Clone)]
pub struct AppState {
    cfg: Arc<ServerConfig>,
    /// At most one render in flight per destination artifact. This server
    /// owns a single destination, so a single lock serializes them all.
    render_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    pub fn new(cfg: ServerConfig) -> Self {
        Self {
            cfg: Arc::new(cfg),
            render_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub questions: Vec<Question>,
    pub style: Style,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    pub message: String,
    pub download_link: String,
}

#[derive(Debug, serde::Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, serde::Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stderr: Option<String>,
}

/// An error ready to leave the server: HTTP status, user-visible message,
/// and (for renderer failures) the subprocess stderr as a diagnostic.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    stderr: Option<String>,
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        let status = match &err {
            QuizError::InvalidInput(_) | QuizError::Validation(_) => StatusCode::BAD_REQUEST,
            QuizError::AssetNotFound(_) => StatusCode::NOT_FOUND,
            QuizError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            QuizError::Render(_) | QuizError::Serde(_) | QuizError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            error: err.to_string(),
            stderr: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self.error, "request failed");
        } else {
            tracing::warn!(error = %self.error, "request rejected");
        }
        (
            self.status,
            Json(ErrorBody {
                error: self.error,
                stderr: self.stderr,
            }),
        )
            .into_response()
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/render", post(render))
        .route("/video.mp4", get(video))
        .layer(
            // The authoring front end is served from another origin.
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve(cfg: ServerConfig) -> QuizResult<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let state = AppState::new(cfg);
    tracing::info!(%addr, "render backend listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| QuizError::Other(anyhow::anyhow!("bind {addr}: {e}")))?;
    axum::serve(listener, app(state))
        .await
        .map_err(|e| QuizError::Other(anyhow::anyhow!("server error: {e}")))
}

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        message: "render backend is running".to_string(),
    })
}

#[tracing::instrument(skip(state, req), fields(questions = req.questions.len()))]
async fn render(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> Result<Json<RenderResponse>, ApiError> {
    let quiz = Quiz {
        questions: req.questions,
        style: req.style,
    };
    // Reject bad input before taking the lock or touching the renderer.
    quiz.validate()?;

    let _in_flight = state.render_lock.lock().await;

    let props_path = state.cfg.props_path();
    let doc = ExportDocument::new(&quiz);
    tokio::fs::create_dir_all(&state.cfg.out_dir)
        .await
        .map_err(|e| {
            QuizError::render(format!(
                "create output dir '{}': {e}",
                state.cfg.out_dir.display()
            ))
        })?;
    tokio::fs::write(&props_path, doc.to_json()?)
        .await
        .map_err(|e| QuizError::render(format!("write props '{}': {e}", props_path.display())))?;

    run_renderer(&state.cfg, &props_path).await?;

    let artifact = state.cfg.artifact_path();
    if !artifact.exists() {
        return Err(QuizError::render(format!(
            "renderer reported success but '{}' is missing",
            artifact.display()
        ))
        .into());
    }

    tracing::info!(artifact = %artifact.display(), "render complete");
    Ok(Json(RenderResponse {
        message: "video ready".to_string(),
        download_link: format!("{}/{VIDEO_FILENAME}", state.cfg.public_base_url),
    }))
}

async fn run_renderer(cfg: &ServerConfig, props_path: &std::path::Path) -> Result<(), ApiError> {
    let artifact = cfg.artifact_path();
    tracing::info!(renderer = %cfg.renderer.display(), "invoking renderer");

    let mut cmd = tokio::process::Command::new(&cfg.renderer);
    cmd.arg("render")
        .arg("--props")
        .arg(props_path)
        .arg("--out")
        .arg(&artifact)
        .stdin(std::process::Stdio::null())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(cfg.render_timeout, cmd.output()).await {
        Err(_) => {
            return Err(QuizError::render(format!(
                "render timed out after {:?}",
                cfg.render_timeout
            ))
            .into());
        }
        Ok(Err(e)) => {
            return Err(QuizError::render(format!(
                "failed to launch renderer '{}': {e}",
                cfg.renderer.display()
            ))
            .into());
        }
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: format!("renderer exited with {}", output.status),
            stderr: (!stderr.is_empty()).then_some(stderr),
        });
    }

    Ok(())
}

async fn video(State(state): State<AppState>) -> Result<Response, ApiError> {
    let artifact = state.cfg.artifact_path();
    match tokio::fs::read(&artifact).await {
        Ok(bytes) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "video/mp4")],
            bytes,
        )
            .into_response()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(QuizError::asset_not_found(
            "no rendered video yet; trigger a render first",
        )
        .into()),
        Err(e) => {
            Err(QuizError::render(format!("read '{}': {e}", artifact.display())).into())
        }
    }
}
