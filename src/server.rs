//! HTTP API server: axum router and request handlers.
//!
//! The server runs on the tokio async runtime while the render thread
//! runs on a plain `std::thread`. Communication is via `std::sync::mpsc`.
//! Choosing a clock mode here plays the part of the keypress menu: the
//! render thread keeps animating the chosen mode until told otherwise.
//!
//! ## Rust concepts
//! - `async fn` and `.await` for non-blocking I/O
//! - axum extractors: `State`, `Json`
//! - `Arc` for sharing state across async tasks
//! - `tower-http` middleware for CORS and request tracing

use crate::clock::{self, ClockMode, ClockTime};
use crate::frame::Frame;
use crate::render::{ClockState, ClockStatus, RenderCommand};
use crate::gadget::LinkState;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// ── App State ────────────────────────────────────────────────────────

/// Shared application state, passed to every handler via axum's `State` extractor.
///
/// axum clones the state for each request, so everything inside must be
/// cheap to clone: a channel sender and an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Channel to send commands to the render thread
    pub command_tx: Sender<RenderCommand>,
    /// Shared clock status (render thread writes, handlers read)
    pub status: Arc<Mutex<ClockStatus>>,
}

// ── OpenAPI Documentation ────────────────────────────────────────────

#[derive(OpenApi)]
#[openapi(
    paths(
        get_status,
        get_modes,
        get_frame,
        post_mode,
        post_stop,
        post_brightness,
        post_render,
    ),
    components(schemas(
        ClockStatus,
        ClockState,
        ClockMode,
        LinkState,
        ModeInfo,
        ModeRequest,
        BrightnessRequest,
        RenderRequest,
        FrameView,
        LedView,
    )),
    tags(
        (name = "clock", description = "Clock control endpoints"),
        (name = "frames", description = "Frame inspection and preview"),
        (name = "system", description = "System status endpoints"),
    ),
    info(
        title = "LED Cube Clock API",
        version = env!("CARGO_PKG_VERSION"),
        description = "HTTP API for choosing what a 4x4x4 LED cube clock shows"
    )
)]
pub struct ApiDoc;

// ── Request/Response types ───────────────────────────────────────────

#[derive(Serialize, utoipa::ToSchema)]
pub struct ModeInfo {
    mode: ClockMode,
    description: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ModeRequest {
    /// Clock mode to animate
    #[schema(example = "paddle-clock")]
    mode: ClockMode,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct BrightnessRequest {
    /// Brightness level (0-100)
    #[schema(example = 75, minimum = 0, maximum = 100)]
    value: u8,
}

/// Render a single frame for an arbitrary time without touching the cube.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RenderRequest {
    mode: ClockMode,
    /// 0-23
    #[schema(example = 10)]
    hour: u32,
    /// 0-59
    #[schema(example = 37)]
    minute: u32,
    /// 0-59
    #[schema(example = 5)]
    second: u32,
    /// Sub-second tick, 0-11
    #[serde(default)]
    #[schema(default = 0)]
    sub_tick: u32,
    /// Fill-test position, 0-63
    #[serde(default)]
    #[schema(default = 0)]
    fill_pos: u8,
}

/// One lit LED of a frame.
#[derive(Debug, PartialEq, Serialize, utoipa::ToSchema)]
pub struct LedView {
    i: i32,
    j: i32,
    k: i32,
    r: u8,
    g: u8,
    b: u8,
}

/// A packed frame plus its decoded, lit LEDs.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FrameView {
    /// The 96 packed bytes as lowercase hex
    hex: String,
    /// Lit LEDs only; channels are the 4-bit device levels scaled to 0-240
    leds: Vec<LedView>,
}

impl From<&Frame> for FrameView {
    fn from(frame: &Frame) -> Self {
        let leds = frame
            .pixels()
            .filter(|(_, _, _, c)| !c.is_black())
            .map(|(i, j, k, c)| LedView {
                i,
                j,
                k,
                r: c.r,
                g: c.g,
                b: c.b,
            })
            .collect();

        Self {
            hex: frame.to_hex(),
            leds,
        }
    }
}

// ── Router ───────────────────────────────────────────────────────────

/// Build the axum router with all API endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(
            SwaggerUi::new("/docs")
                .url("/api-docs/openapi.json", ApiDoc::openapi())
                .config(utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"]).validator_url("none")),
        )
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/modes", get(get_modes))
        .route("/api/v1/frame", get(get_frame))
        .route("/api/v1/clock/mode", post(post_mode))
        .route("/api/v1/clock/stop", post(post_stop))
        .route("/api/v1/brightness", post(post_brightness))
        .route("/api/v1/render", post(post_render))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Forward a command to the render thread.
fn send_command(
    state: &AppState,
    cmd: RenderCommand,
) -> Result<StatusCode, (StatusCode, String)> {
    state.command_tx.send(cmd).map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Render thread gone".to_string(),
        )
    })?;

    Ok(StatusCode::OK)
}

// ── Handlers ─────────────────────────────────────────────────────────

/// GET /api/v1/status — return current clock state
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "system",
    responses(
        (status = 200, description = "Current clock status", body = ClockStatus)
    )
)]
async fn get_status(State(state): State<AppState>) -> Json<ClockStatus> {
    let status = state.status.lock().unwrap().clone();
    Json(status)
}

/// GET /api/v1/modes — list the available clock modes
#[utoipa::path(
    get,
    path = "/api/v1/modes",
    tag = "clock",
    responses(
        (status = 200, description = "Available clock modes", body = Vec<ModeInfo>)
    )
)]
async fn get_modes() -> Json<Vec<ModeInfo>> {
    let modes = ClockMode::ALL
        .into_iter()
        .map(|mode| ModeInfo {
            mode,
            description: mode.description().to_string(),
        })
        .collect();
    Json(modes)
}

/// GET /api/v1/frame — the frame most recently sent to the cube
#[utoipa::path(
    get,
    path = "/api/v1/frame",
    tag = "frames",
    responses(
        (status = 200, description = "Last submitted frame", body = FrameView),
        (status = 404, description = "No frame submitted yet")
    )
)]
async fn get_frame(
    State(state): State<AppState>,
) -> Result<Json<FrameView>, (StatusCode, String)> {
    let last_frame = state.status.lock().unwrap().last_frame;
    match last_frame {
        Some(frame) => Ok(Json(FrameView::from(&frame))),
        None => Err((StatusCode::NOT_FOUND, "No frame submitted yet".to_string())),
    }
}

/// POST /api/v1/clock/mode — start or switch the clock animation
#[utoipa::path(
    post,
    path = "/api/v1/clock/mode",
    tag = "clock",
    request_body = ModeRequest,
    responses(
        (status = 200, description = "Mode change queued"),
        (status = 500, description = "Render thread gone")
    )
)]
async fn post_mode(
    State(state): State<AppState>,
    Json(req): Json<ModeRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    send_command(&state, RenderCommand::SetMode(req.mode))
}

/// POST /api/v1/clock/stop — blank the cube and go idle
#[utoipa::path(
    post,
    path = "/api/v1/clock/stop",
    tag = "clock",
    responses(
        (status = 200, description = "Clock stopped"),
    )
)]
async fn post_stop(State(state): State<AppState>) -> Result<StatusCode, (StatusCode, String)> {
    send_command(&state, RenderCommand::Stop)
}

/// POST /api/v1/brightness — set display brightness (0-100)
#[utoipa::path(
    post,
    path = "/api/v1/brightness",
    tag = "clock",
    request_body = BrightnessRequest,
    responses(
        (status = 200, description = "Brightness updated"),
    )
)]
async fn post_brightness(
    State(state): State<AppState>,
    Json(req): Json<BrightnessRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    send_command(&state, RenderCommand::SetBrightness(req.value))
}

/// POST /api/v1/render — preview a mode at any time of day
#[utoipa::path(
    post,
    path = "/api/v1/render",
    tag = "frames",
    request_body = RenderRequest,
    responses(
        (status = 200, description = "Rendered frame", body = FrameView),
        (status = 400, description = "Time or fill position out of range")
    )
)]
async fn post_render(Json(req): Json<RenderRequest>) -> Result<Json<FrameView>, (StatusCode, String)> {
    let time = ClockTime::new(req.hour, req.minute, req.second, req.sub_tick);
    if !time.is_valid() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Invalid time {:02}:{:02}:{:02} (sub-tick {})",
                req.hour, req.minute, req.second, req.sub_tick
            ),
        ));
    }
    if req.fill_pos > 63 {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Fill position must be 0-63, got {}", req.fill_pos),
        ));
    }

    let frame = clock::render_frame(req.mode, time, req.fill_pos);
    Ok(Json(FrameView::from(&frame)))
}
