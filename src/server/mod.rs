use crate::config::Config;
use crate::library::VideoLibrary;
use crate::transcode::Transcoder;
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use vodforge_av::{FfmpegEngine, FfprobeProber};
use vodforge_db::pool::init_pool;

pub mod error;
pub mod routes_video;

pub use error::ApiError;

/// URL prefix the media root is served under.
pub const PUBLIC_PREFIX: &str = "/public";

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub transcoder: Arc<Transcoder>,
    pub library: VideoLibrary,
}

impl AppContext {
    /// Wire the production collaborators: the SQLite store at
    /// `storage.database_path`, ffprobe and ffmpeg.
    pub fn from_config(config: Config) -> Result<Self> {
        let db_path = &config.storage.database_path;
        tracing::info!("Initializing database at {}", db_path.display());
        let db = init_pool(db_path, config.storage.pool_size)
            .with_context(|| format!("Failed to open database {:?}", db_path))?;

        let tools = config.tools.paths();
        let transcoder = Transcoder::new(
            config.catalog(),
            config.transcode.encode_settings(),
            config.storage.media_root.clone(),
            Arc::new(FfprobeProber::new(tools.ffprobe)),
            Arc::new(FfmpegEngine::new(tools.ffmpeg)),
            db.clone(),
            config.transcode.max_concurrent_jobs,
        );

        Ok(Self {
            config: Arc::new(config),
            transcoder: Arc::new(transcoder),
            library: VideoLibrary::new(db),
        })
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let body_limit = ctx.config.server.max_upload_bytes();
    let media_root = ctx.transcoder.media_root().to_path_buf();

    Router::new()
        .route("/health", get(health_check))
        .merge(routes_video::video_routes())
        .nest_service(PUBLIC_PREFIX, ServeDir::new(media_root))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    tokio::fs::create_dir_all(&config.storage.media_root)
        .await
        .with_context(|| format!("Failed to create media root {:?}", config.storage.media_root))?;

    let ctx = AppContext::from_config(config)?;
    tracing::info!(
        "Serving {:?} under {}, {} concurrent jobs",
        ctx.transcoder.media_root(),
        PUBLIC_PREFIX,
        ctx.config.transcode.max_concurrent_jobs
    );

    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received; in-flight uploads will finish");
}
