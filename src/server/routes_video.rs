//! Video routes: upload, list and lookup.

use std::path::{Path, PathBuf};

use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, Path as UrlPath, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use vodforge_av::{CleanupGuard, JobWorkspace};
use vodforge_db::VideoRecord;
use vodforge_media::hls;

use super::{error::ApiError, AppContext};

/// Multipart field carrying the file.
pub const VIDEO_FIELD: &str = "video";
/// Optional multipart field carrying the display title.
pub const TITLE_FIELD: &str = "title";

pub fn video_routes() -> Router<AppContext> {
    Router::new()
        .route("/video", get(list_videos))
        .route("/video/get/:id", get(get_video))
        .route("/video/upload", post(upload_video))
}

#[derive(Debug, Serialize)]
pub struct VideoListResponse {
    pub videos: Vec<VideoRecord>,
}

#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub message: String,
    pub video: VideoRecord,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub flag: u8,
    pub message: String,
    pub video_path: String,
    pub playback_url: String,
    pub video: VideoRecord,
}

pub async fn list_videos(State(ctx): State<AppContext>) -> Result<Json<VideoListResponse>, ApiError> {
    let videos = ctx.library.list_videos()?;
    Ok(Json(VideoListResponse { videos }))
}

pub async fn get_video(
    State(ctx): State<AppContext>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<VideoResponse>, ApiError> {
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid video id: {id}")))?;

    let video = ctx.library.get_video(id)?;
    Ok(Json(VideoResponse {
        message: "Video fetched successfully".to_string(),
        video,
    }))
}

/// An upload written to its job workspace, not yet transcoded.
///
/// Until handed to the transcoder, dropping it (a rejected upload or a
/// client that disconnected mid-body) removes the workspace.
struct Staged {
    workspace: JobWorkspace,
    source: PathBuf,
    original_name: String,
    bytes: u64,
    guard: CleanupGuard,
}

pub async fn upload_video(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut staged = None;
    let mut title = None;

    receive(&ctx, &mut multipart, &mut staged, &mut title).await?;

    let mut staged = match staged {
        Some(s) if s.bytes > 0 => s,
        _ => return Err(ApiError::bad_request("Please upload a file")),
    };

    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or(staged.original_name);
    let job_id = staged.workspace.job_id();

    tracing::info!(%job_id, bytes = staged.bytes, %title, "upload received");

    // From here the job task owns cleanup, even if this request is dropped.
    staged.guard.disarm();
    let published = ctx
        .transcoder
        .spawn(staged.workspace, staged.source, Some(title))
        .await
        .map_err(|e| ApiError::internal(format!("Transcode task failed: {e}")))??;

    Ok(Json(UploadResponse {
        flag: 1,
        message: "Video uploaded successfully".to_string(),
        video_path: published.master_manifest_path.to_string_lossy().into_owned(),
        playback_url: format!("/public/{}/{}", job_id, hls::master_manifest_name()),
        video: published.record,
    }))
}

async fn receive(
    ctx: &AppContext,
    multipart: &mut Multipart,
    staged: &mut Option<Staged>,
    title: &mut Option<String>,
) -> Result<(), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Invalid multipart body"))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(VIDEO_FIELD) if staged.is_none() => {
                let original_name = field.file_name().unwrap_or("upload").to_string();
                let extension = Path::new(&original_name)
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_owned);

                let workspace = ctx
                    .transcoder
                    .allocate()
                    .await
                    .map_err(|e| ApiError::internal(format!("Failed to allocate job: {e}")))?;
                let source = workspace.source_path(extension.as_deref());
                let guard = CleanupGuard::new(&workspace, &source);

                let slot = staged.insert(Staged {
                    workspace,
                    source,
                    original_name,
                    bytes: 0,
                    guard,
                });
                let bytes = save_field(field, &slot.source).await?;
                slot.bytes = bytes;
            }
            Some(TITLE_FIELD) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, "Invalid title field"))?;
                *title = Some(text);
            }
            _ => {}
        }
    }
    Ok(())
}

async fn save_field(mut field: Field<'_>, dest: &Path) -> Result<u64, ApiError> {
    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create {}: {e}", dest.display())))?;

    let mut written = 0u64;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, "Upload interrupted"))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to write upload: {e}")))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to write upload: {e}")))?;
    Ok(written)
}

/// Body-limit overruns surface as multipart errors; keep their 413.
fn multipart_error(e: MultipartError, context: &str) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(format!("Upload exceeds the size limit: {e}"))
    } else {
        ApiError::bad_request(format!("{context}: {e}"))
    }
}
