//! Shared test harness for integration tests.
//!
//! [`TestHarness`] builds a full [`AppContext`] on a temp directory with a
//! file-backed SQLite store and fake probe/encode collaborators, so no test
//! needs ffmpeg installed.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use http_body_util::BodyExt;
use tower::ServiceExt;

use vodforge::config::Config;
use vodforge::library::VideoLibrary;
use vodforge::server::{create_router, AppContext};
use vodforge::transcode::Transcoder;
use vodforge_av::probe::{CodecType, ProbeReport, ProbedStream};
use vodforge_av::{EncodeOutcome, EncodingEngine, Prober, SessionSpec};
use vodforge_db::pool::{init_pool, DbPool};

pub const BOUNDARY: &str = "vodforge-test-boundary";

/// Reports a single video stream of fixed size, or none at all.
pub struct FakeProber {
    pub dims: Option<(u32, u32)>,
}

#[async_trait]
impl Prober for FakeProber {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn probe(&self, path: &Path) -> vodforge_av::Result<ProbeReport> {
        if !path.exists() {
            return Err(vodforge_av::Error::file_not_found(path));
        }
        let streams = match self.dims {
            Some((w, h)) => vec![ProbedStream {
                index: 0,
                codec_type: CodecType::Video,
                codec_name: Some("h264".into()),
                width: Some(w),
                height: Some(h),
            }],
            None => vec![ProbedStream {
                index: 0,
                codec_type: CodecType::Audio,
                codec_name: Some("aac".into()),
                width: None,
                height: None,
            }],
        };
        Ok(ProbeReport {
            streams,
            ..Default::default()
        })
    }
}

/// Writes every rendition manifest, or fails outright.
pub struct FakeEngine {
    pub fail: bool,
}

#[async_trait]
impl EncodingEngine for FakeEngine {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn run(&self, session: &SessionSpec) -> EncodeOutcome {
        if self.fail {
            return EncodeOutcome::Failed {
                message: "encoder crashed".into(),
            };
        }
        for output in &session.outputs {
            if let Err(e) = tokio::fs::write(&output.manifest_path, "#EXTM3U\n").await {
                return EncodeOutcome::Failed {
                    message: e.to_string(),
                };
            }
        }
        EncodeOutcome::Completed
    }
}

pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub media_root: PathBuf,
    _dir: tempfile::TempDir,
}

impl TestHarness {
    /// 1920x1080 sources with the default catalog.
    pub fn new() -> Self {
        Self::with(Config::default(), Some((1920, 1080)), false)
    }

    pub fn with(config: Config, dims: Option<(u32, u32)>, fail_encode: bool) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let media_root = dir.path().join("public");
        std::fs::create_dir_all(&media_root).expect("failed to create media root");

        let db = init_pool(&dir.path().join("vodforge.db"), config.storage.pool_size)
            .expect("failed to create pool");

        let transcoder = Transcoder::new(
            config.catalog(),
            config.transcode.encode_settings(),
            media_root.clone(),
            Arc::new(FakeProber { dims }),
            Arc::new(FakeEngine { fail: fail_encode }),
            db.clone(),
            config.transcode.max_concurrent_jobs,
        );

        let ctx = AppContext {
            config: Arc::new(config),
            transcoder: Arc::new(transcoder),
            library: VideoLibrary::new(db.clone()),
        };

        Self {
            ctx,
            db,
            media_root,
            _dir: dir,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    /// Send a request and return the status with the body parsed as JSON
    /// (or `Null` for an empty body).
    pub async fn send(&self, req: Request<Body>) -> (u16, serde_json::Value) {
        let resp = self.router().oneshot(req).await.expect("request failed");
        let status = resp.status().as_u16();
        let bytes = resp
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (u16, serde_json::Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    /// Job directories currently under the media root.
    pub fn job_dirs(&self) -> Vec<PathBuf> {
        std::fs::read_dir(&self.media_root)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.is_dir())
            .collect()
    }
}

/// Build a `multipart/form-data` upload request.
pub fn upload_request(file: Option<(&str, &[u8])>, title: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();

    if let Some(title) = title {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{title}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"{name}\"\r\nContent-Type: video/mp4\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/video/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
