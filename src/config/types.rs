use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vodforge_av::EncodeSettings;
use vodforge_media::{Catalog, Preset};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub transcode: TranscodeConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    /// The rendition catalog, largest first.
    #[serde(default = "default_presets")]
    pub presets: Vec<Preset>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            transcode: TranscodeConfig::default(),
            tools: ToolsConfig::default(),
            presets: default_presets(),
        }
    }
}

impl Config {
    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.presets.clone())
    }
}

fn default_presets() -> Vec<Preset> {
    Catalog::default().presets().to_vec()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted upload body, in MiB.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_max_upload_mb() -> u64 {
    4096
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl ServerConfig {
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Job directories live here; also served under `/public`.
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,

    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_media_root() -> PathBuf {
    PathBuf::from("public")
}
fn default_database_path() -> PathBuf {
    PathBuf::from("vodforge.db")
}
fn default_pool_size() -> u32 {
    vodforge_db::pool::DEFAULT_POOL_SIZE
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            media_root: default_media_root(),
            database_path: default_database_path(),
            pool_size: default_pool_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscodeConfig {
    /// Jobs allowed to probe/encode at once; the rest wait.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    #[serde(default = "default_threads")]
    pub threads: u32,

    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    #[serde(default = "default_video_profile")]
    pub video_profile: String,

    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    #[serde(default = "default_audio_sample_rate")]
    pub audio_sample_rate: u32,
}

fn default_max_concurrent_jobs() -> usize {
    2
}
fn default_threads() -> u32 {
    4
}
fn default_video_codec() -> String {
    "libx264".to_string()
}
fn default_video_profile() -> String {
    "main".to_string()
}
fn default_audio_codec() -> String {
    "aac".to_string()
}
fn default_audio_sample_rate() -> u32 {
    48_000
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            threads: default_threads(),
            video_codec: default_video_codec(),
            video_profile: default_video_profile(),
            audio_codec: default_audio_codec(),
            audio_sample_rate: default_audio_sample_rate(),
        }
    }
}

impl TranscodeConfig {
    pub fn encode_settings(&self) -> EncodeSettings {
        EncodeSettings {
            threads: self.threads,
            video_codec: self.video_codec.clone(),
            video_profile: self.video_profile.clone(),
            audio_codec: self.audio_codec.clone(),
            audio_sample_rate: self.audio_sample_rate,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}

impl ToolsConfig {
    pub fn paths(&self) -> vodforge_av::ToolPaths {
        vodforge_av::ToolPaths::lenient(self.ffmpeg_path.as_deref(), self.ffprobe_path.as_deref())
    }
}
