mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    parse_config(&content).with_context(|| format!("Invalid config file: {:?}", path))
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse TOML")?;
    validate_config(&config)?;
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./vodforge.toml",
        "~/.config/vodforge/config.toml",
        "/etc/vodforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Loading config from {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.server.max_upload_mb == 0 {
        anyhow::bail!("server.max_upload_mb must be at least 1");
    }

    config
        .catalog()
        .validate()
        .context("Invalid [[presets]] catalog")?;

    let jobs = config.transcode.max_concurrent_jobs;
    if jobs == 0 {
        anyhow::bail!("transcode.max_concurrent_jobs must be at least 1");
    }

    // Each running job pins one connection; reads need at least one more.
    if (config.storage.pool_size as usize) <= jobs {
        anyhow::bail!(
            "storage.pool_size ({}) must be greater than transcode.max_concurrent_jobs ({})",
            config.storage.pool_size,
            jobs
        );
    }

    if config.transcode.audio_sample_rate == 0 || config.transcode.threads == 0 {
        anyhow::bail!("transcode.threads and transcode.audio_sample_rate must be positive");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        validate_config(&config).unwrap();
        assert_eq!(config.presets.len(), 7);
        assert_eq!(config.storage.media_root, Path::new("public"));
        assert_eq!(config.transcode.max_concurrent_jobs, 2);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.presets, Config::default().presets);
    }

    #[test]
    fn test_three_rung_catalog() {
        let config = parse_config(
            r#"
            [server]
            port = 3000

            [[presets]]
            name = "1080p"
            width = 1920
            height = 1080
            quality_factor = 20
            bitrate = "5000k"

            [[presets]]
            name = "720p"
            width = 1280
            height = 720
            crf = 23
            bitrate = "3M"

            [[presets]]
            name = "480p"
            width = 854
            height = 480
            quality_factor = 26
            bitrate = 1500000
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 3000);
        let names: Vec<&str> = config.presets.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["1080p", "720p", "480p"]);
        assert_eq!(config.presets[1].bandwidth(), 3_000_000);
        assert_eq!(config.presets[2].bandwidth(), 1_500_000);
    }

    #[test]
    fn test_rejects_port_zero() {
        assert!(parse_config("[server]\nport = 0\n").is_err());
    }

    #[test]
    fn test_rejects_zero_jobs() {
        assert!(parse_config("[transcode]\nmax_concurrent_jobs = 0\n").is_err());
    }

    #[test]
    fn test_rejects_pool_not_larger_than_jobs() {
        let err = parse_config("[storage]\npool_size = 2\n[transcode]\nmax_concurrent_jobs = 2\n")
            .unwrap_err();
        assert!(format!("{err:#}").contains("pool_size"));
    }

    #[test]
    fn test_rejects_bad_catalog() {
        let duplicated = r#"
            [[presets]]
            name = "720p"
            width = 1280
            height = 720
            quality_factor = 23
            bitrate = "3000k"

            [[presets]]
            name = "720p"
            width = 1280
            height = 720
            quality_factor = 23
            bitrate = "3000k"
        "#;
        assert!(parse_config(duplicated).is_err());

        assert!(parse_config("presets = []\n").is_err());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vodforge.toml");
        std::fs::write(&path, "[storage]\nmedia_root = \"/srv/media\"\n").unwrap();

        let config = load_config_or_default(Some(&path)).unwrap();
        assert_eq!(config.storage.media_root, Path::new("/srv/media"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(load_config_or_default(Some(Path::new("/no/such/vodforge.toml"))).is_err());
    }
}
