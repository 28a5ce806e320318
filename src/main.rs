mod cli;

use vodforge::{config, server};
use vodforge_av::{check_tools as probe_tools, inspect, FfprobeProber, Prober};
use vodforge_media::{ladder, SourceProfile};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

async fn start_server(host: Option<String>, port: Option<u16>, config_path: Option<&Path>) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting vodforge server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

async fn transcode_file(input: &Path, title: Option<String>, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !input.is_file() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }

    tokio::fs::create_dir_all(&config.storage.media_root)
        .await
        .with_context(|| format!("Failed to create media root {:?}", config.storage.media_root))?;

    let ctx = server::AppContext::from_config(config)?;
    let workspace = ctx.transcoder.allocate().await?;
    let source = workspace.source_path(input.extension().and_then(|e| e.to_str()));

    if let Err(e) = tokio::fs::copy(input, &source).await {
        vodforge_av::cleanup(workspace.dir(), &source).await;
        return Err(e).with_context(|| format!("Failed to import {:?}", input));
    }

    let title = title.or_else(|| {
        input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    });

    tracing::info!("Transcoding {:?} as job {}", input, workspace.job_id());
    let published = ctx
        .transcoder
        .upload_and_transcode(workspace, source, title)
        .await
        .with_context(|| format!("Failed to transcode {:?}", input))?;

    println!("Published video {}", published.record.id);
    println!("  Title: {}", published.record.title);
    println!("  Job: {}", published.job_id);
    println!("  Master manifest: {}", published.master_manifest_path.display());

    Ok(())
}

async fn probe_file(file: &Path, json: bool, config_path: Option<&Path>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let prober = FfprobeProber::new(config.tools.paths().ffprobe);
    let report = prober.probe(file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("File: {}", file.display());
    if let Some(ref container) = report.container {
        println!("Container: {}", container);
    }
    if let Some(secs) = report.duration_secs {
        let secs = secs as u64;
        println!("Duration: {:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60);
    }

    println!("\nStreams: {}", report.streams.len());
    for stream in &report.streams {
        print!(
            "  [{}] {:?} {}",
            stream.index,
            stream.codec_type,
            stream.codec_name.as_deref().unwrap_or("unknown")
        );
        if let (Some(w), Some(h)) = (stream.width, stream.height) {
            print!(" {}x{}", w, h);
        }
        println!();
    }

    match inspect(&prober, file).await {
        Ok(profile) => print_ladder(&config, &profile),
        Err(e) => println!("\nNot transcodable: {}", e),
    }

    Ok(())
}

fn print_ladder(config: &config::Config, profile: &SourceProfile) {
    let ladder = ladder::select(&config.catalog(), profile);

    println!("\nLadder for {}x{}:", profile.width, profile.height);
    if ladder.is_empty() {
        println!("  (none) source is smaller than every preset and would be rejected");
        return;
    }
    for preset in &ladder {
        println!(
            "  {:<6} {}x{} crf {} @ {}",
            preset.name, preset.width, preset.height, preset.quality_factor, preset.bitrate
        );
    }
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tools = probe_tools(&config.tools.paths());
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Uploads will fail until they are installed.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Media root: {}", config.storage.media_root.display());
    println!("  Database: {}", config.storage.database_path.display());
    println!(
        "  Concurrent jobs: {}",
        config.transcode.max_concurrent_jobs
    );
    let names: Vec<&str> = config.presets.iter().map(|p| p.name.as_str()).collect();
    println!("  Presets: {}", names.join(", "));

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vodforge=trace,vodforge_av=trace,vodforge_db=debug,vodforge_media=debug,tower_http=debug".to_string()
        } else {
            "vodforge=debug,vodforge_av=debug,vodforge_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Transcode { file, title } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(transcode_file(&file, title, cli.config.as_deref()))
        }
        Commands::Probe { file, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_file(&file, json, cli.config.as_deref()))
        }
        Commands::Ladder { width, height } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            print_ladder(&config, &SourceProfile::new(width, height));
            Ok(())
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("vodforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
