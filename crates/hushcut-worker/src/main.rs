//! Silence-cut worker binary.
//!
//! Processes one input file: registers a task, runs the matching
//! pipeline with tracked progress, and moves the artifact into the
//! output directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hushcut_media::{check_ffmpeg, check_ffprobe, cut_audio_remove_silence, cut_remove_silence, fs_utils};
use hushcut_worker::{run_tracked, TaskRegistry, WorkerConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("hushcut=info".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }

    let args = std::env::args().skip(1);
    let mut audio = false;
    let mut input: Option<PathBuf> = None;
    for arg in args {
        match arg.as_str() {
            "--audio" => audio = true,
            other => input = Some(PathBuf::from(other)),
        }
    }

    let Some(input) = input else {
        eprintln!("usage: hushcut-worker [--audio] <input-file>");
        std::process::exit(2);
    };

    if let Err(e) = run(&input, audio).await {
        error!(error = ?e, "Worker run failed");
        std::process::exit(1);
    }
}

async fn run(input: &Path, audio: bool) -> anyhow::Result<()> {
    check_ffmpeg().context("ffmpeg is required")?;
    check_ffprobe().context("ffprobe is required")?;

    let config = WorkerConfig::from_env();
    info!(config = ?config, "Starting hushcut-worker");

    let registry = Arc::new(TaskRegistry::new());
    let task_id = registry.create().await;
    info!(task_id = %task_id, input = %input.display(), audio = audio, "Task registered");

    let artifact = if audio {
        let opts = config.audio_options();
        run_tracked(registry.clone(), task_id.clone(), async {
            cut_audio_remove_silence(input, &opts).await
        })
        .await
    } else {
        let opts = config.cut_options();
        run_tracked(registry.clone(), task_id.clone(), async {
            cut_remove_silence(input, &opts).await
        })
        .await
    }
    .context("silence-cut pipeline failed")?;

    let file_name = artifact
        .file_name()
        .context("artifact path has no file name")?;
    let dest = Path::new(&config.output_dir).join(file_name);

    // The artifact is ours to consume; moving it into the results
    // directory is the consumption step.
    fs_utils::move_file(&artifact, &dest)
        .await
        .context("failed to move artifact to output directory")?;

    info!(task_id = %task_id, output = %dest.display(), "Artifact ready");
    Ok(())
}
