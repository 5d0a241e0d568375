mod application;
mod domain;
mod infrastructure;
mod logging;

use crate::application::loader::LoadRetryPolicy;
use crate::application::pipeline::{PipelineConfig, PipelineRunner};
use crate::domain::config::AppConfig;
use crate::infrastructure::{
    ConsoleDisplay, GridFeatureExtractor, KnnClassifierAdapter, StdinInput,
    SyntheticCaptureSource,
};
use crate::logging::init_logging;
use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;

fn main() {
    // ログシステムの初期化（非同期ファイル出力）
    // 標準出力は表示アダプタが使うため、ログはファイルに分離する
    let log_dir = PathBuf::from("logs");
    let _guard = init_logging("info", false, Some(log_dir));
    // 注意: _guardはmain終了まで保持する必要がある（Dropでログスレッドが終了）

    tracing::info!("PoseDojo starting...");

    match run() {
        Ok(_) => {
            tracing::info!("PoseDojo terminated gracefully.");
        }
        Err(e) => {
            tracing::error!("Fatal error: {:?}", e);
            eprintln!("Fatal error: {e:?}");
            std::process::exit(1);
        }
    }
}

/// アプリケーションのメイン処理
fn run() -> anyhow::Result<()> {
    // 設定ファイルの読み込み（存在しない場合はデフォルト設定を使用）
    let config = match AppConfig::from_file("config.toml") {
        Ok(config) => {
            tracing::info!("Loaded configuration from config.toml");
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load config.toml: {:?}, using defaults", e);
            AppConfig::default()
        }
    };

    config.validate().context("invalid configuration")?;

    tracing::info!(
        "Capture: {}x{} @ {}fps, features: {}, k={}",
        config.capture.width,
        config.capture.height,
        config.capture.fps,
        config.extractor.feature_len(),
        config.classifier.k
    );

    // アダプタをポートに束ねてパイプラインを構築
    let source = SyntheticCaptureSource::new(
        config.capture.width,
        config.capture.height,
        config.capture.fps,
    );
    let extractor = GridFeatureExtractor::new(
        config.extractor.grid_cols,
        config.extractor.grid_rows,
        Duration::from_millis(config.extractor.simulated_load_ms),
    )
    .context("failed to create feature extractor")?;
    let classifier = KnnClassifierAdapter::new(
        config.classifier.k,
        config.classifier.distance,
        config.extractor.feature_len(),
    )
    .context("failed to create classifier")?;
    let display = ConsoleDisplay::new();
    let input = StdinInput::new();

    let pipeline_config = PipelineConfig {
        stats_interval: config.pipeline.stats_interval(),
        input_poll_interval: config.pipeline.input_poll_interval(),
    };
    let load_policy = LoadRetryPolicy {
        max_attempts: config.extractor.load_max_attempts,
        initial_backoff: config.extractor.load_initial_delay(),
        max_backoff: config.extractor.load_max_delay(),
    };

    let runner = PipelineRunner::new(
        source, extractor, classifier, display, input, pipeline_config, load_policy,
    );
    runner.run().context("pipeline terminated with error")?;

    Ok(())
}
