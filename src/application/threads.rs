//! スレッド実装の詳細
//!
//! Capture / Extract / Input の3スレッドの実装を含みます。
//! pipeline.rsから分離され、bounded(1)チャネルによる最新優先の
//! スレッド間通信を実現します。

use crate::application::{
    loader::{load_with_backoff, LoadRetryPolicy},
    runtime::RuntimeFlags,
};
use crate::domain::{
    ports::{FeatureExtractorPort, FrameSourcePort, InputCommand, InputPort},
    types::{FeatureVector, Frame},
};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::time::{Duration, Instant};

/// フレームとタイムスタンプのペア
#[derive(Debug, Clone)]
pub(crate) struct TimestampedFrame {
    pub frame: Frame,
    pub captured_at: Instant,
}

/// 特徴ベクトルとタイムスタンプのペア
#[derive(Debug, Clone)]
pub(crate) struct TimestampedFeatures {
    pub features: FeatureVector,
    pub captured_at: Instant,
    pub extracted_at: Instant,
}

/// 初期化結果の通知（Extractスレッド→コントローラループ）
#[derive(Debug, Clone)]
pub(crate) enum ControlMsg {
    /// モデルロード完了
    ExtractorReady,
    /// モデルロード失敗（確定）
    ExtractorFailed(String),
}

/// Captureスレッドのメインループ
///
/// モデル準備完了までフレームを生成しない（フレームループのゲート）。
pub(crate) fn capture_thread<S: FrameSourcePort>(
    mut source: S,
    tx: Sender<TimestampedFrame>,
    flags: RuntimeFlags,
) {
    let info = source.source_info();
    tracing::info!(
        "Capture thread started: {}x{} @ {}fps - {}",
        info.width,
        info.height,
        info.fps,
        info.name
    );

    loop {
        if flags.is_stopping() {
            break;
        }

        // ロード完了までフレームループは走らない
        if !flags.is_model_ready() {
            std::thread::sleep(Duration::from_millis(10));
            continue;
        }

        let captured_at = Instant::now();

        match source.next_frame() {
            Ok(Some(frame)) => {
                let timestamped = TimestampedFrame { frame, captured_at };
                if !send_latest_only(&tx, timestamped) {
                    break;
                }
            }
            Ok(None) => {
                // まだ新しいフレームがない
                std::thread::sleep(Duration::from_millis(1));
            }
            Err(e) => {
                tracing::warn!("Capture error: {}", e);
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }

    tracing::debug!("Capture thread terminated");
}

/// Extractスレッドのメインループ
///
/// 最初にモデルをロードし（バックオフつきリトライ）、結果をコントローラへ
/// 通知する。ロード成功後はフレームを特徴ベクトルへ変換し続ける。
pub(crate) fn extract_thread<E: FeatureExtractorPort>(
    mut extractor: E,
    policy: LoadRetryPolicy,
    rx: Receiver<TimestampedFrame>,
    tx: Sender<TimestampedFeatures>,
    control_tx: Sender<ControlMsg>,
    flags: RuntimeFlags,
) {
    tracing::info!(
        "Extract thread started (feature_len={})",
        extractor.feature_len()
    );

    match load_with_backoff(&mut extractor, &policy) {
        Ok(()) => {
            flags.set_model_ready();
            if control_tx.send(ControlMsg::ExtractorReady).is_err() {
                return;
            }
        }
        Err(e) => {
            let _ = control_tx.send(ControlMsg::ExtractorFailed(e.to_string()));
            return;
        }
    }

    // control_txはスレッド終了まで保持する（コントローラ側のselectを
    // 切断扱いにしないため）
    while let Ok(timestamped) = rx.recv() {
        match extractor.infer(&timestamped.frame) {
            Ok(features) => {
                let extracted = TimestampedFeatures {
                    features,
                    captured_at: timestamped.captured_at,
                    extracted_at: Instant::now(),
                };
                if !send_latest_only(&tx, extracted) {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("Feature extraction error: {}", e);
            }
        }
    }

    tracing::debug!("Extract thread terminated");
}

/// Inputスレッドのメインループ
///
/// ラベリング操作は取りこぼさない: bounded(1)の最新優先ではなく
/// 通常のsendで全件をコントローラへ渡す。
pub(crate) fn input_thread<I: InputPort>(
    mut input: I,
    tx: Sender<InputCommand>,
    flags: RuntimeFlags,
    poll_interval: Duration,
) {
    tracing::info!("Input thread started (poll interval: {:?})", poll_interval);

    loop {
        if flags.is_stopping() {
            break;
        }

        match input.poll_command() {
            Some(command) => {
                if tx.send(command).is_err() {
                    break;
                }
            }
            None => {
                std::thread::sleep(poll_interval);
            }
        }
    }

    tracing::debug!("Input thread terminated");
}

/// 最新のみ上書きポリシーで送信
///
/// bounded(1)キューを使用し、キューが満杯の場合は新しいデータを破棄。
/// 前段の処理が追いついていない間、そのフレームの処理要求は捨てられる
/// （同時処理を常に1件に抑える）。
///
/// # Returns
/// - `true`: 送信成功またはキュー満杯で破棄
/// - `false`: チャネル切断（受信側終了）
pub(crate) fn send_latest_only<T>(tx: &Sender<T>, value: T) -> bool {
    match tx.try_send(value) {
        Ok(_) => true,
        Err(TrySendError::Full(_)) => {
            // キューが満杯 - このフレームはスキップされる
            true
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}
