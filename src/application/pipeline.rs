//! パイプライン制御モジュール
//!
//! Capture / Extract / Input の3スレッドと、呼び出し元スレッドで動く
//! コントローラループでパイプラインを構成します。
//!
//! 状態を変更するのはコントローラループだけなので、コントローラ自体は
//! 単一スレッドのまま。フレーム系チャネルはbounded(1)の最新優先で、
//! 処理中のフレームがある間は新しいフレームの分類要求を破棄します。

use crate::application::{
    controller::{Controller, ControllerEvent},
    loader::LoadRetryPolicy,
    runtime::RuntimeFlags,
    stats::{StatKind, StatsCollector},
    threads,
};
use crate::domain::{
    error::DomainResult,
    ports::{
        ClassifierPort, DisplayPort, FeatureExtractorPort, FrameSourcePort, InputCommand,
        InputPort,
    },
};
use crossbeam_channel::{bounded, never, select, Receiver};
use std::time::{Duration, Instant};

/// パイプライン設定
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 統計出力間隔
    pub stats_interval: Duration,
    /// 入力ポーリング間隔
    pub input_poll_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stats_interval: Duration::from_secs(10),
            input_poll_interval: Duration::from_millis(10),
        }
    }
}

/// パイプライン実行コンテキスト
pub struct PipelineRunner<S, E, C, D, I>
where
    S: FrameSourcePort,
    E: FeatureExtractorPort,
    C: ClassifierPort,
    D: DisplayPort,
    I: InputPort,
{
    source: S,
    extractor: E,
    classifier: C,
    display: D,
    input: I,
    config: PipelineConfig,
    load_policy: LoadRetryPolicy,
}

impl<S, E, C, D, I> PipelineRunner<S, E, C, D, I>
where
    S: FrameSourcePort + 'static,
    E: FeatureExtractorPort + 'static,
    C: ClassifierPort,
    D: DisplayPort,
    I: InputPort + 'static,
{
    /// 新しいPipelineRunnerを作成
    pub fn new(
        source: S,
        extractor: E,
        classifier: C,
        display: D,
        input: I,
        config: PipelineConfig,
        load_policy: LoadRetryPolicy,
    ) -> Self {
        Self {
            source,
            extractor,
            classifier,
            display,
            input,
            config,
            load_policy,
        }
    }

    /// パイプラインを起動（ブロッキング）
    ///
    /// 終了要求（Quit）を受けるか、全ワーカーが停止するまで戻らない。
    pub fn run(self) -> DomainResult<()> {
        let (frame_tx, frame_rx) = bounded::<threads::TimestampedFrame>(1);
        let (feature_tx, feature_rx) = bounded::<threads::TimestampedFeatures>(1);
        let (control_tx, control_rx) = bounded::<threads::ControlMsg>(1);
        // 操作イベントは取りこぼさない（小さめの通常キュー）
        let (action_tx, action_rx) = bounded::<InputCommand>(16);

        let flags = RuntimeFlags::new();

        // Capture Thread
        let capture_handle = {
            let source = self.source;
            let tx = frame_tx;
            let flags = flags.clone();
            std::thread::spawn(move || {
                threads::capture_thread(source, tx, flags);
            })
        };

        // Extract Thread
        let extract_handle = {
            let extractor = self.extractor;
            let policy = self.load_policy.clone();
            let rx = frame_rx;
            let tx = feature_tx;
            let flags = flags.clone();
            std::thread::spawn(move || {
                threads::extract_thread(extractor, policy, rx, tx, control_tx, flags);
            })
        };

        // Input Thread
        let input_handle = {
            let input = self.input;
            let flags = flags.clone();
            let poll_interval = self.config.input_poll_interval;
            std::thread::spawn(move || {
                threads::input_thread(input, action_tx, flags, poll_interval);
            })
        };

        // コントローラループ（呼び出し元スレッドで実行）
        let mut controller = Controller::new(self.classifier, self.display);
        let mut stats = StatsCollector::new(self.config.stats_interval);
        Self::controller_loop(&mut controller, &mut stats, control_rx, feature_rx, action_rx);

        // ワーカーの停止
        flags.request_stop();
        let _ = capture_handle.join();
        let _ = extract_handle.join();
        let _ = input_handle.join();

        tracing::info!("Pipeline terminated");
        Ok(())
    }

    /// コントローラループ本体
    ///
    /// 制御・特徴・操作の3チャネルをselectで待ち、全イベントを
    /// Controller::handle_event()へ直列化する。
    fn controller_loop(
        controller: &mut Controller<C, D>,
        stats: &mut StatsCollector,
        control_rx: Receiver<threads::ControlMsg>,
        feature_rx: Receiver<threads::TimestampedFeatures>,
        action_rx: Receiver<InputCommand>,
    ) {
        let mut control_rx = control_rx;
        let mut feature_rx = feature_rx;

        loop {
            select! {
                recv(control_rx) -> msg => match msg {
                    Ok(threads::ControlMsg::ExtractorReady) => {
                        controller.handle_event(ControllerEvent::ExtractorReady);
                    }
                    Ok(threads::ControlMsg::ExtractorFailed(reason)) => {
                        controller.handle_event(ControllerEvent::ExtractorFailed(reason));
                    }
                    Err(_) => {
                        // Extractスレッド終了 - このチャネルの監視をやめる
                        control_rx = never();
                    }
                },
                recv(feature_rx) -> msg => match msg {
                    Ok(extracted) => {
                        stats.record_frame();
                        stats.record_duration(
                            StatKind::Extract,
                            extracted.extracted_at.duration_since(extracted.captured_at),
                        );

                        let had_labels = controller.classifier().label_count() > 0;
                        let classify_start = Instant::now();
                        controller.handle_event(ControllerEvent::Features(extracted.features));
                        if had_labels {
                            stats.record_duration(StatKind::Classify, classify_start.elapsed());
                        }
                        stats.record_duration(
                            StatKind::EndToEnd,
                            extracted.captured_at.elapsed(),
                        );

                        if stats.should_report() {
                            stats.report_and_reset();
                        }
                    }
                    Err(_) => {
                        feature_rx = never();
                    }
                },
                recv(action_rx) -> msg => match msg {
                    Ok(InputCommand::Action(label)) => {
                        controller.handle_event(ControllerEvent::Action(label));
                    }
                    Ok(InputCommand::Quit) => {
                        tracing::info!("Quit requested");
                        break;
                    }
                    Err(_) => {
                        // Inputスレッド終了: 操作が来なくなったら終了する
                        break;
                    }
                },
            }
        }
    }
}
