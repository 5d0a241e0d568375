//! パイプライン全体のスモークテスト
//!
//! 実アダプタ構成（合成フレームソース + グリッド特徴 + k-NN）で
//! スレッド込みのパイプラインを起動し、「ロード→ラベル付け→分類→終了」が
//! 実際のチャネル/スレッド経由で完走することを確認する。

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use PoseDojo::application::loader::LoadRetryPolicy;
use PoseDojo::application::pipeline::{PipelineConfig, PipelineRunner};
use PoseDojo::domain::config::DistanceMetric;
use PoseDojo::domain::ports::{DisplayPort, InputCommand, InputPort};
use PoseDojo::domain::types::{Label, LabelCounts};
use PoseDojo::infrastructure::{
    GridFeatureExtractor, KnnClassifierAdapter, SyntheticCaptureSource,
};

#[derive(Default)]
struct DisplayLog {
    statuses: Vec<String>,
    counts: Vec<String>,
}

/// パイプラインに渡した後も観察できる共有ディスプレイ
#[derive(Clone, Default)]
struct SharedDisplay {
    log: Arc<Mutex<DisplayLog>>,
}

impl DisplayPort for SharedDisplay {
    fn set_status(&mut self, text: &str) {
        self.log.lock().unwrap().statuses.push(text.to_string());
    }

    fn set_counts(&mut self, counts: &LabelCounts) {
        self.log.lock().unwrap().counts.push(counts.render());
    }

    fn show_controls(&mut self, _visible: bool) {}
}

/// 経過時間に応じてコマンドを流すテスト用入力
///
/// モデル準備と最初の特徴到着を待つため、余裕を持った時刻で発火する。
struct TimedScript {
    started: Instant,
    steps: Vec<(Duration, InputCommand)>,
    next: usize,
}

impl TimedScript {
    fn new(steps: Vec<(Duration, InputCommand)>) -> Self {
        Self {
            started: Instant::now(),
            steps,
            next: 0,
        }
    }
}

impl InputPort for TimedScript {
    fn poll_command(&mut self) -> Option<InputCommand> {
        let (fire_at, command) = *self.steps.get(self.next)?;
        if self.started.elapsed() < fire_at {
            return None;
        }
        self.next += 1;
        Some(command)
    }
}

#[test]
fn test_pipeline_end_to_end() {
    let source = SyntheticCaptureSource::new(64, 48, 0);
    let extractor = GridFeatureExtractor::new(4, 4, Duration::ZERO).unwrap();
    let classifier = KnnClassifierAdapter::new(1, DistanceMetric::L2, 16).unwrap();
    let display = SharedDisplay::default();
    let log = display.log.clone();

    // ロード完了と特徴の流入を待ってからラベル付けし、最後に終了する
    let input = TimedScript::new(vec![
        (Duration::from_millis(500), InputCommand::Action(Label::Up)),
        (Duration::from_millis(1500), InputCommand::Quit),
    ]);

    let config = PipelineConfig {
        stats_interval: Duration::from_secs(60),
        input_poll_interval: Duration::from_millis(1),
    };
    let runner = PipelineRunner::new(
        source,
        extractor,
        classifier,
        display,
        input,
        config,
        LoadRetryPolicy::default(),
    );
    runner.run().expect("pipeline should terminate cleanly");

    let log = log.lock().unwrap();

    // 起動〜準備完了の表示が揃っている
    assert!(log
        .statuses
        .iter()
        .any(|s| s == "Model loading, please wait..."));
    assert!(log.statuses.iter().any(|s| s == "Begin posing and adding data!"));

    // Upのラベル付けがカウントに反映されている
    assert_eq!(
        log.counts.last().expect("a count update should have happened"),
        "Ups: 1 - Downs: 0 - Lefts: 0 - Rights: 0 - Centers: 0"
    );

    // ラベル付け後のフレームはUpと分類されている
    assert!(log.statuses.iter().any(|s| s == "Label: Up"));
}
