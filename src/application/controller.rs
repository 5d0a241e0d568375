//! 対話コントローラ（Application層）
//!
//! フレームごとの分類とユーザー操作によるラベリングを1か所で調停し、
//! ラベル別カウントと表示テキストを分類器の状態と常に一致させます。
//!
//! # 状態機械
//! - `Loading`（初期）→ `Ready`: 特徴抽出器のロード完了で1度だけ遷移
//! - `Loading` → `Failed`: ロードが確定的に失敗した場合
//! - `Ready` は終端状態で、以後は分類とラベリングの2操作だけが繰り返される
//!
//! 全ての状態変更は `handle_event()` を通る。イベント駆動にすることで
//! 不変条件を単体テストで検証できる。

use crate::domain::{ClassifierPort, DisplayPort, FeatureVector, Label, LabelCounts};

/// ロード中のステータステキスト
pub const STATUS_LOADING: &str = "Model loading, please wait...";
/// 準備完了時のステータステキスト
pub const STATUS_READY: &str = "Begin posing and adding data!";

/// コントローラの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// 特徴抽出器のロード待ち
    Loading,
    /// 稼働中（終端状態）
    Ready,
    /// 初期化失敗（終端状態）
    Failed,
}

/// コントローラへのイベント
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// 特徴抽出器のロード完了
    ExtractorReady,
    /// 特徴抽出器のロード失敗（理由つき）
    ExtractorFailed(String),
    /// フレームから抽出された特徴ベクトル（フレームごと）
    Features(FeatureVector),
    /// ユーザーのラベリング操作
    Action(Label),
}

/// 対話コントローラ
///
/// 分類器と表示を所有し、イベントに応じて両者を更新する。
/// 状態・カウント・最新特徴ベクトルを明示的なフィールドとして持つ
/// （グローバル変数の排除）。
pub struct Controller<C, D>
where
    C: ClassifierPort,
    D: DisplayPort,
{
    state: ControllerState,
    counts: LabelCounts,
    /// 直近に計算された特徴ベクトル（まだ1フレームも処理していなければNone）
    last_features: Option<FeatureVector>,
    classifier: C,
    display: D,
}

impl<C, D> Controller<C, D>
where
    C: ClassifierPort,
    D: DisplayPort,
{
    /// 新しいコントローラを作成（Loading状態から開始）
    ///
    /// ロード完了までラベリング操作は非表示にする。
    pub fn new(classifier: C, mut display: D) -> Self {
        display.set_status(STATUS_LOADING);
        display.show_controls(false);

        Self {
            state: ControllerState::Loading,
            counts: LabelCounts::new(),
            last_features: None,
            classifier,
            display,
        }
    }

    /// イベントを1件処理する
    pub fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::ExtractorReady => self.on_extractor_ready(),
            ControllerEvent::ExtractorFailed(reason) => self.on_extractor_failed(&reason),
            ControllerEvent::Features(features) => self.on_features(features),
            ControllerEvent::Action(label) => self.on_action(label),
        }
    }

    /// Loading → Ready 遷移（1度だけ発火する）
    fn on_extractor_ready(&mut self) {
        if self.state != ControllerState::Loading {
            tracing::warn!("ExtractorReady received in {:?} state, ignored", self.state);
            return;
        }

        self.state = ControllerState::Ready;
        self.display.set_status(STATUS_READY);
        self.display.show_controls(true);
        tracing::info!("Feature extractor ready, labeling controls enabled");
    }

    /// Loading → Failed 遷移
    ///
    /// 黙ってLoadingに留まり続けるのではなく、失敗を可視化する。
    fn on_extractor_failed(&mut self, reason: &str) {
        if self.state != ControllerState::Loading {
            tracing::warn!("ExtractorFailed received in {:?} state, ignored", self.state);
            return;
        }

        self.state = ControllerState::Failed;
        self.display
            .set_status(&format!("Model failed to load: {}", reason));
        tracing::error!("Feature extractor failed to load: {}", reason);
    }

    /// フレームごとの分類ステップ
    ///
    /// Loading/Failed中は実行されない。分類器が1ラベル以上を持つ場合のみ
    /// 分類を行い、エラー時は直前の表示を変更せずログに記録する。
    fn on_features(&mut self, features: FeatureVector) {
        if self.state != ControllerState::Ready {
            return;
        }

        self.last_features = Some(features);

        // 訓練例が1つもないうちは分類しない
        if self.classifier.label_count() == 0 {
            return;
        }

        // unwrapしない: last_featuresは直前に設定済み
        let Some(features) = self.last_features.as_ref() else {
            return;
        };

        match self.classifier.classify(features) {
            Ok(result) => {
                self.display
                    .set_status(&format!("Label: {}", result.label));
            }
            Err(e) => {
                // 回復可能: 次のフレームで再試行される。表示は変更しない。
                tracing::warn!("Classification failed: {}", e);
            }
        }
    }

    /// ユーザー操作によるラベリングステップ
    ///
    /// 直近の特徴ベクトルを訓練例として追加し、カウントと表示を更新する。
    /// まだフレームを1枚も処理していない場合は操作を拒否してログに残す
    /// （未定義値を分類器に渡さない）。
    fn on_action(&mut self, label: Label) {
        if self.state != ControllerState::Ready {
            tracing::warn!("Label action '{}' ignored in {:?} state", label, self.state);
            return;
        }

        let Some(features) = self.last_features.clone() else {
            tracing::warn!(
                "Label action '{}' ignored: no frame has been processed yet",
                label
            );
            return;
        };

        match self.classifier.add_example(features, label) {
            Ok(()) => {
                self.counts.increment(label);
                self.display.set_counts(&self.counts);
                tracing::debug!(
                    "Added training example for '{}' (total: {})",
                    label,
                    self.classifier.example_count()
                );
            }
            Err(e) => {
                // カウントは分類器の内容と一致させる: 追加失敗時は数えない
                tracing::error!("Failed to add training example for '{}': {}", label, e);
            }
        }
    }

    /// 現在の状態を取得
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// 現在のラベル別カウントを取得
    pub fn counts(&self) -> &LabelCounts {
        &self.counts
    }

    /// 分類器への参照を取得
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// 表示への参照を取得
    pub fn display(&self) -> &D {
        &self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Classification, DomainError, DomainResult};

    // モック分類器: 呼び出しを記録し、失敗を注入できる
    #[derive(Default)]
    struct MockClassifier {
        examples: Vec<Label>,
        classify_calls: std::cell::Cell<usize>,
        classify_result: Option<Label>,
        fail_classify: bool,
        fail_add: bool,
    }

    impl ClassifierPort for MockClassifier {
        fn label_count(&self) -> usize {
            let mut labels: Vec<Label> = self.examples.clone();
            labels.sort_by_key(|l| l.index());
            labels.dedup();
            labels.len()
        }

        fn example_count(&self) -> usize {
            self.examples.len()
        }

        fn add_example(&mut self, _features: FeatureVector, label: Label) -> DomainResult<()> {
            if self.fail_add {
                return Err(DomainError::Classification("inject add failure".into()));
            }
            self.examples.push(label);
            Ok(())
        }

        fn classify(&self, _features: &FeatureVector) -> DomainResult<Classification> {
            self.classify_calls.set(self.classify_calls.get() + 1);
            if self.fail_classify {
                return Err(DomainError::Classification("inject classify failure".into()));
            }
            let label = self.classify_result.unwrap_or(Label::Up);
            let mut confidences = [0.0; Label::ALL.len()];
            confidences[label.index()] = 0.9;
            Ok(Classification { label, confidences })
        }
    }

    // モック表示: 最後に設定されたテキストを記録する
    #[derive(Default)]
    struct RecordingDisplay {
        status: String,
        counts_line: String,
        controls_visible: bool,
    }

    impl DisplayPort for RecordingDisplay {
        fn set_status(&mut self, text: &str) {
            self.status = text.to_string();
        }

        fn set_counts(&mut self, counts: &LabelCounts) {
            self.counts_line = counts.render();
        }

        fn show_controls(&mut self, visible: bool) {
            self.controls_visible = visible;
        }
    }

    fn features() -> FeatureVector {
        FeatureVector::from_vec(vec![0.5, 0.5, 0.5])
    }

    fn ready_controller() -> Controller<MockClassifier, RecordingDisplay> {
        let mut c = Controller::new(MockClassifier::default(), RecordingDisplay::default());
        c.handle_event(ControllerEvent::ExtractorReady);
        c
    }

    #[test]
    fn test_starts_loading_with_hidden_controls() {
        let c = Controller::new(MockClassifier::default(), RecordingDisplay::default());
        assert_eq!(c.state(), ControllerState::Loading);
        assert_eq!(c.display().status, STATUS_LOADING);
        assert!(!c.display().controls_visible);
    }

    #[test]
    fn test_ready_transition_reveals_controls() {
        let mut c = Controller::new(MockClassifier::default(), RecordingDisplay::default());
        c.handle_event(ControllerEvent::ExtractorReady);

        assert_eq!(c.state(), ControllerState::Ready);
        assert_eq!(c.display().status, STATUS_READY);
        assert!(c.display().controls_visible);
    }

    #[test]
    fn test_ready_transition_fires_once() {
        let mut c = ready_controller();
        // Readyは終端状態: 2度目のReadyも失敗通知も状態を変えない
        c.handle_event(ControllerEvent::ExtractorFailed("late".into()));
        assert_eq!(c.state(), ControllerState::Ready);
        assert_eq!(c.display().status, STATUS_READY);
    }

    #[test]
    fn test_failed_transition_is_visible() {
        let mut c = Controller::new(MockClassifier::default(), RecordingDisplay::default());
        c.handle_event(ControllerEvent::ExtractorFailed("model missing".into()));

        assert_eq!(c.state(), ControllerState::Failed);
        assert!(c.display().status.contains("model missing"));
        assert!(!c.display().controls_visible);
    }

    #[test]
    fn test_no_classification_while_loading() {
        let mut c = Controller::new(MockClassifier::default(), RecordingDisplay::default());
        c.handle_event(ControllerEvent::Features(features()));
        assert_eq!(c.classifier().classify_calls.get(), 0);
        assert_eq!(c.display().status, STATUS_LOADING);
    }

    #[test]
    fn test_no_classification_without_labels() {
        let mut c = ready_controller();
        c.handle_event(ControllerEvent::Features(features()));
        // ラベルが0個のうちは分類器を呼ばない
        assert_eq!(c.classifier().classify_calls.get(), 0);
        assert_eq!(c.display().status, STATUS_READY);
    }

    #[test]
    fn test_action_before_first_frame_is_noop() {
        let mut c = ready_controller();
        c.handle_event(ControllerEvent::Action(Label::Up));

        assert_eq!(c.counts().total(), 0);
        assert_eq!(c.classifier().example_count(), 0);
    }

    #[test]
    fn test_frame_then_action_adds_example() {
        let mut c = ready_controller();
        c.handle_event(ControllerEvent::Features(features()));
        c.handle_event(ControllerEvent::Action(Label::Up));

        assert_eq!(c.counts().get(Label::Up), 1);
        assert_eq!(c.counts().total(), 1);
        assert_eq!(c.classifier().example_count(), 1);
        assert_eq!(c.classifier().label_count(), 1);
        assert_eq!(
            c.display().counts_line,
            "Ups: 1 - Downs: 0 - Lefts: 0 - Rights: 0 - Centers: 0"
        );
    }

    #[test]
    fn test_counts_match_action_sequence() {
        let mut c = ready_controller();
        c.handle_event(ControllerEvent::Features(features()));

        let sequence = [
            Label::Up,
            Label::Up,
            Label::Left,
            Label::Center,
            Label::Up,
            Label::Right,
            Label::Right,
        ];
        for label in sequence {
            c.handle_event(ControllerEvent::Action(label));
        }

        assert_eq!(c.counts().get(Label::Up), 3);
        assert_eq!(c.counts().get(Label::Down), 0);
        assert_eq!(c.counts().get(Label::Left), 1);
        assert_eq!(c.counts().get(Label::Right), 2);
        assert_eq!(c.counts().get(Label::Center), 1);
        assert_eq!(c.classifier().example_count(), sequence.len());
    }

    #[test]
    fn test_classification_updates_status() {
        let mut c = ready_controller();
        c.handle_event(ControllerEvent::Features(features()));
        c.handle_event(ControllerEvent::Action(Label::Up));

        // 2枚目のフレームで分類が走る
        c.handle_event(ControllerEvent::Features(features()));
        assert_eq!(c.classifier().classify_calls.get(), 1);
        assert_eq!(c.display().status, "Label: Up");
    }

    #[test]
    fn test_classification_error_leaves_display_unchanged() {
        let mut c = Controller::new(
            MockClassifier {
                fail_classify: true,
                ..Default::default()
            },
            RecordingDisplay::default(),
        );
        c.handle_event(ControllerEvent::ExtractorReady);
        c.handle_event(ControllerEvent::Features(features()));
        c.handle_event(ControllerEvent::Action(Label::Down));
        let counts_before = c.counts().clone();
        let status_before = c.display().status.clone();

        // 分類エラー: 表示もカウントも変化しない
        c.handle_event(ControllerEvent::Features(features()));
        assert_eq!(c.display().status, status_before);
        assert_eq!(*c.counts(), counts_before);
    }

    #[test]
    fn test_add_failure_does_not_count() {
        let mut c = Controller::new(
            MockClassifier {
                fail_add: true,
                ..Default::default()
            },
            RecordingDisplay::default(),
        );
        c.handle_event(ControllerEvent::ExtractorReady);
        c.handle_event(ControllerEvent::Features(features()));
        c.handle_event(ControllerEvent::Action(Label::Left));

        // 追加が失敗したらカウントも進めない
        assert_eq!(c.counts().total(), 0);
    }

    #[test]
    fn test_action_uses_last_computed_features() {
        let mut c = ready_controller();
        let v1 = FeatureVector::from_vec(vec![1.0, 2.0]);
        c.handle_event(ControllerEvent::Features(v1));
        // 操作は直近のベクトルを使う（1フレーム古い可能性は仕様内）
        c.handle_event(ControllerEvent::Action(Label::Center));
        assert_eq!(c.classifier().example_count(), 1);
    }
}
