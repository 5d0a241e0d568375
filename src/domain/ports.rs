/// Port定義（Clean Architectureのインターフェース）
///
/// Domain層が外部実装に依存するための抽象trait。
/// Infrastructure層がこれらを実装し、Application層がDIで注入する。

use crate::domain::{Classification, DomainResult, FeatureVector, Frame, Label, LabelCounts};

/// フレームソースポート: フレームの取得を抽象化
///
/// Webカメラ等のキャプチャデバイスに相当する。
pub trait FrameSourcePort: Send {
    /// 次のフレームを取得する
    ///
    /// # Returns
    /// - `Ok(Some(Frame))`: 新しいフレームの取得成功
    /// - `Ok(None)`: まだ新しいフレームがない（フレームレート待ち）
    /// - `Err(DomainError)`: 取得エラー
    fn next_frame(&mut self) -> DomainResult<Option<Frame>>;

    /// ソース情報を取得
    fn source_info(&self) -> SourceInfo;
}

/// フレームソース情報
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub name: String,
}

/// 特徴抽出ポート: フレームから固定長特徴ベクトルへの変換を抽象化
///
/// 事前学習モデル（MobileNet等）の推論に相当する。`load()`が完了するまで
/// `infer()`を呼んではならない。
pub trait FeatureExtractorPort: Send {
    /// モデルをロードする（1回限りの初期化）
    ///
    /// # Returns
    /// - `Ok(())`: ロード完了、以後 `infer()` が利用可能
    /// - `Err(DomainError)`: ロード失敗（リトライ可能）
    fn load(&mut self) -> DomainResult<()>;

    /// フレームから特徴ベクトルを抽出する
    fn infer(&self, frame: &Frame) -> DomainResult<FeatureVector>;

    /// 生成される特徴ベクトルの長さを取得
    fn feature_len(&self) -> usize;
}

/// 分類ポート: 最近傍分類器を抽象化
///
/// 訓練例の追加は失敗を握りつぶさない（次元不一致は明示的なエラー）。
pub trait ClassifierPort: Send {
    /// 1例以上の訓練例を持つラベルの数を取得
    fn label_count(&self) -> usize;

    /// 追加された訓練例の総数を取得
    fn example_count(&self) -> usize;

    /// 訓練例を追加する
    ///
    /// # Returns
    /// - `Ok(())`: 追加成功
    /// - `Err(DomainError)`: 次元不一致等の追加エラー
    fn add_example(&mut self, features: FeatureVector, label: Label) -> DomainResult<()>;

    /// 特徴ベクトルを分類する
    ///
    /// # Returns
    /// - `Ok(Classification)`: 予測ラベルとラベル別信頼度
    /// - `Err(DomainError)`: 訓練例なし・次元不一致等の分類エラー
    fn classify(&self, features: &FeatureVector) -> DomainResult<Classification>;
}

/// 表示ポート: 2つのテキスト領域への出力を抽象化
///
/// 状態変化のたびに同期的に更新される。
pub trait DisplayPort: Send {
    /// ステータス行（予測ラベル・状態メッセージ）を更新
    fn set_status(&mut self, text: &str);

    /// ラベル別カウント行を更新
    fn set_counts(&mut self, counts: &LabelCounts);

    /// ラベリング操作の表示/非表示を切り替え
    fn show_controls(&mut self, visible: bool);
}

/// ユーザー入力コマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    /// ラベリング操作（5方向のいずれか）
    Action(Label),
    /// 終了要求
    Quit,
}

/// 入力ポート: ユーザーのラベリング操作を抽象化
pub trait InputPort: Send {
    /// 保留中の入力コマンドを取得する（ノンブロッキング）
    ///
    /// # Returns
    /// - `Some(InputCommand)`: 新しいコマンドあり
    /// - `None`: コマンドなし
    fn poll_command(&mut self) -> Option<InputCommand>;
}
