/// エラー型定義
///
/// Domain層の統一エラー型。thiserrorを使用して型安全なエラー処理を提供します。
///
/// # 設計方針
/// - unwrap()の使用を禁止し、明示的なエラーハンドリングを強制
/// - Result型でエラー伝播を明示化
/// - 回復可能なエラー（分類失敗）と致命的なエラー（初期化失敗）を型で区別

use thiserror::Error;

/// Domain層の統一エラー型
#[derive(Error, Debug)]
pub enum DomainError {
    /// フレーム取得関連のエラー
    #[error("Capture error: {0}")]
    Capture(String),

    /// 特徴抽出関連のエラー
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// 分類関連のエラー（回復可能、次のフレームで再試行される）
    #[error("Classification error: {0}")]
    Classification(String),

    /// 設定関連のエラー
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 初期化エラー（モデルロード失敗等）
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// その他のエラー
    #[error("Unexpected error: {0}")]
    Other(String),
}

/// Domain層の統一Result型
pub type DomainResult<T> = Result<T, DomainError>;
