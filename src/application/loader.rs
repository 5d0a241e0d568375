//! モデルロード制御モジュール
//!
//! 特徴抽出器のロードを指数バックオフつきの有限リトライで制御します。
//! 全試行が失敗した場合は初期化失敗として確定し、呼び出し側が
//! `Failed` 状態として可視化します（無限Loading待ちの排除）。

use crate::domain::{DomainError, DomainResult, FeatureExtractorPort};
use std::time::Duration;

/// ロード再試行ポリシー
#[derive(Debug, Clone)]
pub struct LoadRetryPolicy {
    /// 最大試行回数（1以上）
    pub max_attempts: u32,
    /// 初期バックオフ時間
    pub initial_backoff: Duration,
    /// 最大バックオフ時間
    pub max_backoff: Duration,
}

impl Default for LoadRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
        }
    }
}

/// 指数バックオフつきでモデルをロードする
///
/// # Arguments
/// - `extractor`: ロード対象の特徴抽出器
/// - `policy`: 再試行ポリシー
///
/// # Returns
/// - `Ok(())`: いずれかの試行でロード成功
/// - `Err(DomainError::Initialization)`: 全試行が失敗
pub fn load_with_backoff<E: FeatureExtractorPort>(
    extractor: &mut E,
    policy: &LoadRetryPolicy,
) -> DomainResult<()> {
    let mut backoff = policy.initial_backoff;
    let mut last_error = String::new();

    for attempt in 1..=policy.max_attempts.max(1) {
        match extractor.load() {
            Ok(()) => {
                tracing::info!("Feature extractor loaded (attempt {})", attempt);
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(
                    "Feature extractor load failed (attempt {}/{}): {}",
                    attempt,
                    policy.max_attempts,
                    e
                );
                last_error = e.to_string();

                if attempt < policy.max_attempts {
                    std::thread::sleep(backoff);
                    // 指数バックオフ: 次回の待機時間を2倍にする（上限あり）
                    backoff = (backoff * 2).min(policy.max_backoff);
                }
            }
        }
    }

    Err(DomainError::Initialization(format!(
        "load failed after {} attempts: {}",
        policy.max_attempts, last_error
    )))
}
