//! ランタイムフラグ（Application層）
//!
//! モデル準備完了ゲートと停止フラグをスレッド間で共有します。
//! `Arc<AtomicBool>`を使用したロックフリー設計により、
//! 読み取り側スレッド（Capture/Extract/Input）は数CPUサイクルで状態を確認できます。
//!
//! メモリオーダーはRelaxed: 厳密な順序保証は不要（少し古い値でも無害）。

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// ランタイムフラグ（スレッド間で共有、ロックフリー）
#[derive(Clone)]
pub struct RuntimeFlags {
    /// 特徴抽出器のロード完了（完了までフレームループは走らない）
    model_ready: Arc<AtomicBool>,
    /// 停止要求（コントローラループの終了時に立てる）
    stopping: Arc<AtomicBool>,
}

impl RuntimeFlags {
    /// 新しいRuntimeFlagsを作成（ロード未完了・停止要求なし）
    pub fn new() -> Self {
        Self {
            model_ready: Arc::new(AtomicBool::new(false)),
            stopping: Arc::new(AtomicBool::new(false)),
        }
    }

    /// モデルがロード済みかを確認（ロックフリー）
    #[inline]
    pub fn is_model_ready(&self) -> bool {
        self.model_ready.load(Ordering::Relaxed)
    }

    /// モデルロード完了を記録（Extractスレッドが1度だけ呼ぶ）
    pub fn set_model_ready(&self) {
        self.model_ready.store(true, Ordering::Relaxed);
    }

    /// 停止が要求されているかを確認（ロックフリー）
    #[inline]
    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Relaxed)
    }

    /// 停止を要求する
    pub fn request_stop(&self) {
        self.stopping.store(true, Ordering::Relaxed);
    }
}

impl Default for RuntimeFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_ready_gate() {
        let flags = RuntimeFlags::new();
        assert!(!flags.is_model_ready());

        flags.set_model_ready();
        assert!(flags.is_model_ready());

        // クローンは同じ状態を共有する
        let clone = flags.clone();
        assert!(clone.is_model_ready());
    }

    #[test]
    fn test_stop_request() {
        let flags = RuntimeFlags::new();
        let clone = flags.clone();
        assert!(!clone.is_stopping());

        flags.request_stop();
        assert!(clone.is_stopping());
    }
}
