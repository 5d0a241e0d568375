//! 設定管理
//!
//! TOML設定ファイルの読み込みとDomain型への変換。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::{DomainError, DomainResult};

/// 距離メトリック
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// 二乗ユークリッド距離（デフォルト、平方根計算を省略）
    #[default]
    L2,
    /// マンハッタン距離
    L1,
}

/// アプリケーション設定のルート構造
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AppConfig {
    /// フレームソース設定
    pub capture: CaptureConfig,
    /// 特徴抽出設定
    pub extractor: ExtractorConfig,
    /// 分類器設定
    pub classifier: ClassifierConfig,
    /// パイプライン設定
    pub pipeline: PipelineSettings,
}

/// フレームソース設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CaptureConfig {
    /// フレーム幅（ピクセル）
    ///
    /// デフォルト: 640
    pub width: u32,

    /// フレーム高さ（ピクセル）
    ///
    /// デフォルト: 480
    pub height: u32,

    /// フレームレート（フレーム/秒）
    ///
    /// デフォルト: 30
    pub fps: u32,
}

impl CaptureConfig {
    /// デフォルトのフレーム幅
    pub const DEFAULT_WIDTH: u32 = 640;
    /// デフォルトのフレーム高さ
    pub const DEFAULT_HEIGHT: u32 = 480;
    /// デフォルトのフレームレート
    pub const DEFAULT_FPS: u32 = 30;

    /// 1フレームあたりの時間間隔を取得
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            fps: Self::DEFAULT_FPS,
        }
    }
}

/// 特徴抽出設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractorConfig {
    /// 特徴グリッドの列数（特徴長 = grid_cols * grid_rows）
    ///
    /// デフォルト: 16
    pub grid_cols: u32,

    /// 特徴グリッドの行数
    ///
    /// デフォルト: 12
    pub grid_rows: u32,

    /// モデルロードの最大試行回数
    ///
    /// この回数を超えたら初期化失敗として確定する
    /// デフォルト: 3回
    pub load_max_attempts: u32,

    /// ロード再試行の初期待機時間（ミリ秒）
    ///
    /// デフォルト: 100ms
    pub load_initial_delay_ms: u64,

    /// ロード再試行の最大待機時間（ミリ秒、指数バックオフの上限）
    ///
    /// デフォルト: 2000ms
    pub load_max_delay_ms: u64,

    /// ロードにかかる模擬遅延（ミリ秒、デモ用フレームソース向け）
    ///
    /// デフォルト: 0ms
    #[serde(default)]
    pub simulated_load_ms: u64,
}

impl ExtractorConfig {
    /// デフォルトのグリッド列数
    pub const DEFAULT_GRID_COLS: u32 = 16;
    /// デフォルトのグリッド行数
    pub const DEFAULT_GRID_ROWS: u32 = 12;
    /// デフォルトのロード最大試行回数
    pub const DEFAULT_LOAD_MAX_ATTEMPTS: u32 = 3;
    /// デフォルトのロード初期遅延（ミリ秒）
    pub const DEFAULT_LOAD_INITIAL_DELAY_MS: u64 = 100;
    /// デフォルトのロード最大遅延（ミリ秒）
    pub const DEFAULT_LOAD_MAX_DELAY_MS: u64 = 2000;

    /// 特徴ベクトルの長さを取得
    pub fn feature_len(&self) -> usize {
        (self.grid_cols * self.grid_rows) as usize
    }

    pub fn load_initial_delay(&self) -> Duration {
        Duration::from_millis(self.load_initial_delay_ms)
    }

    pub fn load_max_delay(&self) -> Duration {
        Duration::from_millis(self.load_max_delay_ms)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            grid_cols: Self::DEFAULT_GRID_COLS,
            grid_rows: Self::DEFAULT_GRID_ROWS,
            load_max_attempts: Self::DEFAULT_LOAD_MAX_ATTEMPTS,
            load_initial_delay_ms: Self::DEFAULT_LOAD_INITIAL_DELAY_MS,
            load_max_delay_ms: Self::DEFAULT_LOAD_MAX_DELAY_MS,
            simulated_load_ms: 0,
        }
    }
}

/// 分類器設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClassifierConfig {
    /// 近傍数k
    ///
    /// デフォルト: 3
    pub k: usize,

    /// 距離メトリック
    ///
    /// 選択肢: "l2" (二乗ユークリッド), "l1" (マンハッタン)
    /// デフォルト: "l2"
    #[serde(default)]
    pub distance: DistanceMetric,
}

impl ClassifierConfig {
    /// デフォルトの近傍数
    pub const DEFAULT_K: usize = 3;
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            k: Self::DEFAULT_K,
            distance: DistanceMetric::default(),
        }
    }
}

/// パイプライン設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PipelineSettings {
    /// 統計情報の出力間隔（秒）
    pub stats_interval_sec: u64,

    /// 入力ポーリング間隔（ミリ秒）
    pub input_poll_interval_ms: u64,
}

impl PipelineSettings {
    pub const DEFAULT_STATS_INTERVAL_SEC: u64 = 10;
    pub const DEFAULT_INPUT_POLL_INTERVAL_MS: u64 = 10;

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_sec)
    }

    pub fn input_poll_interval(&self) -> Duration {
        Duration::from_millis(self.input_poll_interval_ms)
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            stats_interval_sec: Self::DEFAULT_STATS_INTERVAL_SEC,
            input_poll_interval_ms: Self::DEFAULT_INPUT_POLL_INTERVAL_MS,
        }
    }
}

impl AppConfig {
    /// TOMLファイルから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> DomainResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content)
            .map_err(|e| DomainError::Configuration(format!("Failed to parse config file: {}", e)))
    }

    /// デフォルト設定をTOMLファイルに書き出す
    pub fn write_default<P: AsRef<Path>>(path: P) -> DomainResult<()> {
        let config = Self::default();
        let content = toml::to_string_pretty(&config).map_err(|e| {
            DomainError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)
            .map_err(|e| DomainError::Configuration(format!("Failed to write config file: {}", e)))
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> DomainResult<()> {
        // フレームサイズの検証
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(DomainError::Configuration(
                "Frame width and height must be greater than 0".to_string(),
            ));
        }
        if self.capture.fps == 0 {
            return Err(DomainError::Configuration(
                "Frame rate must be greater than 0".to_string(),
            ));
        }

        // 特徴グリッドの検証
        if self.extractor.grid_cols == 0 || self.extractor.grid_rows == 0 {
            return Err(DomainError::Configuration(
                "Feature grid dimensions must be greater than 0".to_string(),
            ));
        }
        if self.extractor.grid_cols > self.capture.width
            || self.extractor.grid_rows > self.capture.height
        {
            return Err(DomainError::Configuration(format!(
                "Feature grid {}x{} exceeds frame size {}x{}",
                self.extractor.grid_cols,
                self.extractor.grid_rows,
                self.capture.width,
                self.capture.height
            )));
        }

        // ロード再試行の検証
        if self.extractor.load_max_attempts == 0 {
            return Err(DomainError::Configuration(
                "load_max_attempts must be greater than 0".to_string(),
            ));
        }

        // 分類器の検証
        if self.classifier.k == 0 {
            return Err(DomainError::Configuration(
                "Classifier k must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
