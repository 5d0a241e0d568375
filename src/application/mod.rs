//! Application Layer
//!
//! コントローラ、パイプライン制御、モデルロード、統計管理などの
//! ユースケースを実装します。
//!
//! ## モジュール構成
//! - `controller`: 対話コントローラ（Loading/Ready/Failedの状態機械）
//! - `pipeline`: 3スレッドパイプライン制御（Capture/Extract/Input）
//! - `threads`: 各ワーカースレッドの実装と最新優先送信ポリシー
//! - `runtime`: ロックフリーのランタイムフラグ（準備完了ゲート・停止）
//! - `loader`: モデルロードの指数バックオフリトライ
//! - `stats`: 統計情報管理（FPS、レイテンシ）

pub mod controller;
pub mod loader;
pub mod pipeline;
pub mod runtime;
pub mod stats;
pub(crate) mod threads;
