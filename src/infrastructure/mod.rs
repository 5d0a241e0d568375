//! インフラストラクチャ層
//!
//! ドメイン層のポートに対する具体実装（アダプタ）を提供する。

pub mod console_display;
pub mod grid_features;
pub mod knn;
pub mod stdin_input;
pub mod synthetic_capture;

pub use console_display::ConsoleDisplay;
pub use grid_features::GridFeatureExtractor;
pub use knn::KnnClassifierAdapter;
pub use stdin_input::StdinInput;
pub use synthetic_capture::SyntheticCaptureSource;
