//! グリッドプーリング特徴抽出アダプタ
//!
//! フレームを grid_cols x grid_rows のセルに分割し、各セルの平均輝度を
//! [0,1] に正規化して特徴ベクトルとする。学習済みモデルの畳み込み特徴の
//! 代替として、同じFeatureExtractorPort契約で動く軽量実装。

use crate::domain::{DomainError, DomainResult, FeatureExtractorPort, FeatureVector, Frame};
use std::time::Duration;
use tracing::{debug, info};

/// グリッドプーリング特徴抽出アダプタ
pub struct GridFeatureExtractor {
    grid_cols: u32,
    grid_rows: u32,
    /// モデル読み込みの所要時間を模擬する遅延（0で即時）
    simulated_load: Duration,
    loaded: bool,
}

impl GridFeatureExtractor {
    pub fn new(grid_cols: u32, grid_rows: u32, simulated_load: Duration) -> DomainResult<Self> {
        if grid_cols == 0 || grid_rows == 0 {
            return Err(DomainError::Configuration(
                "feature grid dimensions cannot be zero".to_string(),
            ));
        }
        Ok(Self {
            grid_cols,
            grid_rows,
            simulated_load,
            loaded: false,
        })
    }
}

impl FeatureExtractorPort for GridFeatureExtractor {
    fn load(&mut self) -> DomainResult<()> {
        if !self.simulated_load.is_zero() {
            std::thread::sleep(self.simulated_load);
        }
        self.loaded = true;
        info!(
            grid_cols = self.grid_cols,
            grid_rows = self.grid_rows,
            "特徴抽出器の準備完了"
        );
        Ok(())
    }

    fn infer(&self, frame: &Frame) -> DomainResult<FeatureVector> {
        if !self.loaded {
            return Err(DomainError::Extraction(
                "extractor used before load() completed".to_string(),
            ));
        }
        if !frame.is_well_formed() {
            return Err(DomainError::Extraction(format!(
                "malformed frame: {}x{} with {} bytes",
                frame.width,
                frame.height,
                frame.data.len()
            )));
        }
        if frame.width < self.grid_cols || frame.height < self.grid_rows {
            return Err(DomainError::Extraction(format!(
                "frame {}x{} smaller than feature grid {}x{}",
                frame.width, frame.height, self.grid_cols, self.grid_rows
            )));
        }

        let mut features = Vec::with_capacity(self.feature_len());
        for cell_y in 0..self.grid_rows {
            // セル境界は整数除算の端数を吸収するため比例配分で求める
            let y0 = (cell_y * frame.height / self.grid_rows) as usize;
            let y1 = ((cell_y + 1) * frame.height / self.grid_rows) as usize;
            for cell_x in 0..self.grid_cols {
                let x0 = (cell_x * frame.width / self.grid_cols) as usize;
                let x1 = ((cell_x + 1) * frame.width / self.grid_cols) as usize;

                let mut sum = 0u64;
                for y in y0..y1 {
                    let row = y * frame.width as usize;
                    for x in x0..x1 {
                        sum += frame.data[row + x] as u64;
                    }
                }
                let pixels = ((y1 - y0) * (x1 - x0)) as u64;
                features.push(sum as f32 / pixels as f32 / 255.0);
            }
        }

        debug!(len = features.len(), "特徴抽出完了");
        Ok(FeatureVector::from_vec(features))
    }

    fn feature_len(&self) -> usize {
        (self.grid_cols * self.grid_rows) as usize
    }
}
