//! k-NN分類アダプタ
//!
//! 訓練例をメモリ上に保持し、多数決で分類するk近傍分類器。
//! ClassifierPortの唯一の本実装で、ラベルストアの所有者でもある。
//! 距離は「相対距離」（L2なら平方根を省いた二乗距離）で比較する。

use crate::domain::{
    Classification, ClassifierPort, DistanceMetric, DomainError, DomainResult, FeatureVector,
    Label, TrainingExample,
};
use ndarray::ArrayView1;

/// k-NN分類アダプタ
pub struct KnnClassifierAdapter {
    k: usize,
    distance: DistanceMetric,
    feature_len: usize,
    /// 追加された訓練例（削除・変更なし）
    examples: Vec<TrainingExample>,
}

impl KnnClassifierAdapter {
    /// 新しいk-NN分類器を作成
    ///
    /// # Arguments
    /// - `k`: 近傍数（1以上）
    /// - `distance`: 距離メトリック
    /// - `feature_len`: 受け付ける特徴ベクトルの長さ
    ///
    /// # Returns
    /// - `Err(DomainError::Configuration)`: kが0の場合
    pub fn new(k: usize, distance: DistanceMetric, feature_len: usize) -> DomainResult<Self> {
        if k == 0 {
            return Err(DomainError::Configuration(
                "k cannot be zero for a k-NN classifier".to_string(),
            ));
        }
        Ok(Self {
            k,
            distance,
            feature_len,
            examples: Vec::new(),
        })
    }

    /// 相対距離を計算（大小比較にのみ使うため、L2は平方根を省略）
    fn rdistance(&self, a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
        match self.distance {
            DistanceMetric::L2 => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| {
                    let d = x - y;
                    d * d
                })
                .sum(),
            DistanceMetric::L1 => a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum(),
        }
    }

    fn check_len(&self, features: &FeatureVector) -> DomainResult<()> {
        if features.len() != self.feature_len {
            return Err(DomainError::Classification(format!(
                "feature length mismatch: expected {}, got {}",
                self.feature_len,
                features.len()
            )));
        }
        Ok(())
    }
}

impl ClassifierPort for KnnClassifierAdapter {
    fn label_count(&self) -> usize {
        let mut seen = [false; Label::ALL.len()];
        for example in &self.examples {
            seen[example.label.index()] = true;
        }
        seen.iter().filter(|s| **s).count()
    }

    fn example_count(&self) -> usize {
        self.examples.len()
    }

    fn add_example(&mut self, features: FeatureVector, label: Label) -> DomainResult<()> {
        self.check_len(&features)?;
        self.examples.push(TrainingExample::new(features, label));
        Ok(())
    }

    fn classify(&self, features: &FeatureVector) -> DomainResult<Classification> {
        if self.examples.is_empty() {
            return Err(DomainError::Classification(
                "cannot classify with an empty training set".to_string(),
            ));
        }
        self.check_len(features)?;

        // 1. 全訓練例との相対距離を計算
        let mut distances: Vec<(f32, Label)> = Vec::with_capacity(self.examples.len());
        for example in &self.examples {
            let dist = self.rdistance(
                example.features.as_array().view(),
                features.as_array().view(),
            );
            if dist.is_nan() {
                return Err(DomainError::Classification(
                    "invalid distance (NaN in feature data)".to_string(),
                ));
            }
            distances.push((dist, example.label));
        }

        // 2. 距離の昇順にソート（NaNは上で除外済み）
        distances.sort_unstable_by(|a, b| {
            a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal)
        });

        // 3. 上位k件を近傍として採用（kが訓練例数を超える場合は全件）
        let num_neighbors = self.k.min(distances.len());
        let neighbors = &distances[..num_neighbors];

        // 4. ラベルごとの得票を数え、得票割合を信頼度とする
        let mut votes = [0usize; Label::ALL.len()];
        for (_, label) in neighbors {
            votes[label.index()] += 1;
        }

        let mut confidences = [0.0f32; Label::ALL.len()];
        for (i, count) in votes.iter().enumerate() {
            confidences[i] = *count as f32 / num_neighbors as f32;
        }

        let max_votes = votes.iter().copied().max().unwrap_or(0);

        // 5. 同票の場合は、ソート済み近傍の中で最初に現れる（= 最近傍が
        //    最も近い）ラベルを採用する（決定的なタイブレーク）
        let winner = neighbors
            .iter()
            .map(|(_, label)| *label)
            .find(|label| votes[label.index()] == max_votes)
            .ok_or_else(|| {
                DomainError::Classification("could not determine a majority class".to_string())
            })?;

        Ok(Classification {
            label: winner,
            confidences,
        })
    }
}
