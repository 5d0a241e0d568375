/// コア型定義
///
/// Domain層の中心となるデータ構造。
/// すべての処理で共有される不変の型。

use ndarray::Array1;
use std::fmt;
use std::time::Instant;

/// 分類対象のラベル（固定の閉集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Up,
    Down,
    Left,
    Right,
    Center,
}

impl Label {
    /// 全ラベル（表示・集計の順序もこの並びに従う）
    pub const ALL: [Label; 5] = [
        Label::Up,
        Label::Down,
        Label::Left,
        Label::Right,
        Label::Center,
    ];

    /// ラベル名を取得
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Up => "Up",
            Label::Down => "Down",
            Label::Left => "Left",
            Label::Right => "Right",
            Label::Center => "Center",
        }
    }

    /// 集計表示用の複数形名を取得
    pub fn plural(&self) -> &'static str {
        match self {
            Label::Up => "Ups",
            Label::Down => "Downs",
            Label::Left => "Lefts",
            Label::Right => "Rights",
            Label::Center => "Centers",
        }
    }

    /// ALL配列内のインデックスを取得
    pub fn index(&self) -> usize {
        match self {
            Label::Up => 0,
            Label::Down => 1,
            Label::Left => 2,
            Label::Right => 3,
            Label::Center => 4,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// キャプチャされたフレームデータ（輝度8bit、連続メモリ）
#[derive(Debug, Clone)]
pub struct Frame {
    /// フレーム取得時刻
    pub timestamp: Instant,
    /// フレーム画像データ（Luma8、行優先）
    pub data: Vec<u8>,
    /// 画像の幅
    pub width: u32,
    /// 画像の高さ
    pub height: u32,
}

impl Frame {
    /// 新しいフレームを作成
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            timestamp: Instant::now(),
            data,
            width,
            height,
        }
    }

    /// データ長が幅×高さと一致しているか検証
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == (self.width as usize) * (self.height as usize)
    }
}

/// 特徴ベクトル（固定長の浮動小数点列）
///
/// 抽出器が生成し、分類器が消費する。長さの一致は分類器側が検証する。
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Array1<f32>);

impl FeatureVector {
    /// Vecから特徴ベクトルを作成
    pub fn from_vec(values: Vec<f32>) -> Self {
        Self(Array1::from_vec(values))
    }

    /// ベクトル長を取得
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 長さ0かどうか
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 内部配列への参照を取得
    pub fn as_array(&self) -> &Array1<f32> {
        &self.0
    }
}

/// 訓練例（特徴ベクトルとラベルのペア）
///
/// 分類器に追加された後は削除も変更もされない。
#[derive(Debug, Clone)]
pub struct TrainingExample {
    pub features: FeatureVector,
    pub label: Label,
}

impl TrainingExample {
    pub fn new(features: FeatureVector, label: Label) -> Self {
        Self { features, label }
    }
}

/// ラベル別の訓練例カウント
///
/// 不変条件: 各ラベルのカウントは、そのラベルで追加された訓練例の総数と
/// 常に一致する（表示専用、減算なし）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCounts {
    counts: [u64; Label::ALL.len()],
}

impl LabelCounts {
    /// 全ラベル0のカウントを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定ラベルのカウントを1増やす
    pub fn increment(&mut self, label: Label) {
        self.counts[label.index()] += 1;
    }

    /// 指定ラベルの現在値を取得
    pub fn get(&self, label: Label) -> u64 {
        self.counts[label.index()]
    }

    /// 全ラベルの合計を取得
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// 表示用の1行テキストに整形
    ///
    /// 例: "Ups: 1 - Downs: 0 - Lefts: 0 - Rights: 2 - Centers: 0"
    pub fn render(&self) -> String {
        let parts: Vec<String> = Label::ALL
            .iter()
            .map(|l| format!("{}: {}", l.plural(), self.get(*l)))
            .collect();
        parts.join(" - ")
    }
}

/// 分類結果（予測ラベルとラベル別信頼度）
#[derive(Debug, Clone)]
pub struct Classification {
    /// 予測されたラベル
    pub label: Label,
    /// ラベル別の信頼度（近傍中の得票割合、Label::ALL順）
    pub confidences: [f32; Label::ALL.len()],
}

impl Classification {
    /// 予測ラベルの信頼度を取得
    pub fn confidence(&self) -> f32 {
        self.confidences[self.label.index()]
    }
}
