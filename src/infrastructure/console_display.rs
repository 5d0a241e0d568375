//! コンソール表示アダプタ
//!
//! DisplayPortの標準出力実装。状態テキストとラベルカウントを行として
//! 出力する。同一テキストの連続出力は抑制し、毎フレームの分類結果で
//! 画面が流れないようにする。

use crate::domain::{DisplayPort, LabelCounts};

/// コンソール表示アダプタ
pub struct ConsoleDisplay {
    last_status: Option<String>,
    last_counts: Option<String>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self {
            last_status: None,
            last_counts: None,
        }
    }
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPort for ConsoleDisplay {
    fn set_status(&mut self, text: &str) {
        if self.last_status.as_deref() == Some(text) {
            return;
        }
        println!("{text}");
        self.last_status = Some(text.to_string());
    }

    fn set_counts(&mut self, counts: &LabelCounts) {
        let rendered = counts.render();
        if self.last_counts.as_deref() == Some(rendered.as_str()) {
            return;
        }
        println!("{rendered}");
        self.last_counts = Some(rendered);
    }

    fn show_controls(&mut self, visible: bool) {
        if visible {
            println!("コマンド: up / down / left / right / center でラベル付け、quit で終了");
        }
    }
}
