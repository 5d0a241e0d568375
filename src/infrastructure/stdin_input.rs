//! 標準入力アダプタ
//!
//! InputPortの標準入力実装。専用スレッドで行を読み取り、コマンドに
//! 解析してチャネルに流す。poll_command()は非ブロッキング。
//! EOF到達時はQuitを送って終了コマンドとみなす。

use crate::domain::{InputCommand, InputPort, Label};
use crossbeam_channel::{unbounded, Receiver};
use std::io::BufRead;
use std::thread;
use tracing::{debug, warn};

/// 入力行をコマンドに解析（未知の行はNone）
fn parse_command(line: &str) -> Option<InputCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "up" | "u" => Some(InputCommand::Action(Label::Up)),
        "down" | "d" => Some(InputCommand::Action(Label::Down)),
        "left" | "l" => Some(InputCommand::Action(Label::Left)),
        "right" | "r" => Some(InputCommand::Action(Label::Right)),
        "center" | "c" => Some(InputCommand::Action(Label::Center)),
        "quit" | "q" | "exit" => Some(InputCommand::Quit),
        "" => None,
        other => {
            warn!(input = other, "未知のコマンドを無視");
            None
        }
    }
}

/// 標準入力アダプタ
pub struct StdinInput {
    command_rx: Receiver<InputCommand>,
}

impl StdinInput {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else { break };
                    if let Some(command) = parse_command(&line) {
                        if tx.send(command).is_err() {
                            return;
                        }
                    }
                }
                // EOF: 端末切断と同じ扱いで終了を通知
                debug!("標準入力がEOFに到達");
                let _ = tx.send(InputCommand::Quit);
            })
            .expect("failed to spawn stdin reader thread");

        Self { command_rx: rx }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputPort for StdinInput {
    fn poll_command(&mut self) -> Option<InputCommand> {
        self.command_rx.try_recv().ok()
    }
}
