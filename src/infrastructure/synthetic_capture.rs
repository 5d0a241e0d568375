//! 合成フレームソースアダプタ
//!
//! 実カメラの代わりに、明るいブロブが周期的に移動するグレースケール
//! フレームを生成する。FrameSourcePort契約（ペーシング込み）の本実装で、
//! カメラなしでもパイプライン全体を動かせる。

use crate::domain::{DomainResult, Frame, FrameSourcePort, SourceInfo};
use std::time::{Duration, Instant};
use tracing::debug;

/// ブロブが一箇所に留まるフレーム数
const FRAMES_PER_POSE: u64 = 60;

/// 合成フレームソースアダプタ
pub struct SyntheticCaptureSource {
    width: u32,
    height: u32,
    fps: u32,
    frame_interval: Duration,
    last_frame_at: Option<Instant>,
    tick: u64,
}

impl SyntheticCaptureSource {
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        let frame_interval = if fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / fps
        };
        Self {
            width,
            height,
            fps,
            frame_interval,
            last_frame_at: None,
            tick: 0,
        }
    }

    /// 現在のtickに応じたブロブ中心（上→下→左→右→中央の順に巡回）
    fn blob_center(&self) -> (u32, u32) {
        let cx = self.width / 2;
        let cy = self.height / 2;
        match (self.tick / FRAMES_PER_POSE) % 5 {
            0 => (cx, self.height / 6),
            1 => (cx, self.height - self.height / 6),
            2 => (self.width / 6, cy),
            3 => (self.width - self.width / 6, cy),
            _ => (cx, cy),
        }
    }

    fn render_frame(&self) -> Frame {
        let (bx, by) = self.blob_center();
        let radius = (self.width.min(self.height) / 6) as i64;
        let radius_sq = radius * radius;

        let mut data = vec![0u8; (self.width * self.height) as usize];
        for y in 0..self.height {
            let row = (y * self.width) as usize;
            for x in 0..self.width {
                let dx = x as i64 - bx as i64;
                let dy = y as i64 - by as i64;
                // ブロブ内は高輝度、外は暗い縦グラデーション
                data[row + x as usize] = if dx * dx + dy * dy <= radius_sq {
                    230
                } else {
                    (20 + y * 40 / self.height) as u8
                };
            }
        }
        Frame::new(data, self.width, self.height)
    }
}

impl FrameSourcePort for SyntheticCaptureSource {
    fn next_frame(&mut self) -> DomainResult<Option<Frame>> {
        // ペーシング: 前フレームからframe_interval経過するまではNone
        if let Some(last) = self.last_frame_at {
            if last.elapsed() < self.frame_interval {
                return Ok(None);
            }
        }
        self.last_frame_at = Some(Instant::now());
        self.tick += 1;

        let frame = self.render_frame();
        debug!(tick = self.tick, "合成フレーム生成");
        Ok(Some(frame))
    }

    fn source_info(&self) -> SourceInfo {
        SourceInfo {
            width: self.width,
            height: self.height,
            fps: self.fps,
            name: "synthetic".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_are_well_formed() {
        let mut source = SyntheticCaptureSource::new(64, 48, 0);
        let frame = source.next_frame().unwrap().expect("frame expected");
        assert!(frame.is_well_formed());
        assert_eq!(frame.width, 64);
        assert_eq!(frame.height, 48);
    }

    #[test]
    fn test_pacing_returns_none_between_frames() {
        // 1fps: 直後の2回目はペーシングでNoneになる
        let mut source = SyntheticCaptureSource::new(32, 32, 1);
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_zero_fps_never_paces() {
        let mut source = SyntheticCaptureSource::new(32, 32, 0);
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_some());
    }

    #[test]
    fn test_blob_moves_between_poses() {
        let mut source = SyntheticCaptureSource::new(64, 64, 0);
        let first = source.next_frame().unwrap().unwrap();
        source.tick += FRAMES_PER_POSE;
        let second = source.next_frame().unwrap().unwrap();
        assert_ne!(first.data, second.data);
    }

    #[test]
    fn test_source_info() {
        let source = SyntheticCaptureSource::new(640, 480, 30);
        let info = source.source_info();
        assert_eq!(info.width, 640);
        assert_eq!(info.height, 480);
        assert_eq!(info.fps, 30);
        assert_eq!(info.name, "synthetic");
    }
}
