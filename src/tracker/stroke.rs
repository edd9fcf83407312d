use std::collections::HashMap;

use crate::canvas::{Canvas, Color};
use crate::hand::PixelPoint;

/// 現フレーム内で手を識別する小さな整数
pub type HandSlot = usize;

/// ストロークの描画スタイル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brush {
    pub color: Color,
    pub thickness: u32,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            color: [255, 0, 0],
            thickness: 5,
        }
    }
}

/// スロットごとの直前の描画点。
///
/// アンカーはそのスロットが直前に処理されたフレームで描画していた場合のみ
/// 存在する。連続した描画フレームは一本のストロークになり、新しい
/// ストロークが古い点から引かれることはない。
#[derive(Debug, Clone, Default)]
pub struct StrokeTracker {
    anchors: HashMap<HandSlot, PixelPoint>,
}

impl StrokeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// スロットのストロークを `point` まで延ばす。最初のフレームは点になる
    pub fn draw(&mut self, slot: HandSlot, point: PixelPoint, canvas: &mut Canvas, brush: Brush) {
        let from = self.anchors.get(&slot).copied().unwrap_or(point);
        canvas.draw_segment(from, point, brush.color, brush.thickness);
        self.anchors.insert(slot, point);
    }

    /// スロットのストロークを終了。次の描画は新しいストロークになる
    pub fn retire(&mut self, slot: HandSlot) {
        self.anchors.remove(&slot);
    }

    /// スロットの現在のアンカー
    pub fn anchor(&self, slot: HandSlot) -> Option<PixelPoint> {
        self.anchors.get(&slot).copied()
    }

    pub fn active_slots(&self) -> impl Iterator<Item = HandSlot> + '_ {
        self.anchors.keys().copied()
    }

    pub fn clear(&mut self) {
        self.anchors.clear();
    }
}
