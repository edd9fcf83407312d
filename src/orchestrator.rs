//! フレーム単位の処理: ランドマークを受け取り、キャンバスを更新する。
//!
//! [`FrameOrchestrator`] がフレームをまたぐ状態（キャンバス、ストロークの
//! アンカー、スロットの記憶）をすべて持ち、手はスロット順に一つずつ適用する。

use tracing::{debug, warn};

use crate::canvas::{Blend, Canvas, CanvasError, RgbImage};
use crate::config::Config;
use crate::gesture::{Classifier, Gesture};
use crate::hand::{draw_point, hand_surface, HandLandmarks, Landmark, MalformedLandmarks};
use crate::tracker::{Brush, HandSlot, SlotAssigner, StrokeTracker};

/// 外部からの操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Quit,
    Clear,
    None,
}

/// 1フレーム分の手の処理結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// 処理したスロットごとの判定（処理順）
    pub verdicts: Vec<(HandSlot, Gesture)>,
    /// ランドマーク不正で無視した手の数
    pub skipped: usize,
    /// 手の上限を超えて捨てた検出数
    pub dropped: usize,
}

impl FrameReport {
    pub fn verdict(&self, slot: HandSlot) -> Option<Gesture> {
        self.verdicts
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, g)| *g)
    }
}

pub struct FrameOrchestrator {
    classifier: Classifier,
    strokes: StrokeTracker,
    slots: SlotAssigner,
    canvas: Option<Canvas>,
    brush: Brush,
    erase_radius: u32,
    max_hands: usize,
    blend: Blend,
}

impl FrameOrchestrator {
    pub fn new(config: &Config, classifier: Classifier) -> Self {
        Self {
            classifier,
            strokes: StrokeTracker::new(),
            slots: SlotAssigner::from_config(&config.gesture),
            canvas: None,
            brush: Brush {
                color: config.canvas.ink_color,
                thickness: config.canvas.thickness,
            },
            erase_radius: config.canvas.erase_radius,
            max_hands: config.gesture.max_hands,
            blend: Blend {
                frame: config.display.frame_weight,
                ink: config.display.ink_weight,
            },
        }
    }

    /// ヒューリスティック分類のみで作成
    pub fn from_config(config: &Config) -> Self {
        Self::new(config, Classifier::heuristic(config.gesture.pinch_threshold))
    }

    /// 1フレーム分の検出結果を適用する。
    /// キャンバスは初回呼び出し時のフレームサイズで作成し、以後変えない。
    pub fn process(&mut self, width: u32, height: u32, hands: &[Vec<Landmark>]) -> FrameReport {
        let canvas = self
            .canvas
            .get_or_insert_with(|| Canvas::new(width, height));
        let (width, height) = (canvas.width(), canvas.height());

        let mut report = FrameReport::default();
        let hands = if hands.len() > self.max_hands {
            report.dropped = hands.len() - self.max_hands;
            debug!("Dropping {} detections beyond {} hands", report.dropped, self.max_hands);
            &hands[..self.max_hands]
        } else {
            hands
        };

        let validated: Vec<Result<HandLandmarks, MalformedLandmarks>> =
            hands.iter().map(|points| HandLandmarks::new(points)).collect();
        let centroids: Vec<_> = validated
            .iter()
            .map(|h| h.as_ref().ok().map(HandLandmarks::centroid))
            .collect();

        let assignment = self.slots.assign(&centroids);
        for slot in &assignment.retired {
            self.strokes.retire(*slot);
        }

        let mut order: Vec<(usize, Option<HandSlot>)> =
            assignment.slots.iter().copied().enumerate().collect();
        order.sort_by_key(|(i, slot)| (slot.unwrap_or(usize::MAX), *i));

        for (i, slot) in order {
            let (hand, slot) = match (&validated[i], slot) {
                (Ok(hand), Some(slot)) => (hand, slot),
                (Err(e), slot) => {
                    warn!(hand = i, "Skipping hand: {}", e);
                    report.skipped += 1;
                    if let Some(slot) = slot {
                        self.strokes.retire(slot);
                    }
                    continue;
                }
                (Ok(_), None) => continue,
            };

            let gesture = self.classifier.classify(hand);
            match gesture {
                Gesture::Draw => {
                    let point = draw_point(hand, width, height);
                    self.strokes.draw(slot, point, canvas, self.brush);
                }
                Gesture::Erase => {
                    let surface = hand_surface(hand, width, height);
                    canvas.erase(&surface.polygon, surface.palm_center, self.erase_radius);
                    self.strokes.retire(slot);
                }
                Gesture::Idle => self.strokes.retire(slot),
            }
            report.verdicts.push((slot, gesture));
        }

        report
    }

    /// ループを止めるべきときは false を返す
    pub fn apply(&mut self, control: Control) -> bool {
        match control {
            Control::Quit => false,
            Control::Clear => {
                self.clear();
                true
            }
            Control::None => true,
        }
    }

    /// インクを全消去し、全ストロークを終了
    pub fn clear(&mut self) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.clear();
        }
        self.strokes.clear();
        self.slots.reset();
    }

    /// カメラフレームにインクを重ねた表示画像。
    /// 最初のフレーム処理前はインクがないのでフレームのみ。
    pub fn composite(&self, frame: &RgbImage) -> Result<RgbImage, CanvasError> {
        match &self.canvas {
            Some(canvas) => canvas.composite_over(frame, self.blend),
            None => Canvas::new(frame.width(), frame.height()).composite_over(frame, self.blend),
        }
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn strokes(&self) -> &StrokeTracker {
        &self.strokes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlotAssignmentMode;
    use crate::hand::fixtures;
    use crate::hand::PixelPoint;

    const W: u32 = 640;
    const H: u32 = 480;

    fn orchestrator() -> FrameOrchestrator {
        FrameOrchestrator::from_config(&Config::default())
    }

    fn ink(o: &FrameOrchestrator) -> usize {
        o.canvas().map(Canvas::ink_pixels).unwrap_or(0)
    }

    fn pinch(x: i32, y: i32) -> Vec<Landmark> {
        fixtures::pinch_at(x, y, 5, W, H)
    }

    #[test]
    fn test_no_hands_changes_nothing() {
        let mut o = orchestrator();
        let report = o.process(W, H, &[]);
        assert!(report.verdicts.is_empty());
        assert_eq!(ink(&o), 0);
        assert_eq!(o.strokes().active_slots().count(), 0);
    }

    #[test]
    fn test_example_scenario() {
        let mut o = orchestrator();

        // フレーム1: (100, 100) を挟む幅0.02のピンチ
        let f1 = fixtures::pinch_at(100, 100, 10, 1000, 1000);
        let report = o.process(1000, 1000, &[f1]);
        assert_eq!(report.verdict(0), Some(Gesture::Draw));
        assert_eq!(o.strokes().anchor(0), Some(PixelPoint::new(100, 100)));
        let canvas = o.canvas().unwrap();
        assert_eq!(canvas.pixel(100, 100), Some([255, 0, 0]));
        assert_eq!(canvas.ink_pixels(), 13);

        // フレーム2: (120, 110) を挟む幅0.03のピンチ
        let f2 = fixtures::pinch_at(120, 110, 15, 1000, 1000);
        let report = o.process(1000, 1000, &[f2]);
        assert_eq!(report.verdict(0), Some(Gesture::Draw));
        assert_eq!(o.strokes().anchor(0), Some(PixelPoint::new(120, 110)));
        let canvas = o.canvas().unwrap();
        for (x, y) in [(100, 100), (110, 105), (120, 110)] {
            assert_eq!(canvas.pixel(x, y), Some([255, 0, 0]), "gap at ({}, {})", x, y);
        }

        // フレーム3: 手のひらがストローク上にある拳
        let f3 = fixtures::fist_at(0.110, 0.105);
        let report = o.process(1000, 1000, &[f3]);
        assert_eq!(report.verdict(0), Some(Gesture::Erase));
        assert_eq!(o.strokes().anchor(0), None);
        assert_eq!(ink(&o), 0);
    }

    #[test]
    fn test_continuity_across_frames() {
        let mut o = orchestrator();
        o.process(W, H, &[pinch(100, 100)]);
        o.process(W, H, &[pinch(200, 100)]);
        let canvas = o.canvas().unwrap();
        for x in 100..=200 {
            assert_eq!(canvas.pixel(x, 100), Some([255, 0, 0]), "gap at x={}", x);
        }
    }

    #[test]
    fn test_idle_interrupts_stroke() {
        let mut o = orchestrator();
        o.process(W, H, &[pinch(100, 100)]);
        let after_dot = ink(&o);

        let report = o.process(W, H, &[fixtures::open_hand()]);
        assert_eq!(report.verdict(0), Some(Gesture::Idle));
        assert_eq!(ink(&o), after_dot);
        assert_eq!(o.strokes().anchor(0), None);

        o.process(W, H, &[pinch(200, 100)]);
        let canvas = o.canvas().unwrap();
        assert_eq!(canvas.pixel(150, 100), Some([0, 0, 0]));
        assert_eq!(canvas.ink_pixels(), 2 * after_dot);
    }

    #[test]
    fn test_idle_never_creates_anchor() {
        let mut o = orchestrator();
        o.process(W, H, &[fixtures::open_hand(), fixtures::open_hand()]);
        assert_eq!(ink(&o), 0);
        assert_eq!(o.strokes().active_slots().count(), 0);
    }

    #[test]
    fn test_anchor_survives_frame_without_hands() {
        let mut o = orchestrator();
        o.process(W, H, &[pinch(100, 100)]);
        o.process(W, H, &[]);
        assert_eq!(o.strokes().anchor(0), Some(PixelPoint::new(100, 100)));
        o.process(W, H, &[pinch(150, 100)]);
        assert_eq!(o.canvas().unwrap().pixel(125, 100), Some([255, 0, 0]));
    }

    #[test]
    fn test_two_hands_are_independent() {
        let left = [pinch(100, 100), pinch(150, 120), fixtures::open_hand()];
        let right = [fixtures::open_hand(), pinch(400, 300), pinch(450, 300)];

        let mut both = orchestrator();
        let mut only_left = orchestrator();
        let mut only_right = orchestrator();
        for t in 0..3 {
            both.process(W, H, &[left[t].clone(), right[t].clone()]);
            only_left.process(W, H, &[left[t].clone()]);
            only_right.process(W, H, &[right[t].clone()]);
        }

        assert_eq!(both.strokes().anchor(0), only_left.strokes().anchor(0));
        assert_eq!(both.strokes().anchor(1), only_right.strokes().anchor(0));
        assert_eq!(ink(&both), ink(&only_left) + ink(&only_right));

        let combined = both.canvas().unwrap();
        for (single, name) in [(&only_left, "left"), (&only_right, "right")] {
            let canvas = single.canvas().unwrap();
            for y in 0..H as i32 {
                for x in 0..W as i32 {
                    if canvas.pixel(x, y) != Some([0, 0, 0]) {
                        assert_eq!(combined.pixel(x, y), canvas.pixel(x, y), "{} at ({}, {})", name, x, y);
                    }
                }
            }
        }
    }

    #[test]
    fn test_later_slot_paints_over_earlier() {
        let mut o = orchestrator();
        // 同じフレームでスロット0が描き、スロット1が同じ場所を消す
        let fist = fixtures::fist_at(100.0 / W as f32, 100.0 / H as f32);
        o.process(W, H, &[pinch(100, 100), fist]);
        assert_eq!(o.canvas().unwrap().pixel(100, 100), Some([0, 0, 0]));
    }

    #[test]
    fn test_malformed_hand_is_skipped() {
        let mut o = orchestrator();
        o.process(W, H, &[pinch(50, 50), pinch(300, 300)]);

        let mut broken = pinch(60, 50);
        broken.truncate(20);
        let report = o.process(W, H, &[broken, pinch(320, 300)]);

        assert_eq!(report.skipped, 1);
        assert_eq!(report.verdict(0), None);
        assert_eq!(report.verdict(1), Some(Gesture::Draw));
        assert_eq!(o.strokes().anchor(0), None);
        assert_eq!(o.strokes().anchor(1), Some(PixelPoint::new(320, 300)));
    }

    #[test]
    fn test_extra_hands_dropped() {
        let mut o = orchestrator();
        let report = o.process(W, H, &[pinch(50, 50), pinch(200, 50), pinch(400, 50)]);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.verdicts.len(), 2);
        assert_eq!(o.canvas().unwrap().pixel(400, 50), Some([0, 0, 0]));
    }

    #[test]
    fn test_clear_control() {
        let mut o = orchestrator();
        o.process(W, H, &[pinch(100, 100)]);
        assert!(o.apply(Control::Clear));
        assert_eq!(ink(&o), 0);
        assert_eq!(o.strokes().anchor(0), None);

        let cleared = o.canvas().cloned();
        o.clear();
        assert_eq!(o.canvas().cloned(), cleared);

        assert!(o.apply(Control::None));
        assert!(!o.apply(Control::Quit));
    }

    #[test]
    fn test_canvas_keeps_first_frame_size() {
        let mut o = orchestrator();
        o.process(W, H, &[]);
        o.process(320, 240, &[pinch(100, 100)]);
        let canvas = o.canvas().unwrap();
        assert_eq!((canvas.width(), canvas.height()), (W, H));
    }

    #[test]
    fn test_frame_of_other_size_is_recoverable() {
        let mut o = orchestrator();
        o.process(320, 240, &[pinch(100, 100)]);

        let frame = RgbImage::new(W, H);
        assert!(matches!(
            o.composite(&frame),
            Err(CanvasError::SizeMismatch { width: 320, height: 240, .. })
        ));

        // キャンバスと同じサイズのフレームは引き続き描画・合成できる
        o.process(320, 240, &[pinch(50, 50)]);
        let small = RgbImage::new(320, 240);
        assert!(o.composite(&small).is_ok());
    }

    #[test]
    fn test_composite_blends_frame_and_ink() {
        let mut o = orchestrator();
        let mut frame = RgbImage::new(W, H);
        frame.fill([100, 100, 100]);
        let before = o.composite(&frame).unwrap();
        assert_eq!(before.pixel(0, 0), Some([50, 50, 50]));

        o.process(W, H, &[pinch(100, 100)]);
        let out = o.composite(&frame).unwrap();
        assert_eq!(out.pixel(100, 100), Some([255, 50, 50]));
        assert_eq!(out.pixel(0, 0), Some([50, 50, 50]));
    }

    #[test]
    fn test_nearest_centroid_keeps_strokes_on_swap() {
        let mut config = Config::default();
        config.gesture.slot_assignment = SlotAssignmentMode::NearestCentroid;
        let mut o = FrameOrchestrator::from_config(&config);

        o.process(W, H, &[pinch(100, 100), pinch(500, 100)]);
        // 同じ手が逆順で報告される
        o.process(W, H, &[pinch(505, 100), pinch(105, 100)]);

        let canvas = o.canvas().unwrap();
        // 手の間をまたぐ線は引かれない
        assert_eq!(canvas.pixel(300, 100), Some([0, 0, 0]));
        assert_eq!(o.strokes().anchor(0), Some(PixelPoint::new(105, 100)));
        assert_eq!(o.strokes().anchor(1), Some(PixelPoint::new(505, 100)));
    }

    #[test]
    fn test_detection_order_swaps_strokes() {
        let mut o = orchestrator();
        o.process(W, H, &[pinch(100, 100), pinch(500, 100)]);
        o.process(W, H, &[pinch(505, 100), pinch(105, 100)]);
        // スロットはリスト位置で決まるので、各スロットが画面を横切って飛ぶ
        assert_eq!(o.canvas().unwrap().pixel(300, 100), Some([255, 0, 0]));
    }
}
