use crate::config::{GestureConfig, SlotAssignmentMode};
use crate::hand::NormalizedPoint;

use super::stroke::HandSlot;

/// 1フレーム分の手のスロット
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    /// 検出順の各手のスロット。位置がなく割り当てられない手は `None`
    pub slots: Vec<Option<HandSlot>>,
    /// 今フレームで手が対応しなかったスロット。ストロークを終了させる
    pub retired: Vec<HandSlot>,
}

/// 検出した手にスロットを割り当てる。
///
/// `DetectionOrder` はリスト位置をそのまま使うので、検出順が入れ替わると
/// スロットも入れ替わる。`NearestCentroid` は前フレームの位置に最も近い手に
/// 同じスロットを与える。
#[derive(Debug, Clone)]
pub struct SlotAssigner {
    mode: SlotAssignmentMode,
    max_distance: f32,
    previous: Vec<(HandSlot, NormalizedPoint)>,
}

impl SlotAssigner {
    pub fn new(mode: SlotAssignmentMode, max_distance: f32) -> Self {
        Self {
            mode,
            max_distance,
            previous: Vec::new(),
        }
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self::new(config.slot_assignment, config.slot_match_distance)
    }

    /// `centroids[i]` は手 `i` の位置。使えない手は `None`
    pub fn assign(&mut self, centroids: &[Option<NormalizedPoint>]) -> Assignment {
        match self.mode {
            SlotAssignmentMode::DetectionOrder => Assignment {
                slots: (0..centroids.len()).map(Some).collect(),
                retired: Vec::new(),
            },
            SlotAssignmentMode::NearestCentroid => self.assign_nearest(centroids),
        }
    }

    fn assign_nearest(&mut self, centroids: &[Option<NormalizedPoint>]) -> Assignment {
        let mut candidates: Vec<(f32, usize, HandSlot)> = Vec::new();
        for (hand, centroid) in centroids.iter().enumerate() {
            let Some(c) = centroid else { continue };
            for (slot, prev) in &self.previous {
                let d = c.distance(prev);
                if d <= self.max_distance {
                    candidates.push((d, hand, *slot));
                }
            }
        }
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.2.cmp(&b.2)));

        let mut slots: Vec<Option<HandSlot>> = vec![None; centroids.len()];
        let mut taken: Vec<HandSlot> = Vec::new();
        for (_, hand, slot) in candidates {
            if slots[hand].is_none() && !taken.contains(&slot) {
                slots[hand] = Some(slot);
                taken.push(slot);
            }
        }

        let retired: Vec<HandSlot> = self
            .previous
            .iter()
            .map(|(slot, _)| *slot)
            .filter(|slot| !taken.contains(slot))
            .collect();

        for (hand, centroid) in centroids.iter().enumerate() {
            if centroid.is_some() && slots[hand].is_none() {
                let free = (0..).find(|s| !taken.contains(s)).unwrap_or(0);
                slots[hand] = Some(free);
                taken.push(free);
            }
        }

        self.previous = slots
            .iter()
            .zip(centroids.iter())
            .filter_map(|(slot, c)| Some(((*slot)?, (*c)?)))
            .collect();

        Assignment { slots, retired }
    }

    /// 手の位置の記憶を消す
    pub fn reset(&mut self) {
        self.previous.clear();
    }
}
