use crate::hand::{HandLandmarks, LandmarkIndex};

pub const FEATURE_LEN: usize = LandmarkIndex::COUNT * 2;

/// 各ランドマークの手首基準x/yを、絶対値の最大が1になるよう正規化。
///
/// フレーム内での手の位置と大きさの影響が消える。
pub fn landmark_features(hand: &HandLandmarks) -> Vec<f32> {
    let wrist = hand.point(LandmarkIndex::Wrist);
    let mut features: Vec<f32> = hand
        .landmarks()
        .iter()
        .flat_map(|lm| [lm.x - wrist.x, lm.y - wrist.y])
        .collect();

    let max = features.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    if max > 0.0 {
        for v in &mut features {
            *v /= max;
        }
    }
    features
}
