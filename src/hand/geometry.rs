//! 片手のランドマークから求めるジェスチャー特徴量。
//!
//! すべて [`HandLandmarks`] 一つの純粋関数。距離は正規化座標で、
//! フレームサイズを取る関数のみそのフレームの画素単位。

use super::landmark::{HandLandmarks, LandmarkIndex, PixelPoint};

/// 親指先と人差し指先の距離がこれ未満ならピンチ
pub const DEFAULT_PINCH_THRESHOLD: f32 = 0.05;

/// 消去に使う閉じた手の輪郭ランドマーク
const SURFACE_LANDMARKS: [LandmarkIndex; 9] = [
    LandmarkIndex::Wrist,
    LandmarkIndex::IndexMcp,
    LandmarkIndex::MiddleMcp,
    LandmarkIndex::RingMcp,
    LandmarkIndex::PinkyMcp,
    LandmarkIndex::IndexTip,
    LandmarkIndex::MiddleTip,
    LandmarkIndex::RingTip,
    LandmarkIndex::PinkyTip,
];

/// 指先がPIP関節より上にある指の数（親指を除く）
pub fn extended_finger_count(hand: &HandLandmarks) -> u8 {
    LandmarkIndex::FINGER_TIPS
        .iter()
        .filter_map(|&tip| tip.two_back().map(|pip| (tip, pip)))
        .filter(|&(tip, pip)| hand.get(tip).y < hand.get(pip).y)
        .count() as u8
}

/// 親指先と人差し指先の距離
pub fn pinch_distance(hand: &HandLandmarks) -> f32 {
    hand.point(LandmarkIndex::ThumbTip)
        .distance(&hand.point(LandmarkIndex::IndexTip))
}

pub fn is_pinching(hand: &HandLandmarks, threshold: f32) -> bool {
    pinch_distance(hand) < threshold
}

/// ピンチ中の描画点: 親指先と人差し指先の中点
pub fn draw_point(hand: &HandLandmarks, width: u32, height: u32) -> PixelPoint {
    let thumb = hand.pixel(LandmarkIndex::ThumbTip, width, height);
    let index = hand.pixel(LandmarkIndex::IndexTip, width, height);
    thumb.midpoint(&index)
}

/// 閉じた手の消去領域（画素）
#[derive(Debug, Clone, PartialEq)]
pub struct HandSurface {
    /// 単純閉多角形。最後の頂点は最初の頂点につながる
    pub polygon: Vec<PixelPoint>,
    /// 中指MCP
    pub palm_center: PixelPoint,
}

/// 閉じた手のおおよその輪郭。
///
/// 輪郭ランドマークを重心周りの角度順に並べるので、指の曲げ方によらず
/// 自己交差しない多角形になる。
pub fn hand_surface(hand: &HandLandmarks, width: u32, height: u32) -> HandSurface {
    let mut points: Vec<PixelPoint> = SURFACE_LANDMARKS
        .iter()
        .map(|&idx| hand.pixel(idx, width, height))
        .collect();

    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x as f64).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y as f64).sum::<f64>() / n;

    let key = |p: &PixelPoint| {
        let dx = p.x as f64 - cx;
        let dy = p.y as f64 - cy;
        (dy.atan2(dx), dx * dx + dy * dy)
    };
    points.sort_by(|a, b| {
        let (ang_a, r_a) = key(a);
        let (ang_b, r_b) = key(b);
        ang_a.total_cmp(&ang_b).then(r_a.total_cmp(&r_b))
    });
    points.dedup();

    HandSurface {
        polygon: points,
        palm_center: hand.pixel(LandmarkIndex::MiddleMcp, width, height),
    }
}
