use crate::hand::LandmarkIndex::{self, *};

/// 21点の手の骨格接続 (始点, 終点)
pub const HAND_CONNECTIONS: [(LandmarkIndex, LandmarkIndex); 21] = [
    // 親指
    (Wrist, ThumbCmc),
    (ThumbCmc, ThumbMcp),
    (ThumbMcp, ThumbIp),
    (ThumbIp, ThumbTip),
    // 人差し指
    (Wrist, IndexMcp),
    (IndexMcp, IndexPip),
    (IndexPip, IndexDip),
    (IndexDip, IndexTip),
    // 中指
    (IndexMcp, MiddleMcp),
    (MiddleMcp, MiddlePip),
    (MiddlePip, MiddleDip),
    (MiddleDip, MiddleTip),
    // 薬指
    (MiddleMcp, RingMcp),
    (RingMcp, RingPip),
    (RingPip, RingDip),
    (RingDip, RingTip),
    // 小指
    (RingMcp, PinkyMcp),
    (Wrist, PinkyMcp),
    (PinkyMcp, PinkyPip),
    (PinkyPip, PinkyDip),
    (PinkyDip, PinkyTip),
];

/// ランドマーク点の色 (RGB)
pub const LANDMARK_COLOR: u32 = 0xFF0000;

/// 骨格線の色 (RGB)
pub const BONE_COLOR: u32 = 0xFFFFFF;
