use thiserror::Error;

/// 21点の手ランドマークのインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl LandmarkIndex {
    pub const COUNT: usize = 21;

    /// 親指以外の4本の指先
    pub const FINGER_TIPS: [LandmarkIndex; 4] = [
        LandmarkIndex::IndexTip,
        LandmarkIndex::MiddleTip,
        LandmarkIndex::RingTip,
        LandmarkIndex::PinkyTip,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        use LandmarkIndex::*;
        const ALL: [LandmarkIndex; LandmarkIndex::COUNT] = [
            Wrist, ThumbCmc, ThumbMcp, ThumbIp, ThumbTip, IndexMcp, IndexPip, IndexDip, IndexTip,
            MiddleMcp, MiddlePip, MiddleDip, MiddleTip, RingMcp, RingPip, RingDip, RingTip,
            PinkyMcp, PinkyPip, PinkyDip, PinkyTip,
        ];
        ALL.get(index).copied()
    }

    /// 同じ指で2つ手前の関節（指先ならPIP）
    pub fn two_back(self) -> Option<Self> {
        (self as usize).checked_sub(2).and_then(Self::from_index)
    }
}

/// ランドマークが [0, 1] の外にはみ出してよい幅。
/// フレームから一部出た手は単位正方形の少し外の点として報告される。
pub const LANDMARK_MARGIN: f32 = 0.5;

/// 正規化画像座標の点（両軸 0.0..=1.0）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedPoint {
    pub x: f32,
    pub y: f32,
}

impl NormalizedPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &NormalizedPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// ピクセル座標に変換（0方向に切り捨て）
    pub fn to_pixel(&self, width: u32, height: u32) -> PixelPoint {
        PixelPoint::new(
            (self.x * width as f32) as i32,
            (self.y * height as f32) as i32,
        )
    }
}

/// あるフレームのピクセル座標の点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(&self, other: &PixelPoint) -> PixelPoint {
        PixelPoint::new(
            (self.x + other.x).div_euclid(2),
            (self.y + other.y).div_euclid(2),
        )
    }
}

/// 認識側から渡される手ランドマーク1点
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    /// 正規化X座標 (0.0-1.0、フレーム幅基準)
    pub x: f32,
    /// 正規化Y座標 (0.0-1.0、フレーム高さ基準、下向き)
    pub y: f32,
    /// 手首基準の奥行き
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn point(&self) -> NormalizedPoint {
        NormalizedPoint::new(self.x, self.y)
    }
}

/// ランドマーク集合を拒否する理由
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedLandmarks {
    #[error("malformed landmarks: expected 21 points, got {got}")]
    WrongCount { got: usize },
    #[error("malformed landmarks: point {index} has a non-finite coordinate")]
    NonFinite { index: usize },
    #[error("malformed landmarks: point {index} at ({x}, {y}) is outside the frame")]
    OutOfRange { index: usize, x: f32, y: f32 },
}

/// 検証済みの片手21点ランドマーク
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    landmarks: [Landmark; LandmarkIndex::COUNT],
}

impl HandLandmarks {
    /// 認識側から来た生のランドマーク列を検証
    pub fn new(points: &[Landmark]) -> Result<Self, MalformedLandmarks> {
        let landmarks: [Landmark; LandmarkIndex::COUNT] = points
            .try_into()
            .map_err(|_| MalformedLandmarks::WrongCount { got: points.len() })?;

        let range = -LANDMARK_MARGIN..=1.0 + LANDMARK_MARGIN;
        for (index, lm) in landmarks.iter().enumerate() {
            if !(lm.x.is_finite() && lm.y.is_finite() && lm.z.is_finite()) {
                return Err(MalformedLandmarks::NonFinite { index });
            }
            if !range.contains(&lm.x) || !range.contains(&lm.y) {
                return Err(MalformedLandmarks::OutOfRange { index, x: lm.x, y: lm.y });
            }
        }

        Ok(Self { landmarks })
    }

    pub fn get(&self, index: LandmarkIndex) -> &Landmark {
        &self.landmarks[index as usize]
    }

    pub fn point(&self, index: LandmarkIndex) -> NormalizedPoint {
        self.get(index).point()
    }

    pub fn pixel(&self, index: LandmarkIndex, width: u32, height: u32) -> PixelPoint {
        self.point(index).to_pixel(width, height)
    }

    pub fn landmarks(&self) -> &[Landmark; LandmarkIndex::COUNT] {
        &self.landmarks
    }

    /// 全ランドマークのx/y平均
    pub fn centroid(&self) -> NormalizedPoint {
        let n = LandmarkIndex::COUNT as f32;
        let (sx, sy) = self
            .landmarks
            .iter()
            .fold((0.0, 0.0), |(sx, sy), lm| (sx + lm.x, sy + lm.y));
        NormalizedPoint::new(sx / n, sy / n)
    }
}
