use thiserror::Error;

/// RGB色（各チャンネル1バイト）
pub type Color = [u8; 3];

pub const EMPTY_INK: Color = [0, 0, 0];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    #[error("frame is {frame_width}x{frame_height} but canvas is {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },
    #[error("image buffer holds {got} bytes, {width}x{height} RGB needs {expected}")]
    BufferLength {
        width: u32,
        height: u32,
        expected: usize,
        got: usize,
    },
}

/// 8bit RGB画像（行優先で詰めて格納）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbImage {
    pub const CHANNELS: usize = 3;

    /// 全画素0の画像を作成
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * Self::CHANNELS],
        }
    }

    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CanvasError> {
        let expected = width as usize * height as usize * Self::CHANNELS;
        if data.len() != expected {
            return Err(CanvasError::BufferLength {
                width,
                height,
                expected,
                got: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            Some((y as usize * self.width as usize + x as usize) * Self::CHANNELS)
        } else {
            None
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.offset(x, y)
            .map(|i| [self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// 画像外への書き込みは無視
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + Self::CHANNELS].copy_from_slice(&color);
        }
    }

    pub fn fill(&mut self, color: Color) {
        for px in self.data.chunks_exact_mut(Self::CHANNELS) {
            px.copy_from_slice(&color);
        }
    }

    /// 0x00RRGGBB形式でバッファに書き出す
    pub fn to_xrgb(&self, out: &mut Vec<u32>) {
        out.clear();
        out.extend(
            self.data
                .chunks_exact(Self::CHANNELS)
                .map(|px| ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32),
        );
    }
}

/// カメラフレームにインクを重ねる際の重み
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blend {
    pub frame: f32,
    pub ink: f32,
}

impl Default for Blend {
    fn default() -> Self {
        Self {
            frame: 0.5,
            ink: 1.0,
        }
    }
}

impl Blend {
    /// 2画像の重み付き和（チャンネルごとに丸めて飽和）
    pub fn apply(&self, frame: &RgbImage, ink: &RgbImage) -> Result<RgbImage, CanvasError> {
        if frame.width != ink.width || frame.height != ink.height {
            return Err(CanvasError::SizeMismatch {
                width: ink.width,
                height: ink.height,
                frame_width: frame.width,
                frame_height: frame.height,
            });
        }

        let data = frame
            .data
            .iter()
            .zip(ink.data.iter())
            .map(|(&f, &i)| {
                let v = f as f32 * self.frame + i as f32 * self.ink;
                v.round().clamp(0.0, 255.0) as u8
            })
            .collect();

        Ok(RgbImage {
            width: frame.width,
            height: frame.height,
            data,
        })
    }
}
