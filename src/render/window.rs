use anyhow::Result;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::canvas::{for_each_line_point, RgbImage};
use crate::hand::{HandLandmarks, PixelPoint};
use crate::orchestrator::Control;
use crate::render::skeleton::{BONE_COLOR, HAND_CONNECTIONS, LANDMARK_COLOR};

/// minifbを使用したレンダラー
pub struct MinifbRenderer {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl MinifbRenderer {
    /// ウィンドウを作成
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        Ok(Self {
            window,
            buffer: vec![0u32; width * height],
            width,
            height,
        })
    }

    /// ウィンドウが開いているか
    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// キー入力を操作に変換（Qで終了、Cで消去）
    pub fn poll_control(&self) -> Control {
        if !self.is_open() || self.window.is_key_pressed(Key::Q, KeyRepeat::No) {
            Control::Quit
        } else if self.window.is_key_pressed(Key::C, KeyRepeat::No) {
            Control::Clear
        } else {
            Control::None
        }
    }

    /// タイトルを変更
    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    /// ウィンドウと同じサイズの画像をバッファにコピー
    pub fn draw_image(&mut self, image: &RgbImage) {
        if image.width() as usize == self.width && image.height() as usize == self.height {
            image.to_xrgb(&mut self.buffer);
        }
    }

    /// 検出した手の骨格を描画
    pub fn draw_hand(&mut self, hand: &HandLandmarks) {
        let w = self.width as u32;
        let h = self.height as u32;

        for (start, end) in HAND_CONNECTIONS.iter() {
            let a = hand.pixel(*start, w, h);
            let b = hand.pixel(*end, w, h);
            self.draw_line(a, b, BONE_COLOR);
        }

        for lm in hand.landmarks().iter() {
            let p = lm.point().to_pixel(w, h);
            self.draw_circle(p.x, p.y, 3, LANDMARK_COLOR);
        }
    }

    /// バッファをウィンドウに表示
    pub fn update(&mut self) -> Result<()> {
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)?;
        Ok(())
    }

    /// 線を描画
    fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: u32) {
        for_each_line_point(from, to, |p| self.set_pixel(p.x, p.y, color));
    }

    /// 円を描画
    fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// ピクセルを設定
    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize * self.width + x as usize] = color;
        }
    }
}
