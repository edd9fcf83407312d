pub mod image;

pub use image::{Blend, CanvasError, Color, RgbImage, EMPTY_INK};

use crate::hand::PixelPoint;

/// 永続するインク層。カメラフレームと同じサイズで、リサイズしない
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    ink: RgbImage,
}

impl Canvas {
    /// 空のキャンバスを作成
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            ink: RgbImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.ink.width()
    }

    pub fn height(&self) -> u32 {
        self.ink.height()
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.ink.pixel(x, y)
    }

    /// インクのある画素数
    pub fn ink_pixels(&self) -> usize {
        self.ink
            .as_bytes()
            .chunks_exact(RgbImage::CHANNELS)
            .filter(|px| px.iter().any(|&c| c != 0))
            .count()
    }

    /// `from`から`to`へ太線を描画。長さ0なら点を打つ
    pub fn draw_segment(&mut self, from: PixelPoint, to: PixelPoint, color: Color, thickness: u32) {
        let radius = i64::from(thickness / 2);
        for_each_line_point(from, to, |p| self.fill_disk(p, radius, color));
    }

    /// 閉じた手の範囲を消す: 多角形と手のひら中心の円
    pub fn erase(&mut self, polygon: &[PixelPoint], palm_center: PixelPoint, radius: u32) {
        self.fill_polygon(polygon, EMPTY_INK);
        self.fill_disk(palm_center, i64::from(radius), EMPTY_INK);
    }

    /// 全インクを消去
    pub fn clear(&mut self) {
        self.ink.fill(EMPTY_INK);
    }

    /// カメラフレームとインクを `blend` で合成した表示画像
    pub fn composite_over(&self, frame: &RgbImage, blend: Blend) -> Result<RgbImage, CanvasError> {
        blend.apply(frame, &self.ink)
    }

    /// 円内（dx²+dy² <= r²）を塗る。走査はキャンバス内に限定
    fn fill_disk(&mut self, center: PixelPoint, radius: i64, color: Color) {
        let (cx, cy) = (i64::from(center.x), i64::from(center.y));
        let r2 = i128::from(radius) * i128::from(radius);
        let x_min = (cx - radius).max(0);
        let x_max = (cx + radius).min(i64::from(self.width()) - 1);
        let y_min = (cy - radius).max(0);
        let y_max = (cy + radius).min(i64::from(self.height()) - 1);

        for y in y_min..=y_max {
            let dy = i128::from(y - cy);
            for x in x_min..=x_max {
                let dx = i128::from(x - cx);
                if dx * dx + dy * dy <= r2 {
                    // x, y はキャンバス内なので i32 に収まる
                    self.ink.set_pixel(x as i32, y as i32, color);
                }
            }
        }
    }

    /// 画素中心で判定する偶奇規則のスキャンライン塗りつぶし。
    /// 異なる頂点が3つ未満なら何もしない
    fn fill_polygon(&mut self, polygon: &[PixelPoint], color: Color) {
        let mut distinct = polygon.to_vec();
        distinct.sort_by_key(|p| (p.x, p.y));
        distinct.dedup();
        if distinct.len() < 3 {
            return;
        }

        let (Some(min_y), Some(max_y)) = (
            polygon.iter().map(|p| p.y).min(),
            polygon.iter().map(|p| p.y).max(),
        ) else {
            return;
        };
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height() as i32 - 1);
        let width = self.width() as i32;

        let mut crossings: Vec<f64> = Vec::with_capacity(polygon.len());
        for y in min_y..=max_y {
            let yc = y as f64 + 0.5;
            crossings.clear();
            for (i, a) in polygon.iter().enumerate() {
                let b = &polygon[(i + 1) % polygon.len()];
                let (ay, by) = (a.y as f64, b.y as f64);
                if (ay > yc) != (by > yc) {
                    let t = (yc - ay) / (by - ay);
                    crossings.push(a.x as f64 + t * (b.x - a.x) as f64);
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));

            for span in crossings.chunks_exact(2) {
                let start = ((span[0] - 0.5).ceil() as i32).max(0);
                let end = ((span[1] - 0.5).ceil() as i32).min(width);
                for x in start..end {
                    self.ink.set_pixel(x, y, color);
                }
            }
        }
    }
}

/// Bresenhamで`from`から`to`までの各画素を両端込みで列挙
pub fn for_each_line_point(from: PixelPoint, to: PixelPoint, mut plot: impl FnMut(PixelPoint)) {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = from.x;
    let mut y = from.y;

    loop {
        plot(PixelPoint::new(x, y));

        if x == to.x && y == to.y {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = [255, 0, 0];

    fn p(x: i32, y: i32) -> PixelPoint {
        PixelPoint::new(x, y)
    }

    fn inked_canvas(width: u32, height: u32) -> Canvas {
        let mut canvas = Canvas::new(width, height);
        canvas.ink.fill(RED);
        canvas
    }

    #[test]
    fn test_new_canvas_is_empty() {
        let canvas = Canvas::new(16, 8);
        assert_eq!(canvas.ink_pixels(), 0);
        assert_eq!((canvas.width(), canvas.height()), (16, 8));
    }

    #[test]
    fn test_zero_length_segment_draws_dot() {
        let mut canvas = Canvas::new(50, 50);
        canvas.draw_segment(p(20, 20), p(20, 20), RED, 5);
        assert_eq!(canvas.pixel(20, 20), Some(RED));
        assert_eq!(canvas.pixel(22, 20), Some(RED));
        assert_eq!(canvas.pixel(23, 20), Some(EMPTY_INK));
        // 半径2の円: 13画素
        assert_eq!(canvas.ink_pixels(), 13);
    }

    #[test]
    fn test_thin_segment_is_continuous() {
        let mut canvas = Canvas::new(50, 50);
        canvas.draw_segment(p(5, 5), p(40, 5), RED, 1);
        for x in 5..=40 {
            assert_eq!(canvas.pixel(x, 5), Some(RED), "gap at x={}", x);
        }
        assert_eq!(canvas.ink_pixels(), 36);
    }

    #[test]
    fn test_diagonal_segment_reaches_both_ends() {
        let mut canvas = Canvas::new(50, 50);
        canvas.draw_segment(p(40, 30), p(10, 5), RED, 3);
        assert_eq!(canvas.pixel(40, 30), Some(RED));
        assert_eq!(canvas.pixel(10, 5), Some(RED));
    }

    #[test]
    fn test_segment_clips_at_border() {
        let mut canvas = Canvas::new(10, 10);
        canvas.draw_segment(p(-5, 5), p(15, 5), RED, 1);
        assert_eq!(canvas.ink_pixels(), 10);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut canvas = inked_canvas(8, 8);
        canvas.clear();
        let once = canvas.clone();
        canvas.clear();
        assert_eq!(canvas, once);
        assert_eq!(canvas.ink_pixels(), 0);
    }

    #[test]
    fn test_erase_only_inside_region() {
        let mut canvas = inked_canvas(60, 60);
        let square = [p(10, 10), p(20, 10), p(20, 20), p(10, 20)];
        // 手のひらの円は四角形から離しておく
        canvas.erase(&square, p(45, 45), 5);

        for y in 0..60 {
            for x in 0..60 {
                let in_square = (10..20).contains(&x) && (10..20).contains(&y);
                let (dx, dy) = (x - 45, y - 45);
                let in_disk = dx * dx + dy * dy <= 25;
                let expected = if in_square || in_disk { EMPTY_INK } else { RED };
                assert_eq!(canvas.pixel(x, y), Some(expected), "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_erase_concave_polygon() {
        let mut canvas = inked_canvas(40, 40);
        // x=10 から x=20 の間が上に開いたU字
        let u = [
            p(0, 0), p(10, 0), p(10, 20), p(20, 20), p(20, 0), p(30, 0), p(30, 30), p(0, 30),
        ];
        canvas.erase(&u, p(-100, -100), 1);
        assert_eq!(canvas.pixel(15, 5), Some(RED));
        assert_eq!(canvas.pixel(5, 5), Some(EMPTY_INK));
        assert_eq!(canvas.pixel(25, 5), Some(EMPTY_INK));
        assert_eq!(canvas.pixel(15, 25), Some(EMPTY_INK));
    }

    #[test]
    fn test_degenerate_polygon_skips_fill() {
        let mut canvas = inked_canvas(20, 20);
        let line = [p(2, 2), p(10, 10), p(2, 2)];
        canvas.erase(&line, p(-50, -50), 3);
        assert_eq!(canvas.ink_pixels(), 400);

        let collinear = [p(0, 0), p(5, 5), p(10, 10)];
        canvas.erase(&collinear, p(-50, -50), 3);
        assert_eq!(canvas.ink_pixels(), 400);
    }

    #[test]
    fn test_degenerate_polygon_still_erases_disk() {
        let mut canvas = inked_canvas(20, 20);
        canvas.erase(&[], p(10, 10), 2);
        assert_eq!(canvas.pixel(10, 10), Some(EMPTY_INK));
        assert_eq!(canvas.ink_pixels(), 400 - 13);
    }

    #[test]
    fn test_composite_leaves_canvas_untouched() {
        let mut canvas = Canvas::new(4, 4);
        canvas.draw_segment(p(1, 1), p(1, 1), RED, 1);
        let before = canvas.clone();

        let mut frame = RgbImage::new(4, 4);
        frame.fill([100, 100, 100]);
        let out = canvas.composite_over(&frame, Blend::default()).unwrap();

        assert_eq!(canvas, before);
        assert_eq!(out.pixel(1, 1), Some([255, 50, 50]));
        assert_eq!(out.pixel(0, 0), Some([50, 50, 50]));
    }

    #[test]
    fn test_huge_erase_radius_wipes_canvas() {
        let mut canvas = inked_canvas(10, 10);
        canvas.erase(&[], p(5, 5), 50_000);
        assert_eq!(canvas.ink_pixels(), 0);

        let mut canvas = inked_canvas(10, 10);
        canvas.erase(&[], p(-1_000_000, 5), u32::MAX);
        assert_eq!(canvas.ink_pixels(), 0);
    }

    #[test]
    fn test_huge_thickness_stays_bounded() {
        let mut canvas = Canvas::new(10, 10);
        canvas.draw_segment(p(5, 5), p(5, 5), RED, u32::MAX);
        assert_eq!(canvas.ink_pixels(), 100);
    }

    #[test]
    fn test_line_points_include_both_ends() {
        let mut points = Vec::new();
        for_each_line_point(p(0, 0), p(3, -2), |pt| points.push(pt));
        assert_eq!(points.first(), Some(&p(0, 0)));
        assert_eq!(points.last(), Some(&p(3, -2)));
        assert_eq!(points.len(), 4);
    }
}
