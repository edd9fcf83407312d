use anyhow::{Context, Result};
use opencv::{
    core::{self, Mat, Vec3b},
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureAPIs, VideoCaptureTrait},
};
use tracing::info;

use crate::canvas::RgbImage;
use crate::config::CameraConfig;

/// OpenCVを使用したカメラキャプチャ
pub struct OpenCvCamera {
    capture: VideoCapture,
    width: u32,
    height: u32,
    mirror: bool,
}

impl OpenCvCamera {
    /// 設定からカメラを開く
    pub fn from_config(config: &CameraConfig) -> Result<Self> {
        let mut camera =
            Self::open_with_resolution(config.index, Some(config.width), Some(config.height))?;
        camera.mirror = config.mirror;
        Ok(camera)
    }

    /// 解像度を指定してカメラを開く
    pub fn open_with_resolution(index: i32, width: Option<u32>, height: Option<u32>) -> Result<Self> {
        let mut capture =
            VideoCapture::new(index, VideoCaptureAPIs::CAP_ANY as i32).context("Failed to open camera")?;

        if !capture.is_opened()? {
            anyhow::bail!("Camera {} is not available", index);
        }

        if let Some(w) = width {
            capture.set(videoio::CAP_PROP_FRAME_WIDTH, w as f64)?;
        }
        if let Some(h) = height {
            capture.set(videoio::CAP_PROP_FRAME_HEIGHT, h as f64)?;
        }
        capture.set(videoio::CAP_PROP_BUFFERSIZE, 1.0)?;

        let actual_width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let actual_height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        info!(
            "Camera {}: {}x{} @ {} fps",
            index,
            actual_width,
            actual_height,
            capture.get(videoio::CAP_PROP_FPS)?
        );

        Ok(Self {
            capture,
            width: actual_width,
            height: actual_height,
            mirror: false,
        })
    }

    /// 解像度を取得（カメラの申告値）
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// フレームを読み込む（BGR形式、設定により左右反転）
    pub fn read_frame(&mut self) -> Result<Mat> {
        let mut frame = Mat::default();
        self.capture
            .read(&mut frame)
            .context("Failed to read frame")?;

        if frame.empty() {
            anyhow::bail!("Empty frame received");
        }

        if self.mirror {
            let mut flipped = Mat::default();
            core::flip(&frame, &mut flipped, 1)?;
            return Ok(flipped);
        }

        Ok(frame)
    }
}

/// BGR Mat を RGB 画像に変換
pub fn mat_to_rgb(frame: &Mat) -> Result<RgbImage> {
    let width = frame.cols() as u32;
    let height = frame.rows() as u32;
    let mut data = Vec::with_capacity(width as usize * height as usize * RgbImage::CHANNELS);

    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let pixel = frame.at_2d::<Vec3b>(y, x)?;
            data.extend_from_slice(&[pixel[2], pixel[1], pixel[0]]);
        }
    }

    Ok(RgbImage::from_raw(width, height, data)?)
}
