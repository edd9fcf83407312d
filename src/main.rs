use anyhow::{Context, Result};
use opencv::core::Mat;
use opencv::prelude::*;
use std::time::Instant;
use tracing::{info, warn};

use air_canvas::camera::{mat_to_rgb, OpenCvCamera};
use air_canvas::config::Config;
use air_canvas::gesture::{Classifier, Gesture};
use air_canvas::hand::{HandDetector, HandLandmarks};
use air_canvas::render::MinifbRenderer;
use air_canvas::{Control, FrameOrchestrator};

const CONFIG_PATH: &str = "config.toml";

/// 最初のフレームを読むまでの試行回数
const FIRST_FRAME_ATTEMPTS: u32 = 30;

/// ウィンドウの大きさを決める最初のフレームを待つ
fn first_frame(camera: &mut OpenCvCamera) -> Result<Mat> {
    let mut last_error = None;
    for _ in 0..FIRST_FRAME_ATTEMPTS {
        match camera.read_frame() {
            Ok(frame) if frame.cols() > 0 && frame.rows() > 0 => return Ok(frame),
            Ok(_) => {}
            Err(e) => last_error = Some(e),
        }
    }
    match last_error {
        Some(e) => Err(e).context("No frame from camera"),
        None => anyhow::bail!("No frame from camera"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::load_or_default(CONFIG_PATH);
    let legend = Gesture::legend();
    info!("{}", legend);

    let mut camera = OpenCvCamera::from_config(&config.camera)?;

    info!("Loading hand landmark model from {}", config.detector.model);
    let mut detector = HandDetector::from_config(&config.detector)?;

    let classifier = Classifier::from_config(&config);
    let mut orchestrator = FrameOrchestrator::new(&config, classifier);

    // ウィンドウはカメラの申告値ではなく実際のフレームに合わせる
    let first = first_frame(&mut camera)?;
    let (width, height) = (first.cols() as usize, first.rows() as usize);
    let mut pending = Some(first);
    let (reported_width, reported_height) = camera.resolution();
    if (reported_width as usize, reported_height as usize) != (width, height) {
        warn!(
            "Camera reports {}x{} but delivers {}x{}",
            reported_width, reported_height, width, height
        );
    }

    let mut renderer = MinifbRenderer::new(&config.display.title, width, height)?;
    renderer.set_title(&format!("{} - {}", config.display.title, legend));

    let mut frame_count = 0u32;
    let mut fps_timer = Instant::now();

    while renderer.is_open() {
        let frame = match pending.take() {
            Some(frame) => frame,
            None => match camera.read_frame() {
                Ok(f) => f,
                Err(e) => {
                    warn!("Frame capture error: {:#}", e);
                    continue;
                }
            },
        };

        let hands = match detector.detect(&frame) {
            Ok(hands) => hands,
            Err(e) => {
                warn!("Hand detection failed: {:#}", e);
                Vec::new()
            }
        };

        let image = match mat_to_rgb(&frame) {
            Ok(image) => image,
            Err(e) => {
                warn!("Frame conversion error: {:#}", e);
                continue;
            }
        };

        // キャンバスは最初に処理したフレームの大きさで確保される
        let report = orchestrator.process(image.width(), image.height(), &hands);

        let composed = match orchestrator.composite(&image) {
            Ok(composed) => composed,
            Err(e) => {
                warn!("Composite failed, showing raw frame: {}", e);
                image
            }
        };
        renderer.draw_image(&composed);
        if config.display.show_landmarks {
            for hand in hands.iter().filter_map(|points| HandLandmarks::new(points).ok()) {
                renderer.draw_hand(&hand);
            }
        }
        renderer.update()?;

        let control = renderer.poll_control();
        if control == Control::Clear {
            info!("Canvas cleared");
        }
        if !orchestrator.apply(control) {
            break;
        }

        frame_count += 1;
        let elapsed = fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            info!(
                "FPS: {:.1}, hands: {:?}",
                frame_count as f32 / elapsed,
                report.verdicts
            );
            frame_count = 0;
            fps_timer = Instant::now();
        }
    }

    info!("Shutting down");
    Ok(())
}
