use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::hand::DEFAULT_PINCH_THRESHOLD;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    #[serde(default)]
    pub index: i32,
    #[serde(default = "default_camera_width")]
    pub width: u32,
    #[serde(default = "default_camera_height")]
    pub height: u32,
    /// 左右反転して鏡のように表示
    #[serde(default = "default_true")]
    pub mirror: bool,
}

/// フレーム間で手にスロットを割り当てる方法
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlotAssignmentMode {
    /// スロット = 検出リスト内の位置
    #[default]
    DetectionOrder,
    /// 前フレームの重心に最も近い手にスロットを引き継ぐ
    NearestCentroid,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GestureConfig {
    /// ピンチと判定する親指-人差し指間距離（正規化）
    #[serde(default = "default_pinch_threshold")]
    pub pinch_threshold: f32,
    #[serde(default = "default_max_hands")]
    pub max_hands: usize,
    #[serde(default)]
    pub slot_assignment: SlotAssignmentMode,
    /// 同じスロットとみなす重心移動量の上限（正規化）
    #[serde(default = "default_slot_match_distance")]
    pub slot_match_distance: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CanvasConfig {
    /// 描画色 (RGB)
    #[serde(default = "default_ink_color")]
    pub ink_color: [u8; 3],
    #[serde(default = "default_thickness")]
    pub thickness: u32,
    /// 拳で消す手のひらの円の半径（画素）
    #[serde(default = "default_erase_radius")]
    pub erase_radius: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_frame_weight")]
    pub frame_weight: f32,
    #[serde(default = "default_ink_weight")]
    pub ink_weight: f32,
    #[serde(default = "default_true")]
    pub show_landmarks: bool,
}

/// 任意の統計的ジェスチャー分類器。ファイルがある場合のみ使用
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_gesture_model")]
    pub gesture_model: String,
    #[serde(default = "default_model_input")]
    pub input_name: String,
    #[serde(default = "default_model_output")]
    pub output_name: String,
    /// 出力スコアに対応するラベル（モデルの順）
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default = "default_draw_labels")]
    pub draw_labels: Vec<String>,
    #[serde(default = "default_erase_labels")]
    pub erase_labels: Vec<String>,
    #[serde(default)]
    pub idle_labels: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetectorConfig {
    #[serde(default = "default_detector_model")]
    pub model: String,
    #[serde(default = "default_detector_input_size")]
    pub input_size: u32,
    #[serde(default = "default_detector_input")]
    pub input_name: String,
    #[serde(default = "default_landmarks_output")]
    pub landmarks_output: String,
    #[serde(default = "default_presence_output")]
    pub presence_output: String,
    #[serde(default = "default_min_presence")]
    pub min_presence: f32,
}

fn default_true() -> bool { true }
fn default_camera_width() -> u32 { 640 }
fn default_camera_height() -> u32 { 480 }
fn default_pinch_threshold() -> f32 { DEFAULT_PINCH_THRESHOLD }
fn default_max_hands() -> usize { 2 }
fn default_slot_match_distance() -> f32 { 0.25 }
fn default_ink_color() -> [u8; 3] { [255, 0, 0] }
fn default_thickness() -> u32 { 5 }
fn default_erase_radius() -> u32 { 40 }
fn default_title() -> String { "Air Canvas".to_string() }
fn default_frame_weight() -> f32 { 0.5 }
fn default_ink_weight() -> f32 { 1.0 }
fn default_gesture_model() -> String { "models/gesture_classifier.onnx".to_string() }
fn default_model_input() -> String { "input".to_string() }
fn default_model_output() -> String { "probabilities".to_string() }
fn default_draw_labels() -> Vec<String> { vec!["draw".to_string(), "pinch".to_string()] }
fn default_erase_labels() -> Vec<String> { vec!["erase".to_string(), "fist".to_string()] }
fn default_detector_model() -> String { "models/hand_landmark.onnx".to_string() }
fn default_detector_input_size() -> u32 { 224 }
fn default_detector_input() -> String { "input_1".to_string() }
fn default_landmarks_output() -> String { "Identity".to_string() }
fn default_presence_output() -> String { "Identity_1".to_string() }
fn default_min_presence() -> f32 { 0.7 }

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: default_camera_width(),
            height: default_camera_height(),
            mirror: default_true(),
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: default_pinch_threshold(),
            max_hands: default_max_hands(),
            slot_assignment: SlotAssignmentMode::default(),
            slot_match_distance: default_slot_match_distance(),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            ink_color: default_ink_color(),
            thickness: default_thickness(),
            erase_radius: default_erase_radius(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            frame_weight: default_frame_weight(),
            ink_weight: default_ink_weight(),
            show_landmarks: default_true(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            gesture_model: default_gesture_model(),
            input_name: default_model_input(),
            output_name: default_model_output(),
            labels: Vec::new(),
            draw_labels: default_draw_labels(),
            erase_labels: default_erase_labels(),
            idle_labels: Vec::new(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model: default_detector_model(),
            input_size: default_detector_input_size(),
            input_name: default_detector_input(),
            landmarks_output: default_landmarks_output(),
            presence_output: default_presence_output(),
            min_presence: default_min_presence(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Invalid config")?;
        Ok(config)
    }

    /// 設定ファイルがない・壊れている場合はデフォルト値を使う
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }
}
