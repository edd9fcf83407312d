use std::collections::HashMap;
use tracing::{info, warn};

use super::features::landmark_features;
use super::model::GestureModel;
use super::Gesture;
use crate::config::{Config, ModelConfig};
use crate::hand::{extended_finger_count, is_pinching, HandLandmarks};

/// ピンチで描画、拳で消去、それ以外は待機。
///
/// ピンチを先に判定する。強いピンチは指も曲がるため拳と誤判定されうる。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicClassifier {
    pub pinch_threshold: f32,
}

impl HeuristicClassifier {
    pub fn new(pinch_threshold: f32) -> Self {
        Self { pinch_threshold }
    }

    pub fn classify(&self, hand: &HandLandmarks) -> Gesture {
        if is_pinching(hand, self.pinch_threshold) {
            Gesture::Draw
        } else if extended_finger_count(hand) == 0 {
            Gesture::Erase
        } else {
            Gesture::Idle
        }
    }
}

/// モデルのラベルからジェスチャーへの対応。未登録のラベルは意味を持たない
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelMap {
    labels: HashMap<String, Gesture>,
}

impl LabelMap {
    pub fn from_config(config: &ModelConfig) -> Self {
        let mut map = Self::default();
        for (names, gesture) in [
            (&config.draw_labels, Gesture::Draw),
            (&config.erase_labels, Gesture::Erase),
            (&config.idle_labels, Gesture::Idle),
        ] {
            for name in names {
                map.insert(name, gesture);
            }
        }
        map
    }

    pub fn insert(&mut self, label: &str, gesture: Gesture) {
        self.labels.insert(label.to_lowercase(), gesture);
    }

    pub fn get(&self, label: &str) -> Option<Gesture> {
        self.labels.get(&label.to_lowercase()).copied()
    }
}

/// 起動時に選ぶジェスチャー分類器。
///
/// `HeuristicOnly` はランドマークのみを使う。`HeuristicPlusModel` はまずモデルに
/// 問い合わせ、対応表にあるラベルならそれを採用する。未登録ラベルや推論エラーの
/// 場合はヒューリスティックの判定を使う。
pub enum Classifier {
    HeuristicOnly(HeuristicClassifier),
    HeuristicPlusModel {
        heuristic: HeuristicClassifier,
        model: Box<dyn GestureModel>,
        labels: LabelMap,
    },
}

impl Classifier {
    pub fn heuristic(pinch_threshold: f32) -> Self {
        Classifier::HeuristicOnly(HeuristicClassifier::new(pinch_threshold))
    }

    pub fn with_model(pinch_threshold: f32, model: Box<dyn GestureModel>, labels: LabelMap) -> Self {
        Classifier::HeuristicPlusModel {
            heuristic: HeuristicClassifier::new(pinch_threshold),
            model,
            labels,
        }
    }

    /// ヒューリスティック分類器。モデルファイルがあり読み込めればモデルを併用
    pub fn from_config(config: &Config) -> Self {
        let threshold = config.gesture.pinch_threshold;
        let path = std::path::Path::new(&config.model.gesture_model);

        if !path.exists() {
            info!("No gesture model at {}, using heuristic gestures", path.display());
            return Self::heuristic(threshold);
        }

        Self::load_model(threshold, path, &config.model)
    }

    #[cfg(feature = "desktop")]
    fn load_model(threshold: f32, path: &std::path::Path, config: &ModelConfig) -> Self {
        match super::model::OnnxGestureModel::new(path, config) {
            Ok(model) => {
                info!("Gesture model loaded from {}", path.display());
                Self::with_model(threshold, Box::new(model), LabelMap::from_config(config))
            }
            Err(e) => {
                warn!("{:#}, using heuristic gestures", e);
                Self::heuristic(threshold)
            }
        }
    }

    #[cfg(not(feature = "desktop"))]
    fn load_model(threshold: f32, path: &std::path::Path, _config: &ModelConfig) -> Self {
        warn!(
            "Gesture model {} found but model support is not built in, using heuristic gestures",
            path.display()
        );
        Self::heuristic(threshold)
    }

    pub fn has_model(&self) -> bool {
        matches!(self, Classifier::HeuristicPlusModel { .. })
    }

    pub fn classify(&mut self, hand: &HandLandmarks) -> Gesture {
        match self {
            Classifier::HeuristicOnly(heuristic) => heuristic.classify(hand),
            Classifier::HeuristicPlusModel {
                heuristic,
                model,
                labels,
            } => {
                let fallback = heuristic.classify(hand);
                match model.predict(&landmark_features(hand)) {
                    Ok(label) => labels.get(&label).unwrap_or(fallback),
                    Err(e) => {
                        warn!("Gesture model failed: {:#}", e);
                        fallback
                    }
                }
            }
        }
    }
}
