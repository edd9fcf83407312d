pub mod classifier;
pub mod features;
pub mod model;

pub use classifier::{Classifier, HeuristicClassifier, LabelMap};
pub use features::landmark_features;
pub use model::GestureModel;
#[cfg(feature = "desktop")]
pub use model::OnnxGestureModel;

use std::fmt;

/// 1フレームにおける片手の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Draw,
    Erase,
    Idle,
}

impl Gesture {
    pub const ALL: [Gesture; 3] = [Gesture::Draw, Gesture::Erase, Gesture::Idle];

    /// この判定になる手の形
    pub fn trigger(&self) -> &'static str {
        match self {
            Gesture::Draw => "Pinch",
            Gesture::Erase => "Fist",
            Gesture::Idle => "Open hand",
        }
    }

    /// 画面表示用の操作説明 (例: "Draw=Pinch | Erase=Fist | C=Clear | Q=Quit")
    pub fn legend() -> String {
        let mut parts: Vec<String> = Gesture::ALL
            .iter()
            .filter(|g| **g != Gesture::Idle)
            .map(|g| format!("{}={}", g, g.trigger()))
            .collect();
        parts.push("C=Clear".to_string());
        parts.push("Q=Quit".to_string());
        parts.join(" | ")
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gesture::Draw => "Draw",
            Gesture::Erase => "Erase",
            Gesture::Idle => "Idle",
        };
        f.write_str(name)
    }
}
