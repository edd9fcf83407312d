use anyhow::{Context, Result};
use opencv::core::Mat;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;

use super::landmark::{Landmark, LandmarkIndex};
use super::preprocess::preprocess_for_landmarks;
use crate::config::DetectorConfig;

/// フレーム全体に対する手のランドマークモデル
///
/// 出力: モデル入力画素単位の 21 x (x, y, z) と手の存在スコア。
/// ランドマークはフレームに対して正規化して返す。
pub struct HandDetector {
    session: Session,
    input_size: i32,
    input_name: String,
    landmarks_output: String,
    presence_output: String,
    min_presence: f32,
}

impl HandDetector {
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&config.model)
            .with_context(|| format!("Failed to load hand landmark model {}", config.model))?;

        Ok(Self {
            session,
            input_size: config.input_size as i32,
            input_name: config.input_name.clone(),
            landmarks_output: config.landmarks_output.clone(),
            presence_output: config.presence_output.clone(),
            min_presence: config.min_presence,
        })
    }

    /// BGRフレーム中の手を生のランドマーク列として返す。
    /// モデルが1手分しか出力しないため、結果は常に0個か1個。
    pub fn detect(&mut self, frame: &Mat) -> Result<Vec<Vec<Landmark>>> {
        let input = preprocess_for_landmarks(frame, self.input_size)?;
        let input_tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .context("Hand landmark inference failed")?;

        let presence: ndarray::ArrayViewD<f32> = outputs[self.presence_output.as_str()]
            .try_extract_array()
            .context("Failed to extract presence score")?;
        let score = presence.iter().next().copied().unwrap_or(0.0);
        if score < self.min_presence {
            return Ok(Vec::new());
        }

        let coords: ndarray::ArrayViewD<f32> = outputs[self.landmarks_output.as_str()]
            .try_extract_array()
            .context("Failed to extract landmarks")?;
        let values: Vec<f32> = coords.iter().copied().collect();
        if values.len() < LandmarkIndex::COUNT * 3 {
            anyhow::bail!("Landmark output has {} values", values.len());
        }

        let scale = self.input_size as f32;
        let landmarks = values
            .chunks_exact(3)
            .take(LandmarkIndex::COUNT)
            .map(|v| Landmark::new(v[0] / scale, v[1] / scale, v[2] / scale))
            .collect();

        Ok(vec![landmarks])
    }
}
