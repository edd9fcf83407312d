use anyhow::Result;

/// 外部の統計的分類器: 特徴ベクトルからジェスチャーラベルを返す
pub trait GestureModel {
    fn predict(&mut self, features: &[f32]) -> Result<String>;
}

#[cfg(feature = "desktop")]
pub use onnx::OnnxGestureModel;

#[cfg(feature = "desktop")]
mod onnx {
    use anyhow::{Context, Result};
    use ndarray::Array2;
    use ort::session::builder::GraphOptimizationLevel;
    use ort::session::Session;
    use ort::value::Tensor;
    use std::path::Path;

    use super::GestureModel;
    use crate::config::ModelConfig;

    /// ラベルごとにスコアを出すONNX分類器
    pub struct OnnxGestureModel {
        session: Session,
        input_name: String,
        output_name: String,
        labels: Vec<String>,
    }

    impl OnnxGestureModel {
        pub fn new<P: AsRef<Path>>(model_path: P, config: &ModelConfig) -> Result<Self> {
            if config.labels.is_empty() {
                anyhow::bail!("Gesture model needs [model] labels in the config");
            }

            let session = Session::builder()?
                .with_optimization_level(GraphOptimizationLevel::Level3)?
                .commit_from_file(model_path.as_ref())
                .context("Failed to load gesture model")?;

            Ok(Self {
                session,
                input_name: config.input_name.clone(),
                output_name: config.output_name.clone(),
                labels: config.labels.clone(),
            })
        }
    }

    impl GestureModel for OnnxGestureModel {
        fn predict(&mut self, features: &[f32]) -> Result<String> {
            let input = Array2::from_shape_vec((1, features.len()), features.to_vec())?;
            let input_tensor = Tensor::from_array(input)?;
            let outputs = self
                .session
                .run(ort::inputs![self.input_name.as_str() => input_tensor])
                .context("Gesture inference failed")?;

            let scores: ndarray::ArrayViewD<f32> = outputs[self.output_name.as_str()]
                .try_extract_array()
                .context("Failed to extract gesture scores")?;

            let best = scores
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .context("Gesture model returned no scores")?;

            self.labels
                .get(best)
                .cloned()
                .with_context(|| format!("Score index {} has no label", best))
        }
    }
}
