//! Verdict derivation from classifier output.
//!
//! The model emits a single probability. Training labeled parasitized slides
//! as class 0, so LOW scores mean malaria: anything at or below the threshold
//! is a positive verdict. The boundary itself is positive — when the model
//! is maximally uncertain the screening errs toward flagging the slide.

use tracing::info;

use super::preprocess::SlideTensor;
use super::ClassifierError;
use crate::models::enums::ImageVerdict;

/// Probabilities at or below this are classified as parasitized.
pub const POSITIVE_THRESHOLD: f32 = 0.5;

/// Inference backend for the slide classifier.
///
/// `predict` returns the raw model probability in [0, 1]. Implementations
/// must be shareable across threads; the ONNX backend wraps its session in
/// a mutex for this reason.
pub trait ClassifierModel: Send + Sync {
    fn predict(&self, input: &SlideTensor) -> Result<f32, ClassifierError>;
}

/// Map a model probability to a verdict. Boundary is inclusive: 0.5 is positive.
pub fn verdict_from_probability(probability: f32) -> ImageVerdict {
    if probability <= POSITIVE_THRESHOLD {
        ImageVerdict::Positive
    } else {
        ImageVerdict::Negative
    }
}

/// Classifies preprocessed slide tensors through a pluggable model backend.
pub struct SlideClassifier {
    model: Box<dyn ClassifierModel>,
}

impl SlideClassifier {
    pub fn new(model: Box<dyn ClassifierModel>) -> Self {
        Self { model }
    }

    /// Run inference and derive a verdict.
    ///
    /// Unlike advisory generation, classifier failures are surfaced to the
    /// caller: a slide result feeds the recorded diagnosis and must never be
    /// silently substituted.
    pub fn classify(&self, input: &SlideTensor) -> Result<ImageVerdict, ClassifierError> {
        let probability = self.model.predict(input)?;

        // NaN fails the range check too.
        if !(0.0..=1.0).contains(&probability) {
            return Err(ClassifierError::ModelInference(format!(
                "Probability out of range: {probability}"
            )));
        }

        let verdict = verdict_from_probability(probability);
        info!(
            probability = probability,
            verdict = verdict.as_str(),
            "Slide classified"
        );
        Ok(verdict)
    }
}

// ═══════════════════════════════════════════════════════════
// ONNX backend, behind the `onnx-classifier` feature
// ═══════════════════════════════════════════════════════════

#[cfg(feature = "onnx-classifier")]
mod onnx {
    use std::path::Path;
    use std::sync::Mutex;

    use ort::session::Session;

    use super::{ClassifierError, ClassifierModel, SlideTensor};

    /// Real slide classifier backed by ONNX Runtime.
    ///
    /// Expects a single-input, single-output model: input `[1, 128, 128, 3]`
    /// float32 channels-last, output one probability.
    ///
    /// Uses interior mutability (Mutex) because ort::Session::run requires
    /// `&mut self` but the ClassifierModel trait exposes `&self` for ergonomic
    /// shared usage.
    pub struct OnnxClassifier {
        session: Mutex<Session>,
    }

    impl OnnxClassifier {
        /// Load the ONNX model from disk.
        pub fn load(model_path: &Path) -> Result<Self, ClassifierError> {
            if !model_path.exists() {
                return Err(ClassifierError::ModelNotFound(model_path.to_path_buf()));
            }

            let session = Session::builder()
                .map_err(|e: ort::Error| ClassifierError::ModelInit(e.to_string()))?
                .with_intra_threads(2)
                .map_err(|e: ort::Error| ClassifierError::ModelInit(e.to_string()))?
                .commit_from_file(model_path)
                .map_err(|e: ort::Error| {
                    ClassifierError::ModelInit(format!("ONNX load failed: {e}"))
                })?;

            tracing::info!("Slide classifier loaded from {}", model_path.display());

            Ok(Self {
                session: Mutex::new(session),
            })
        }
    }

    impl ClassifierModel for OnnxClassifier {
        fn predict(&self, input: &SlideTensor) -> Result<f32, ClassifierError> {
            use ort::value::TensorRef;

            let tensor = TensorRef::from_array_view(&input.pixels)
                .map_err(|e| ClassifierError::ModelInference(e.to_string()))?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| ClassifierError::ModelInference("Session lock poisoned".to_string()))?;

            let outputs = session
                .run(ort::inputs![tensor])
                .map_err(|e| ClassifierError::ModelInference(format!("ONNX inference failed: {e}")))?;

            let (shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| ClassifierError::ModelInference(format!("Output extraction: {e}")))?;

            // One probability regardless of exact shape ([1] or [1, 1]).
            let count: i64 = shape.iter().product();
            if count != 1 {
                return Err(ClassifierError::ModelInference(format!(
                    "Unexpected output shape: {shape:?}, expected a single probability"
                )));
            }

            Ok(data[0])
        }
    }
}

#[cfg(feature = "onnx-classifier")]
pub use onnx::OnnxClassifier;

/// Mock model for tests. Returns a fixed probability or a fixed failure.
pub struct MockClassifierModel {
    result: Result<f32, String>,
}

impl MockClassifierModel {
    pub fn with_probability(probability: f32) -> Self {
        Self {
            result: Ok(probability),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err("Mock inference failure".to_string()),
        }
    }
}

impl ClassifierModel for MockClassifierModel {
    fn predict(&self, _input: &SlideTensor) -> Result<f32, ClassifierError> {
        self.result
            .clone()
            .map_err(ClassifierError::ModelInference)
    }
}
