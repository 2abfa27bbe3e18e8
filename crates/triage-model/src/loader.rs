//! Artifact loading and the load-once shared model handle.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Instant;

use tracing::{info, warn};

use triage_core::config::TriageConfig;
use triage_core::error::{Result, TriageError};

use crate::artifacts::ModelPair;
use crate::count_vectorizer::CountVectorizer;
use crate::linear::LinearClassifier;

/// Source of a vectorizer/classifier pair.
pub trait ArtifactLoader: Send + Sync {
    fn load(&self) -> Result<ModelPair>;
}

impl<F> ArtifactLoader for F
where
    F: Fn() -> Result<ModelPair> + Send + Sync,
{
    fn load(&self) -> Result<ModelPair> {
        self()
    }
}

/// Loads a [`CountVectorizer`] and [`LinearClassifier`] from JSON files.
#[derive(Debug, Clone)]
pub struct JsonArtifactLoader {
    vectorizer_path: PathBuf,
    classifier_path: PathBuf,
}

impl JsonArtifactLoader {
    pub fn new(vectorizer_path: impl Into<PathBuf>, classifier_path: impl Into<PathBuf>) -> Self {
        Self {
            vectorizer_path: vectorizer_path.into(),
            classifier_path: classifier_path.into(),
        }
    }

    /// Paths from `[model]`, resolved against the data directory.
    pub fn from_config(config: &TriageConfig) -> Self {
        Self::new(
            config.resolve_path(&config.model.vectorizer_path),
            config.resolve_path(&config.model.classifier_path),
        )
    }

    fn read(path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .map_err(|e| TriageError::ModelUnavailable(format!("{}: {}", path.display(), e)))
    }
}

impl ArtifactLoader for JsonArtifactLoader {
    fn load(&self) -> Result<ModelPair> {
        let vectorizer = CountVectorizer::from_json(&Self::read(&self.vectorizer_path)?)?;
        let classifier = LinearClassifier::from_json(&Self::read(&self.classifier_path)?)?;

        if vectorizer.dimensions() != classifier.features() {
            return Err(TriageError::ModelUnavailable(format!(
                "vectorizer produces {} features but classifier expects {}",
                vectorizer.dimensions(),
                classifier.features()
            )));
        }

        info!(
            vectorizer = %self.vectorizer_path.display(),
            classifier = %self.classifier_path.display(),
            features = vectorizer.dimensions(),
            classes = classifier.classes().len(),
            "Loaded model artifacts"
        );
        Ok(ModelPair::new(vectorizer, classifier))
    }
}

/// Lazily loaded, process-wide model pair.
///
/// The first successful load is kept for the handle's lifetime. Concurrent
/// first callers wait on the init lock, so the loader runs once. A failed
/// load is returned to its caller and not remembered.
pub struct ModelHandle {
    loader: Box<dyn ArtifactLoader>,
    model: OnceLock<Arc<ModelPair>>,
    init: Mutex<()>,
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl ModelHandle {
    pub fn new(loader: impl ArtifactLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            model: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// A handle around an already constructed pair.
    pub fn preloaded(pair: ModelPair) -> Self {
        let handle = Self::new(|| -> Result<ModelPair> {
            Err(TriageError::ModelUnavailable(
                "preloaded handle has no loader".to_string(),
            ))
        });
        let _ = handle.model.set(Arc::new(pair));
        handle
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// The shared pair, loading it on first use.
    pub fn get(&self) -> Result<Arc<ModelPair>> {
        if let Some(model) = self.model.get() {
            return Ok(Arc::clone(model));
        }

        let _guard = self
            .init
            .lock()
            .map_err(|e| TriageError::LockPoisoned(format!("model init: {}", e)))?;

        if let Some(model) = self.model.get() {
            return Ok(Arc::clone(model));
        }

        let started = Instant::now();
        let model = match self.loader.load() {
            Ok(pair) => Arc::new(pair),
            Err(e) => {
                warn!(error = %e, "Model artifacts failed to load");
                return Err(match e {
                    TriageError::ModelUnavailable(_) => e,
                    other => TriageError::ModelUnavailable(other.to_string()),
                });
            }
        };
        let _ = self.model.set(Arc::clone(&model));
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model ready"
        );
        Ok(model)
    }
}
