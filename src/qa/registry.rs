//! Process-wide checkpoint cache.
//!
//! Loading a checkpoint (resolving a provider, reading API keys, building
//! HTTP clients) happens once per process per [`QaConfig::model_key`]. Every
//! later question, from any session, reuses the same [`LoadedModel`].
//!
//! The cache lock is held while a checkpoint loads, so two callers racing for
//! the same key never load it twice.

use super::lexical::LexicalAnswerer;
use super::llm::LlmAnswerer;
use super::{LoadedModel, QuestionAnswerer};
use crate::config::{QaConfig, DEFAULT_CHECKPOINT};
use crate::error::PdfQaError;
use edgequake_llm::{LLMProvider, ProviderFactory};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Turns a config into a ready answerer.
pub trait ModelLoader: Send + Sync {
    fn load(&self, config: &QaConfig) -> Result<Arc<dyn QuestionAnswerer>, PdfQaError>;
}

/// Default loader: `"lexical"` is built in, anything else is an LLM model id.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckpointLoader;

impl ModelLoader for CheckpointLoader {
    fn load(&self, config: &QaConfig) -> Result<Arc<dyn QuestionAnswerer>, PdfQaError> {
        if config.is_lexical() {
            return Ok(Arc::new(LexicalAnswerer));
        }
        let provider = resolve_provider(config)?;
        Ok(Arc::new(LlmAnswerer::new(provider, config)))
    }
}

fn create_provider(
    provider_name: &str,
    model: &str,
    checkpoint: &str,
) -> Result<Arc<dyn LLMProvider>, PdfQaError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        PdfQaError::ModelLoadFailure {
            checkpoint: checkpoint.to_string(),
            reason: format!("provider '{}': {}", provider_name, e),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is
/// 2. **Named provider** (`config.provider_name`) serving `config.checkpoint`
/// 3. **`EDGEQUAKE_LLM_PROVIDER`** serving `config.checkpoint`
/// 4. **OpenAI** when `OPENAI_API_KEY` is set
/// 5. **Full auto-detection** via [`ProviderFactory::from_env`]
fn resolve_provider(config: &QaConfig) -> Result<Arc<dyn LLMProvider>, PdfQaError> {
    let checkpoint = config.checkpoint.as_str();

    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        return create_provider(name, checkpoint, checkpoint);
    }

    if let Ok(prov) = std::env::var("EDGEQUAKE_LLM_PROVIDER") {
        if !prov.is_empty() {
            return create_provider(&prov, checkpoint, checkpoint);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_provider("openai", checkpoint, checkpoint);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| PdfQaError::ModelLoadFailure {
            checkpoint: checkpoint.to_string(),
            reason: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY or ANTHROPIC_API_KEY, or use --checkpoint lexical.\n\
                Error: {}",
                e
            ),
        })?;

    if checkpoint != DEFAULT_CHECKPOINT {
        warn!(
            "Auto-detected provider uses its own default model; checkpoint '{}' may be ignored",
            checkpoint
        );
    }
    Ok(llm_provider)
}

/// Cache of loaded checkpoints keyed by [`QaConfig::model_key`].
pub struct ModelRegistry {
    loader: Arc<dyn ModelLoader>,
    models: Mutex<HashMap<String, Arc<LoadedModel>>>,
}

static GLOBAL: Lazy<Arc<ModelRegistry>> = Lazy::new(|| Arc::new(ModelRegistry::new()));

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    /// Registry backed by [`CheckpointLoader`].
    pub fn new() -> Self {
        Self::with_loader(Arc::new(CheckpointLoader))
    }

    pub fn with_loader(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            models: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide registry.
    pub fn global() -> Arc<ModelRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Return the model for `config`, loading it on first use.
    ///
    /// A failed load is not cached; the next call tries again.
    pub fn get_or_load(&self, config: &QaConfig) -> Result<Arc<LoadedModel>, PdfQaError> {
        let key = config.model_key();
        let mut models = self
            .models
            .lock()
            .map_err(|_| PdfQaError::Internal("model registry lock poisoned".to_string()))?;

        if let Some(model) = models.get(&key) {
            return Ok(Arc::clone(model));
        }

        info!("Loading checkpoint '{}' ({})", config.checkpoint, key);
        let answerer = self.loader.load(config)?;
        let model = Arc::new(LoadedModel::new(answerer, config.max_concurrent_inferences));
        models.insert(key, Arc::clone(&model));
        Ok(model)
    }

    /// `true` when `config`'s checkpoint is already in memory.
    pub fn is_loaded(&self, config: &QaConfig) -> bool {
        self.models
            .lock()
            .map(|m| m.contains_key(&config.model_key()))
            .unwrap_or(false)
    }

    /// Number of checkpoints in memory.
    pub fn len(&self) -> usize {
        self.models.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
