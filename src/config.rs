//! Configuration types for PDF question answering.
//!
//! All behaviour is controlled through [`QaConfig`], built via its
//! [`QaConfigBuilder`]. One struct holds every knob so a config can be shared
//! across tasks, logged, and compared between runs.
//!
//! The one externally meaningful parameter is the **checkpoint**: the name of
//! the pretrained model that answers questions. It is plain configuration,
//! never a compile-time constant, so callers trade accuracy against latency
//! and memory without rebuilding.

use crate::error::PdfQaError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Checkpoint name of the built-in offline extractive answerer.
pub const LEXICAL_CHECKPOINT: &str = "lexical";

/// Default LLM checkpoint when none is configured.
pub const DEFAULT_CHECKPOINT: &str = "gpt-4.1-nano";

/// Configuration for extraction and question answering.
///
/// # Example
/// ```rust
/// use edgequake_pdfqa::{QaConfig, PageSeparator};
///
/// let config = QaConfig::builder()
///     .checkpoint("lexical")
///     .page_separator(PageSeparator::Marker)
///     .min_score(0.2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct QaConfig {
    /// QA model checkpoint, e.g. "gpt-4.1-nano", "claude-sonnet-4-20250514",
    /// or [`LEXICAL_CHECKPOINT`] for the offline answerer.
    pub checkpoint: String,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None, the provider is auto-detected from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Which PDF text-layer backend to use. Default: [`ExtractorBackend::Native`].
    pub extractor: ExtractorBackend,

    /// Separator inserted between page texts. Default: [`PageSeparator::Newline`].
    pub page_separator: PageSeparator,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Answers scoring below this are reported as "no confident answer".
    /// Range 0.0–1.0. Default: 0.1.
    pub min_score: f32,

    /// Longest context, in characters, handed to the model in one call.
    /// Longer documents are answered window by window. Default: 4000.
    pub max_context_chars: usize,

    /// Characters shared by consecutive windows so an answer straddling a
    /// window edge is still seen whole by one of them. Default: 200.
    pub context_overlap_chars: usize,

    /// Upper bound, in seconds, on the model call for one context window.
    /// A question over N windows may take up to N times this. The `lexical`
    /// checkpoint answers without yielding and is never cut short. Default: 60.
    pub inference_timeout_secs: u64,

    /// Concurrent inferences allowed against one loaded model. Default: 1.
    pub max_concurrent_inferences: usize,

    /// Sampling temperature for LLM checkpoints. Default: 0.0.
    pub temperature: f32,

    /// Maximum tokens an LLM checkpoint may generate per window. Default: 256.
    pub max_tokens: usize,

    /// Custom system prompt for LLM checkpoints. If None, uses built-in default.
    pub system_prompt: Option<String>,

    /// Receives extraction and answering events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            checkpoint: DEFAULT_CHECKPOINT.to_string(),
            provider_name: None,
            provider: None,
            extractor: ExtractorBackend::default(),
            page_separator: PageSeparator::default(),
            password: None,
            min_score: 0.1,
            max_context_chars: 4000,
            context_overlap_chars: 200,
            inference_timeout_secs: 60,
            max_concurrent_inferences: 1,
            temperature: 0.0,
            max_tokens: 256,
            system_prompt: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for QaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QaConfig")
            .field("checkpoint", &self.checkpoint)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("extractor", &self.extractor)
            .field("page_separator", &self.page_separator)
            .field("min_score", &self.min_score)
            .field("max_context_chars", &self.max_context_chars)
            .field("context_overlap_chars", &self.context_overlap_chars)
            .field("inference_timeout_secs", &self.inference_timeout_secs)
            .field("max_concurrent_inferences", &self.max_concurrent_inferences)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn SessionProgressCallback>"),
            )
            .finish()
    }
}

impl QaConfig {
    /// Create a new builder for `QaConfig`.
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder {
            config: Self::default(),
        }
    }

    /// `true` when the configured checkpoint is the offline answerer.
    pub fn is_lexical(&self) -> bool {
        self.checkpoint.eq_ignore_ascii_case(LEXICAL_CHECKPOINT)
    }

    /// Registry key for the model this config loads.
    ///
    /// Two configs with the same key share one loaded model, so the key
    /// covers everything fixed at load time: the provider (by identity when a
    /// pre-built one is supplied), the checkpoint, the sampling options, the
    /// system prompt and the inference concurrency. The readable part comes
    /// first, followed by a fingerprint of the settings.
    pub fn model_key(&self) -> String {
        let mut hasher = DefaultHasher::new();
        self.max_concurrent_inferences.hash(&mut hasher);
        if self.is_lexical() {
            return format!("{}#{:016x}", LEXICAL_CHECKPOINT, hasher.finish());
        }

        self.temperature.to_bits().hash(&mut hasher);
        self.max_tokens.hash(&mut hasher);
        self.system_prompt.hash(&mut hasher);
        let base = match (&self.provider, &self.provider_name) {
            (Some(provider), _) => {
                (Arc::as_ptr(provider) as *const () as usize).hash(&mut hasher);
                format!("custom/{}", self.checkpoint)
            }
            (None, Some(name)) => format!("{}/{}", name, self.checkpoint),
            (None, None) => format!("auto/{}", self.checkpoint),
        };
        format!("{}#{:016x}", base, hasher.finish())
    }
}

/// Builder for [`QaConfig`].
#[derive(Debug)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl QaConfigBuilder {
    pub fn checkpoint(mut self, checkpoint: impl Into<String>) -> Self {
        self.config.checkpoint = checkpoint.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn extractor(mut self, backend: ExtractorBackend) -> Self {
        self.config.extractor = backend;
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn min_score(mut self, score: f32) -> Self {
        self.config.min_score = score;
        self
    }

    pub fn max_context_chars(mut self, n: usize) -> Self {
        self.config.max_context_chars = n;
        self
    }

    pub fn context_overlap_chars(mut self, n: usize) -> Self {
        self.config.context_overlap_chars = n;
        self
    }

    pub fn inference_timeout_secs(mut self, secs: u64) -> Self {
        self.config.inference_timeout_secs = secs;
        self
    }

    pub fn max_concurrent_inferences(mut self, n: usize) -> Self {
        self.config.max_concurrent_inferences = n.max(1);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<QaConfig, PdfQaError> {
        let c = &self.config;
        if c.checkpoint.trim().is_empty() {
            return Err(PdfQaError::InvalidConfig(
                "Checkpoint name must not be empty".into(),
            ));
        }
        if !(0.0..=1.0).contains(&c.min_score) {
            return Err(PdfQaError::InvalidConfig(format!(
                "min_score must be 0.0–1.0, got {}",
                c.min_score
            )));
        }
        if c.max_context_chars < 100 {
            return Err(PdfQaError::InvalidConfig(format!(
                "max_context_chars must be ≥ 100, got {}",
                c.max_context_chars
            )));
        }
        if c.context_overlap_chars >= c.max_context_chars {
            return Err(PdfQaError::InvalidConfig(format!(
                "context_overlap_chars ({}) must be smaller than max_context_chars ({})",
                c.context_overlap_chars, c.max_context_chars
            )));
        }
        if c.inference_timeout_secs == 0 {
            return Err(PdfQaError::InvalidConfig(
                "inference_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// PDF text-layer backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtractorBackend {
    /// Pure-Rust parser (`pdf-extract`). No native library needed. (default)
    #[default]
    Native,
    /// Google's pdfium via `pdfium-render`. More tolerant of unusual fonts
    /// and broken xref tables; needs libpdfium at runtime.
    Pdfium,
}

impl fmt::Display for ExtractorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractorBackend::Native => f.write_str("native"),
            ExtractorBackend::Pdfium => f.write_str("pdfium"),
        }
    }
}

/// How to separate page texts in the assembled document.
///
/// Raw concatenation fuses the last word of one page with the first word of
/// the next ("…end of chapterChapter 2…"), which hurts span selection. The
/// default therefore puts a newline between pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSeparator {
    /// Pages concatenated with nothing in between.
    None,
    /// Single newline between pages. (default)
    #[default]
    Newline,
    /// Marker line with the page number: "\n\n--- page N ---\n\n"
    Marker,
    /// Custom string on its own line between pages.
    Custom(String),
}

impl PageSeparator {
    /// Render the separator placed before the given page (1-indexed).
    pub fn render(&self, page_num: usize) -> String {
        match self {
            PageSeparator::None => String::new(),
            PageSeparator::Newline => "\n".to_string(),
            PageSeparator::Marker => format!("\n\n--- page {} ---\n\n", page_num),
            PageSeparator::Custom(s) => format!("\n{}\n", s),
        }
    }
}
