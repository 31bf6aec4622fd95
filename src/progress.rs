//! Progress-callback trait for extraction and answering events.
//!
//! Inject an [`Arc<dyn SessionProgressCallback>`] via
//! [`crate::config::QaConfigBuilder::progress_callback`] to receive events
//! while a document is extracted and while a question is answered. The CLI
//! drives its spinner from these; a web front end could forward them to a
//! socket instead.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdfqa::{SessionProgressCallback, QaConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PageCounter {
//!     pages: AtomicUsize,
//! }
//!
//! impl SessionProgressCallback for PageCounter {
//!     fn on_page_extracted(&self, _page_num: usize, _total_pages: usize, _chars: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(PageCounter { pages: AtomicUsize::new(0) });
//!
//! let config = QaConfig::builder()
//!     .progress_callback(counter as Arc<dyn SessionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the extraction and answering pipeline.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync`: events are
/// fired from blocking-pool threads during extraction.
pub trait SessionProgressCallback: Send + Sync {
    /// Called once the page count is known, before any page is read.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after each page's text has been read and normalised.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — pages in the document
    /// * `chars`       — characters in the normalised page text (0 for
    ///   image-only pages)
    fn on_page_extracted(&self, page_num: usize, total_pages: usize, chars: usize) {
        let _ = (page_num, total_pages, chars);
    }

    /// Called once after all pages have been read.
    fn on_extraction_complete(&self, total_pages: usize, text_pages: usize) {
        let _ = (total_pages, text_pages);
    }

    /// Called when a question is handed to the model.
    ///
    /// `windows` is the number of context windows that will be examined.
    fn on_answer_start(&self, question: &str, windows: usize) {
        let _ = (question, windows);
    }

    /// Called when the model has finished, whether or not it found an answer.
    fn on_answer_complete(&self, question: &str, found: bool) {
        let _ = (question, found);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SessionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::QaConfig`].
pub type ProgressCallback = Arc<dyn SessionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        pages: AtomicUsize,
        text_pages: AtomicUsize,
        answers: AtomicUsize,
        found: AtomicUsize,
    }

    impl SessionProgressCallback for TrackingCallback {
        fn on_page_extracted(&self, _page_num: usize, _total_pages: usize, _chars: usize) {
            self.pages.fetch_add(1, Ordering::SeqCst);
        }

        fn on_extraction_complete(&self, _total_pages: usize, text_pages: usize) {
            self.text_pages.store(text_pages, Ordering::SeqCst);
        }

        fn on_answer_start(&self, _question: &str, _windows: usize) {
            self.answers.fetch_add(1, Ordering::SeqCst);
        }

        fn on_answer_complete(&self, _question: &str, found: bool) {
            if found {
                self.found.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_extraction_start(2);
        cb.on_page_extracted(1, 2, 120);
        cb.on_extraction_complete(2, 1);
        cb.on_answer_start("why?", 1);
        cb.on_answer_complete("why?", false);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_extraction_start(3);
        tracker.on_page_extracted(1, 3, 10);
        tracker.on_page_extracted(2, 3, 0);
        tracker.on_page_extracted(3, 3, 42);
        tracker.on_extraction_complete(3, 2);
        tracker.on_answer_start("q", 2);
        tracker.on_answer_complete("q", true);

        assert_eq!(tracker.pages.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.text_pages.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.answers.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.found.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn SessionProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_extraction_start(10);
        cb.on_page_extracted(1, 10, 512);
    }
}
