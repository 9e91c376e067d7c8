//! Output collaborators driven by the view controller.

use std::sync::{Mutex, PoisonError};

use crate::models::BookRecord;

/// Receives the ordered list to present.
///
/// Called once per completed transition. An empty slice after a search is a
/// real result and should be shown as an empty state.
pub trait RenderSink: Send + Sync {
    fn render(&self, records: &[BookRecord]);

    /// A fetch started (`true`) or finished (`false`)
    fn loading(&self, _active: bool) {}
}

/// Receives human-readable fetch failures
pub trait ErrorSink: Send + Sync {
    fn report_error(&self, message: &str);
}

/// Sink that remembers every call, for tests and scripted sessions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    renders: Mutex<Vec<Vec<BookRecord>>>,
    errors: Mutex<Vec<String>>,
    loading: Mutex<Vec<bool>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every rendered list, oldest first
    pub fn renders(&self) -> Vec<Vec<BookRecord>> {
        self.renders.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn render_count(&self) -> usize {
        self.renders.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Display titles of every rendered list
    pub fn rendered_titles(&self) -> Vec<Vec<String>> {
        self.renders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|records| titles(records))
            .collect()
    }

    /// Display titles of the most recent render
    pub fn last_render_titles(&self) -> Option<Vec<String>> {
        self.renders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .map(|r| titles(r))
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn loading_events(&self) -> Vec<bool> {
        self.loading.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

fn titles(records: &[BookRecord]) -> Vec<String> {
    records
        .iter()
        .map(|b| b.display_title().to_string())
        .collect()
}

impl RenderSink for RecordingSink {
    fn render(&self, records: &[BookRecord]) {
        self.renders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(records.to_vec());
    }

    fn loading(&self, active: bool) {
        self.loading.lock().unwrap_or_else(PoisonError::into_inner).push(active);
    }
}

impl ErrorSink for RecordingSink {
    fn report_error(&self, message: &str) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
