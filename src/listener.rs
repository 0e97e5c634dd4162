//! Callback trait for file-selection changes.
//!
//! Inject an [`Arc<dyn SelectionListener>`] into
//! [`crate::intake::FileIntake::with_listener`] to hear about every change of
//! the retained file: a new accepted file, a rejection, or a clear. The
//! argument is `None` whenever the intake no longer holds a file.
//!
//! # Example
//!
//! ```rust
//! use meddoc::{AcceptedFile, FileIntake, SelectionListener, ValidationPolicy};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct LastName(Mutex<Option<String>>);
//!
//! impl SelectionListener for LastName {
//!     fn on_file_selected(&self, file: Option<&AcceptedFile>) {
//!         *self.0.lock().unwrap() = file.map(|f| f.name().to_string());
//!     }
//! }
//!
//! let listener = Arc::new(LastName::default());
//! let mut intake = FileIntake::new(ValidationPolicy::default())
//!     .with_listener(listener.clone() as Arc<dyn SelectionListener>);
//! intake.clear();
//! assert!(listener.0.lock().unwrap().is_none());
//! ```

use crate::intake::AcceptedFile;
use std::sync::Arc;

/// Called by [`crate::intake::FileIntake`] whenever its selection changes.
///
/// Implementations must be `Send + Sync`; the intake may live inside a
/// session whose owner moves between Tokio worker threads.
pub trait SelectionListener: Send + Sync {
    /// `Some(file)` after an accepted selection, `None` after a clear,
    /// an empty selection, or a rejection.
    fn on_file_selected(&self, file: Option<&AcceptedFile>) {
        let _ = file;
    }
}

/// A no-op implementation for callers that don't track selections.
///
/// This is the default when no listener is configured.
pub struct NoopSelectionListener;

impl SelectionListener for NoopSelectionListener {}

/// Convenience alias matching the type stored in the intake.
pub type SharedSelectionListener = Arc<dyn SelectionListener>;
