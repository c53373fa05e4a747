//! Model layer - workflow data and presentation state
//!
//! - `upload` / `preview` - the selected source image and its preview handle
//! - `mode` - processing mode hint for the service
//! - `result` - schema-less extraction result
//! - `state` - the extraction state machine
//! - `modal` / `ui` - overlays and view toggles

pub mod modal;
pub mod mode;
pub mod preview;
pub mod result;
pub mod state;
pub mod ui;
pub mod upload;

// Re-export commonly used types
pub use mode::ProcessingMode;
pub use preview::{PreviewHandle, PreviewRegistry, Thumbnail};
pub use result::ExtractionResult;
pub use state::{ExtractionEvent, ExtractionState, RequestId};
pub use ui::{ServerStatus, StatusMessage, ViewMode};
pub use upload::{FileCandidate, UploadedFile};
