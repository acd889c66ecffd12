//! Domain model types (pure).
//!
//! All types in this module are plain data: line records produced by the diff
//! parser, commit metadata, file row mapping, text positions and keyboard actions.

pub mod commit;
pub mod error;
pub mod file_index;
pub mod key_action;
pub mod line;
pub mod position;

// Re-export for convenience
pub use commit::Commit;
pub use error::{AppError, RunnerError};
pub use file_index::FileRowIndex;
pub use key_action::KeyAction;
pub use line::{LineKind, LineRecord};
pub use position::TextPosition;
