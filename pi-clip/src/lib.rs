//! # pi-clip - Clipboard for the pi file manager
//!
//! Holds the paths captured by a yank together with the copy/cut mode, and
//! executes paste and link batches against a destination directory.
//!
//! ## Key Features
//! - Copy or cut mode shared by every item of a yank
//! - Recursive, metadata-preserving copies
//! - Moves that survive cross-device renames (copy then delete)
//! - Relative symlink creation that never overwrites
//! - Per-item failure reports; one bad item never aborts a batch

pub mod clipboard;
pub mod error;
pub mod item;
pub mod operations;

pub use clipboard::{Clipboard, PasteReport};
pub use error::{ClipError, ClipResult};
pub use item::{ClipboardItem, ClipboardOperation};
pub use operations::{FileOperation, relative_path};
