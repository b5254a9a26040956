pub mod keyboard_handler;
pub use keyboard_handler::{Binding, KeyboardHandler};
