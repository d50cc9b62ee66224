pub mod clipboard;
pub mod layout;
pub mod text;

pub use clipboard::Clipboard;
