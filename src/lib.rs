//! ISO Session Fix Library
//!
//! Rewrites multisession ISO 9660 disc images so that tools expecting a single
//! session can mount and read them.

pub mod disc;
pub mod repair;

pub use repair::repair_image;
