//! CLI command handlers

pub mod classify;
pub mod infer;

pub use classify::handle_classify;
pub use infer::handle_infer;
