//! Rewrites applied to a checked stylesheet.

pub mod fold;
pub mod select;

pub use fold::{FoldError, fold};
pub use select::select_branches;
