//! Terminal output.
//!
//! - `tree`: an ASCII tree built from `/`-delimited paths.
//! - [`ResolutionExt`]: turns a resolution into those paths and renders it.

mod resolution_ext;
mod tree;

pub use self::resolution_ext::ResolutionExt;
