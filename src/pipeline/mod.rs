//! Pipeline stages for figure conversion.
//!
//! Each submodule implements exactly one step.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ render (svg→pdf) ──▶ render (pdf→png) ──▶ sync
//! (glob, dir   (renderer            (renderer            (copy into
//!  checks)      subprocess)          subprocess)          figs/)
//! ```
//!
//! 1. [`discover`] — resolve targets to existing figure directories and list
//!    files by extension
//! 2. [`render`]   — drive the [`crate::renderer::Renderer`] over every input
//!    of one figure, aborting on the first failure
//! 3. [`sync`]     — copy finished `*.pdf` / `*.png` files into the external
//!    target directory

pub mod discover;
pub mod render;
pub mod sync;
