//! Pipeline stages for PDF-to-PPTX conversion.
//!
//! Each submodule implements exactly one transformation step and can be
//! tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ clean ──▶ layout ──▶ pptx
//! (path)    (lopdf)     (text)    (slides)   (zip)
//! ```
//!
//! 1. [`input`]  : check the file exists and carries the `%PDF` signature
//! 2. [`extract`]: pull raw text out of every page with lopdf
//! 3. [`clean`]  : split page text into blocks and tidy each block
//! 4. [`layout`] : paginate blocks into fixed-height boxes on slides
//! 5. [`pptx`]   : serialise slides as an Office Open XML presentation

pub mod clean;
pub mod extract;
pub mod input;
pub mod layout;
pub mod pptx;
