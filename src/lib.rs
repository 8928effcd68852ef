//! README synthesis engine.
//!
//! Turns a small set of project fields into a Markdown README, either by
//! deterministic local assembly or by prompting a remote model with local
//! assembly as the fallback.

pub mod config;
pub mod document;
pub mod export;
pub mod fields;
pub mod gemini;
pub mod generator;
pub mod logging;
pub mod prompt;
pub mod remote;
pub mod sections;

pub use document::{Document, anchor, assemble, assemble_markdown};
pub use fields::{License, ProjectFields, ProjectType, ValidFields, ValidationError};
pub use generator::{Generation, GenerationState, Generator, Rejected, Source, Strategy};
pub use remote::{GenerationError, TextGenerator};
