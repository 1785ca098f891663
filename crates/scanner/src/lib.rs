//! Release-name parsing: pulls the series title out of tag-laden file names.
#![allow(clippy::collapsible_if)]
pub mod parser;
pub mod tokenizer;

pub use parser::{Element, ElementCategory, classify, extract_provider_ids, normalize};
