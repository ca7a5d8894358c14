//! Parameter Extraction Module
//!
//! Turns noisy completion/workover report text into typed, unit-normalized
//! field candidates.
//!
//! - `PatternRegistry` - compiled label locators and per-kind value rules
//! - `ParameterExtractor` - candidate search, primary selection, provenance
//! - `parse_number` - separator- and fraction-aware numeric tokens

mod extractor;
pub mod number;
pub mod registry;

pub use extractor::ParameterExtractor;
pub use number::{parse_number, NumberError};
pub use registry::{FieldSpec, Locator, Normalizer, PatternRegistry, PatternRule, RegistryError};
