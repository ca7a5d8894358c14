//! Report Module
//!
//! - `ReportAssembler` - merges stage outputs into one `AnalysisResult`
//! - `AnalysisResult::to_json_pretty()` / `to_markdown()` - renderings

mod assembler;
mod markdown;

pub use assembler::{follow_up_questions, ReportAssembler};
