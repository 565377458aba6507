pub mod analyzer;

pub use analyzer::{analyze, classify, AnalysisBackend, AnalyzeError, HttpBackend};
