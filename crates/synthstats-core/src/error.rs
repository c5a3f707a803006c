// crates/synthstats-core/src/error.rs

use thiserror::Error;

use crate::aggregate::AggregateError;
use crate::loader::LoadError;
use crate::preprocess::PreprocessError;
use crate::source::SourceError;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Data generation failed: {0}")]
    Source(#[from] SourceError),

    #[error("CSV loading failed: {0}")]
    Load(#[from] LoadError),

    #[error("Schema validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),

    #[error("Aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
