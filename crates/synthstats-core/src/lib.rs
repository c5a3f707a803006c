pub mod aggregate;
pub mod error;
pub mod loader;
pub mod pipelines;
pub mod present;
pub mod preprocess;
pub mod schema;
pub mod source;
pub mod validation;

pub use aggregate::{ActivityPivot, AggregateError, AggregateTable, GroupSpec, Measure, Reduction};
pub use error::{PipelineError, Result};
pub use preprocess::PreprocessError;
pub use schema::{Activity, Field, Product, Region, User};
