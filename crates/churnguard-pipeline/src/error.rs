use std::error::Error;
use std::fmt;

/// Error taxonomy for the pipeline. Every stage failure falls into one of
/// three buckets and aborts the run; there are no partial-failure semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Malformed input: missing columns, unparseable values, or a
    /// categorical column with nothing observed to impute from.
    Data(String),
    /// A computation produced an undefined result, e.g. division by zero in
    /// a derived feature or a filter that removed every row.
    Computation(String),
    /// Invalid run configuration: bad split fraction, empty search ranges,
    /// or too few class examples for the requested fold count.
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineError::Data(msg) => write!(f, "data error: {}", msg),
            PipelineError::Computation(msg) => write!(f, "computation error: {}", msg),
            PipelineError::Configuration(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl Error for PipelineError {}
