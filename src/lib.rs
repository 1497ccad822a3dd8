pub mod config;
pub mod error;
pub mod format;
pub mod load;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod process;
pub mod schema;

#[cfg(test)]
pub mod test_support;

pub use config::PipelineConfig;
pub use error::{DvfError, Result};
pub use format::InputFormat;
pub use pipeline::{clean, store, CleanReport, StoreReport};
