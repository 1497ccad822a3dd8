use std::{fmt, str::FromStr};

use crate::error::DvfError;

/// Source encodings accepted by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Parquet,
    Pickle,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Csv => "csv",
            InputFormat::Parquet => "parquet",
            InputFormat::Pickle => "pickle",
        }
    }
}

impl FromStr for InputFormat {
    type Err = DvfError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "csv" => Ok(InputFormat::Csv),
            "parquet" => Ok(InputFormat::Parquet),
            "pickle" => Ok(InputFormat::Pickle),
            _ => Err(DvfError::UnsupportedFormat(tag.to_string())),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
