use anyhow::{Context, Result};
use std::{env, str::FromStr};

pub const THREADS_ENV: &str = "DVF_THREADS";
pub const BATCH_SIZE_ENV: &str = "DVF_BATCH_SIZE";
pub const BROTLI_LEVEL_ENV: &str = "DVF_BROTLI_LEVEL";

pub const DEFAULT_BATCH_SIZE: usize = 65_536;
pub const DEFAULT_BROTLI_LEVEL: u32 = 5;

/// Runtime knobs shared by the `clean` and `store` paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Worker threads for the fusion pool.
    pub threads: usize,
    /// Rows per Arrow batch when reading sources.
    pub batch_size: usize,
    /// Brotli quality for the Parquet output (0..=11).
    pub brotli_level: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            batch_size: DEFAULT_BATCH_SIZE,
            brotli_level: DEFAULT_BROTLI_LEVEL,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `DVF_THREADS`, `DVF_BATCH_SIZE` and `DVF_BROTLI_LEVEL`.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(threads) = read_env(THREADS_ENV)? {
            cfg.threads = threads;
        }
        if let Some(batch_size) = read_env(BATCH_SIZE_ENV)? {
            cfg.batch_size = batch_size;
        }
        if let Some(level) = read_env(BROTLI_LEVEL_ENV)? {
            cfg.brotli_level = level;
        }
        cfg.validated()
    }

    /// Apply explicit overrides (CLI flags win over the environment).
    pub fn with_overrides(
        mut self,
        threads: Option<usize>,
        batch_size: Option<usize>,
        brotli_level: Option<u32>,
    ) -> Result<Self> {
        if let Some(t) = threads {
            self.threads = t;
        }
        if let Some(b) = batch_size {
            self.batch_size = b;
        }
        if let Some(l) = brotli_level {
            self.brotli_level = l;
        }
        self.validated()
    }

    fn validated(self) -> Result<Self> {
        anyhow::ensure!(self.threads > 0, "thread count must be at least 1");
        anyhow::ensure!(self.batch_size > 0, "batch size must be at least 1");
        anyhow::ensure!(
            self.brotli_level <= 11,
            "brotli level {} out of range 0..=11",
            self.brotli_level
        );
        Ok(self)
    }
}

fn read_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("invalid value `{}` for {}", raw, key)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("reading {}", key)),
    }
}
