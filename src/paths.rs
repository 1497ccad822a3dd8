// src/paths.rs

use std::path::{Path, PathBuf};

/// File name minus its last extension: `full.csv.gz` gives `full.csv`.
fn stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dvf".to_string())
}

/// Where `clean` writes: next to the source, or inside `output` when it is an
/// existing directory, as `<stem>_cleaned.parquet`. Any other `output` is used
/// as given.
pub fn clean_output_path(source: &Path, output: Option<&Path>) -> PathBuf {
    let name = format!("{}_cleaned.parquet", stem(source));
    match output {
        Some(out) if out.is_dir() => out.join(name),
        Some(out) => out.to_path_buf(),
        None => source.with_file_name(name),
    }
}

/// Where `store` writes: the source with a `.parquet` extension, or
/// `<output>/<stem>.parquet` when `output` is an existing directory.
pub fn store_output_path(source: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(out) if out.is_dir() => out.join(format!("{}.parquet", stem(source))),
        Some(out) => out.to_path_buf(),
        None => source.with_extension("parquet"),
    }
}
