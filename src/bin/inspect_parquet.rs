use anyhow::Result;
use dvf_maintenance::output::summarize;
use std::{env, path::Path, process::exit};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <PARQUET_FILE>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect(Path::new(&args[1])) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

fn inspect(path: &Path) -> Result<()> {
    let summary = summarize(path)?;

    println!("=== Parquet File: {} ===", path.display());
    println!("Total rows:           {}", summary.rows);
    println!("Number of row groups: {}", summary.row_groups);
    println!("File-size on disk:    {} bytes", summary.file_size);
    println!(
        "Compression:          {}",
        summary
            .compression
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    );
    match &summary.metadata {
        Some(meta) => {
            println!("Kind:                 {:?}", meta.kind);
            println!("Index:                {}", meta.index_columns.join(", "));
        }
        None => println!("Kind:                 <not written by dvf-maintenance>"),
    }
    println!();

    println!("=== Columns ===");
    for (name, data_type) in &summary.columns {
        println!("- {:<34} | {}", name, data_type);
    }
    Ok(())
}
