pub mod arrow;
pub mod columns;
pub mod fused;

pub use arrow::{coerce_raw_types, raw_arrow_type, strict_cast_options};
pub use fused::{fused_schema, FusedColumn, RawKind, INDEX_COLUMN};
