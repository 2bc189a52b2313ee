//! Snapshot export and import: JSON round-trips and semicolon-delimited CSV expense files.

pub mod csv;
pub mod json;

use serde::{Deserialize, Serialize};

pub use self::csv::{CsvImportOptions, CsvImportReport, CsvMode, SkippedRow};
pub use self::json::{
    BlanketResolver, Collision, CollisionResolver, JsonImportReport, Resolution,
};

/// How imported records combine with the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Imported data replaces what it covers.
    Overwrite,
    /// Imported records are added; id collisions are settled by a resolver.
    #[default]
    Merge,
}
