//! Migration report types and helpers.

mod migration_report;
mod result;

pub use migration_report::MigrationReport;
pub use result::{EntityKind, MigrationResult, Outcome};
