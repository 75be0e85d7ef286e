//! Report artifacts: metrics tables, the merged PDF, and the run report.

pub mod outcome;
pub mod pdf;
pub mod table;
