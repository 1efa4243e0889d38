//! Translation between the caller's loose query vocabulary and the strict
//! upstream request/response shapes. Nothing in here performs I/O.

pub mod dates;
pub mod fields;
pub mod filter;
pub mod format;
pub mod request;
pub mod response;

/// Maximum rows returned by a flat report.
pub const FLAT_ROW_CAP: u32 = 100;

/// Default row cap for each pivot axis.
pub const PIVOT_DEFAULT_ROWS: u32 = 30;

/// Maximum data rows rendered in the pivot text report.
pub const PIVOT_DISPLAY_CAP: usize = 50;

/// Number of leading records repeated in a flat report summary.
pub const TOP_RECORDS: usize = 10;

/// A query that cannot be turned into an upstream request.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("{0} é obrigatório")]
    MissingField(&'static str),
}
