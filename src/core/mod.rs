mod diagnostic;
mod row;

pub use diagnostic::Diagnostic;
pub use row::ReportRow;
