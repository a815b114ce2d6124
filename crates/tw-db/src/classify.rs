//! Classification of driver errors
//!
//! Re-running a schema script must not fail because an object it creates is
//! already there. These errors are recognized by MySQL error number, by the
//! matching symbolic name, by SQLSTATE, and finally by an "already exists"
//! message (which is what DuckDB and most other engines report).

use std::fmt;

/// `ER_TABLE_EXISTS_ERROR`
pub const ER_TABLE_EXISTS_ERROR: u16 = 1050;
/// `ER_DUP_FIELDNAME`
pub const ER_DUP_FIELDNAME: u16 = 1060;
/// `ER_DUP_KEYNAME`
pub const ER_DUP_KEYNAME: u16 = 1061;
/// `ER_DUP_ENTRY`
pub const ER_DUP_ENTRY: u16 = 1062;

/// Which kind of pre-existing object was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlreadyExistsKind {
    /// Index or key name already used on the table
    DuplicateKeyName,
    /// Table already exists
    TableExists,
    /// Row with the same unique key already present
    DuplicateEntry,
    /// Column already exists on the table
    DuplicateColumn,
    /// Message said "already exists" without a recognized code
    Message,
}

impl fmt::Display for AlreadyExistsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlreadyExistsKind::DuplicateKeyName => write!(f, "duplicate key name"),
            AlreadyExistsKind::TableExists => write!(f, "table already exists"),
            AlreadyExistsKind::DuplicateEntry => write!(f, "duplicate entry"),
            AlreadyExistsKind::DuplicateColumn => write!(f, "duplicate column"),
            AlreadyExistsKind::Message => write!(f, "already exists"),
        }
    }
}

/// Outcome of classifying a statement failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The statement's target already exists; safe to skip
    AlreadyExists(AlreadyExistsKind),
    /// A genuine failure
    Other,
}

impl ErrorClass {
    /// True for [`ErrorClass::AlreadyExists`]
    pub fn is_already_exists(self) -> bool {
        matches!(self, ErrorClass::AlreadyExists(_))
    }
}

/// Classify a failure from its driver `code` and `message`
pub fn classify(code: Option<&str>, message: &str) -> ErrorClass {
    if let Some(kind) = code.and_then(kind_for_code) {
        return ErrorClass::AlreadyExists(kind);
    }
    if message.to_ascii_lowercase().contains("already exists") {
        return ErrorClass::AlreadyExists(AlreadyExistsKind::Message);
    }
    ErrorClass::Other
}

fn kind_for_code(code: &str) -> Option<AlreadyExistsKind> {
    let code = code.trim();
    if let Ok(number) = code.parse::<u16>() {
        return match number {
            ER_TABLE_EXISTS_ERROR => Some(AlreadyExistsKind::TableExists),
            ER_DUP_FIELDNAME => Some(AlreadyExistsKind::DuplicateColumn),
            ER_DUP_KEYNAME => Some(AlreadyExistsKind::DuplicateKeyName),
            ER_DUP_ENTRY => Some(AlreadyExistsKind::DuplicateEntry),
            _ => None,
        };
    }
    match code {
        "ER_TABLE_EXISTS_ERROR" | "42S01" => Some(AlreadyExistsKind::TableExists),
        "ER_DUP_FIELDNAME" | "42S21" => Some(AlreadyExistsKind::DuplicateColumn),
        "ER_DUP_KEYNAME" => Some(AlreadyExistsKind::DuplicateKeyName),
        "ER_DUP_ENTRY" => Some(AlreadyExistsKind::DuplicateEntry),
        _ => None,
    }
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
