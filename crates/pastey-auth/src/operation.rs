//! Operations a caller can request on a paste

use std::fmt;

/// Operations checked by the access gate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Read metadata or content
    Read,
    /// Replace content or metadata
    Write,
    /// Delete the paste
    Delete,
    /// Create or remove grants
    Share,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Delete => "delete",
            Operation::Share => "share",
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Operation::Read)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All operations for convenience
pub const ALL_OPERATIONS: &[Operation] = &[
    Operation::Read,
    Operation::Write,
    Operation::Delete,
    Operation::Share,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        let names: Vec<String> = ALL_OPERATIONS.iter().map(|op| op.to_string()).collect();
        assert_eq!(names, vec!["read", "write", "delete", "share"]);
    }

    #[test]
    fn test_only_read_is_read_only() {
        let read_only: Vec<_> = ALL_OPERATIONS
            .iter()
            .filter(|op| op.is_read_only())
            .collect();
        assert_eq!(read_only, vec![&Operation::Read]);
    }
}
