use std::fmt;

use crate::error::Error;

/// Upper bound for the length of a diagnostic, in bytes.
pub const MAX_DIAGNOSTIC_LEN: usize = 255;

/// The human-readable message that accompanies a failed operation.
///
/// It names the failing operation and the provider's raw status code, e.g.
/// `Failed to load PDB file (status: 0x806D0004)`. It is empty for successful
/// operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Diagnostic(String);

impl Diagnostic {
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn from_error(err: &Error) -> Self {
        let mut message = format!("{} (status: {})", err.operation(), err.status());
        truncate_at_char_boundary(&mut message, MAX_DIAGNOSTIC_LEN);
        Self(message)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn truncate_at_char_boundary(s: &mut String, max_len: usize) {
    if s.len() <= max_len {
        return;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
