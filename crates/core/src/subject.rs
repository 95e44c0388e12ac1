use serde::{Deserialize, Serialize};

/// Identity of the caller a request is evaluated for.
///
/// Authentication itself is owned by the host application; this type only
/// carries the answer so the policy port can be asked about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    subject: String,
    display_name: String,
}

impl Subject {
    /// Creates a subject from host-supplied identity data.
    #[must_use]
    pub fn new(subject: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
        }
    }

    /// Returns the stable subject claim.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current caller.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }
}
