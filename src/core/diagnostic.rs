use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Per-application finding attached to a report row.
///
/// The numbered forms are what operators grep for, so the rendered text is
/// fixed: `needs attention (N)` or `OK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Diagnostic {
    /// The current droplet could not be fetched.
    DropletUnavailable,
    /// The droplet lists no buildpacks; staging likely went wrong.
    NoBuildpacks,
    /// A droplet buildpack carries no version.
    MissingVersion,
    /// A droplet buildpack is not among the enabled buildpacks.
    NotInCatalog,
    /// The enabled buildpack's file is a different version than the one staged.
    VersionMismatch,
    Ok,
}

impl Diagnostic {
    pub fn code(self) -> Option<u8> {
        match self {
            Diagnostic::DropletUnavailable => Some(1),
            Diagnostic::NoBuildpacks => Some(2),
            Diagnostic::MissingVersion => Some(3),
            Diagnostic::NotInCatalog => Some(4),
            Diagnostic::VersionMismatch => Some(5),
            Diagnostic::Ok => None,
        }
    }

    pub fn needs_attention(self) -> bool {
        self != Diagnostic::Ok
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code() {
            Some(code) => write!(f, "needs attention ({code})"),
            None => f.write_str("OK"),
        }
    }
}

impl FromStr for Diagnostic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "OK" => Ok(Diagnostic::Ok),
            "needs attention (1)" => Ok(Diagnostic::DropletUnavailable),
            "needs attention (2)" => Ok(Diagnostic::NoBuildpacks),
            "needs attention (3)" => Ok(Diagnostic::MissingVersion),
            "needs attention (4)" => Ok(Diagnostic::NotInCatalog),
            "needs attention (5)" => Ok(Diagnostic::VersionMismatch),
            other => Err(format!("unknown diagnostic: {other}")),
        }
    }
}

impl From<Diagnostic> for String {
    fn from(d: Diagnostic) -> Self {
        d.to_string()
    }
}

impl TryFrom<String> for Diagnostic {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
