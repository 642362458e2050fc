use serde::Serialize;

use crate::core::Diagnostic;

/// One application in the report.
///
/// Built once by the traversal and never modified afterwards. `messages` is
/// never empty: a row with nothing to flag carries a single [`Diagnostic::Ok`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    organization: String,
    space: String,
    application: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    buildpacks: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    total_memory: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    messages: Vec<Diagnostic>,
}

impl ReportRow {
    pub fn new(
        organization: impl Into<String>,
        space: impl Into<String>,
        application: impl Into<String>,
        buildpacks: Vec<String>,
        total_memory: i64,
        mut messages: Vec<Diagnostic>,
    ) -> Self {
        if messages.is_empty() {
            messages.push(Diagnostic::Ok);
        }
        Self {
            organization: organization.into(),
            space: space.into(),
            application: application.into(),
            buildpacks,
            total_memory: total_memory.to_string(),
            messages,
        }
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn space(&self) -> &str {
        &self.space
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn buildpacks(&self) -> &[String] {
        &self.buildpacks
    }

    /// Instance memory times instance count, as a decimal string.
    pub fn total_memory(&self) -> &str {
        &self.total_memory
    }

    pub fn messages(&self) -> &[Diagnostic] {
        &self.messages
    }

    pub fn needs_attention(&self) -> bool {
        self.messages.iter().any(|m| m.needs_attention())
    }
}
