//! User-facing error records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use resumeforge_core::{ErrorId, Severity};

/// Where a user-facing error originated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSource {
    Infrastructure,
    Application,
    Domain,
    Ui,
}

impl ErrorSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSource::Infrastructure => "infrastructure",
            ErrorSource::Application => "application",
            ErrorSource::Domain => "domain",
            ErrorSource::Ui => "ui",
        }
    }
}

/// Declarative recovery pointer.
///
/// `handler` is an opaque identifier the presentation layer resolves to a
/// concrete operation; nothing here executes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorAction {
    pub label: String,
    pub handler: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl ErrorAction {
    pub fn new(label: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            handler: handler.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

/// Error record as held by the error store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub id: ErrorId,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub source: ErrorSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ErrorAction>,
    pub dismissed: bool,
}

/// Error record before it enters the store.
///
/// `id` and `timestamp` are optional; the store fills in whatever is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    pub id: Option<ErrorId>,
    pub timestamp: Option<DateTime<Utc>>,
    pub message: String,
    pub severity: Severity,
    pub source: ErrorSource,
    pub field: Option<String>,
    pub action: Option<ErrorAction>,
    pub dismissed: bool,
}

impl ErrorReport {
    /// Blocking report with no field, action, id or timestamp.
    pub fn new(message: impl Into<String>, source: ErrorSource) -> Self {
        Self {
            id: None,
            timestamp: None,
            message: message.into(),
            severity: Severity::Error,
            source,
            field: None,
            action: None,
            dismissed: false,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_action(mut self, action: ErrorAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_id(mut self, id: ErrorId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn dismissed(mut self, dismissed: bool) -> Self {
        self.dismissed = dismissed;
        self
    }

    /// Fill in a fresh id and the current time where absent.
    pub fn into_info(self) -> ErrorInfo {
        ErrorInfo {
            id: self.id.unwrap_or_default(),
            message: self.message,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            severity: self.severity,
            source: self.source,
            field: self.field,
            action: self.action,
            dismissed: self.dismissed,
        }
    }
}

impl From<ErrorInfo> for ErrorReport {
    fn from(info: ErrorInfo) -> Self {
        Self {
            id: Some(info.id),
            timestamp: Some(info.timestamp),
            message: info.message,
            severity: info.severity,
            source: info.source,
            field: info.field,
            action: info.action,
            dismissed: info.dismissed,
        }
    }
}
