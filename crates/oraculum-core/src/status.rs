//! ============================================================================
//! Status Sink - Per-component status, latest operation and alerts
//! ============================================================================
//! The display layer renders one panel per component. Writers only ever set
//! the current status, replace the latest operation, or append an alert;
//! alerts are never pruned within a session.
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status shown for a component nobody has written to yet
pub const DEFAULT_STATUS: &str = "Inactive";

/// Latest operation shown for a component nobody has written to yet
pub const DEFAULT_LATEST_OPERATION: &str = "N/A";

/// Write side of the status panels
pub trait StatusSink {
    fn set_status(&mut self, component: &str, value: &str);
    fn set_latest_operation(&mut self, component: &str, text: &str);
    fn append_alert(&mut self, component: &str, text: &str);
}

/// Everything the display layer shows for one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub status: String,
    pub latest_operation: String,
    pub alerts: Vec<String>,
}

impl Default for ComponentStatus {
    fn default() -> Self {
        Self {
            status: DEFAULT_STATUS.to_string(),
            latest_operation: DEFAULT_LATEST_OPERATION.to_string(),
            alerts: Vec::new(),
        }
    }
}

/// In-memory sink owned by a single session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    components: BTreeMap<String, ComponentStatus>,
}

impl SessionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink with the given components already present in their default state
    pub fn with_components<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let components = names
            .into_iter()
            .map(|name| (name.into(), ComponentStatus::default()))
            .collect();
        Self { components }
    }

    pub fn component(&self, name: &str) -> Option<&ComponentStatus> {
        self.components.get(name)
    }

    /// Iterate components in name order
    pub fn components(&self) -> impl Iterator<Item = (&str, &ComponentStatus)> {
        self.components.iter().map(|(name, status)| (name.as_str(), status))
    }

    /// Alerts for a component, oldest first
    pub fn alerts(&self, name: &str) -> &[String] {
        self.components
            .get(name)
            .map(|c| c.alerts.as_slice())
            .unwrap_or(&[])
    }

    /// Total alerts across all components
    pub fn alert_count(&self) -> usize {
        self.components.values().map(|c| c.alerts.len()).sum()
    }

    fn entry(&mut self, component: &str) -> &mut ComponentStatus {
        self.components.entry(component.to_string()).or_default()
    }
}

impl StatusSink for SessionStatus {
    fn set_status(&mut self, component: &str, value: &str) {
        self.entry(component).status = value.to_string();
    }

    fn set_latest_operation(&mut self, component: &str, text: &str) {
        self.entry(component).latest_operation = text.to_string();
    }

    fn append_alert(&mut self, component: &str, text: &str) {
        self.entry(component).alerts.push(text.to_string());
    }
}
