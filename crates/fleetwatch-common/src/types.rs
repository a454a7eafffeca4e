use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Label and annotation names shared with the alerting backend's rule
/// templates. Values are wire contract and must not change.
pub mod known_labels {
    pub const CUSTOMER_ID: &str = "customer_uuid";
    pub const DEFINITION_ID: &str = "definition_uuid";
    pub const CONFIGURATION_ID: &str = "configuration_uuid";
    pub const SOURCE_ID: &str = "source_uuid";
    pub const SOURCE_NAME: &str = "source_name";
    pub const DEFINITION_NAME: &str = "definition_name";
    pub const SEVERITY: &str = "severity";
    pub const CONFIGURATION_TYPE: &str = "configuration_type";
    pub const MAINTENANCE_WINDOW_IDS: &str = "maintenance_window_uuids";

    /// Annotation carrying the human-readable alert message.
    pub const SUMMARY_ANNOTATION: &str = "summary";
}

/// Alert severity level, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use fleetwatch_common::types::Severity;
///
/// let sev: Severity = "warning".parse().unwrap();
/// assert_eq!(sev, Severity::Warning);
/// assert_eq!(sev.to_string(), "WARNING");
/// assert!(Severity::Severe.priority() > Severity::Info.priority());
/// assert_eq!(Severity::from_label(None), Severity::Severe);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Severe,
}

impl Severity {
    /// Used when a sample carries no (or an unrecognised) severity label.
    pub const FALLBACK: Severity = Severity::Severe;

    /// Integer priority used for deduplication tie-breaking.
    pub fn priority(self) -> i32 {
        match self {
            Severity::Info => 1,
            Severity::Warning => 2,
            Severity::Severe => 3,
        }
    }

    pub fn from_label(value: Option<&str>) -> Self {
        match value.map(str::parse::<Severity>) {
            Some(Ok(severity)) => severity,
            Some(Err(e)) => {
                tracing::debug!(error = %e, "Falling back to default severity");
                Self::FALLBACK
            }
            None => Self::FALLBACK,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Severe => write!(f, "SEVERE"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INFO" => Ok(Severity::Info),
            "WARNING" => Ok(Severity::Warning),
            "SEVERE" => Ok(Severity::Severe),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// Scope of the configuration that produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfigurationType {
    Universe,
    Platform,
}

impl ConfigurationType {
    pub const FALLBACK: ConfigurationType = ConfigurationType::Universe;

    pub fn from_label(value: Option<&str>) -> Self {
        match value.map(str::parse::<ConfigurationType>) {
            Some(Ok(kind)) => kind,
            Some(Err(e)) => {
                tracing::debug!(error = %e, "Falling back to default configuration type");
                Self::FALLBACK
            }
            None => Self::FALLBACK,
        }
    }
}

impl std::fmt::Display for ConfigurationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationType::Universe => write!(f, "UNIVERSE"),
            ConfigurationType::Platform => write!(f, "PLATFORM"),
        }
    }
}

impl std::str::FromStr for ConfigurationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UNIVERSE" => Ok(ConfigurationType::Universe),
            "PLATFORM" => Ok(ConfigurationType::Platform),
            _ => Err(format!("unknown configuration type: {s}")),
        }
    }
}

/// Lifecycle state of a persisted alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertState {
    Active,
    Acknowledged,
    Suspended,
    Resolved,
}

impl AlertState {
    /// Every state except `Resolved`.
    pub const FIRING: [AlertState; 3] = [
        AlertState::Active,
        AlertState::Acknowledged,
        AlertState::Suspended,
    ];

    pub fn is_firing(self) -> bool {
        self != AlertState::Resolved
    }
}

impl std::fmt::Display for AlertState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertState::Active => write!(f, "ACTIVE"),
            AlertState::Acknowledged => write!(f, "ACKNOWLEDGED"),
            AlertState::Suspended => write!(f, "SUSPENDED"),
            AlertState::Resolved => write!(f, "RESOLVED"),
        }
    }
}

impl std::str::FromStr for AlertState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Ok(AlertState::Active),
            "ACKNOWLEDGED" => Ok(AlertState::Acknowledged),
            "SUSPENDED" => Ok(AlertState::Suspended),
            "RESOLVED" => Ok(AlertState::Resolved),
            _ => Err(format!("unknown alert state: {s}")),
        }
    }
}

/// Condition status reported by the alerting backend for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleState {
    Pending,
    Firing,
}

impl SampleState {
    /// Map a backend state string. Anything other than `firing` (including
    /// `inactive` or unknown values) is treated as pending.
    pub fn from_wire(value: &str) -> Self {
        if value.eq_ignore_ascii_case("firing") {
            SampleState::Firing
        } else {
            SampleState::Pending
        }
    }
}

/// One fired (or pending) condition as reported by the alerting backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    pub state: SampleState,
    pub active_at: DateTime<Utc>,
}

impl RawSample {
    /// Returns the label value, treating empty strings as absent.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn annotation(&self, name: &str) -> Option<&str> {
        self.annotations.get(name).map(String::as_str)
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.label(known_labels::CUSTOMER_ID)
    }

    pub fn definition_id(&self) -> Option<&str> {
        self.label(known_labels::DEFINITION_ID)
    }

    pub fn configuration_id(&self) -> Option<&str> {
        self.label(known_labels::CONFIGURATION_ID)
    }

    pub fn source_id(&self) -> Option<&str> {
        self.label(known_labels::SOURCE_ID)
    }

    /// The logical alert identity, if both halves are present.
    pub fn key(&self) -> Option<AlertKey> {
        Some(AlertKey::new(self.definition_id()?, self.source_id()?))
    }

    pub fn severity(&self) -> Severity {
        Severity::from_label(self.label(known_labels::SEVERITY))
    }

    pub fn configuration_type(&self) -> ConfigurationType {
        ConfigurationType::from_label(self.label(known_labels::CONFIGURATION_TYPE))
    }

    pub fn summary(&self) -> Option<&str> {
        self.annotation(known_labels::SUMMARY_ANNOTATION)
    }

    pub fn in_maintenance_window(&self) -> bool {
        self.label(known_labels::MAINTENANCE_WINDOW_IDS).is_some()
    }

    /// All labels as alert labels, sorted by name.
    pub fn sorted_labels(&self) -> Vec<AlertLabel> {
        let mut labels: Vec<AlertLabel> = self
            .labels
            .iter()
            .map(|(name, value)| AlertLabel::new(name, value))
            .collect();
        labels.sort();
        labels
    }
}

/// `(definition id, source id)`: identity of one logical alert across passes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlertKey {
    pub definition_id: String,
    pub source_id: String,
}

impl AlertKey {
    pub fn new(definition_id: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            definition_id: definition_id.into(),
            source_id: source_id.into(),
        }
    }
}

impl std::fmt::Display for AlertKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.definition_id, self.source_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AlertLabel {
    pub name: String,
    pub value: String,
}

impl AlertLabel {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A durable alert record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub customer_id: String,
    pub definition_id: String,
    pub configuration_id: String,
    pub source_id: String,
    pub source_name: Option<String>,
    /// Display name, taken from the definition name label on creation.
    pub name: Option<String>,
    pub severity: Severity,
    pub configuration_type: ConfigurationType,
    pub message: Option<String>,
    /// Always sorted by name.
    pub labels: Vec<AlertLabel>,
    pub state: AlertState,
    pub create_time: DateTime<Utc>,
    pub acknowledged_time: Option<DateTime<Utc>>,
    pub resolved_time: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn key(&self) -> AlertKey {
        AlertKey::new(&self.definition_id, &self.source_id)
    }

    pub fn label_value(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.value.as_str())
    }
}

/// The rule that produced a sample. Read-only to the reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDefinition {
    pub id: String,
    pub customer_id: String,
    pub configuration_id: String,
    pub created_at: DateTime<Utc>,
}

/// User-authored policy controlling whether its definitions' alerts are
/// materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfiguration {
    pub id: String,
    pub customer_id: String,
    pub name: String,
    pub target_type: ConfigurationType,
    pub default_severity: Severity,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
