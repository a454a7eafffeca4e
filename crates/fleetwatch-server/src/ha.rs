use std::path::PathBuf;

use fleetwatch_alert::InstanceRole;

use crate::config::{HighAvailabilityConfig, Role};

/// Active-instance check driven by `[high_availability]`.
///
/// With a marker file configured its contents decide the role on every
/// call, so an external failover tool can flip instances without a restart.
/// A missing or unreadable marker falls back to the configured role.
#[derive(Debug, Clone)]
pub struct ConfiguredRole {
    role: Role,
    marker: Option<PathBuf>,
}

impl ConfiguredRole {
    pub fn new(role: Role, marker: Option<PathBuf>) -> Self {
        Self { role, marker }
    }

    pub fn from_config(config: &HighAvailabilityConfig) -> Self {
        Self::new(
            config.role,
            config.follower_marker_file.as_ref().map(PathBuf::from),
        )
    }

    pub fn current(&self) -> Role {
        let Some(marker) = &self.marker else {
            return self.role;
        };
        match std::fs::read_to_string(marker) {
            Ok(content) => match content.parse::<Role>() {
                Ok(role) => role,
                Err(e) => {
                    tracing::warn!(path = %marker.display(), error = %e, "Ignoring role marker");
                    self.role
                }
            },
            Err(e) => {
                tracing::debug!(path = %marker.display(), error = %e, "Role marker unreadable");
                self.role
            }
        }
    }
}

impl InstanceRole for ConfiguredRole {
    fn is_active(&self) -> bool {
        self.current() == Role::Leader
    }
}
