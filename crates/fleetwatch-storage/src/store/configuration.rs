use chrono::Utc;
use fleetwatch_common::types::AlertConfiguration;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::alert_configuration::{self, Column, Entity};
use crate::error::{parse_column, Result};
use crate::store::AlertStore;

#[derive(Debug, Clone, Default)]
pub struct ConfigurationFilter {
    pub ids: Option<Vec<String>>,
    pub active_eq: Option<bool>,
}

impl ConfigurationFilter {
    /// Active configurations among `ids`.
    pub fn active_by_ids(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            ids: Some(ids.into_iter().collect()),
            active_eq: Some(true),
        }
    }
}

fn to_configuration(m: alert_configuration::Model) -> Result<AlertConfiguration> {
    Ok(AlertConfiguration {
        target_type: parse_column("target_type", &m.target_type)?,
        default_severity: parse_column("default_severity", &m.default_severity)?,
        id: m.id,
        customer_id: m.customer_id,
        name: m.name,
        active: m.active,
        created_at: m.created_at.with_timezone(&Utc),
    })
}

impl AlertStore {
    pub async fn insert_configuration(
        &self,
        cfg: &AlertConfiguration,
    ) -> Result<AlertConfiguration> {
        let am = alert_configuration::ActiveModel {
            id: Set(cfg.id.clone()),
            customer_id: Set(cfg.customer_id.clone()),
            name: Set(cfg.name.clone()),
            target_type: Set(cfg.target_type.to_string()),
            default_severity: Set(cfg.default_severity.to_string()),
            active: Set(cfg.active),
            created_at: Set(cfg.created_at.fixed_offset()),
        };
        let model = am.insert(self.db()).await?;
        to_configuration(model)
    }

    pub async fn list_configurations(
        &self,
        filter: &ConfigurationFilter,
    ) -> Result<Vec<AlertConfiguration>> {
        let mut q = Entity::find();
        if let Some(ids) = &filter.ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            q = q.filter(Column::Id.is_in(ids.iter().cloned()));
        }
        if let Some(active) = filter.active_eq {
            q = q.filter(Column::Active.eq(active));
        }
        let rows = q.order_by_asc(Column::Id).all(self.db()).await?;
        rows.into_iter().map(to_configuration).collect()
    }

    /// Toggle a configuration. Alerts of an inactive configuration are
    /// resolved by the next reconciliation pass.
    pub async fn set_configuration_active(
        &self,
        id: &str,
        active: bool,
    ) -> Result<Option<AlertConfiguration>> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        if let Some(m) = model {
            let mut am: alert_configuration::ActiveModel = m.into();
            am.active = Set(active);
            let updated = am.update(self.db()).await?;
            tracing::info!(configuration_id = %id, active, "Configuration toggled");
            Ok(Some(to_configuration(updated)?))
        } else {
            Ok(None)
        }
    }
}
