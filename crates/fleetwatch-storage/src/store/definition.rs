use chrono::Utc;
use fleetwatch_common::types::AlertDefinition;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::alert_definition::{self, Column, Entity};
use crate::error::Result;
use crate::store::AlertStore;

/// `None` matches every definition; an empty list matches none.
#[derive(Debug, Clone, Default)]
pub struct DefinitionFilter {
    pub ids: Option<Vec<String>>,
}

impl DefinitionFilter {
    pub fn by_ids(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            ids: Some(ids.into_iter().collect()),
        }
    }
}

fn to_definition(m: alert_definition::Model) -> AlertDefinition {
    AlertDefinition {
        id: m.id,
        customer_id: m.customer_id,
        configuration_id: m.configuration_id,
        created_at: m.created_at.with_timezone(&Utc),
    }
}

impl AlertStore {
    pub async fn insert_definition(&self, def: &AlertDefinition) -> Result<AlertDefinition> {
        let am = alert_definition::ActiveModel {
            id: Set(def.id.clone()),
            customer_id: Set(def.customer_id.clone()),
            configuration_id: Set(def.configuration_id.clone()),
            created_at: Set(def.created_at.fixed_offset()),
        };
        let model = am.insert(self.db()).await?;
        Ok(to_definition(model))
    }

    pub async fn list_definitions(&self, filter: &DefinitionFilter) -> Result<Vec<AlertDefinition>> {
        let mut q = Entity::find();
        if let Some(ids) = &filter.ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            q = q.filter(Column::Id.is_in(ids.iter().cloned()));
        }
        let rows = q.order_by_asc(Column::Id).all(self.db()).await?;
        Ok(rows.into_iter().map(to_definition).collect())
    }
}
