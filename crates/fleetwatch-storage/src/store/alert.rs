use std::collections::HashSet;

use chrono::Utc;
use fleetwatch_common::types::{Alert, AlertLabel, AlertState};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};

use crate::entities::alert::{self, Column, Entity};
use crate::error::{parse_column, Result};
use crate::store::AlertStore;

/// Rows per multi-row statement, kept well under SQLite's bind limit.
const WRITE_CHUNK: usize = 200;

/// Conflict target for bulk saves. Every column except the acknowledgement
/// time is replaced; an `ACKNOWLEDGED` row keeps its state.
fn upsert_on_conflict() -> OnConflict {
    OnConflict::column(Column::Id)
        .update_columns([
            Column::CustomerId,
            Column::DefinitionId,
            Column::ConfigurationId,
            Column::SourceId,
            Column::SourceName,
            Column::Name,
            Column::Severity,
            Column::ConfigurationType,
            Column::Message,
            Column::Labels,
            Column::CreateTime,
            Column::ResolvedTime,
        ])
        .value(
            Column::State,
            Expr::cust(
                "CASE WHEN alerts.state = 'ACKNOWLEDGED' THEN alerts.state ELSE excluded.state END",
            ),
        )
        .to_owned()
}

/// Selection over persisted alerts. `None` means "no constraint"; an empty
/// list matches nothing.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub ids: Option<Vec<String>>,
    pub exclude_ids: HashSet<String>,
    pub definition_ids: Option<Vec<String>>,
    pub states: Option<Vec<AlertState>>,
}

impl AlertFilter {
    /// Firing alerts belonging to any of `definition_ids`.
    pub fn firing_for_definitions(definition_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            definition_ids: Some(definition_ids.into_iter().collect()),
            states: Some(AlertState::FIRING.to_vec()),
            ..Self::default()
        }
    }

    /// Every firing alert whose id is not in `exclude_ids`.
    pub fn firing_except(exclude_ids: HashSet<String>) -> Self {
        Self {
            exclude_ids,
            states: Some(AlertState::FIRING.to_vec()),
            ..Self::default()
        }
    }

    fn matches_nothing(&self) -> bool {
        self.ids.as_ref().is_some_and(Vec::is_empty)
            || self.definition_ids.as_ref().is_some_and(Vec::is_empty)
            || self.states.as_ref().is_some_and(Vec::is_empty)
    }
}

fn to_alert(m: alert::Model) -> Result<Alert> {
    let labels: Vec<AlertLabel> = serde_json::from_str(&m.labels)?;
    Ok(Alert {
        severity: parse_column("severity", &m.severity)?,
        configuration_type: parse_column("configuration_type", &m.configuration_type)?,
        state: parse_column("state", &m.state)?,
        id: m.id,
        customer_id: m.customer_id,
        definition_id: m.definition_id,
        configuration_id: m.configuration_id,
        source_id: m.source_id,
        source_name: m.source_name,
        name: m.name,
        message: m.message,
        labels,
        create_time: m.create_time.with_timezone(&Utc),
        acknowledged_time: m.acknowledged_time.map(|t| t.with_timezone(&Utc)),
        resolved_time: m.resolved_time.map(|t| t.with_timezone(&Utc)),
    })
}

fn to_active_model(a: &Alert) -> Result<alert::ActiveModel> {
    Ok(alert::ActiveModel {
        id: Set(a.id.clone()),
        customer_id: Set(a.customer_id.clone()),
        definition_id: Set(a.definition_id.clone()),
        configuration_id: Set(a.configuration_id.clone()),
        source_id: Set(a.source_id.clone()),
        source_name: Set(a.source_name.clone()),
        name: Set(a.name.clone()),
        severity: Set(a.severity.to_string()),
        configuration_type: Set(a.configuration_type.to_string()),
        message: Set(a.message.clone()),
        labels: Set(serde_json::to_string(&a.labels)?),
        state: Set(a.state.to_string()),
        create_time: Set(a.create_time.fixed_offset()),
        acknowledged_time: Set(a.acknowledged_time.map(|t| t.fixed_offset())),
        resolved_time: Set(a.resolved_time.map(|t| t.fixed_offset())),
    })
}

async fn find_alerts<C: ConnectionTrait>(conn: &C, filter: &AlertFilter) -> Result<Vec<alert::Model>> {
    if filter.matches_nothing() {
        return Ok(Vec::new());
    }
    let mut q = Entity::find();
    if let Some(ids) = &filter.ids {
        q = q.filter(Column::Id.is_in(ids.iter().cloned()));
    }
    if let Some(definition_ids) = &filter.definition_ids {
        q = q.filter(Column::DefinitionId.is_in(definition_ids.iter().cloned()));
    }
    if let Some(states) = &filter.states {
        q = q.filter(Column::State.is_in(states.iter().map(ToString::to_string)));
    }
    let rows = q.order_by_asc(Column::Id).all(conn).await?;
    // Exclusion sets can be as large as the whole firing population, so
    // they are applied here rather than bound into the statement.
    Ok(rows
        .into_iter()
        .filter(|m| !filter.exclude_ids.contains(&m.id))
        .collect())
}

impl AlertStore {
    pub async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        find_alerts(self.db(), filter)
            .await?
            .into_iter()
            .map(to_alert)
            .collect()
    }

    pub async fn get_alert_by_id(&self, id: &str) -> Result<Option<Alert>> {
        Entity::find_by_id(id)
            .one(self.db())
            .await?
            .map(to_alert)
            .transpose()
    }

    /// Insert or update every alert in one transaction.
    ///
    /// Returns the stored rows, re-read inside the same transaction and
    /// ordered by id per chunk. A row already `ACKNOWLEDGED` in the store
    /// keeps that state even if the caller passed another firing state.
    pub async fn save_alerts(&self, alerts: &[Alert]) -> Result<Vec<Alert>> {
        if alerts.is_empty() {
            return Ok(Vec::new());
        }
        let models = alerts
            .iter()
            .map(to_active_model)
            .collect::<Result<Vec<_>>>()?;

        let txn = self.db().begin().await?;
        for chunk in models.chunks(WRITE_CHUNK) {
            Entity::insert_many(chunk.to_vec())
                .on_conflict(upsert_on_conflict())
                .exec_without_returning(&txn)
                .await?;
        }
        let mut written = Vec::with_capacity(alerts.len());
        for chunk in alerts.chunks(WRITE_CHUNK) {
            let filter = AlertFilter {
                ids: Some(chunk.iter().map(|a| a.id.clone()).collect()),
                ..AlertFilter::default()
            };
            written.extend(find_alerts(&txn, &filter).await?);
        }
        txn.commit().await?;

        tracing::debug!(count = written.len(), "Saved alerts");
        written.into_iter().map(to_alert).collect()
    }

    /// Transition every firing alert matched by `filter` to `RESOLVED`.
    ///
    /// The state constraint in `filter` is ignored: only firing alerts are
    /// ever touched. Returns the resolved alerts.
    pub async fn mark_resolved(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        let filter = AlertFilter {
            states: Some(AlertState::FIRING.to_vec()),
            ..filter.clone()
        };
        let now = Utc::now();

        let txn = self.db().begin().await?;
        let candidates = find_alerts(&txn, &filter).await?;
        let ids: Vec<String> = candidates.iter().map(|m| m.id.clone()).collect();
        for chunk in ids.chunks(WRITE_CHUNK) {
            Entity::update_many()
                .col_expr(Column::State, Expr::value(AlertState::Resolved.to_string()))
                .col_expr(Column::ResolvedTime, Expr::value(now.fixed_offset()))
                .filter(Column::Id.is_in(chunk.iter().cloned()))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;

        candidates
            .into_iter()
            .map(|m| {
                let mut alert = to_alert(m)?;
                alert.state = AlertState::Resolved;
                alert.resolved_time = Some(now);
                Ok(alert)
            })
            .collect()
    }

    /// Operator acknowledgement. Resolved alerts are returned unchanged;
    /// `None` if the id is unknown.
    pub async fn acknowledge_alert(&self, id: &str) -> Result<Option<Alert>> {
        let Some(model) = Entity::find_by_id(id).one(self.db()).await? else {
            return Ok(None);
        };
        let current = to_alert(model.clone())?;
        if !current.state.is_firing() || current.state == AlertState::Acknowledged {
            return Ok(Some(current));
        }

        let mut am: alert::ActiveModel = model.into();
        am.state = Set(AlertState::Acknowledged.to_string());
        am.acknowledged_time = Set(Some(Utc::now().fixed_offset()));
        let updated = am.update(self.db()).await?;
        tracing::info!(alert_id = %id, "Alert acknowledged");
        Ok(Some(to_alert(updated)?))
    }
}
