use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::Result;
use crate::types::{LoanId, OwnerId, SnapshotId};

/// projected balance of one loan at one simulated month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub owner: OwnerId,
    pub loan_id: LoanId,
    pub date: NaiveDate,
    pub balance: Money,
    pub label: String,
}

impl Snapshot {
    pub fn capture(owner: OwnerId, loan_id: LoanId, date: NaiveDate, balance: Money, label: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            loan_id,
            date,
            balance,
            label: label.to_string(),
        }
    }

    pub fn view(&self) -> SnapshotView {
        SnapshotView {
            date: self.date,
            balance: self.balance,
            label: self.label.clone(),
        }
    }
}

/// chart point returned to callers
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnapshotView {
    pub date: NaiveDate,
    pub balance: Money,
    pub label: String,
}

/// owner-scoped mapping of snapshot id to chart point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotChart {
    pub owner: OwnerId,
    pub points: BTreeMap<SnapshotId, SnapshotView>,
}

impl SnapshotChart {
    pub fn from_snapshots<'a>(owner: OwnerId, snapshots: impl IntoIterator<Item = &'a Snapshot>) -> Self {
        let points = snapshots
            .into_iter()
            .filter(|s| s.owner == owner)
            .map(|s| (s.id, s.view()))
            .collect();
        Self { owner, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// points grouped by label, each series ordered by date
    pub fn series(&self) -> BTreeMap<String, Vec<(NaiveDate, Money)>> {
        let mut series: BTreeMap<String, Vec<(NaiveDate, Money)>> = BTreeMap::new();
        for point in self.points.values() {
            series
                .entry(point.label.clone())
                .or_default()
                .push((point.date, point.balance));
        }
        for points in series.values_mut() {
            points.sort();
        }
        series
    }

    /// chart points without their ids, sorted
    pub fn views(&self) -> Vec<SnapshotView> {
        let mut views: Vec<SnapshotView> = self.points.values().cloned().collect();
        views.sort();
        views
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.points)?)
    }
}
