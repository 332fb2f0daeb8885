use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::aggregate::record::ValidatedRecord;

/// Running totals for one user. The three sequences are parallel: index `i`
/// of each refers to the same source record.
///
/// `total_count` is wider than a single record's count so that summing any
/// number of valid counts cannot overflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccumulator {
    pub activities: Vec<String>,
    pub total_count: u128,
    pub timestamps: Vec<String>,
    pub ip_addresses: Vec<String>,
}

impl UserAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, record: ValidatedRecord) {
        self.timestamps.push(record.timestamp_string());
        self.activities.push(record.activity);
        self.total_count += u128::from(record.count);
        self.ip_addresses.push(record.ip_address);
    }

    /// Appends `other`'s entries after this accumulator's own.
    pub fn extend(&mut self, other: UserAccumulator) {
        self.activities.extend(other.activities);
        self.total_count += other.total_count;
        self.timestamps.extend(other.timestamps);
        self.ip_addresses.extend(other.ip_addresses);
    }

    /// Number of records folded in.
    pub fn record_count(&self) -> usize {
        self.activities.len()
    }

    pub fn is_consistent(&self) -> bool {
        self.activities.len() == self.timestamps.len()
            && self.activities.len() == self.ip_addresses.len()
    }
}

/// Per-user accumulators keyed by user ID.
///
/// Serializes with keys in ascending order so output is reproducible; the
/// order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct GlobalAccumulator {
    users: HashMap<String, UserAccumulator>,
}

impl GlobalAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, user_id: &str) -> &mut UserAccumulator {
        self.users.entry(user_id.to_string()).or_default()
    }

    pub fn fold(&mut self, record: ValidatedRecord) {
        self.get_or_create(&record.user_id).fold(record);
    }

    /// Merges a later batch into this one, preserving input order per user.
    pub fn merge(&mut self, batch: GlobalAccumulator) {
        for (user_id, acc) in batch.users {
            match self.users.get_mut(&user_id) {
                Some(existing) => existing.extend(acc),
                None => {
                    self.users.insert(user_id, acc);
                }
            }
        }
    }

    pub fn get(&self, user_id: &str) -> Option<&UserAccumulator> {
        self.users.get(user_id)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &UserAccumulator)> {
        self.users.iter()
    }

    /// Entries ordered by user ID.
    pub fn sorted(&self) -> Vec<(&String, &UserAccumulator)> {
        let mut entries: Vec<_> = self.users.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn total_records(&self) -> usize {
        self.users.values().map(UserAccumulator::record_count).sum()
    }

    pub fn total_count(&self) -> u128 {
        self.users.values().map(|acc| acc.total_count).sum()
    }
}

impl Serialize for GlobalAccumulator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.sorted();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (user_id, acc) in entries {
            map.serialize_entry(user_id, acc)?;
        }
        map.end()
    }
}
