use std::collections::HashMap;

use super::record::{NetworkRecord, RequestId};

/// Read-only RequestId lookup over one run's finalized records.
#[derive(Debug, Clone, Default)]
pub struct NetworkRecordIndex {
    records: HashMap<RequestId, NetworkRecord>,
}

impl NetworkRecordIndex {
    /// Single pass; a later record with a repeated id replaces the earlier one.
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a NetworkRecord>,
    {
        let mut map = HashMap::new();
        for record in records {
            map.insert(record.request_id.clone(), record.clone());
        }
        Self { records: map }
    }

    /// Absent means the request never completed or was never observed. Not an error.
    pub fn lookup(&self, request_id: &RequestId) -> Option<&NetworkRecord> {
        self.records.get(request_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
