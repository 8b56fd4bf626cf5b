//! The fixed benchmark layout: which input rows belong to which proxy/protocol case.

use crate::table::{InputTable, RotatedRow, RotatedTable};
use crate::{RotateError, RotateResult};
use bytes::Bytes;

/// Request-size buckets measured per case, in input row order.
pub const BUCKETS: [&str; 4] = ["Tiny", "Small", "Medium", "Large"];
pub const BUCKETS_PER_GROUP: usize = BUCKETS.len();

/// Input column holding `Requests/sec`.
pub const REQUESTS_COLUMN: usize = 1;
/// Input column holding `Transfer 10K/sec`.
pub const TRANSFER_COLUMN: usize = 2;

/// One proxy/protocol combination and the first input row of its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group {
    pub name: &'static str,
    pub start: usize,
}

impl Group {
    const fn new(name: &'static str, start: usize) -> Self {
        Self { name, start }
    }

    pub fn rows(&self) -> std::ops::Range<usize> {
        self.start..self.start + BUCKETS_PER_GROUP
    }
}

pub const GROUPS: [Group; 8] = [
    Group::new("http-result-4c-monolake", 0),
    Group::new("http-result-4c-nginx", 4),
    Group::new("http-result-4c-traefik", 8),
    Group::new("http-result-4c-envoy", 12),
    Group::new("https-result-4c-monolake", 16),
    Group::new("https-result-4c-nginx", 20),
    Group::new("https-result-4c-traefik", 24),
    Group::new("https-result-4c-envoy", 28),
];

/// Number of data rows a complete results file carries.
pub const REQUIRED_ROWS: usize = GROUPS.len() * BUCKETS_PER_GROUP;

pub const OUTPUT_HEADER: [&str; 1 + 2 * BUCKETS_PER_GROUP] = [
    "Case",
    "Tiny Requests/sec",
    "Small Requests/sec",
    "Medium Requests/sec",
    "Large Requests/sec",
    "Tiny Transfer/sec",
    "Small Transfer/sec",
    "Medium Transfer/sec",
    "Large Transfer/sec",
];

/// Regroup the per-test-case rows into one row per case.
pub fn pivot(table: &InputTable) -> RotateResult<RotatedTable> {
    if table.len() < REQUIRED_ROWS {
        return Err(RotateError::TooFewRows {
            found: table.len(),
            required: REQUIRED_ROWS,
        });
    }

    let rows = GROUPS
        .iter()
        .map(|group| {
            let requests = gather(table, group, REQUESTS_COLUMN)?;
            let transfer = gather(table, group, TRANSFER_COLUMN)?;
            Ok(RotatedRow {
                case: group.name,
                requests,
                transfer,
            })
        })
        .collect::<RotateResult<Vec<_>>>()?;

    tracing::debug!(groups = rows.len(), "pivoted results");
    Ok(RotatedTable { rows })
}

fn gather(
    table: &InputTable,
    group: &Group,
    column: usize,
) -> RotateResult<[Bytes; BUCKETS_PER_GROUP]> {
    let mut values: [Bytes; BUCKETS_PER_GROUP] = Default::default();
    for (slot, row) in values.iter_mut().zip(group.rows()) {
        *slot = table.field(row, column)?;
    }
    Ok(values)
}
