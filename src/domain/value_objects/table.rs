use crate::domain::value_objects::payload::RecordPayload;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Bookkeeping fields that must never leave the process; stripped from every
/// outgoing row.
const LOCAL_ONLY_FIELDS: [&str; 5] = [
    "local_id",
    "remote_id",
    "sync_status",
    "created_at",
    "updated_at",
];

/// The closed set of logical tables the engine manages. Local and remote
/// vocabularies differ for some of them; the mapping lives here and is
/// applied symmetrically on push and pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalTable {
    Patients,
    Appointments,
    Prescriptions,
    Visits,
    Invoices,
}

impl LogicalTable {
    pub const ALL: [LogicalTable; 5] = [
        LogicalTable::Patients,
        LogicalTable::Appointments,
        LogicalTable::Prescriptions,
        LogicalTable::Visits,
        LogicalTable::Invoices,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalTable::Patients => "patients",
            LogicalTable::Appointments => "appointments",
            LogicalTable::Prescriptions => "prescriptions",
            LogicalTable::Visits => "visits",
            LogicalTable::Invoices => "invoices",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "patients" => Ok(LogicalTable::Patients),
            "appointments" => Ok(LogicalTable::Appointments),
            "prescriptions" => Ok(LogicalTable::Prescriptions),
            "visits" => Ok(LogicalTable::Visits),
            "invoices" => Ok(LogicalTable::Invoices),
            other => Err(format!("Unknown logical table: {other}")),
        }
    }

    /// Name of the corresponding table on the remote backend.
    pub fn remote_table(&self) -> &'static str {
        match self {
            LogicalTable::Visits => "antenatal_visits",
            LogicalTable::Invoices => "billing_entries",
            other => other.as_str(),
        }
    }

    /// Field renames as `(local, remote)` pairs. The visits table keys its
    /// rows by pregnancy on the remote side.
    fn field_renames(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            LogicalTable::Visits => &[("patient_id", "pregnancy_id")],
            _ => &[],
        }
    }

    /// Translate a payload into the remote vocabulary, dropping local-only
    /// bookkeeping fields.
    pub fn to_remote_row(&self, payload: &RecordPayload) -> Map<String, Value> {
        let mut row = Map::new();
        for (key, value) in payload.as_map() {
            if LOCAL_ONLY_FIELDS.contains(&key.as_str()) {
                continue;
            }
            row.insert(self.remote_field(key), value.clone());
        }
        row
    }

    /// Translate a remote row back into the local vocabulary.
    pub fn to_local_row(&self, row: Map<String, Value>) -> Map<String, Value> {
        let mut map = Map::new();
        for (key, value) in row {
            map.insert(self.local_field(&key), value);
        }
        map
    }

    fn remote_field(&self, local: &str) -> String {
        self.field_renames()
            .iter()
            .find(|(from, _)| *from == local)
            .map(|(_, to)| (*to).to_string())
            .unwrap_or_else(|| local.to_string())
    }

    fn local_field(&self, remote: &str) -> String {
        self.field_renames()
            .iter()
            .find(|(_, to)| *to == remote)
            .map(|(from, _)| (*from).to_string())
            .unwrap_or_else(|| remote.to_string())
    }
}

impl fmt::Display for LogicalTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
