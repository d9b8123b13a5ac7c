use serde::Serialize;
use std::collections::BTreeMap;

use crate::event::{EventKind, PedestrianActivity};
use crate::header::Fingerprint;
use crate::registry::EventKindRegistry;

/// Nanosecond-resolution timestamp written at token 0 of a data line.
pub type Timestamp = u64;

/// A single coerced field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int(i64),
    Float(f64),
    Str(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Any of the integer variants, widened.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int8(v) => Some(i64::from(*v)),
            FieldValue::Int16(v) => Some(i64::from(*v)),
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

/// One decoded event. `fields` follows the payload columns of its kind's schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub event_index: usize,
    pub timestamp: Timestamp,
    pub kind: EventKind,
    pub fields: Vec<FieldValue>,
}

impl Record {
    /// Look up a payload field by its column name.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        let schema = EventKindRegistry::global().schema_for(self.kind).ok()?;
        self.fields.get(schema.position(field)?)
    }

    /// Activity of a `PedestrianActivity` record, from its `rawActivityId`.
    pub fn pedestrian_activity(&self) -> Option<PedestrianActivity> {
        if self.kind != EventKind::PedestrianActivity {
            return None;
        }
        PedestrianActivity::from_id(self.get("rawActivityId")?.as_i64()?)
    }
}

/// One anchor measurement from the variable tail of a `DecawaveUwb` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UwbDistanceSample {
    pub event_index: usize,
    pub node_id: i16,
    pub distance_mm: i64,
    pub quality_factor: i8,
}

/// Row of the chronological index: every data line of a section, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChronologicalEvent {
    pub event_index: usize,
    pub timestamp: Timestamp,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Everything decoded from one section of a readout document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionResult {
    pub fingerprint: Option<Fingerprint>,
    pub events: Vec<ChronologicalEvent>,
    /// Only kinds that were both present and active.
    pub records: BTreeMap<EventKind, Vec<Record>>,
    pub uwb_distances: Vec<UwbDistanceSample>,
}

impl SectionResult {
    pub fn new(fingerprint: Option<Fingerprint>) -> Self {
        Self {
            fingerprint,
            ..Self::default()
        }
    }

    /// Records of one kind, empty if none were materialized.
    pub fn records(&self, kind: EventKind) -> &[Record] {
        self.records.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_data_for(&self, kind: EventKind) -> bool {
        !self.records(kind).is_empty()
    }

    /// Total number of materialized records across all kinds.
    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    /// UWB distance samples belonging to one event.
    pub fn uwb_distances_for(&self, event_index: usize) -> impl Iterator<Item = &UwbDistanceSample> {
        self.uwb_distances
            .iter()
            .filter(move |d| d.event_index == event_index)
    }

    pub fn accel(&self) -> &[Record] {
        self.records(EventKind::Accelerometer)
    }

    pub fn gyro(&self) -> &[Record] {
        self.records(EventKind::Gyroscope)
    }

    pub fn magnetic(&self) -> &[Record] {
        self.records(EventKind::MagneticField)
    }

    pub fn wifi(&self) -> &[Record] {
        self.records(EventKind::Wifi)
    }

    pub fn wifi_rtt(&self) -> &[Record] {
        self.records(EventKind::WifiRtt)
    }

    pub fn ble(&self) -> &[Record] {
        self.records(EventKind::Ble)
    }

    pub fn uwb(&self) -> &[Record] {
        self.records(EventKind::DecawaveUwb)
    }

    pub fn ground_truth(&self) -> &[Record] {
        self.records(EventKind::GroundTruth)
    }

    /// The first `FileMetadata` record, if the section has one.
    pub fn file_metadata(&self) -> Option<&Record> {
        self.records(EventKind::FileMetadata).first()
    }
}

/// Result of parsing a whole document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParseResult {
    /// The document held exactly one section without a fingerprint header.
    Single(SectionResult),
    /// Sections keyed by fingerprint name (empty key for an anonymous one).
    Named(BTreeMap<String, SectionResult>),
}

impl ParseResult {
    pub fn as_single(&self) -> Option<&SectionResult> {
        match self {
            ParseResult::Single(section) => Some(section),
            ParseResult::Named(_) => None,
        }
    }

    pub fn into_single(self) -> Option<SectionResult> {
        match self {
            ParseResult::Single(section) => Some(section),
            ParseResult::Named(_) => None,
        }
    }

    pub fn section(&self, name: &str) -> Option<&SectionResult> {
        match self {
            ParseResult::Single(section) if name.is_empty() => Some(section),
            ParseResult::Single(_) => None,
            ParseResult::Named(sections) => sections.get(name),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ParseResult::Single(_) => 1,
            ParseResult::Named(sections) => sections.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(key, section)` pairs; the key of a single anonymous section is empty.
    pub fn sections(&self) -> Vec<(&str, &SectionResult)> {
        match self {
            ParseResult::Single(section) => vec![("", section)],
            ParseResult::Named(sections) => sections
                .iter()
                .map(|(name, section)| (name.as_str(), section))
                .collect(),
        }
    }
}
