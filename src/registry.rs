//! Static schema registry: one ordered column list per event kind.
//!
//! Column types are closed tags fixed at compile time, so the decoder only
//! switches on [`ColumnType`] per token and never re-classifies a column.

use crate::error::{Error, Result};
use crate::event::EventKind;

/// Semantic type of a schema column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Bool,
    Int8,
    Int16,
    Int,
    Float,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

const fn col(name: &'static str, ty: ColumnType) -> Column {
    Column { name, ty }
}

/// Columns every table starts with. They are synthesized by the decoder,
/// not read from the payload of a data line.
pub const SYNTHESIZED_COLUMNS: [Column; 2] = [
    col("eventIdx", ColumnType::Int),
    col("timestamp", ColumnType::Int),
];

/// Columns of the per-section UWB distance table.
pub const UWB_DISTANCE_COLUMNS: [Column; 4] = [
    col("eventIdx", ColumnType::Int),
    col("nodeId", ColumnType::Int16),
    col("distance", ColumnType::Int),
    col("qualityFactor", ColumnType::Int8),
];

/// Width of one UWB node measurement in the variable tail.
pub const UWB_TRIPLE_WIDTH: usize = 3;

/// Tokens before the payload: timestamp and discriminant.
pub const LINE_HEAD_WIDTH: usize = 2;

/// Ordered payload columns of one event kind.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    kind: EventKind,
    columns: &'static [Column],
}

impl Schema {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Payload columns, excluding the synthesized `eventIdx` and `timestamp`.
    pub fn columns(&self) -> &'static [Column] {
        self.columns
    }

    /// Number of fixed payload tokens consumed from a data line.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Whether trailing UWB node triples follow the fixed columns.
    pub fn has_uwb_tail(&self) -> bool {
        self.kind == EventKind::DecawaveUwb
    }

    /// Position of a payload column by name.
    pub fn position(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == field)
    }

    /// All column names including the synthesized ones, in table order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> {
        SYNTHESIZED_COLUMNS
            .iter()
            .chain(self.columns.iter())
            .map(|c| c.name)
    }
}

use ColumnType::{Bool, Float, Int, Int8, String as Str};

const XYZ: &[Column] = &[col("X", Float), col("Y", Float), col("Z", Float)];

const PRESSURE: &[Column] = &[col("pressureHpa", Float)];

const ORIENTATION: &[Column] = &[
    col("azimuth", Float),
    col("pitch", Float),
    col("roll", Float),
];

const WIFI: &[Column] = &[col("mac", Str), col("channelFreq", Int), col("rssi", Int)];

const BLE: &[Column] = &[col("mac", Str), col("rssi", Int), col("txPower", Int)];

const RELATIVE_HUMIDITY: &[Column] = &[col("relativeHumidity", Float)];

const ROTATION_VECTOR: &[Column] = &[
    col("X", Float),
    col("Y", Float),
    col("Z", Float),
    col("W", Float),
];

const LIGHT: &[Column] = &[col("light", Float)];

const AMBIENT_TEMPERATURE: &[Column] = &[col("ambientTemperature", Float)];

const HEART_RATE: &[Column] = &[col("heartRate", Float)];

const GPS: &[Column] = &[
    col("lat", Float),
    col("lon", Float),
    col("alt", Float),
    col("bearing", Float),
];

const WIFI_RTT: &[Column] = &[
    col("success", Bool),
    col("mac", Str),
    col("distInMM", Int),
    col("distInStdDevMM", Int),
    col("rssi", Int),
    col("numAttempted", Int),
    col("numSuccessful", Int),
];

const EDDYSTONE_UID: &[Column] = &[col("mac", Str), col("rssi", Int), col("uuid", Str)];

const DECAWAVE_UWB: &[Column] = &[
    col("X", Float),
    col("Y", Float),
    col("Z", Float),
    col("qualityFactor", Int8),
];

const STEP_DETECTOR: &[Column] = &[
    col("stepStartTs", Int),
    col("stepEndTs", Int),
    col("probability", Float),
];

const HEADING_CHANGE: &[Column] = &[col("headingChangeInRad", Float)];

const PEDESTRIAN_ACTIVITY: &[Column] = &[col("rawActivityName", Str), col("rawActivityId", Int)];

const GROUND_TRUTH: &[Column] = &[col("groundTruthId", Int)];

const GROUND_TRUTH_PATH: &[Column] = &[col("pathId", Int), col("groundTruthPointCnt", Int)];

const FILE_METADATA: &[Column] = &[col("date", Str), col("person", Str), col("comment", Str)];

const RECORDING_ID: &[Column] = &[col("recordingId", Str)];

const fn schema(kind: EventKind, columns: &'static [Column]) -> Option<Schema> {
    Some(Schema { kind, columns })
}

/// Lookup table from event kind to schema, indexed by [`EventKind::slot`].
pub struct EventKindRegistry {
    schemas: [Option<Schema>; EventKind::COUNT],
}

static REGISTRY: EventKindRegistry = EventKindRegistry {
    schemas: [
        schema(EventKind::Accelerometer, XYZ),
        schema(EventKind::Gravity, XYZ),
        schema(EventKind::LinearAcceleration, XYZ),
        schema(EventKind::Gyroscope, XYZ),
        schema(EventKind::MagneticField, XYZ),
        schema(EventKind::Pressure, PRESSURE),
        schema(EventKind::Orientation, ORIENTATION),
        // RotationMatrix is recognized but has no table
        None,
        schema(EventKind::Wifi, WIFI),
        schema(EventKind::Ble, BLE),
        schema(EventKind::RelativeHumidity, RELATIVE_HUMIDITY),
        schema(EventKind::OrientationOld, XYZ),
        schema(EventKind::RotationVector, ROTATION_VECTOR),
        schema(EventKind::Light, LIGHT),
        schema(EventKind::AmbientTemperature, AMBIENT_TEMPERATURE),
        schema(EventKind::HeartRate, HEART_RATE),
        schema(EventKind::Gps, GPS),
        schema(EventKind::WifiRtt, WIFI_RTT),
        schema(EventKind::GameRotationVector, XYZ),
        schema(EventKind::EddystoneUid, EDDYSTONE_UID),
        schema(EventKind::DecawaveUwb, DECAWAVE_UWB),
        schema(EventKind::StepDetector, STEP_DETECTOR),
        schema(EventKind::HeadingChange, HEADING_CHANGE),
        schema(EventKind::PedestrianActivity, PEDESTRIAN_ACTIVITY),
        schema(EventKind::GroundTruth, GROUND_TRUTH),
        schema(EventKind::GroundTruthPath, GROUND_TRUTH_PATH),
        schema(EventKind::FileMetadata, FILE_METADATA),
        schema(EventKind::RecordingId, RECORDING_ID),
    ],
};

impl EventKindRegistry {
    /// The process-wide registry. Immutable, safe for concurrent reads.
    pub fn global() -> &'static EventKindRegistry {
        &REGISTRY
    }

    pub fn schema_for(&self, kind: EventKind) -> Result<&Schema> {
        self.schemas[kind.slot()]
            .as_ref()
            .ok_or(Error::UnknownKind(kind))
    }

    pub fn is_supported(&self, kind: EventKind) -> bool {
        self.schemas[kind.slot()].is_some()
    }

    /// Kinds that have a schema, in declaration order.
    pub fn supported_kinds(&self) -> impl Iterator<Item = EventKind> + '_ {
        EventKind::ALL
            .into_iter()
            .filter(move |kind| self.is_supported(*kind))
    }

    pub fn kind_for_discriminant(&self, value: i64) -> Option<EventKind> {
        EventKind::from_discriminant(value)
    }
}
