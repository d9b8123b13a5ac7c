//! The closed set of event kinds found in sensor readout files.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Kind of a data line, identified by the integer discriminant at token 1.
///
/// Discriminants are not contiguous and include negative values for the
/// special non-sensor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EventKind {
    // Sensor events
    Accelerometer,
    Gravity,
    LinearAcceleration,
    Gyroscope,
    MagneticField,
    Pressure,
    Orientation,
    RotationMatrix,
    Wifi,
    Ble,
    RelativeHumidity,
    OrientationOld,
    RotationVector,
    Light,
    AmbientTemperature,
    HeartRate,
    Gps,
    WifiRtt,
    GameRotationVector,
    EddystoneUid,
    DecawaveUwb,
    StepDetector,
    HeadingChange,
    // Special events
    PedestrianActivity,
    GroundTruth,
    GroundTruthPath,
    FileMetadata,
    RecordingId,
}

impl EventKind {
    /// Number of kinds in the closed set.
    pub const COUNT: usize = 28;

    /// Every kind, in declaration order. `ALL[kind.slot()] == kind`.
    pub const ALL: [EventKind; EventKind::COUNT] = [
        EventKind::Accelerometer,
        EventKind::Gravity,
        EventKind::LinearAcceleration,
        EventKind::Gyroscope,
        EventKind::MagneticField,
        EventKind::Pressure,
        EventKind::Orientation,
        EventKind::RotationMatrix,
        EventKind::Wifi,
        EventKind::Ble,
        EventKind::RelativeHumidity,
        EventKind::OrientationOld,
        EventKind::RotationVector,
        EventKind::Light,
        EventKind::AmbientTemperature,
        EventKind::HeartRate,
        EventKind::Gps,
        EventKind::WifiRtt,
        EventKind::GameRotationVector,
        EventKind::EddystoneUid,
        EventKind::DecawaveUwb,
        EventKind::StepDetector,
        EventKind::HeadingChange,
        EventKind::PedestrianActivity,
        EventKind::GroundTruth,
        EventKind::GroundTruthPath,
        EventKind::FileMetadata,
        EventKind::RecordingId,
    ];

    /// Kinds read regardless of the caller's sensor selection.
    pub const STRUCTURAL: [EventKind; 4] = [
        EventKind::FileMetadata,
        EventKind::GroundTruthPath,
        EventKind::GroundTruth,
        EventKind::PedestrianActivity,
    ];

    /// Radio based positioning kinds.
    pub const RADIO: [EventKind; 4] = [
        EventKind::Wifi,
        EventKind::WifiRtt,
        EventKind::Ble,
        EventKind::DecawaveUwb,
    ];

    /// Resolve a raw discriminant. `None` for values outside the closed set.
    pub fn from_discriminant(value: i64) -> Option<EventKind> {
        let kind = match value {
            0 => EventKind::Accelerometer,
            1 => EventKind::Gravity,
            2 => EventKind::LinearAcceleration,
            3 => EventKind::Gyroscope,
            4 => EventKind::MagneticField,
            5 => EventKind::Pressure,
            6 => EventKind::Orientation,
            7 => EventKind::RotationMatrix,
            8 => EventKind::Wifi,
            9 => EventKind::Ble,
            10 => EventKind::RelativeHumidity,
            11 => EventKind::OrientationOld,
            12 => EventKind::RotationVector,
            13 => EventKind::Light,
            14 => EventKind::AmbientTemperature,
            15 => EventKind::HeartRate,
            16 => EventKind::Gps,
            17 => EventKind::WifiRtt,
            18 => EventKind::GameRotationVector,
            19 => EventKind::EddystoneUid,
            20 => EventKind::DecawaveUwb,
            21 => EventKind::StepDetector,
            22 => EventKind::HeadingChange,
            50 => EventKind::PedestrianActivity,
            99 => EventKind::GroundTruth,
            -1 => EventKind::GroundTruthPath,
            -2 => EventKind::FileMetadata,
            -3 => EventKind::RecordingId,
            _ => return None,
        };
        Some(kind)
    }

    /// The integer written at token 1 of a data line.
    pub fn discriminant(self) -> i64 {
        match self {
            EventKind::PedestrianActivity => 50,
            EventKind::GroundTruth => 99,
            EventKind::GroundTruthPath => -1,
            EventKind::FileMetadata => -2,
            EventKind::RecordingId => -3,
            sensor => sensor.slot() as i64,
        }
    }

    /// Dense index in `0..COUNT`, used for table lookups.
    pub fn slot(self) -> usize {
        self as usize
    }

    /// Stable snake_case name, used for CLI selection and output file names.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Accelerometer => "accelerometer",
            EventKind::Gravity => "gravity",
            EventKind::LinearAcceleration => "linear_acceleration",
            EventKind::Gyroscope => "gyroscope",
            EventKind::MagneticField => "magnetic_field",
            EventKind::Pressure => "pressure",
            EventKind::Orientation => "orientation",
            EventKind::RotationMatrix => "rotation_matrix",
            EventKind::Wifi => "wifi",
            EventKind::Ble => "ble",
            EventKind::RelativeHumidity => "relative_humidity",
            EventKind::OrientationOld => "orientation_old",
            EventKind::RotationVector => "rotation_vector",
            EventKind::Light => "light",
            EventKind::AmbientTemperature => "ambient_temperature",
            EventKind::HeartRate => "heart_rate",
            EventKind::Gps => "gps",
            EventKind::WifiRtt => "wifi_rtt",
            EventKind::GameRotationVector => "game_rotation_vector",
            EventKind::EddystoneUid => "eddystone_uid",
            EventKind::DecawaveUwb => "decawave_uwb",
            EventKind::StepDetector => "step_detector",
            EventKind::HeadingChange => "heading_change",
            EventKind::PedestrianActivity => "pedestrian_activity",
            EventKind::GroundTruth => "ground_truth",
            EventKind::GroundTruthPath => "ground_truth_path",
            EventKind::FileMetadata => "file_metadata",
            EventKind::RecordingId => "recording_id",
        }
    }

    pub fn is_structural(self) -> bool {
        EventKind::STRUCTURAL.contains(&self)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a kind name does not match any [`EventKind::name`].
#[derive(Debug, Clone, Error)]
#[error("unknown event kind name {0:?}")]
pub struct ParseEventKindError(pub String);

impl FromStr for EventKind {
    type Err = ParseEventKindError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EventKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| ParseEventKindError(s.to_string()))
    }
}

/// Activity label carried by `PedestrianActivity` events (`rawActivityId`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PedestrianActivity {
    Walking = 0,
    Standing = 1,
    StairsUp = 2,
    StairsDown = 3,
    ElevatorUp = 4,
    ElevatorDown = 5,
    MessAround = 6,
}

impl PedestrianActivity {
    pub fn from_id(id: i64) -> Option<PedestrianActivity> {
        Some(match id {
            0 => PedestrianActivity::Walking,
            1 => PedestrianActivity::Standing,
            2 => PedestrianActivity::StairsUp,
            3 => PedestrianActivity::StairsDown,
            4 => PedestrianActivity::ElevatorUp,
            5 => PedestrianActivity::ElevatorDown,
            6 => PedestrianActivity::MessAround,
            _ => return None,
        })
    }
}
