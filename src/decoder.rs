//! Data line tokenizer and typed record decoder.
//!
//! A data line is `timestamp;discriminant;field;...`. Every line gets an
//! event index before filtering, so the chronological index always mirrors
//! raw line positions. Only lines of active kinds are coerced into records.

use crate::error::{Error, Location, Result};
use crate::event::EventKind;
use crate::models::{ChronologicalEvent, FieldValue, Record, Timestamp, UwbDistanceSample};
use crate::registry::{
    Column, ColumnType, EventKindRegistry, LINE_HEAD_WIDTH, UWB_TRIPLE_WIDTH,
};

/// Set of event kinds to materialize, as a table indexed by [`EventKind::slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveKinds {
    mask: [bool; EventKind::COUNT],
}

impl ActiveKinds {
    /// Every kind the registry has a schema for.
    pub fn all() -> Self {
        let registry = EventKindRegistry::global();
        let mut mask = [false; EventKind::COUNT];
        for kind in registry.supported_kinds() {
            mask[kind.slot()] = true;
        }
        Self { mask }
    }

    /// The requested kinds plus the structural kinds. Unsupported kinds are dropped.
    pub fn from_requested<I: IntoIterator<Item = EventKind>>(requested: I) -> Self {
        let registry = EventKindRegistry::global();
        let mut mask = [false; EventKind::COUNT];
        for kind in EventKind::STRUCTURAL.into_iter().chain(requested) {
            if registry.is_supported(kind) {
                mask[kind.slot()] = true;
            }
        }
        Self { mask }
    }

    /// Radio positioning kinds plus the structural kinds.
    pub fn radio() -> Self {
        Self::from_requested(EventKind::RADIO)
    }

    /// `None` selects every supported kind.
    pub fn from_option(requested: Option<&[EventKind]>) -> Self {
        match requested {
            Some(kinds) => Self::from_requested(kinds.iter().copied()),
            None => Self::all(),
        }
    }

    pub fn contains(&self, kind: EventKind) -> bool {
        self.mask[kind.slot()]
    }

    pub fn iter(&self) -> impl Iterator<Item = EventKind> + '_ {
        EventKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl Default for ActiveKinds {
    fn default() -> Self {
        Self::all()
    }
}

/// Where a line sits, for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'s> {
    pub line: usize,
    pub section: &'s str,
}

impl LineContext<'_> {
    fn location(&self) -> Location {
        Location {
            line: self.line,
            section: self.section.to_string(),
        }
    }
}

/// Outcome of decoding one data line.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLine {
    pub event: ChronologicalEvent,
    /// `None` when the kind is not active
    pub record: Option<Record>,
    /// Only set for active `DecawaveUwb` lines
    pub uwb_distances: Option<Vec<UwbDistanceSample>>,
}

pub struct RecordDecoder {
    registry: &'static EventKindRegistry,
    active: ActiveKinds,
}

impl RecordDecoder {
    pub fn new(active: ActiveKinds) -> Self {
        Self {
            registry: EventKindRegistry::global(),
            active,
        }
    }

    pub fn active_kinds(&self) -> &ActiveKinds {
        &self.active
    }

    /// Decode one non-blank, trimmed data line.
    pub fn decode(
        &self,
        line: &str,
        event_index: usize,
        ctx: &LineContext<'_>,
    ) -> Result<DecodedLine> {
        let tokens: Vec<&str> = line.split(';').collect();
        if tokens.len() < LINE_HEAD_WIDTH {
            return Err(Error::TruncatedLine {
                at: ctx.location(),
                expected: LINE_HEAD_WIDTH,
                found: tokens.len(),
            });
        }

        let timestamp: Timestamp = parse_head(tokens[0], "timestamp", ctx)?;
        let discriminant: i64 = parse_head(tokens[1], "discriminant", ctx)?;
        let kind = self
            .registry
            .kind_for_discriminant(discriminant)
            .ok_or_else(|| Error::UnrecognizedDiscriminant {
                at: ctx.location(),
                discriminant,
            })?;

        let event = ChronologicalEvent {
            event_index,
            timestamp,
            kind,
        };
        if !self.active.contains(kind) {
            return Ok(DecodedLine {
                event,
                record: None,
                uwb_distances: None,
            });
        }

        let schema = self.registry.schema_for(kind)?;
        let payload = &tokens[LINE_HEAD_WIDTH..];
        if payload.len() < schema.width() {
            return Err(Error::TruncatedLine {
                at: ctx.location(),
                expected: LINE_HEAD_WIDTH + schema.width(),
                found: tokens.len(),
            });
        }

        let fields = schema
            .columns()
            .iter()
            .zip(payload)
            .map(|(column, raw)| coerce(column, raw, kind, ctx))
            .collect::<Result<Vec<_>>>()?;

        let uwb_distances = if schema.has_uwb_tail() {
            Some(decode_uwb_tail(&payload[schema.width()..], event_index, ctx)?)
        } else {
            None
        };

        Ok(DecodedLine {
            event,
            record: Some(Record {
                event_index,
                timestamp,
                kind,
                fields,
            }),
            uwb_distances,
        })
    }
}

fn parse_head<T: std::str::FromStr>(
    raw: &str,
    column: &'static str,
    ctx: &LineContext<'_>,
) -> Result<T> {
    raw.trim().parse().map_err(|_| Error::InvalidLineHead {
        at: ctx.location(),
        column,
        raw: raw.to_string(),
    })
}

/// Convert one token according to its column tag.
fn coerce(column: &Column, raw: &str, kind: EventKind, ctx: &LineContext<'_>) -> Result<FieldValue> {
    let failed = || Error::FieldCoercion {
        at: ctx.location(),
        kind,
        field: column.name,
        raw: raw.to_string(),
    };
    let value = match column.ty {
        ColumnType::Float => FieldValue::Float(raw.trim().parse().map_err(|_| failed())?),
        ColumnType::String => FieldValue::Str(raw.to_string()),
        ColumnType::Int => FieldValue::Int(raw.trim().parse().map_err(|_| failed())?),
        ColumnType::Int8 => FieldValue::Int8(raw.trim().parse().map_err(|_| failed())?),
        ColumnType::Int16 => FieldValue::Int16(raw.trim().parse().map_err(|_| failed())?),
        // Any non-empty token is true
        ColumnType::Bool => FieldValue::Bool(!raw.is_empty()),
    };
    Ok(value)
}

/// Split the variable UWB tail into `(nodeId, distance, qualityFactor)` triples.
fn decode_uwb_tail(
    tail: &[&str],
    event_index: usize,
    ctx: &LineContext<'_>,
) -> Result<Vec<UwbDistanceSample>> {
    let remainder = tail.len() % UWB_TRIPLE_WIDTH;
    if remainder != 0 {
        return Err(Error::TruncatedUwbTail {
            at: ctx.location(),
            remainder,
        });
    }

    let field = |name: &'static str, raw: &str| Error::FieldCoercion {
        at: ctx.location(),
        kind: EventKind::DecawaveUwb,
        field: name,
        raw: raw.to_string(),
    };

    tail.chunks_exact(UWB_TRIPLE_WIDTH)
        .map(|triple| -> Result<UwbDistanceSample> {
            Ok(UwbDistanceSample {
                event_index,
                node_id: triple[0].trim().parse().map_err(|_| field("nodeId", triple[0]))?,
                distance_mm: triple[1].trim().parse().map_err(|_| field("distance", triple[1]))?,
                quality_factor: triple[2]
                    .trim()
                    .parse()
                    .map_err(|_| field("qualityFactor", triple[2]))?,
            })
        })
        .collect()
}
