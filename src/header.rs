//! Fingerprint section headers.
//!
//! A header is a tag line followed by `key=value` lines and a blank line:
//!
//! ```text
//! [fingerprint:path]
//! name=Corridor
//! floorIdxs[]=1
//! floorIdxs[0]=2
//! floorNames[]=1
//! floorNames[0]=OG2
//! positions[]=2
//! positions[0]=(1;2;0)
//! positions[1]=(4;2;0)
//!
//! ```
//!
//! All pairs are collected first, then every `key[]=N` declaration is folded
//! together with `key[0]` .. `key[N-1]` into one array value under `key`.
//! Line order inside the header therefore does not matter.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::cursor::LineCursor;
use crate::error::{Error, Result};
use crate::models::Vec3;

/// Value of a header key after array folding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Scalar(String),
    Array(Vec<String>),
}

/// Folded header parameters, including keys without a typed meaning.
pub type HeaderParams = BTreeMap<String, HeaderValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintType {
    Point,
    Path,
}

impl FingerprintType {
    pub fn from_tag(line: &str) -> Option<FingerprintType> {
        match line {
            "[fingerprint:point]" => Some(FingerprintType::Point),
            "[fingerprint:path]" => Some(FingerprintType::Path),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            FingerprintType::Point => "[fingerprint:point]",
            FingerprintType::Path => "[fingerprint:path]",
        }
    }
}

/// A labeled measurement location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointFingerprint {
    pub name: String,
    /// `-1` when the header has no `floorIdx`
    pub floor_idx: i64,
    pub floor_name: Option<String>,
    pub position: Option<Vec3>,
    pub parameters: HeaderParams,
}

/// A labeled path, possibly spanning several floors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathFingerprint {
    pub name: String,
    pub floor_idxs: Vec<i64>,
    pub floor_names: Vec<String>,
    pub points: Option<Vec<String>>,
    pub positions: Vec<Vec3>,
    pub parameters: HeaderParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fingerprint {
    Point(PointFingerprint),
    Path(PathFingerprint),
}

impl Fingerprint {
    pub fn name(&self) -> &str {
        match self {
            Fingerprint::Point(fp) => &fp.name,
            Fingerprint::Path(fp) => &fp.name,
        }
    }

    pub fn fingerprint_type(&self) -> FingerprintType {
        match self {
            Fingerprint::Point(_) => FingerprintType::Point,
            Fingerprint::Path(_) => FingerprintType::Path,
        }
    }

    /// All folded header parameters, typed keys included.
    pub fn parameters(&self) -> &HeaderParams {
        match self {
            Fingerprint::Point(fp) => &fp.parameters,
            Fingerprint::Path(fp) => &fp.parameters,
        }
    }

    /// Floor index and name identifying the fingerprint; a path uses its first floor.
    pub fn primary_floor(&self) -> Option<(i64, Option<&str>)> {
        match self {
            Fingerprint::Point(fp) => Some((fp.floor_idx, fp.floor_name.as_deref())),
            Fingerprint::Path(fp) => fp
                .floor_idxs
                .first()
                .map(|idx| (*idx, fp.floor_names.first().map(String::as_str))),
        }
    }

    /// Build the typed fingerprint from folded parameters.
    ///
    /// `line` is the tag line number, reported with missing or mistyped keys.
    pub fn from_params(
        fp_type: FingerprintType,
        parameters: HeaderParams,
        line: usize,
    ) -> Result<Fingerprint> {
        let fields = Fields {
            params: &parameters,
            line,
        };
        let name = fields.required_scalar("name")?.to_string();

        let fingerprint = match fp_type {
            FingerprintType::Point => {
                let floor_idx = match fields.scalar("floorIdx")? {
                    Some(raw) => fields.int("floorIdx", raw)?,
                    None => -1,
                };
                let floor_name = fields.scalar("floorName")?.map(str::to_string);
                let position = fields
                    .scalar("position")?
                    .map(|raw| parse_vec3("position", raw, line))
                    .transpose()?;
                Fingerprint::Point(PointFingerprint {
                    name,
                    floor_idx,
                    floor_name,
                    position,
                    parameters: HeaderParams::new(),
                })
            }
            FingerprintType::Path => {
                let positions = fields
                    .required_array("positions")?
                    .iter()
                    .map(|raw| parse_vec3("positions", raw, line))
                    .collect::<Result<Vec<_>>>()?;
                let floor_idxs = fields
                    .required_array("floorIdxs")?
                    .iter()
                    .map(|raw| fields.int("floorIdxs", raw))
                    .collect::<Result<Vec<_>>>()?;
                let floor_names = fields.required_array("floorNames")?.to_vec();
                if floor_idxs.len() != floor_names.len() {
                    return Err(fields.malformed(format!(
                        "floorIdxs has {} entries but floorNames has {}",
                        floor_idxs.len(),
                        floor_names.len()
                    )));
                }
                let points = fields.array("points")?.map(<[String]>::to_vec);
                Fingerprint::Path(PathFingerprint {
                    name,
                    floor_idxs,
                    floor_names,
                    points,
                    positions,
                    parameters: HeaderParams::new(),
                })
            }
        };

        Ok(fingerprint.with_parameters(parameters))
    }

    fn with_parameters(mut self, parameters: HeaderParams) -> Self {
        match &mut self {
            Fingerprint::Point(fp) => fp.parameters = parameters,
            Fingerprint::Path(fp) => fp.parameters = parameters,
        }
        self
    }
}

/// Typed access to folded parameters while building a fingerprint.
struct Fields<'p> {
    params: &'p HeaderParams,
    line: usize,
}

impl<'p> Fields<'p> {
    fn malformed(&self, reason: String) -> Error {
        Error::MalformedHeader {
            line: self.line,
            reason,
        }
    }

    fn scalar(&self, key: &str) -> Result<Option<&'p str>> {
        match self.params.get(key) {
            None => Ok(None),
            Some(HeaderValue::Scalar(value)) => Ok(Some(value)),
            Some(HeaderValue::Array(_)) => {
                Err(self.malformed(format!("key {:?} must not be an array", key)))
            }
        }
    }

    fn required_scalar(&self, key: &str) -> Result<&'p str> {
        self.scalar(key)?
            .ok_or_else(|| self.malformed(format!("missing required key {:?}", key)))
    }

    fn array(&self, key: &str) -> Result<Option<&'p [String]>> {
        match self.params.get(key) {
            None => Ok(None),
            Some(HeaderValue::Array(items)) => Ok(Some(items)),
            Some(HeaderValue::Scalar(_)) => Err(self.malformed(format!(
                "key {:?} must be declared as an array ({}[]=N)",
                key, key
            ))),
        }
    }

    fn required_array(&self, key: &str) -> Result<&'p [String]> {
        self.array(key)?
            .ok_or_else(|| self.malformed(format!("missing required array {:?}", key)))
    }

    fn int(&self, key: &str, raw: &str) -> Result<i64> {
        raw.trim()
            .parse()
            .map_err(|_| self.malformed(format!("{:?} is not an integer for key {:?}", raw, key)))
    }
}

/// Parse a header starting at a line beginning with `[`, including its
/// terminating blank line.
pub fn parse_header(cursor: &mut LineCursor<'_>) -> Result<Fingerprint> {
    let tag_line = cursor
        .next_line()
        .ok_or(Error::MissingBlankLine {
            line: cursor.line_number(),
        })?
        .trim();
    let tag_line_number = cursor.line_number();
    let fp_type = FingerprintType::from_tag(tag_line).ok_or_else(|| Error::MalformedHeader {
        line: tag_line_number,
        reason: format!("unknown fingerprint header {:?}", tag_line),
    })?;

    let mut flat = BTreeMap::new();
    loop {
        let line = cursor.next_line().ok_or(Error::MissingBlankLine {
            line: cursor.line_number(),
        })?;
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| Error::MalformedHeader {
            line: cursor.line_number(),
            reason: format!("missing key/value separator '=' in {:?}", line),
        })?;
        flat.insert(key.to_string(), value.to_string());
    }

    let parameters = fold_arrays(flat).map_err(|reason| Error::MalformedHeader {
        line: tag_line_number,
        reason,
    })?;
    Fingerprint::from_params(fp_type, parameters, tag_line_number)
}

/// Fold `key[]=N` declarations and their `key[i]` entries into array values.
///
/// Declarations and consumed entries are removed; the array shadows any
/// scalar stored under the bare key.
pub fn fold_arrays(
    mut flat: BTreeMap<String, String>,
) -> std::result::Result<HeaderParams, String> {
    let declared: Vec<String> = flat
        .keys()
        .filter_map(|key| key.strip_suffix("[]"))
        .map(str::to_string)
        .collect();

    let mut arrays = Vec::with_capacity(declared.len());
    for base in declared {
        let len_raw = flat.remove(&format!("{}[]", base)).unwrap_or_default();
        let len: usize = len_raw
            .trim()
            .parse()
            .map_err(|_| format!("invalid length {:?} for array {:?}", len_raw, base))?;
        let mut items = Vec::new();
        for i in 0..len {
            let key = format!("{}[{}]", base, i);
            let item = flat.remove(&key).ok_or_else(|| {
                format!("missing entry {:?} of array {:?} with length {}", key, base, len)
            })?;
            items.push(item);
        }
        arrays.push((base, items));
    }

    let mut params: HeaderParams = flat
        .into_iter()
        .map(|(key, value)| (key, HeaderValue::Scalar(value)))
        .collect();
    params.extend(
        arrays
            .into_iter()
            .map(|(base, items)| (base, HeaderValue::Array(items))),
    );
    Ok(params)
}

/// Parse a `(x;y;z)` literal. `line` is the header tag line, reported on failure.
pub fn parse_vec3(key: &str, raw: &str, line: usize) -> Result<Vec3> {
    let malformed = || Error::MalformedVector {
        line,
        key: key.to_string(),
        raw: raw.to_string(),
    };
    let inner = raw
        .trim()
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(malformed)?;

    let mut parts = inner.split(';');
    let mut coords = [0.0f64; 3];
    for coord in coords.iter_mut() {
        *coord = parts
            .next()
            .and_then(|part| part.trim().parse().ok())
            .ok_or_else(malformed)?;
    }
    if parts.next().is_some() {
        return Err(malformed());
    }
    Ok(Vec3::new(coords[0], coords[1], coords[2]))
}

pub fn format_vec3(v: &Vec3) -> String {
    format!("({};{};{})", v.x, v.y, v.z)
}
