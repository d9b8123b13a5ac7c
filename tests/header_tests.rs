mod common;

use common::ReadoutBuilder;
use sensor_readout_parser::{
    Error, Fingerprint, FingerprintType, HeaderValue, ParseResult, SensorReadoutReaderBuilder,
    Vec3,
};

fn parse(text: &str) -> sensor_readout_parser::Result<ParseResult> {
    SensorReadoutReaderBuilder::new().parse_str(text)
}

fn fingerprint_of(result: &ParseResult, name: &str) -> Fingerprint {
    result
        .section(name)
        .and_then(|s| s.fingerprint.clone())
        .expect("section with fingerprint")
}

// ============================================================================
// POINT FINGERPRINTS
// ============================================================================

#[test]
fn test_point_fingerprint_typed_fields() {
    let text = ReadoutBuilder::new()
        .point_header(
            "FP 053",
            &[
                ("floorIdx", "2"),
                ("floorName", "second"),
                ("position", "(1.5;-2;0.25)"),
            ],
        )
        .accel(1, 0.0, 0.0, 9.81)
        .end_section()
        .build();

    let fp = fingerprint_of(&parse(&text).unwrap(), "FP 053");
    assert_eq!(fp.fingerprint_type(), FingerprintType::Point);
    assert_eq!(fp.primary_floor(), Some((2, Some("second"))));
    match fp {
        Fingerprint::Point(point) => {
            assert_eq!(point.floor_idx, 2);
            assert_eq!(point.floor_name.as_deref(), Some("second"));
            assert_eq!(point.position, Some(Vec3::new(1.5, -2.0, 0.25)));
        }
        other => panic!("expected point, got {:?}", other),
    }
}

#[test]
fn test_point_fingerprint_defaults() {
    let result = parse("[fingerprint:point]\nname=bare\n\n1;13;2\n").unwrap();
    match fingerprint_of(&result, "bare") {
        Fingerprint::Point(point) => {
            assert_eq!(point.floor_idx, -1);
            assert!(point.floor_name.is_none());
            assert!(point.position.is_none());
        }
        other => panic!("expected point, got {:?}", other),
    }
}

#[test]
fn test_value_split_at_first_equals() {
    let result = parse("[fingerprint:point]\nname=a=b\nnote=x=1;y=2\n\n").unwrap();
    let fp = fingerprint_of(&result, "a=b");
    assert_eq!(
        fp.parameters().get("note"),
        Some(&HeaderValue::Scalar("x=1;y=2".to_string()))
    );
}

#[test]
fn test_extra_parameters_preserved() {
    let text = ReadoutBuilder::new()
        .point_header("A", &[("device", "Pixel 7"), ("operator", "jd")])
        .build();
    let fp = fingerprint_of(&parse(&text).unwrap(), "A");
    let params = fp.parameters();
    assert_eq!(params.get("device"), Some(&HeaderValue::Scalar("Pixel 7".into())));
    assert_eq!(params.get("operator"), Some(&HeaderValue::Scalar("jd".into())));
    assert_eq!(params.get("name"), Some(&HeaderValue::Scalar("A".into())));
}

// ============================================================================
// PATH FINGERPRINTS AND ARRAYS
// ============================================================================

const PATH_HEADER: &str = "[fingerprint:path]
name=corridor
positions[]=2
positions[0]=(0;0;0)
positions[1]=(10;0;0)
floorIdxs[]=2
floorIdxs[0]=0
floorIdxs[1]=1
floorNames[]=2
floorNames[0]=ground
floorNames[1]=first
points[]=2
points[0]=P1
points[1]=P2

";

#[test]
fn test_path_fingerprint_arrays() {
    let text = format!("{}100;8;aa:bb;2412;-60\n\n", PATH_HEADER);
    let result = parse(&text).unwrap();
    let section = result.section("corridor").unwrap();
    assert_eq!(section.wifi().len(), 1);

    let fp = section.fingerprint.clone().unwrap();
    assert_eq!(fp.primary_floor(), Some((0, Some("ground"))));
    match fp {
        Fingerprint::Path(path) => {
            assert_eq!(path.positions, vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0)]);
            assert_eq!(path.floor_idxs, vec![0, 1]);
            assert_eq!(path.floor_names, vec!["ground".to_string(), "first".to_string()]);
            assert_eq!(path.points, Some(vec!["P1".to_string(), "P2".to_string()]));
            // Array entries are folded away
            assert!(path.parameters.keys().all(|key| !key.contains('[')));
            assert_eq!(
                path.parameters.get("points"),
                Some(&HeaderValue::Array(vec!["P1".into(), "P2".into()]))
            );
        }
        other => panic!("expected path, got {:?}", other),
    }
}

#[test]
fn test_array_entries_before_declaration() {
    let text = "[fingerprint:path]
floorNames[0]=ground
positions[0]=(1;2;3)
floorIdxs[0]=4
name=reversed
floorNames[]=1
positions[]=1
floorIdxs[]=1

";
    let result = parse(text).unwrap();
    match fingerprint_of(&result, "reversed") {
        Fingerprint::Path(path) => {
            assert_eq!(path.positions, vec![Vec3::new(1.0, 2.0, 3.0)]);
            assert_eq!(path.floor_idxs, vec![4]);
            assert_eq!(path.floor_names, vec!["ground".to_string()]);
            assert!(path.points.is_none());
        }
        other => panic!("expected path, got {:?}", other),
    }
}

#[test]
fn test_array_declaration_with_missing_entry() {
    let text = "[fingerprint:path]
name=gap
positions[]=2
positions[0]=(0;0;0)
floorIdxs[]=0
floorNames[]=0

";
    match parse(text).unwrap_err() {
        Error::MalformedHeader { line, reason } => {
            assert_eq!(line, 1);
            assert!(reason.contains("positions[1]"), "reason: {}", reason);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_path_requires_positions() {
    let text = ReadoutBuilder::new()
        .path_header("nopos", &[("floorIdxs[]", "0"), ("floorNames[]", "0")])
        .build();
    assert!(matches!(
        parse(&text).unwrap_err(),
        Error::MalformedHeader { .. }
    ));
}

#[test]
fn test_path_floor_lengths_must_match() {
    let text = ReadoutBuilder::new()
        .path_header(
            "uneven",
            &[
                ("positions[]", "1"),
                ("positions[0]", "(0;0;0)"),
                ("floorIdxs[]", "2"),
                ("floorIdxs[0]", "0"),
                ("floorIdxs[1]", "1"),
                ("floorNames[]", "1"),
                ("floorNames[0]", "ground"),
            ],
        )
        .build();
    match parse(&text).unwrap_err() {
        Error::MalformedHeader { reason, .. } => assert!(reason.contains("floorNames")),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_oversized_array_length_is_rejected() {
    let text = ReadoutBuilder::new()
        .path_header("huge", &[("positions[]", "18446744073709551615")])
        .accel(1, 1.0, 2.0, 3.0)
        .end_section()
        .build();
    match parse(&text).unwrap_err() {
        Error::MalformedHeader { line, reason } => {
            assert_eq!(line, 1);
            assert!(reason.contains("positions[0]"), "reason: {}", reason);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_malformed_path_position_reports_header_line() {
    let text = ReadoutBuilder::new()
        .accel(1, 0.0, 0.0, 0.0)
        .end_section()
        .path_header(
            "bent",
            &[
                ("positions[]", "1"),
                ("positions[0]", "(0;0)"),
                ("floorIdxs[]", "0"),
                ("floorNames[]", "0"),
            ],
        )
        .build();
    match parse(&text).unwrap_err() {
        Error::MalformedVector { line, key, .. } => {
            assert_eq!(line, 3);
            assert_eq!(key, "positions");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_bad_array_length() {
    let text = ReadoutBuilder::new()
        .path_header("x", &[("positions[]", "many")])
        .build();
    assert!(matches!(
        parse(&text).unwrap_err(),
        Error::MalformedHeader { .. }
    ));
}

// ============================================================================
// MALFORMED HEADERS
// ============================================================================

#[test]
fn test_unknown_header_tag() {
    match parse("[fingerprint:area]\nname=x\n\n").unwrap_err() {
        Error::MalformedHeader { line, .. } => assert_eq!(line, 1),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_header_line_without_equals() {
    match parse("[fingerprint:point]\nname=x\njust words\n\n").unwrap_err() {
        Error::MalformedHeader { line, reason } => {
            assert_eq!(line, 3);
            assert!(reason.contains("just words"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_missing_name() {
    assert!(matches!(
        parse("[fingerprint:point]\nfloorIdx=1\n\n").unwrap_err(),
        Error::MalformedHeader { .. }
    ));
}

#[test]
fn test_header_reaches_eof() {
    match parse("1;13;1\n\n[fingerprint:point]\nname=late").unwrap_err() {
        Error::MissingBlankLine { line } => assert_eq!(line, 4),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_malformed_position_vector() {
    for raw in ["1;2;3", "(1;2)", "(1;2;3;4)", "(a;b;c)", "(1;2;3"] {
        let text = ReadoutBuilder::new()
            .point_header("v", &[("position", raw)])
            .build();
        match parse(&text).unwrap_err() {
            Error::MalformedVector { line, key, raw: got } => {
                assert_eq!(line, 1);
                assert_eq!(key, "position");
                assert_eq!(got, raw);
            }
            other => panic!("unexpected error for {:?}: {:?}", raw, other),
        }
    }
}

#[test]
fn test_non_integer_floor_idx() {
    let text = ReadoutBuilder::new()
        .point_header("f", &[("floorIdx", "ground")])
        .build();
    assert!(matches!(
        parse(&text).unwrap_err(),
        Error::MalformedHeader { .. }
    ));
}
