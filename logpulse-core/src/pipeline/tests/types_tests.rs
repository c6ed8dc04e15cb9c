use crate::pipeline::failure::FailureCause;
use crate::pipeline::parse::decode_line;
use crate::pipeline::types::{AttrError, AttrValue, HealthSummary, Level, RawLine};

use pretty_assertions::assert_eq;

fn raw(text: &str) -> RawLine {
    RawLine {
        line_no: 1,
        text: text.to_string(),
    }
}

#[test]
fn decodes_wire_schema() {
    // Arrange
    let line = raw(
        r#"{"time":"2024-01-01T00:00:00Z","level":"INFO","msg":"http request","details":{"status":500,"method":"GET"}}"#,
    );

    // Act
    let record = decode_line(&line).unwrap();

    // Assert
    assert_eq!(record.level, Level::Info);
    assert_eq!(record.message, "http request");
    assert_eq!(record.timestamp.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    assert_eq!(record.attr("status"), Some(&AttrValue::from(500_i64)));
    assert_eq!(record.attr("method"), Some(&AttrValue::from("GET")));
}

#[test]
fn level_matching_is_case_sensitive() {
    // Arrange
    let line = raw(r#"{"time":"2024-01-01T00:00:00Z","level":"warn","msg":"x","details":{}}"#);

    // Act
    let record = decode_line(&line).unwrap();

    // Assert
    assert_eq!(record.level, Level::Other("warn".to_string()));
    assert_eq!(record.level.to_string(), "warn");
}

#[test]
fn missing_details_decode_as_empty_map() {
    // Arrange
    let line = raw(r#"{"time":"2024-01-01T00:00:00Z","level":"ERROR","msg":"boom"}"#);

    // Act
    let record = decode_line(&line).unwrap();

    // Assert
    assert!(record.attributes.is_empty());
}

#[test]
fn offset_timestamps_are_preserved() {
    // Arrange
    let line = raw(r#"{"time":"2024-06-01T12:30:00.123+02:00","level":"DEBUG","msg":"x"}"#);

    // Act
    let record = decode_line(&line).unwrap();

    // Assert
    assert_eq!(
        record.timestamp.to_rfc3339(),
        "2024-06-01T12:30:00.123+02:00"
    );
}

#[test]
fn every_json_value_kind_decodes_into_attributes() {
    // Arrange
    let line = raw(
        r#"{"time":"2024-01-01T00:00:00Z","level":"INFO","msg":"x","details":{"s":"a","n":1.5,"b":true,"z":null,"l":[1,"two"],"m":{"inner":{"deep":7}}}}"#,
    );

    // Act
    let record = decode_line(&line).unwrap();

    // Assert
    let kinds: Vec<(&str, &str)> = record
        .attributes
        .iter()
        .map(|(k, v)| (k.as_str(), v.kind()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("b", "bool"),
            ("l", "list"),
            ("m", "map"),
            ("n", "number"),
            ("s", "string"),
            ("z", "null"),
        ]
    );

    let deep = record
        .attr("m")
        .and_then(|m| m.get("inner"))
        .and_then(|inner| inner.get("deep"))
        .map(AttrValue::as_f64);
    assert_eq!(deep, Some(Ok(7.0)));
}

#[test]
fn schema_violations_are_decode_failures() {
    let cases = [
        "not json at all",
        r#"{"level":"INFO","msg":"no time"}"#,
        r#"{"time":"yesterday","level":"INFO","msg":"bad time"}"#,
        r#"{"time":"2024-01-01T00:00:00Z","level":3,"msg":"numeric level"}"#,
        r#"{"time":"2024-01-01T00:00:00Z","level":"INFO"}"#,
        r#"{"time":"2024-01-01T00:00:00Z","level":"INFO","msg":"x","details":[1,2]}"#,
    ];

    for (i, text) in cases.iter().enumerate() {
        let line = RawLine {
            line_no: i as u64 + 10,
            text: text.to_string(),
        };

        match decode_line(&line) {
            Err(FailureCause::Decode { line_no, line, .. }) => {
                assert_eq!(line_no, i as u64 + 10);
                assert_eq!(line, *text);
            }
            other => panic!("expected decode failure for {text}, got {other:?}"),
        }
    }
}

#[test]
fn numeric_accessor() {
    assert_eq!(AttrValue::from(404_i64).as_f64(), Ok(404.0));
    assert_eq!(AttrValue::from(" 503 ").as_f64(), Ok(503.0));
    assert_eq!(
        AttrValue::from("teapot").as_f64(),
        Err(AttrError::Unparseable("teapot".to_string()))
    );
    assert_eq!(
        AttrValue::from("NaN").as_f64(),
        Err(AttrError::Unparseable("NaN".to_string()))
    );
    assert_eq!(
        AttrValue::Bool(true).as_f64(),
        Err(AttrError::NotNumeric { found: "bool" })
    );
    assert_eq!(
        AttrValue::Null.as_f64(),
        Err(AttrError::NotNumeric { found: "null" })
    );
}

#[test]
fn failed_rate_is_undefined_without_requests() {
    let empty = HealthSummary::default();
    let half = HealthSummary {
        total_requests: 4,
        failed_requests: 2,
        ..Default::default()
    };

    assert_eq!(empty.failed_rate(), None);
    assert_eq!(half.failed_rate(), Some(50.0));
}
