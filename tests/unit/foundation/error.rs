use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        GazemapError::invalid_parameter("x")
            .to_string()
            .contains("invalid parameter:")
    );
    assert!(GazemapError::no_data("p1").to_string().contains("'p1'"));
    assert!(
        GazemapError::missing_background("p1")
            .to_string()
            .contains("missing background")
    );
    assert!(GazemapError::parse("x").to_string().contains("parse error:"));
}

#[test]
fn empty_grid_reports_dimensions() {
    let err = GazemapError::EmptyGrid {
        width: 5,
        height: 7,
        spacing: 10.0,
    };
    let msg = err.to_string();
    assert!(msg.contains("5x7"));
    assert!(msg.contains("10"));
}

#[test]
fn status_codes_are_distinct_per_kind() {
    assert_eq!(GazemapError::invalid_parameter("x").status_code(), 400);
    assert_eq!(GazemapError::parse("x").status_code(), 400);
    assert_eq!(
        GazemapError::EmptyGrid {
            width: 1,
            height: 1,
            spacing: 2.0
        }
        .status_code(),
        400
    );
    assert_eq!(GazemapError::no_data("x").status_code(), 404);
    assert_eq!(GazemapError::missing_background("x").status_code(), 404);
    assert_eq!(
        GazemapError::Other(anyhow::anyhow!("boom")).status_code(),
        500
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = GazemapError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
