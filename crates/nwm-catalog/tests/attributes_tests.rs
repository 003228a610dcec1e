//! Tests for reading NWM attributes out of file names.

use nwm_catalog::{extract_attributes, AttributeError, File};
use test_utils::{file_name, names};

#[test]
fn test_member_is_split_from_model_type() {
    let attrs = extract_attributes(names::MEDIUM_RANGE_MEMBER).unwrap();
    assert_eq!(attrs.member, Some(3));
    assert_eq!(attrs.model_type, "channel_rt");
    assert_eq!(attrs.step, Some(12));
    assert_eq!(attrs.reference, 0);
}

#[test]
fn test_model_type_without_digits_is_kept() {
    let attrs = extract_attributes(names::SHORT_RANGE_CHANNEL).unwrap();
    assert_eq!(attrs.member, None);
    assert_eq!(attrs.model_type, "channel_rt");
}

#[test]
fn test_analysis_step_token() {
    let attrs = extract_attributes(names::ANALYSIS).unwrap();
    assert_eq!(attrs.reference, 18);
    assert_eq!(attrs.configuration, "analysis_assim");
    assert_eq!(attrs.step, Some(2));
    assert_eq!(attrs.area, "hawaii");
}

#[test]
fn test_short_name_fails_with_name() {
    let err = extract_attributes(names::TOO_SHORT).unwrap_err();
    assert!(matches!(err, AttributeError::MissingSegment { .. }));
    assert_eq!(err.name(), names::TOO_SHORT);
}

#[test]
fn test_bad_reference_names_segment() {
    let err = extract_attributes(names::BAD_REFERENCE).unwrap_err();
    assert!(matches!(err, AttributeError::NotNumeric { segment: "reference", .. }));
}

#[test]
fn test_generated_names_round_trip_through_file() {
    for member in [None, Some(1), Some(12)] {
        let name = file_name(23, "long_range", "reservoir", member, 720, "conus");
        let file = File::parse(name.clone(), format!("/data/{}", name)).unwrap();
        assert_eq!(file.member, member);
        assert_eq!(file.model_type, "reservoir");
        assert_eq!(file.step, Some(720));
        assert_eq!(file.reference, 23);
    }
}
