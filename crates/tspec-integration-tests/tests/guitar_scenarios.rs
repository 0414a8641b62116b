//! # Guitar Scenarios
//!
//! End-to-end checks over the guitar fixtures: pickup construction, guitar
//! validation with nested pickups, inheritance on top of the fixtures, and
//! agreement between the interpreted and compiled paths.

use serde_json::{json, Value};
use tspec_cli::fixtures::{guitars, Fixtures};
use tspec_core::{ErrorCode, Predicate, TypeSpec, TypeSpecError};

fn sh4() -> Value {
    json!({
        "position": "bridge",
        "make": "Seymour Duncan",
        "model": "SH-4",
        "color": "Black",
        "coil": "humbucker",
        "magnet": "alnico-5",
        "circuit": "passive"
    })
}

#[test]
fn pickup_create_returns_same_record_frozen() {
    let fixtures = Fixtures::load().unwrap();
    let record = fixtures.pickup.create(&sh4()).unwrap();
    assert_eq!(record, sh4());

    let copy = record.clone();
    assert!(std::ptr::eq(record.as_map(), copy.as_map()));
}

#[test]
fn pickup_with_unknown_position_is_rejected() {
    let fixtures = Fixtures::load().unwrap();
    let mut bad = sh4();
    bad["position"] = json!("unknown-slot");

    let interpreted = fixtures.pickup.create(&bad).unwrap_err();
    let compiled = fixtures.pickup.build().create(&bad).unwrap_err();
    assert_eq!(interpreted, TypeSpecError::invalid_prop("Pickup", "position"));
    assert_eq!(interpreted, compiled);
}

#[test]
fn guitar_year_must_be_unsigned() {
    let fixtures = Fixtures::load().unwrap();
    let mut guitar = guitars()[0].clone();
    guitar["year"] = json!(-1);
    assert_eq!(
        fixtures.guitar.create(&guitar).unwrap_err().code(),
        ErrorCode::InvalidPropertyType
    );
    assert!(!fixtures.guitar.build().is_of(&guitar));
}

#[test]
fn guitar_pickups_must_be_non_empty_unless_allowed() {
    let fixtures = Fixtures::load().unwrap();
    let mut guitar = guitars()[0].clone();
    guitar["pickups"] = json!([]);
    assert!(fixtures.guitar.create(&guitar).is_err());

    let acoustic = TypeSpec::init("Acoustic")
        .and_then(|t| t.prop("make", Predicate::nonempty_string()))
        .and_then(|t| t.prop("pickups", Predicate::array_of(&fixtures.pickup, true)))
        .unwrap();
    let created = acoustic
        .create(&json!({"make": "Martin", "pickups": []}))
        .unwrap();
    assert_eq!(created["pickups"], json!([]));
}

#[test]
fn guitar_rejects_a_bad_nested_pickup() {
    let fixtures = Fixtures::load().unwrap();
    let mut guitar = guitars()[1].clone();
    guitar["pickups"][1]["magnet"] = json!("neodymium");
    assert_eq!(
        fixtures.guitar.check(&guitar).unwrap_err(),
        TypeSpecError::invalid_prop("Guitar", "pickups")
    );
}

#[test]
fn check_demands_every_property_but_create_fills_defaults() {
    let fixtures = Fixtures::load().unwrap();
    let signed = TypeSpec::extend("SignedGuitar", &fixtures.guitar)
        .and_then(|t| t.optional("signature", Predicate::string(), json!("")))
        .unwrap();

    let plain = guitars()[0].clone();
    assert_eq!(
        signed.check(&plain).unwrap_err(),
        TypeSpecError::missing_prop("SignedGuitar", "signature")
    );

    let made = signed.create(&plain).unwrap();
    assert_eq!(made["signature"], json!(""));
    assert!(signed.check(&made).is_ok());
    assert!(fixtures.guitar.check(&plain).is_ok());
}

#[test]
fn child_shadowing_leaves_parent_untouched() {
    let fixtures = Fixtures::load().unwrap();
    let vintage = TypeSpec::extend("VintageGuitar", &fixtures.guitar)
        .and_then(|t| t.prop("year", Predicate::new(|v| v.as_u64().is_some_and(|y| y < 1980))))
        .unwrap();

    let modern = guitars()[0].clone();
    assert!(fixtures.guitar.is_of(&modern));
    assert!(!vintage.is_of(&modern));
    assert!(!vintage.build().is_of(&modern));

    let mut old = modern;
    old["year"] = json!(1962);
    assert!(vintage.is_of(&old));
    assert_eq!(vintage.prop_names(), fixtures.guitar.prop_names());
}

#[test]
fn update_revalidates_and_ignores_defaults() {
    let fixtures = Fixtures::load().unwrap();
    let guitar = fixtures.guitar.create(&guitars()[2]).unwrap();

    let repainted = fixtures
        .guitar
        .update(&guitar, &json!({"color": "sunburst"}))
        .unwrap();
    assert_eq!(repainted["color"], json!("sunburst"));
    assert_eq!(guitar["color"], json!("black/white"));

    let err = fixtures
        .guitar
        .update(&guitar, &json!({"color": ""}))
        .unwrap_err();
    assert_eq!(err, TypeSpecError::invalid_prop("Guitar", "color"));
}

#[test]
fn records_serialize_back_to_json() {
    let fixtures = Fixtures::load().unwrap();
    let record = fixtures.pickup.create(&sh4()).unwrap();
    let text = serde_json::to_string(&record).unwrap();
    let back: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(back, sh4());
}
