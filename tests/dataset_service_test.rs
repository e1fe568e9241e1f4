//! Tests for DatasetService: reading source records from JSON and TOML files

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use sankey_tree::application::services::{DataFormat, DatasetService};
use sankey_tree::application::ApplicationError;
use sankey_tree::infrastructure::traits::RealFileSystem;

fn service() -> DatasetService {
    DatasetService::new(Arc::new(RealFileSystem))
}

fn resource(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources")
        .join(name)
}

#[rstest]
#[case("data.json", Some(DataFormat::Json))]
#[case("DATA.JSON", Some(DataFormat::Json))]
#[case("data.toml", Some(DataFormat::Toml))]
#[case("data.yaml", None)]
#[case("data", None)]
fn given_extension_when_detecting_format_then_maps_known_ones(
    #[case] file: &str,
    #[case] expected: Option<DataFormat>,
) {
    assert_eq!(DataFormat::from_path(Path::new(file)).ok(), expected);
}

#[test]
fn given_json_fixture_when_building_store_then_has_traces_hierarchy() {
    let store = service().build_store(&resource("traces.json")).unwrap();

    assert_eq!(store.len(), 14);
    assert!(store.find("Not Doable").is_some());
}

#[test]
fn given_nested_toml_fixture_when_building_store_then_matches_json_hierarchy() {
    let from_toml = service().build_store(&resource("traces.toml")).unwrap();
    let from_json = service().build_store(&resource("traces.json")).unwrap();

    assert_eq!(from_toml.len(), from_json.len());
    assert_eq!(from_toml.links().len(), from_json.links().len());
    let error = from_toml.find("Error").unwrap();
    let root = from_toml.find("Traces").unwrap();
    assert_eq!(from_toml.link_between(root, error).unwrap().value, 1030.0);
}

#[test]
fn given_unordered_keys_when_loading_then_keeps_source_order() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("order.json");
    std::fs::write(&path, r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();

    let record = service().load(&path).unwrap();

    let keys: Vec<&str> = record.keys().map(String::as_str).collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn given_missing_file_when_loading_then_fails_with_not_found() {
    let temp = TempDir::new().unwrap();

    let err = service().load(&temp.path().join("absent.json")).unwrap_err();

    assert!(matches!(err, ApplicationError::DataNotFound(_)));
}

#[test]
fn given_unknown_extension_when_loading_then_fails_with_unsupported_format() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data.yaml");
    std::fs::write(&path, "a: 1").unwrap();

    let err = service().load(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::UnsupportedFormat(_)));
}

#[test]
fn given_malformed_json_when_loading_then_fails_to_parse() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.json");
    std::fs::write(&path, r#"{"a": "#).unwrap();

    let err = service().load(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::Parse { .. }));
    assert!(err.to_string().contains("parse JSON"));
}

#[test]
fn given_inconsistent_hierarchy_when_building_store_then_surfaces_domain_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("orphan.json");
    std::fs::write(&path, r#"{"A.b": 1}"#).unwrap();

    let err = service().build_store(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::Domain(_)));
}
