#![cfg(feature = "cli")]

use std::fs;

use serde_json::json;
use tokensync::cli::{CliError, PlanOptions, SyncOptions, execute_plan, execute_sync};
use tokensync::store::ModeValue;
use tokensync::{MemoryStore, SyncError};

const FIXTURE: &str = include_str!("fixtures/tokens.json");

fn empty_snapshot() -> String {
    json!({
        "collections": [
            {
                "id": "VariableCollectionId:1",
                "name": "Demo Collection",
                "modes": [
                    { "modeId": "1:0", "name": "light" },
                    { "modeId": "1:1", "name": "dark" }
                ]
            }
        ]
    })
    .to_string()
}

#[test]
fn test_sync_against_snapshot() {
    let outcome = execute_sync(&SyncOptions {
        tokens: Some(FIXTURE.to_string()),
        store: empty_snapshot(),
        config: None,
    })
    .unwrap();

    assert!(outcome.report.is_clean());
    assert_eq!(outcome.store.len(), 6);

    let themed = outcome.store.variable_named("themed/background").unwrap();
    let black = outcome.store.variable_named("color/base/black").unwrap();
    assert_eq!(
        themed.values_by_mode.get("1:0").and_then(ModeValue::alias_target),
        Some(black.id.as_str())
    );
}

#[test]
fn test_snapshot_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    fs::write(&path, empty_snapshot()).unwrap();

    let options = SyncOptions {
        tokens: Some(FIXTURE.to_string()),
        store: fs::read_to_string(&path).unwrap(),
        config: None,
    };
    let first = execute_sync(&options).unwrap();
    fs::write(&path, serde_json::to_string_pretty(&first.store).unwrap()).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    let reloaded = MemoryStore::from_json_str(&written).unwrap();
    assert_eq!(reloaded, first.store);

    // Running again on the written snapshot creates nothing new
    let second = execute_sync(&SyncOptions {
        store: written,
        ..options
    })
    .unwrap();
    assert!(second.report.created.is_empty());
    assert_eq!(second.store, first.store);
}

#[test]
fn test_snapshot_format() {
    let outcome = execute_sync(&SyncOptions {
        tokens: Some(FIXTURE.to_string()),
        store: empty_snapshot(),
        config: None,
    })
    .unwrap();
    let json = serde_json::to_value(&outcome.store).unwrap();

    let corner = json["variables"]
        .as_object()
        .unwrap()
        .values()
        .find(|v| v["name"] == "corner/small")
        .unwrap();
    assert_eq!(corner["resolvedType"], "FLOAT");
    assert_eq!(corner["variableCollectionId"], "VariableCollectionId:1");
    assert_eq!(corner["valuesByMode"]["1:0"], json!(4.0));

    let themed = json["variables"]
        .as_object()
        .unwrap()
        .values()
        .find(|v| v["name"] == "themed/background")
        .unwrap();
    assert_eq!(themed["valuesByMode"]["1:1"]["type"], "VARIABLE_ALIAS");
}

#[test]
fn test_sync_with_custom_config() {
    let config = json!({
        "rules": [ { "pattern": "corner", "type": "FLOAT", "value": "px-to-number" } ]
    })
    .to_string();
    let outcome = execute_sync(&SyncOptions {
        tokens: Some(FIXTURE.to_string()),
        store: empty_snapshot(),
        config: Some(config),
    })
    .unwrap();

    assert_eq!(outcome.report.created, vec!["corner/small", "corner/medium"]);
    assert_eq!(outcome.report.skipped.len(), 6);
}

#[test]
fn test_sync_errors() {
    let missing_input = execute_sync(&SyncOptions {
        tokens: None,
        store: empty_snapshot(),
        config: None,
    });
    assert!(matches!(missing_input, Err(CliError::NoInput)));

    let bad_store = execute_sync(&SyncOptions {
        tokens: Some(FIXTURE.to_string()),
        store: r#"{ "collections": 5 }"#.to_string(),
        config: None,
    });
    assert!(matches!(bad_store, Err(CliError::Json(_))));
    let message = bad_store.err().map(|e| e.to_string()).unwrap_or_default();
    assert!(message.starts_with("JSON error:"), "{}", message);

    let no_collection = execute_sync(&SyncOptions {
        tokens: Some(FIXTURE.to_string()),
        store: "{}".to_string(),
        config: None,
    });
    assert!(matches!(
        no_collection,
        Err(CliError::Sync(SyncError::CollectionNotFound(_)))
    ));
}

#[test]
fn test_plan_command() {
    let entries = execute_plan(&PlanOptions {
        tokens: Some(FIXTURE.to_string()),
        config: None,
    })
    .unwrap();
    assert_eq!(entries.len(), 8);

    let bad_tree = execute_plan(&PlanOptions {
        tokens: Some(r#"{ "a": 1 }"#.to_string()),
        config: None,
    });
    assert!(matches!(bad_tree, Err(CliError::Tree(_))));
}
