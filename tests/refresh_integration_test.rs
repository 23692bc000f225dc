use anyhow::Result;
use httpmock::prelude::*;
use std::time::Duration;
use storefront_shipping::core::TableStore;
use storefront_shipping::{
    DistanceMatrixClient, LocalTableStore, RefreshEngine, ReferenceTable, ShippingResolver,
    TABLE_PATH_ENV,
};
use tempfile::TempDir;

const ORIGIN: &str = "Imaara Mall, Nairobi, Kenya";

fn route(metres: u64) -> serde_json::Value {
    serde_json::json!({
        "status": "OK",
        "rows": [{ "elements": [{ "status": "OK", "distance": { "text": "", "value": metres } }] }]
    })
}

fn write_table(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("cities.toml");
    std::fs::write(&path, body).unwrap();
    path
}

/// One city fails upstream, the other succeeds: the failed one keeps its
/// previous value and the file still holds every city.
#[tokio::test]
async fn test_partial_failure_keeps_previous_distance() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_table(
        &dir,
        r#"
[[cities]]
name = "Nakuru"
distance_km = 171

[[cities]]
name = "Lamu"
distance_km = 700
"#,
    );

    let server = MockServer::start();
    let nakuru = server.mock(|when, then| {
        when.method(GET)
            .path("/json")
            .query_param("destinations", "Nakuru, Kenya")
            .query_param("origins", ORIGIN);
        then.status(200).json_body(route(158_700));
    });
    let lamu = server.mock(|when, then| {
        when.method(GET)
            .path("/json")
            .query_param("destinations", "Lamu, Kenya");
        then.status(200).json_body(serde_json::json!({
            "status": "OK",
            "rows": [{ "elements": [{ "status": "NOT_FOUND" }] }]
        }));
    });

    let client = DistanceMatrixClient::new(server.url("/json"), "test-key")?;
    let engine = RefreshEngine::new(client, LocalTableStore::new(&path), ORIGIN)
        .with_request_delay(Duration::ZERO);
    let report = engine.run(&[]).await?;

    nakuru.assert();
    lamu.assert();
    assert_eq!(report.degraded(), vec!["Lamu"]);

    let table = ReferenceTable::from_file(&path)?;
    assert_eq!(table.names(), vec!["Nakuru", "Lamu"]);
    assert_eq!(table.find("Nakuru").map(|c| c.distance_km), Some(159));
    assert_eq!(table.find("Lamu").map(|c| c.distance_km), Some(700));

    // the refreshed file is what checkout reads next
    let resolver = ShippingResolver::new(table, Default::default());
    assert_eq!(resolver.fee("nakuru"), 150 + 318);
    Ok(())
}

#[tokio::test]
async fn test_denied_key_keeps_whole_table() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("cities.toml");

    let server = MockServer::start();
    let denied = server.mock(|when, then| {
        when.method(GET).path("/json");
        then.status(200).json_body(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "rows": []
        }));
    });

    let client = DistanceMatrixClient::new(server.url("/json"), "bad-key")?;
    let store = LocalTableStore::new(&path);
    let engine = RefreshEngine::new(client, store.clone(), ORIGIN)
        .with_request_delay(Duration::ZERO);
    let report = engine.run(&[]).await?;

    let builtin = ReferenceTable::builtin();
    denied.assert_hits(builtin.len());
    assert_eq!(report.updated_count(), 0);

    let saved = store.load().await?.expect("table written");
    assert_eq!(saved.cities, builtin.cities().to_vec());
    assert_eq!(saved.origin.as_deref(), Some(ORIGIN));
    Ok(())
}

#[tokio::test]
async fn test_selected_cities_only() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_table(
        &dir,
        r#"
[[cities]]
name = "Voi"
distance_km = 319

[[cities]]
name = "Embu"
distance_km = 134
"#,
    );

    let server = MockServer::start();
    let embu = server.mock(|when, then| {
        when.method(GET).path("/json").query_param("destinations", "Embu, Kenya");
        then.status(200).json_body(route(131_200));
    });

    let client = DistanceMatrixClient::new(server.url("/json"), "key")?;
    let engine = RefreshEngine::new(client, LocalTableStore::new(&path), ORIGIN)
        .with_request_delay(Duration::ZERO);
    let report = engine.run(&["embu".to_string()]).await?;

    embu.assert();
    assert_eq!(report.outcomes.len(), 1);

    let table = ReferenceTable::from_file(&path)?;
    assert_eq!(table.names(), vec!["Voi", "Embu"]);
    assert_eq!(table.find("Voi").map(|c| c.distance_km), Some(319));
    assert_eq!(table.find("Embu").map(|c| c.distance_km), Some(131));
    Ok(())
}

/// Refreshing a single city in a fresh deployment writes the whole table,
/// and the deployed resolver then quotes the new distance.
#[tokio::test]
async fn test_refreshed_table_changes_deployed_quotes() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("cities.toml");
    std::env::set_var(TABLE_PATH_ENV, &path);

    let before = ShippingResolver::deployed();
    assert_eq!(before.resolve("Nakuru").distance_km, 171);

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/json").query_param("destinations", "Nakuru, Kenya");
        then.status(200).json_body(route(160_000));
    });

    let client = DistanceMatrixClient::new(server.url("/json"), "key")?;
    let engine = RefreshEngine::new(client, LocalTableStore::new(&path), ORIGIN)
        .with_request_delay(Duration::ZERO);
    engine.run(&["Nakuru".to_string()]).await?;

    let after = ShippingResolver::deployed();
    std::env::remove_var(TABLE_PATH_ENV);

    assert_eq!(after.resolve("Nakuru").distance_km, 160);
    assert_eq!(after.fee("nakuru"), 470);
    // untouched cities come across from the embedded table
    assert_eq!(after.table().len(), ReferenceTable::builtin().len());
    assert_eq!(after.resolve("Eldoret"), before.resolve("Eldoret"));
    Ok(())
}
