use std::collections::BTreeMap;

use edgedeploy_core::printer::{format_configuration, format_table, SEPARATOR};
use edgedeploy_registry::{Configuration, ConfigurationContent, PROPERTIES_DESIRED};
use serde_json::json;

fn stored_configuration() -> Configuration {
    Configuration {
        id: "config01".to_string(),
        schema_version: Some("1.0".to_string()),
        labels: Some(BTreeMap::from([("team".to_string(), "edge".to_string())])),
        content: ConfigurationContent {
            modules_content: Some(BTreeMap::from([(
                "asaModule".to_string(),
                BTreeMap::from([(PROPERTIES_DESIRED.to_string(), json!({ "foo": "bar" }))]),
            )])),
            device_content: None,
        },
        content_type: Some("assignment".to_string()),
        target_condition: "*".to_string(),
        created_time_utc: Some("2024-05-01T10:00:00.000Z".to_string()),
        last_updated_time_utc: Some("2024-05-02T11:30:00.000Z".to_string()),
        priority: 10,
        etag: Some("MQ==".to_string()),
    }
}

#[test]
fn renders_fields_in_fixed_order() {
    let report = format_configuration(&stored_configuration());
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(
        lines,
        [
            "Configuration Id: config01",
            "Configuration SchemaVersion: 1.0",
            r#"Configuration Labels: {"team":"edge"}"#,
            "Configuration ContentType: assignment",
            r#"Configuration ModulesContent: {"asaModule":{"properties.desired":{"foo":"bar"}}}"#,
            "Configuration DeviceContent: ",
            "Configuration TargetCondition: *",
            "Configuration CreatedTimeUtc: 2024-05-01T10:00:00.000Z",
            "Configuration LastUpdatedTimeUtc: 2024-05-02T11:30:00.000Z",
            "Configuration Priority: 10",
            "Configuration ETag: MQ==",
            SEPARATOR,
        ]
    );
    assert!(report.ends_with('\n'));
}

#[test]
fn absent_metadata_renders_empty() {
    let report = format_configuration(&Configuration::new("bare"));

    assert!(report.contains("Configuration Id: bare\n"));
    assert!(report.contains("Configuration SchemaVersion: \n"));
    assert!(report.contains("Configuration Labels: \n"));
    assert!(report.contains("Configuration ModulesContent: \n"));
    assert!(report.contains("Configuration Priority: 0\n"));
    assert!(report.contains("Configuration ETag: \n"));
    assert_eq!(SEPARATOR.len(), 60);
}

#[test]
fn table_lists_each_configuration() {
    let mut second = stored_configuration();
    second.id = "config02".to_string();
    second.priority = 20;

    let table = format_table(&[stored_configuration(), second]);

    assert!(table.contains("TargetCondition"));
    assert!(table.contains("config01"));
    assert!(table.contains("config02"));
    assert!(table.contains("20"));
}
