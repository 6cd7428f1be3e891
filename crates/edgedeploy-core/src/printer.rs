use comfy_table::Table;
use edgedeploy_registry::Configuration;
use serde::Serialize;

pub const SEPARATOR: &str = "------------------------------------------------------------";

/// Human-readable report for one configuration, one field per line, ending with
/// [`SEPARATOR`].
pub fn format_configuration(configuration: &Configuration) -> String {
    let fields = [
        ("Id", configuration.id.clone()),
        ("SchemaVersion", text(&configuration.schema_version)),
        ("Labels", json(configuration.labels.as_ref())),
        ("ContentType", text(&configuration.content_type)),
        (
            "ModulesContent",
            json(configuration.content.modules_content.as_ref()),
        ),
        (
            "DeviceContent",
            json(configuration.content.device_content.as_ref()),
        ),
        ("TargetCondition", configuration.target_condition.clone()),
        ("CreatedTimeUtc", text(&configuration.created_time_utc)),
        ("LastUpdatedTimeUtc", text(&configuration.last_updated_time_utc)),
        ("Priority", configuration.priority.to_string()),
        ("ETag", text(&configuration.etag)),
    ];

    let mut report = String::new();
    for (name, value) in fields {
        report.push_str(&format!("Configuration {name}: {value}\n"));
    }
    report.push_str(SEPARATOR);
    report.push('\n');
    report
}

/// Compact summary table, one row per configuration.
pub fn format_table(configurations: &[Configuration]) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "Id",
        "Priority",
        "TargetCondition",
        "CreatedTimeUtc",
        "ETag",
    ]);
    for configuration in configurations {
        table.add_row(vec![
            configuration.id.clone(),
            configuration.priority.to_string(),
            configuration.target_condition.clone(),
            text(&configuration.created_time_utc),
            text(&configuration.etag),
        ]);
    }
    table.to_string()
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn json<T: Serialize>(value: Option<&T>) -> String {
    value
        .and_then(|value| serde_json::to_string(value).ok())
        .unwrap_or_default()
}
