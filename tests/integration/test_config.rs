//! Configuration files driving the pipeline.

use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use tempfile::TempDir;

use logistics_insight::{
    AnalysisRouter, Config, ConfigError, InsightError, InsightInterface, QueryProcessor,
};

use crate::common::{at, directory, RecordingBackend};

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("logistics-insight.toml");
    let mut file = File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[tokio::test]
async fn test_config_file_sets_festival_and_capacity() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[data]
earliest = "2024-01-01T00:00:00"
latest = "2024-12-31T00:00:00"

[history]
capacity = 2

[festival]
start = "2024-11-01"
end = "2024-11-05"
"#,
    );

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.data.earliest, at(2024, 1, 1));
    assert_eq!(config.history.capacity, 2);

    let backend = Arc::new(RecordingBackend::default());
    let interface =
        InsightInterface::from_config(&config, backend.clone(), Arc::new(directory())).unwrap();

    assert_eq!(
        interface.router().festival_period().to_string(),
        "2024-11-01 to 2024-11-05"
    );
    assert_eq!(interface.processor().parser().bounds().latest, at(2024, 12, 31));
    assert!(interface.router().rewriter_name().is_none());

    for _ in 0..3 {
        let response = interface
            .ask("What are the likely causes of delivery failures during the festival period?")
            .await;
        assert!(response.success);
    }

    assert_eq!(
        backend.calls()[0],
        "festival_period [2024-11-01 to 2024-11-05]"
    );
    assert_eq!(interface.history().len(), 2);
}

#[test]
fn test_config_bounds_drive_time_validation() {
    let config = Config::from_str(
        r#"
[data]
earliest = "2024-01-01T00:00:00"
latest = "2024-06-30T00:00:00"
"#,
    )
    .unwrap();

    let processor = QueryProcessor::new(config.data.bounds());
    let validation = processor
        .parser()
        .validate(&processor.parser().parse("2024"));

    assert!(validation.valid);
    assert_eq!(validation.adjusted_start, at(2024, 1, 1));
    assert_eq!(validation.adjusted_end, at(2024, 6, 30));
    assert_eq!(validation.warnings.len(), 1);
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let result = Config::from_file(dir.path().join("absent.toml"));
    assert!(matches!(
        result,
        Err(InsightError::Config(ConfigError::ReadFile(_)))
    ));
}

#[test]
fn test_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[festival]
start = "2025-10-25"
end = "2025-10-20"
"#,
    );

    assert!(matches!(
        Config::from_file(&path),
        Err(InsightError::Config(ConfigError::Invalid(_)))
    ));
}

#[test]
fn test_openai_without_api_key_is_rejected() {
    let config = Config::from_str(
        r#"
[narrative]
enabled = true
provider = "openai"
"#,
    )
    .unwrap();

    let result = AnalysisRouter::from_config(
        &config,
        Arc::new(RecordingBackend::default()),
        Arc::new(directory()),
    );
    assert!(result.is_err());
}
