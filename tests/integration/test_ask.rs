//! End-to-end question answering tests.

use std::sync::Arc;

use logistics_insight::{AnalysisRequest, EntityRef, QueryType};

use crate::common::{interface_with, RecordingBackend};

#[tokio::test]
async fn test_city_delay_routes_to_backend() {
    let backend = Arc::new(RecordingBackend::default());
    let interface = interface_with(backend.clone(), 100);

    let response = interface
        .ask("Why were deliveries delayed in Mumbai yesterday?")
        .await;

    assert!(response.success, "{:?}", response.error);
    assert_eq!(response.query_type, QueryType::CityDelayAnalysis);
    assert_eq!(
        backend.calls(),
        vec!["city_delays Mumbai 2025-09-09 [2025-09-09 to 2025-09-09]".to_string()]
    );
    assert!(response.narrative.unwrap().contains("city_delays Mumbai"));
    assert!(!response.rewritten);
    assert!(response.error.is_none());
}

#[tokio::test]
async fn test_all_supported_examples_answer() {
    let backend = Arc::new(RecordingBackend::default());
    let interface = interface_with(backend.clone(), 100);

    for supported in interface.supported_queries() {
        let response = interface.ask(supported.example).await;
        assert!(response.success, "{}: {:?}", supported.example, response.error);
        assert_eq!(response.query_type, supported.query_type);
    }

    assert_eq!(
        backend.calls(),
        vec![
            "city_delays Mumbai 2025-09-09 [2025-09-09 to 2025-09-09]".to_string(),
            "client_failures 7 [2025-09-03 to 2025-09-10]".to_string(),
            "warehouse_failures 4 [2025-08-01 to 2025-08-31]".to_string(),
            "compare_cities Delhi Mumbai [2025-08-01 to 2025-08-31]".to_string(),
            "festival_period [2025-10-20 to 2025-10-25]".to_string(),
            "capacity_impact Xyz 20000".to_string(),
        ]
    );

    let stats = interface.statistics();
    assert_eq!(stats.total_queries, 6);
    assert_eq!(stats.successful_queries, 6);
    assert_eq!(stats.success_rate, 100.0);
    assert_eq!(stats.query_types.len(), 6);
}

#[tokio::test]
async fn test_client_id_skips_name_lookup() {
    let backend = Arc::new(RecordingBackend::default());
    let interface = interface_with(backend.clone(), 100);

    let response = interface.ask("Why did client 42 orders fail?").await;

    assert!(response.success, "{:?}", response.error);
    match response.request {
        Some(AnalysisRequest::ClientFailureAnalysis { client, .. }) => {
            assert_eq!(client, EntityRef::Id(42))
        }
        other => panic!("unexpected request: {:?}", other),
    }
    assert!(backend.calls()[0].starts_with("client_failures 42 "));
}

#[tokio::test]
async fn test_unknown_query_is_reported_not_routed() {
    let backend = Arc::new(RecordingBackend::default());
    let interface = interface_with(backend.clone(), 100);

    let response = interface.ask("What is the weather today?").await;

    assert!(!response.success);
    assert_eq!(response.query_type, QueryType::Unknown);
    assert_eq!(
        response.error.as_deref(),
        Some("Could not identify query type. Please rephrase your question.")
    );
    assert_eq!(response.supported_queries.len(), 6);
    assert!(response.narrative.is_none());
    assert!(backend.calls().is_empty());

    let history = interface.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].query_type, None);
    assert!(!history[0].success);
}

#[tokio::test]
async fn test_unresolvable_client_name() {
    let backend = Arc::new(RecordingBackend::default());
    let interface = interface_with(backend.clone(), 100);

    let response = interface
        .ask("Why did Client Globex's orders fail in the past week?")
        .await;

    assert!(!response.success);
    assert_eq!(response.query_type, QueryType::ClientFailureAnalysis);
    assert_eq!(
        response.error.as_deref(),
        Some("Could not find client with name 'Globex'")
    );
    assert!(backend.calls().is_empty());
    assert!(response.request.is_some());
}

#[tokio::test]
async fn test_missing_entity_is_reported() {
    let backend = Arc::new(RecordingBackend::default());
    let interface = interface_with(backend.clone(), 100);

    let response = interface
        .ask("What failure risks come with more orders?")
        .await;

    assert!(!response.success);
    assert_eq!(response.query_type, QueryType::CapacityImpactAnalysis);
    assert_eq!(
        response.error.as_deref(),
        Some("Could not extract capacity impact parameters")
    );
    assert!(response.supported_queries.is_empty());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_backend_failure_is_reported() {
    let backend = Arc::new(RecordingBackend::failing("orders table unavailable"));
    let interface = interface_with(backend.clone(), 100);

    let response = interface
        .ask("Compare delivery failure causes between Delhi and Mumbai last month?")
        .await;

    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("Analysis error: orders table unavailable")
    );
    assert_eq!(backend.calls().len(), 1);
    assert_eq!(interface.statistics().successful_queries, 0);
}

#[tokio::test]
async fn test_out_of_range_time_is_flagged() {
    let backend = Arc::new(RecordingBackend::default());
    let interface = interface_with(backend.clone(), 100);

    let response = interface
        .ask("Why did Client ABC's orders fail in 2024?")
        .await;

    assert!(response.success, "{:?}", response.error);
    assert!(!response.warnings.is_empty());
    match response.request {
        Some(AnalysisRequest::ClientFailureAnalysis { time, .. }) => {
            assert_eq!(time.time_expression, "2024");
            assert!(!time.time_validation.valid);
            assert!(!time.time_validation.suggestions.is_empty());
        }
        other => panic!("unexpected request: {:?}", other),
    }
}

#[tokio::test]
async fn test_history_is_bounded() {
    let backend = Arc::new(RecordingBackend::default());
    let interface = interface_with(backend, 3);

    for city in ["Mumbai", "Delhi", "Pune", "Chennai", "Kolkata"] {
        interface
            .ask(&format!("Why were deliveries delayed in {} yesterday?", city))
            .await;
    }

    let history = interface.history();
    assert_eq!(history.len(), 3);
    assert_eq!(
        history[0].query_text,
        "Why were deliveries delayed in Pune yesterday?"
    );

    let stats = interface.statistics();
    assert_eq!(stats.total_queries, 3);
    assert_eq!(stats.query_types.get(&QueryType::CityDelayAnalysis), Some(&3));

    interface.clear_history();
    assert!(interface.history().is_empty());
}

#[tokio::test]
async fn test_response_serializes_without_empty_fields() {
    let backend = Arc::new(RecordingBackend::default());
    let interface = interface_with(backend, 100);

    let response = interface
        .ask("What are the likely causes of delivery failures during the festival period?")
        .await;
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["query_type"], "festival_period_analysis");
    assert_eq!(json["request"]["query_type"], "festival_period_analysis");
    assert!(json.get("error").is_none());
    assert!(json.get("supported_queries").is_none());
}
