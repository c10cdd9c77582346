// HTTP client tests against a live stand-in backend
//
// Purpose: error classification (status, timeout, transport) and result
// decoding for the ML backend client, plus the plans client against a
// running relay server.
// Run with: cargo test --test backend_client_tests

#[cfg(feature = "api")]
mod common;

#[cfg(feature = "api")]
mod client_tests {
    use std::time::Duration;

    use approx::assert_relative_eq;
    use farm_planner::client::ApiErrorKind;
    use farm_planner::config::ServerConfig;
    use farm_planner::model::{AllocationRequest, FarmPlanInput, ResourceConstraints};
    use farm_planner::{create_router, AppState, BackendClient, PlanStore, PlansClient};
    use serde_json::json;

    use crate::common::{dead_url, spawn_backend, Behaviour};
    use farm_planner::forms::yield_prefill;
    use farm_planner::FarmConditions;

    // =========================================================================
    // Section 1: Error Classification
    // =========================================================================

    #[tokio::test]
    async fn test_422_uses_fixed_message() {
        let (url, _) = spawn_backend(Behaviour::Rejecting).await;
        let client = BackendClient::new(&url).unwrap();

        let err = client
            .generate_farm_plan(&FarmPlanInput::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Status);
        assert_eq!(err.status, Some(422));
        assert_eq!(
            err.to_string(),
            "Validation error. Some fields are missing or incorrect."
        );
        assert_eq!(err.raw, "Request failed with status code 422");
    }

    #[tokio::test]
    async fn test_400_passes_detail_through() {
        let (url, _) = spawn_backend(Behaviour::BadInput).await;
        let client = BackendClient::new(&url).unwrap();

        let request = AllocationRequest {
            resources: ResourceConstraints::default(),
            crop_names: vec!["Cotton".to_string()],
        };
        let err = client.optimize_allocation(&request).await.unwrap_err();
        assert_eq!(err.status, Some(400));
        assert_eq!(err.user_message, "Unknown crop(s): ['Cotton']");
    }

    #[tokio::test]
    async fn test_500_message() {
        let (url, _) = spawn_backend(Behaviour::Broken).await;
        let client = BackendClient::new(&url).unwrap();

        let err = client.predict_crop(&FarmConditions::default()).await.unwrap_err();
        assert_eq!(
            err.user_message,
            "Server error. The model or backend is unavailable."
        );
        assert_eq!(err.raw, "Request failed with status code 500");
    }

    #[tokio::test]
    async fn test_timeout() {
        let (url, _) = spawn_backend(Behaviour::Slow(Duration::from_secs(2))).await;
        let client = BackendClient::with_timeout(&url, Duration::from_millis(100)).unwrap();

        let err = client
            .generate_farm_plan(&FarmPlanInput::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Timeout);
        assert_eq!(err.status, None);
        assert_eq!(err.raw, "timeout of 100ms exceeded");
        assert_eq!(err.user_message, "timeout of 100ms exceeded");
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let client = BackendClient::new(&dead_url().await).unwrap();

        let err = client.predict_crop(&FarmConditions::default()).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Transport);
        assert_eq!(err.status, None);
        assert!(!err.user_message.is_empty());
    }

    // =========================================================================
    // Section 2: Result Decoding
    // =========================================================================

    #[tokio::test]
    async fn test_generate_farm_plan_decodes() {
        let (url, mock) = spawn_backend(Behaviour::Healthy).await;
        let client = BackendClient::new(&format!("{}/", url)).unwrap();

        let result = client
            .generate_farm_plan(&FarmPlanInput::default())
            .await
            .unwrap();
        assert_eq!(result.predicted_crop, "Rice");
        assert_eq!(result.farm_plan.len(), 2);
        assert_eq!(result.farm_plan[1].risk_level, "Medium");
        assert!(result.farm_plan.iter().all(|a| a.adjusted_yield <= a.expected_yield));
        assert!((0.0..=100.0).contains(&result.sustainability_score));
        assert_eq!(mock.plan_calls(), 1);
    }

    #[tokio::test]
    async fn test_predict_yield_decodes() {
        let (url, _) = spawn_backend(Behaviour::Healthy).await;
        let client = BackendClient::new(&url).unwrap();

        let mut request = yield_prefill(&FarmConditions::default(), "Wheat");
        request.acres = 4.0;
        let prediction = client.predict_yield(&request).await.unwrap();

        assert_eq!(prediction.crop, "Wheat");
        assert_relative_eq!(prediction.acres, 4.0);
        assert_relative_eq!(prediction.total_production_tons, 14.0);
        assert_relative_eq!(prediction.profit, 168000.0);
    }

    #[tokio::test]
    async fn test_optimize_allocation_decodes() {
        let (url, _) = spawn_backend(Behaviour::Healthy).await;
        let client = BackendClient::new(&url).unwrap();

        let request = AllocationRequest {
            resources: ResourceConstraints::default(),
            crop_names: vec!["Rice".to_string(), "Maize".to_string()],
        };
        let result = client.optimize_allocation(&request).await.unwrap();

        assert_eq!(result.allocation.len(), 2);
        assert_relative_eq!(result.allocation["Rice"], 5.0);
        assert_relative_eq!(result.resource_usage.water_used, 9000.0);
        assert_relative_eq!(result.total_profit, 150000.0);
    }

    // =========================================================================
    // Section 3: Plans Client Against a Running Relay
    // =========================================================================

    async fn spawn_relay(backend_url: &str) -> String {
        let config = ServerConfig {
            backend_url: backend_url.to_string(),
            ..ServerConfig::default()
        };
        let backend = BackendClient::new(backend_url).unwrap();
        let app = create_router(AppState::from_parts(config, backend, PlanStore::in_memory()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_plans_client_round_trip() {
        let (backend_url, _) = spawn_backend(Behaviour::Healthy).await;
        let plans = PlansClient::new(&spawn_relay(&backend_url).await).unwrap();

        let mut body = serde_json::to_value(FarmPlanInput::default()).unwrap();
        body["farmerName"] = json!("Asha");
        let record = plans.generate(&body).await.unwrap();
        assert_eq!(record.farmer_name.as_deref(), Some("Asha"));
        assert_eq!(record.risk_level, "Low");

        let listed = plans.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, record.id);

        assert_eq!(plans.get(record.id).await.unwrap(), record);
        assert_eq!(plans.delete(record.id).await.unwrap(), "Plan deleted successfully");

        let err = plans.get(record.id).await.unwrap_err();
        assert_eq!(err.status, Some(404));
        assert_eq!(err.user_message, "Requested resource not found.");
    }

    #[tokio::test]
    async fn test_plans_client_relay_failure() {
        let (backend_url, _) = spawn_backend(Behaviour::Broken).await;
        let plans = PlansClient::new(&spawn_relay(&backend_url).await).unwrap();

        let body = serde_json::to_value(FarmPlanInput::default()).unwrap();
        let err = plans.generate(&body).await.unwrap_err();
        assert_eq!(err.status, Some(500));
        assert!(plans.list().await.unwrap().is_empty());
    }
}
