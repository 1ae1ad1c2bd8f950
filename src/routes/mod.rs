use crate::models::AppState;
use axum::Router;

pub mod achievement_routes;
pub mod appointment_routes;
pub mod auth_routes;
pub mod dashboard_routes;
pub mod dentist_routes;
pub mod goal_routes;
pub mod invoice_routes;
pub mod material_routes;
pub mod patient_routes;
pub mod procedure_routes;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(patient_routes::router())
        .merge(dentist_routes::router())
        .merge(procedure_routes::router())
        .merge(invoice_routes::router())
        .merge(appointment_routes::router())
        .merge(material_routes::router())
        .merge(goal_routes::router())
        .merge(achievement_routes::router())
        .merge(dashboard_routes::router());

    Router::new()
        .nest("/api/auth", auth_routes::router())
        .nest("/api", api)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::repository::SqliteRepository;
    use crate::test_support::*;

    async fn app() -> (Router, Arc<SqliteRepository>) {
        app_with_ttl(1).await
    }

    async fn app_with_ttl(session_ttl_hours: i64) -> (Router, Arc<SqliteRepository>) {
        let repo = Arc::new(memory_repo().await);
        let state = AppState {
            repo: repo.clone(),
            session_ttl_hours,
        };
        (router(state), repo)
    }

    async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn revenue_goal() -> Value {
        json!({
            "name": "January revenue",
            "goalType": "REVENUE",
            "targetValue": 1000.0,
            "startDate": "2024-01-01",
            "endDate": "2024-01-31T00:00:00.000Z",
            "frequency": "MONTHLY",
            "difficulty": "MEDIUM"
        })
    }

    #[tokio::test]
    async fn requests_without_a_session_are_rejected() {
        let (app, _repo) = app().await;
        let (status, body) = call(&app, Method::GET, "/api/financial-goals", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "SESSION_EXPIRED");
    }

    #[tokio::test]
    async fn check_progress_reports_counts() {
        let (app, repo) = app().await;
        let admin = seed_session(repo.as_ref(), "admin", true).await;
        let patient = seed_patient(repo.as_ref(), "Ana").await;
        for (value, day) in [(600.0, 10), (500.0, 20)] {
            let on = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            seed_procedure(repo.as_ref(), patient.patient_id, None, "TREATMENT", value, on).await;
        }

        let (status, goal) = call(&app, Method::POST, "/api/financial-goals", Some(&admin), Some(revenue_goal())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(goal["currentValue"], 0.0);
        assert_eq!(goal["isCompleted"], false);

        let (status, report) =
            call(&app, Method::POST, "/api/financial-goals/check-progress", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report, json!({ "updatedGoals": 1, "completedGoals": 1 }));

        let uri = format!("/api/financial-goals/{}", goal["goalId"].as_str().unwrap());
        let (_, stored) = call(&app, Method::GET, &uri, Some(&admin), None).await;
        assert_eq!(stored["currentValue"], 1100.0);
        assert_eq!(stored["isCompleted"], true);
    }

    #[tokio::test]
    async fn malformed_ids_and_queries_get_the_error_envelope() {
        let (app, repo) = app().await;
        let token = seed_session(repo.as_ref(), "staff", false).await;

        for uri in [
            "/api/financial-goals/not-a-uuid",
            "/api/achievements/42/award",
            "/api/procedures?from=yesterday",
            "/api/invoices?status=LOST",
        ] {
            let method = if uri.ends_with("/award") { Method::POST } else { Method::GET };
            let (status, body) = call(&app, method, uri, Some(&token), None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "{uri}");
            assert!(body["error"]["message"].is_string(), "{uri}");
        }
    }

    #[tokio::test]
    async fn login_issues_a_working_session() {
        let (app, repo) = app().await;
        seed_session(repo.as_ref(), "reception", false).await;
        let creds = json!({ "username": "reception", "password": "password" });

        let (status, body) = call(&app, Method::POST, "/api/auth/login", None, Some(creds)).await;
        assert_eq!(status, StatusCode::OK);
        let token = body["accessToken"].as_str().unwrap().to_string();

        let (status, me) = call(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["username"], "reception");
    }

    #[tokio::test]
    async fn out_of_range_session_lifetime_fails_cleanly() {
        let (app, repo) = app_with_ttl(i64::MAX).await;
        seed_session(repo.as_ref(), "reception", false).await;
        let creds = json!({ "username": "reception", "password": "password" });

        let (status, body) = call(&app, Method::POST, "/api/auth/login", None, Some(creds)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL");
    }

    #[tokio::test]
    async fn goal_creation_is_admin_only() {
        let (app, repo) = app().await;
        let staff = seed_session(repo.as_ref(), "staff", false).await;
        let (status, body) = call(&app, Method::POST, "/api/financial-goals", Some(&staff), Some(revenue_goal())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn goal_with_inverted_window_is_rejected() {
        let (app, repo) = app().await;
        let admin = seed_session(repo.as_ref(), "admin", true).await;
        let mut goal = revenue_goal();
        goal["startDate"] = json!("2024-02-01");

        let (status, body) = call(&app, Method::POST, "/api/financial-goals", Some(&admin), Some(goal)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        let (app, repo) = app().await;
        let admin = seed_session(repo.as_ref(), "admin", true).await;
        let body = json!({ "name": "x", "goalType": "PROFIT" });

        let (status, body) = call(&app, Method::POST, "/api/financial-goals", Some(&admin), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn progress_on_unknown_goal_is_404() {
        let (app, repo) = app().await;
        let token = seed_session(repo.as_ref(), "staff", false).await;
        let uri = format!("/api/financial-goals/{}/progress", Uuid::new_v4());

        let (status, body) = call(&app, Method::POST, &uri, Some(&token), Some(json!({ "value": 10.0 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn manual_progress_completes_and_then_sticks() {
        let (app, repo) = app().await;
        let admin = seed_session(repo.as_ref(), "admin", true).await;
        let (_, goal) = call(&app, Method::POST, "/api/financial-goals", Some(&admin), Some(revenue_goal())).await;
        let uri = format!("/api/financial-goals/{}/progress", goal["goalId"].as_str().unwrap());

        let (status, done) = call(&app, Method::POST, &uri, Some(&admin), Some(json!({ "value": 1000.0 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(done["isCompleted"], true);

        let (_, after) = call(&app, Method::POST, &uri, Some(&admin), Some(json!({ "value": 5.0 }))).await;
        assert_eq!(after["currentValue"], 1000.0);
        assert_eq!(after["completedAt"], done["completedAt"]);

        let (status, _) = call(&app, Method::POST, &uri, Some(&admin), Some(json!({ "value": -1.0 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn achievements_are_awarded_once() {
        let (app, repo) = app().await;
        let token = seed_session(repo.as_ref(), "staff", false).await;
        let badge = seed_achievement(repo.as_ref(), "First Case", 10).await;
        let uri = format!("/api/achievements/{}/award", badge.achievement_id);

        let (status, first) = call(&app, Method::POST, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["awarded"], true);

        let (_, second) = call(&app, Method::POST, &uri, Some(&token), None).await;
        assert_eq!(second, json!({ "awarded": false }));

        let (_, earned) = call(&app, Method::GET, "/api/achievements/user", Some(&token), None).await;
        assert_eq!(earned.as_array().map(Vec::len), Some(1));

        let missing = format!("/api/achievements/{}/award", Uuid::new_v4());
        let (status, _) = call(&app, Method::POST, &missing, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn procedure_cost_and_low_stock_over_http() {
        let (app, repo) = app().await;
        let token = seed_session(repo.as_ref(), "staff", false).await;
        let files = seed_material(repo.as_ref(), "Rotary files", 10.0, 2, Some(5)).await;
        let sealer = seed_material(repo.as_ref(), "Sealer", 5.0, 40, Some(5)).await;

        for (material_id, qty) in [(files.material_id, 2.0), (sealer.material_id, 3.0)] {
            let link = json!({ "procedureType": "TREATMENT", "materialId": material_id, "quantityUsed": qty });
            let (status, _) = call(&app, Method::POST, "/api/procedure-materials", Some(&token), Some(link)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, cost) = call(&app, Method::GET, "/api/procedure-cost/TREATMENT", Some(&token), None).await;
        assert_eq!(cost["totalCost"], 35.0);

        let (_, low) = call(&app, Method::GET, "/api/materials/low-stock", Some(&token), None).await;
        let names: Vec<&str> = low
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|m| m["name"].as_str())
            .collect();
        assert_eq!(names, vec!["Rotary files"]);
    }

    #[tokio::test]
    async fn appointment_duration_is_bounded() {
        let (app, repo) = app().await;
        let token = seed_session(repo.as_ref(), "staff", false).await;
        let patient = seed_patient(repo.as_ref(), "Ana").await;
        let body = json!({
            "patientId": patient.patient_id,
            "scheduledAt": "2030-05-01T09:00:00Z",
            "durationMinutes": 0
        });

        let (status, _) = call(&app, Method::POST, "/api/appointments", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
