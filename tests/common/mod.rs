#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use mes_api::{
    auth::issue_session_token,
    config::AppConfig,
    db,
    entities::team_member::MemberRole,
    AppState,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test_session_secret_for_integration_tests_only";

/// A seeded user together with a session token for their team
#[derive(Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub team_id: Uuid,
    pub token: String,
}

/// Application harness backed by a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub team_id: Uuid,
    pub admin: TestUser,
    pub member: TestUser,
    /// Admin of a second team, used for cross-team checks
    pub outsider: TestUser,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Builds the app after letting the caller adjust the configuration.
    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("mes_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_SECRET.to_string(),
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.upload_dir = dir.path().join("uploads").display().to_string();
        tweak(&mut cfg);

        std::fs::create_dir_all(&cfg.upload_dir).expect("upload dir");

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool).await.expect("migrations");

        let state = AppState::new(Arc::new(pool), cfg).expect("app state");
        let router = mes_api::app_router(state.clone());

        let users = &state.services.users;
        let team = users.create_team("Line 1").await.expect("team");
        let other_team = users.create_team("Line 2").await.expect("other team");

        let admin = Self::seed_user(&state, "admin@example.com", team.id, MemberRole::Admin).await;
        let member =
            Self::seed_user(&state, "operator@example.com", team.id, MemberRole::Member).await;
        let outsider =
            Self::seed_user(&state, "outsider@example.com", other_team.id, MemberRole::Admin).await;

        Self {
            router,
            state,
            team_id: team.id,
            admin,
            member,
            outsider,
            _dir: dir,
        }
    }

    async fn seed_user(state: &AppState, email: &str, team_id: Uuid, role: MemberRole) -> TestUser {
        let user = state
            .services
            .users
            .create_user(email, Some(email.to_string()))
            .await
            .expect("user");
        state
            .services
            .users
            .add_member(team_id, user.id, role)
            .await
            .expect("membership");
        let token = session_token(state, user.id, Some(team_id));
        TestUser {
            id: user.id,
            team_id,
            token,
        }
    }

    pub fn upload_dir(&self) -> &str {
        &self.state.config.upload_dir
    }

    /// Sends a request with an optional JSON body and bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("router response")
    }

    /// Sends a request authenticated with an API key header.
    pub async fn request_with_api_key(&self, uri: &str, key: &str) -> Response {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header("x-api-key", key)
            .body(Body::empty())
            .expect("request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router response")
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> Response {
        self.request(Method::GET, uri, None, Some(&user.token)).await
    }

    pub async fn post(&self, uri: &str, body: Value, user: &TestUser) -> Response {
        self.request(Method::POST, uri, Some(body), Some(&user.token))
            .await
    }

    /// Creates a routing with the given operation titles and returns its JSON.
    pub async fn create_routing(&self, titles: &[&str]) -> Value {
        let operations: Vec<Value> = titles
            .iter()
            .map(|title| json!({ "title": title, "runTimeSeconds": 600 }))
            .collect();
        let response = self
            .post(
                "/api/routings",
                json!({ "name": format!("Routing {}", Uuid::new_v4()), "operations": operations }),
                &self.admin,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response_json(response).await
    }

    /// Creates an order from a fresh routing and returns the order JSON,
    /// which includes its work order operations.
    pub async fn create_order(&self, titles: &[&str]) -> Value {
        let routing = self.create_routing(titles).await;
        let response = self
            .post(
                "/api/orders",
                json!({
                    "orderNumber": format!("WO-{}", &Uuid::new_v4().to_string()[..8]),
                    "productName": "Bracket",
                    "quantity": 10,
                    "routingId": routing["id"],
                }),
                &self.admin,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response_json(response).await
    }

    /// Id of the first work order operation on a new single-step order.
    pub async fn create_woo(&self) -> String {
        let order = self.create_order(&["Cut"]).await;
        order["operations"][0]["id"]
            .as_str()
            .expect("operation id")
            .to_string()
    }

    pub async fn create_pause_reason(&self, name: &str, category: &str) -> String {
        let response = self
            .post(
                "/api/pause-reasons",
                json!({ "name": name, "category": category }),
                &self.admin,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response_json(response).await["id"]
            .as_str()
            .expect("pause reason id")
            .to_string()
    }
}

/// Signs a session token against the app's secret and issuer.
pub fn session_token(state: &AppState, user_id: Uuid, team_id: Option<Uuid>) -> String {
    issue_session_token(
        &state.config.session_secret,
        &state.config.session_issuer,
        user_id,
        team_id,
        chrono::Duration::hours(1),
    )
    .expect("session token")
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
