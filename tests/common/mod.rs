use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use bikeshop_api::{
    auth::{AuthConfig, AuthService, Claims},
    config::AppConfig,
    db,
    entities::{bike, bike_type, owner, user_profile, work_order},
    AppState,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str =
    "Xk29fLq8Rz4VwN7tBp3HsJ6yMd1GcQe5UoA0iKlZxCvTbYnWgPrEjDhFuOaSm8Lw";

/// Bike seeded with an owner and a type
pub const SEEDED_BIKE_ID: i32 = 5;
/// Second seeded bike, used to move work orders between bikes
pub const OTHER_BIKE_ID: i32 = 6;
/// Seeded staff member
pub const SEEDED_MECHANIC_ID: i32 = 1;

/// Helper harness for spinning up an application backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_JWT_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single connection keeps every query on the same in-memory database
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::create_schema(&pool)
            .await
            .expect("failed to create test schema");

        let state = AppState::new(Arc::new(pool), cfg.clone());
        let auth_service = Arc::new(AuthService::new(AuthConfig::from(&cfg)));
        let router = bikeshop_api::build_router(state.clone(), auth_service, CorsLayer::permissive());

        let token = encode_token(&cfg, chrono::Duration::hours(1));

        let app = Self {
            router,
            state,
            token,
        };
        app.seed_reference_data().await;
        app
    }

    async fn seed_reference_data(&self) {
        let db = self.state.db.as_ref();

        owner::ActiveModel {
            id: Set(1),
            name: Set("Grace Hopper".to_string()),
            address: Set(Some("12 Harbor Rd".to_string())),
            email: Set(Some("grace@example.com".to_string())),
            telephone: Set(None),
        }
        .insert(db)
        .await
        .expect("seed owner");

        bike_type::ActiveModel {
            id: Set(1),
            name: Set("Road".to_string()),
        }
        .insert(db)
        .await
        .expect("seed bike type");

        user_profile::ActiveModel {
            id: Set(SEEDED_MECHANIC_ID),
            first_name: Set("Linus".to_string()),
            last_name: Set("Wrench".to_string()),
            address: Set(None),
            email: Set(Some("linus@bikeshop.test".to_string())),
        }
        .insert(db)
        .await
        .expect("seed user profile");

        for (id, color) in [(SEEDED_BIKE_ID, "Red"), (OTHER_BIKE_ID, "Blue")] {
            bike::ActiveModel {
                id: Set(id),
                brand: Set("Bianchi".to_string()),
                color: Set(color.to_string()),
                owner_id: Set(1),
                bike_type_id: Set(1),
            }
            .insert(db)
            .await
            .expect("seed bike");
        }
    }

    /// Inserts a work order directly, bypassing the service clock.
    pub async fn insert_work_order(
        &self,
        description: &str,
        user_profile_id: Option<i32>,
        date_initiated: DateTime<Utc>,
        date_completed: Option<DateTime<Utc>>,
    ) -> work_order::Model {
        work_order::ActiveModel {
            description: Set(description.to_string()),
            bike_id: Set(SEEDED_BIKE_ID),
            user_profile_id: Set(user_profile_id),
            date_initiated: Set(date_initiated),
            date_completed: Set(date_completed),
            ..Default::default()
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("insert work order")
    }

    /// Access the bearer token for the default user.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for authenticated JSON requests.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body, Some(self.token())).await
    }
}

/// Signs a token the way the external identity provider would.
pub fn encode_token(cfg: &AppConfig, lifetime: chrono::Duration) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: "mechanic-1".to_string(),
        name: Some("Linus Wrench".to_string()),
        email: Some("linus@bikeshop.test".to_string()),
        jti: Some(Uuid::new_v4().to_string()),
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
        iss: cfg.jwt_issuer.clone(),
        aud: cfg.jwt_audience.clone(),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(cfg.jwt_secret.as_bytes()),
    )
    .expect("encode access token")
}

/// Reads a response body as JSON.
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is json")
}
