//! Common test utilities for integration tests.
//!
//! Provides a `TestContext` with a database pool, a built router, a test
//! user with a signed token, and helpers for creating vehicles and spaces.
//!
//! Requires a running PostgreSQL reachable through `DATABASE_URL` (plus
//! `JWT_SECRET`); tests that hit the database are `#[ignore]`d so the
//! suite still passes without one.

use axum::body::Body;
use axum::http::{Request, Response};
use parqueo_api::app::{build_router, AppState};
use parqueo_api::config::Config;
use parqueo_shared::auth::jwt::{create_token, Claims};
use parqueo_shared::models::space::ParkingSpace;
use parqueo_shared::models::user::{CreateUser, User};
use parqueo_shared::models::vehicle::{CreateVehicle, Vehicle};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
    /// Unique prefix for spaces created by this context, so cleanup can
    /// remove them without touching other tests' rows.
    space_prefix: String,
    space_seq: std::sync::atomic::AtomicU32,
}

impl TestContext {
    /// Creates a new test context with a fresh user and a signed token.
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to Cargo.toml, not this file.
        sqlx::migrate!("../migrations").run(&db).await?;

        let password_hash =
            parqueo_shared::auth::password::hash_password("test-password-123")?;

        let user = User::create(
            &db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                nombre: "Test User".to_string(),
                telefono: "".to_string(),
                password_hash,
            },
        )
        .await?;

        let claims = Claims::new(user.id, user.email.clone());
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
            space_prefix: format!("T-{}", &Uuid::new_v4().simple().to_string()[..8]),
            space_seq: std::sync::atomic::AtomicU32::new(0),
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Creates a vehicle owned by the test user.
    pub async fn create_vehicle(&self, placa: &str) -> anyhow::Result<Vehicle> {
        let vehicle = Vehicle::create(
            &self.db,
            self.user.id,
            CreateVehicle {
                placa: placa.to_string(),
                marca: "Toyota".to_string(),
                modelo: "Corolla".to_string(),
                color: "gris".to_string(),
            },
        )
        .await?;
        Ok(vehicle)
    }

    /// Creates an available parking space with a unique number.
    pub async fn create_space(&self) -> anyhow::Result<ParkingSpace> {
        let seq = self
            .space_seq
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let numero = format!("{}-{:03}", self.space_prefix, seq);
        let space = ParkingSpace::create(&self.db, &numero, 1, "automovil").await?;
        Ok(space)
    }

    /// Sends a request through the router and returns the response.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app
            .clone()
            .call(request)
            .await
            .expect("router call is infallible")
    }

    /// Cleans up test data. Deleting the user cascades to vehicles and
    /// reservations; spaces are removed by prefix.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM espacios_parqueadero WHERE numero LIKE $1")
            .bind(format!("{}%", self.space_prefix))
            .execute(&self.db)
            .await?;

        sqlx::query("DELETE FROM usuarios WHERE id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}

/// Builds an authenticated JSON request.
pub fn json_request(
    ctx: &TestContext,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds an authenticated request with an empty body.
pub fn empty_request(ctx: &TestContext, method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap()
}

/// Reads a response body as JSON.
pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
