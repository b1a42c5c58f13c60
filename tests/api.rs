//! End-to-end tests against an in-process mock backend

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use url::Url;

use fuel_log::api::auth::{AuthApi, Registration, LOGIN_FALLBACK};
use fuel_log::api::client::ApiClient;
use fuel_log::api::fuel_logs::FuelLogApi;
use fuel_log::api::vehicles::{Vehicle, VehicleApi, VehicleId};
use fuel_log::core::credentials::{FileBackend, MemoryBackend};
use fuel_log::core::session::SessionStore;
use fuel_log::error::FuelLogError;
use fuel_log::workflow::fuel_log::{FetchOutcome, FuelLogWorkflow, Phase};
use fuel_log::workflow::validation::ValidationError;

const TOKEN: &str = "tok-123";

// ─── Mock backend ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Recorded {
    method: &'static str,
    path: String,
    authorization: Option<String>,
    body: Option<Value>,
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockState {
    fn record(&self, method: &'static str, path: String, headers: &HeaderMap, body: Option<Value>) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(Recorded {
            method,
            path,
            authorization,
            body,
        });
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn last(&self) -> Recorded {
        self.requests().last().cloned().expect("no request recorded")
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some("Bearer tok-123")
}

async fn login(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.record("POST", "/v1/customer/login".to_string(), &headers, None);

    let email = params.get("email").map(String::as_str);
    let password = params.get("password").map(String::as_str);
    if email == Some("driver@example.com") && password == Some("s3cret & more") {
        (StatusCode::OK, TOKEN).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response()
    }
}

async fn register(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let taken = body["email"] == "taken@example.com";
    state.record("POST", "/customer/add".to_string(), &headers, Some(body));

    if taken {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Email already registered" })),
        )
            .into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}

async fn vehicles(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.record("GET", "/vehicles".to_string(), &headers, None);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([
        { "vehicleId": "V1", "make": "Toyota", "plateNumber": "ABC-123" },
        { "vehicleId": 2, "make": "Ford", "plateNumber": "XYZ-789" }
    ]))
    .into_response()
}

async fn latest_odometer(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(vehicle_id): Path<String>,
) -> Response {
    state.record("GET", format!("/fuel-logs/latest/{}", vehicle_id), &headers, None);
    match vehicle_id.as_str() {
        "V1" => Json(json!({ "odometer": 10000 })).into_response(),
        "EMPTY" => (StatusCode::OK, "").into_response(),
        "AB/12" => Json(json!({ "odometer": 777 })).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn add_fuel_log(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let ok = authorized(&headers);
    state.record("POST", "/fuel-logs".to_string(), &headers, Some(body));
    if ok {
        StatusCode::CREATED.into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "late"
}

async fn broken() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Database unavailable" })),
    )
        .into_response()
}

async fn malformed() -> &'static str {
    "[{\"vehicleId\": "
}

async fn spawn_backend() -> (Url, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/api/v1/customer/login", post(login))
        .route("/api/customer/add", post(register))
        .route("/api/vehicles", get(vehicles))
        .route("/api/fuel-logs/latest/{vehicle_id}", get(latest_odometer))
        .route("/api/fuel-logs", post(add_fuel_log))
        .route("/api/slow", get(slow))
        .route("/api/broken", get(broken))
        .route("/api/malformed", get(malformed))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base = Url::parse(&format!("http://{}/api", addr)).unwrap();
    (base, state)
}

fn client_for(base: &Url, session: SessionStore) -> ApiClient {
    ApiClient::new(base.clone(), Arc::new(session), Duration::from_secs(5)).unwrap()
}

fn password() -> SecretString {
    SecretString::from("s3cret & more")
}

// ─── Session and authentication ──────────────────────────────────────────────

#[tokio::test]
async fn test_login_token_survives_restart() {
    let (base, state) = spawn_backend().await;
    let storage = MemoryBackend::new();

    let client = client_for(&base, SessionStore::new(Box::new(storage.clone())));
    let outcome = AuthApi::new(&client)
        .login("driver@example.com", &password())
        .await
        .unwrap();
    assert!(outcome.persisted);

    // Login itself goes out without credentials
    let login = state.last();
    assert_eq!(login.path, "/v1/customer/login");
    assert_eq!(login.authorization, None);

    // Simulated restart: a fresh store over the same storage
    let restarted = client_for(&base, SessionStore::new(Box::new(storage)));
    let vehicles = VehicleApi::new(&restarted).list().await.unwrap();
    assert_eq!(vehicles.len(), 2);
    assert_eq!(state.last().authorization.as_deref(), Some("Bearer tok-123"));
}

#[tokio::test]
async fn test_login_token_survives_restart_with_file_backend() {
    let (base, state) = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let client = client_for(&base, SessionStore::new(Box::new(FileBackend::new(&path))));
    AuthApi::new(&client)
        .login("driver@example.com", &password())
        .await
        .unwrap();
    drop(client);

    let restarted = client_for(&base, SessionStore::new(Box::new(FileBackend::new(&path))));
    assert_eq!(
        restarted.session().get_credential().unwrap().expose_secret(),
        TOKEN
    );
    VehicleApi::new(&restarted).list().await.unwrap();
    assert!(authorized_request(&state.last()));
}

fn authorized_request(request: &Recorded) -> bool {
    request.authorization.as_deref() == Some("Bearer tok-123")
}

#[tokio::test]
async fn test_logout_stops_sending_credentials() {
    let (base, state) = spawn_backend().await;
    let client = client_for(&base, SessionStore::in_memory());
    let auth = AuthApi::new(&client);

    auth.login("driver@example.com", &password()).await.unwrap();
    VehicleApi::new(&client).list().await.unwrap();
    assert!(authorized_request(&state.last()));

    auth.logout().unwrap();
    let err = VehicleApi::new(&client).list().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(state.last().authorization, None);
}

#[tokio::test]
async fn test_login_failure_surfaces_backend_message() {
    let (base, _state) = spawn_backend().await;
    let client = client_for(&base, SessionStore::in_memory());

    let err = AuthApi::new(&client)
        .login("driver@example.com", &SecretString::from("wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, FuelLogError::Api { status: 401, .. }));
    assert_eq!(err.user_message(LOGIN_FALLBACK), "Invalid credentials");
    assert!(!client.session().has_credential());
}

#[tokio::test]
async fn test_register_sends_account_details() {
    let (base, state) = spawn_backend().await;
    let client = client_for(&base, SessionStore::in_memory());

    let registration = Registration {
        firstname: "Ada".to_string(),
        lastname: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        dob: "1990-12-10".to_string(),
        password: SecretString::from("hunter22"),
    };
    AuthApi::new(&client).register(&registration).await.unwrap();

    let request = state.last();
    assert_eq!(request.path, "/customer/add");
    assert_eq!(request.body.unwrap()["email"], "ada@example.com");

    let taken = Registration {
        email: "taken@example.com".to_string(),
        ..registration
    };
    let err = AuthApi::new(&client).register(&taken).await.unwrap_err();
    assert_eq!(err.user_message("fallback"), "Email already registered");
}

// ─── Error classification ────────────────────────────────────────────────────

#[tokio::test]
async fn test_timeout_maps_to_network() {
    let (base, _state) = spawn_backend().await;
    let client = ApiClient::new(
        base,
        Arc::new(SessionStore::in_memory()),
        Duration::from_millis(200),
    )
    .unwrap();

    let err = client.get("/slow").await.unwrap_err();
    assert!(matches!(err, FuelLogError::Network(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_server_maps_to_network() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let base = Url::parse(&format!("http://{}/api", addr)).unwrap();
    let client = client_for(&base, SessionStore::in_memory());

    let err = client.get("/vehicles").await.unwrap_err();
    assert!(matches!(err, FuelLogError::Network(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_server_error_carries_backend_message() {
    let (base, _state) = spawn_backend().await;
    let client = client_for(&base, SessionStore::in_memory());

    let err = client.get("/broken").await.unwrap_err();
    match err {
        FuelLogError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message.as_deref(), Some("Database unavailable"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_maps_to_decode() {
    let (base, _state) = spawn_backend().await;
    let client = client_for(&base, SessionStore::in_memory());

    let response = client.get("/malformed").await.unwrap();
    let err = response.json::<Vec<Vehicle>>().unwrap_err();
    assert!(matches!(err, FuelLogError::Decode(_)));
}

// ─── Fuel logs ───────────────────────────────────────────────────────────────

async fn logged_in_client(base: &Url) -> Arc<ApiClient> {
    let session = SessionStore::in_memory();
    session.set_credential(TOKEN).unwrap();
    Arc::new(client_for(base, session))
}

#[tokio::test]
async fn test_latest_odometer_lookup() {
    let (base, state) = spawn_backend().await;
    let client = logged_in_client(&base).await;

    let v1 = VehicleId::Text("V1".to_string());
    assert_eq!(client.latest_odometer(&v1).await.unwrap(), Some(10000));
    assert!(authorized_request(&state.last()));

    let unknown = VehicleId::Number(99);
    assert_eq!(client.latest_odometer(&unknown).await.unwrap(), None);

    let empty = VehicleId::Text("EMPTY".to_string());
    assert_eq!(client.latest_odometer(&empty).await.unwrap(), None);
}

#[tokio::test]
async fn test_latest_odometer_id_with_slash_stays_one_segment() {
    let (base, state) = spawn_backend().await;
    let client = logged_in_client(&base).await;

    let id = VehicleId::Text("AB/12".to_string());
    assert_eq!(client.latest_odometer(&id).await.unwrap(), Some(777));
    assert_eq!(state.last().path, "/fuel-logs/latest/AB/12");
}

#[tokio::test]
async fn test_dot_vehicle_id_fails_the_lookup_instead_of_skipping_the_check() {
    let (base, state) = spawn_backend().await;
    let client = logged_in_client(&base).await;
    let before = state.requests().len();

    let err = client
        .latest_odometer(&VehicleId::Text("..".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, FuelLogError::InvalidInput(_)));
    assert_eq!(state.requests().len(), before);

    let mut workflow = FuelLogWorkflow::new(client);
    let outcome = workflow
        .select_vehicle(VehicleId::Text(".".to_string()))
        .await;
    assert_eq!(outcome, Some(FetchOutcome::Failed));
    assert_eq!(workflow.phase(), Phase::FetchError);
}

#[tokio::test]
async fn test_submit_scenario_sends_contract_body() {
    let (base, state) = spawn_backend().await;
    let client = logged_in_client(&base).await;
    let mut workflow = FuelLogWorkflow::new(client);

    let outcome = workflow
        .select_vehicle(VehicleId::Text("V1".to_string()))
        .await;
    assert!(matches!(outcome, Some(FetchOutcome::Ready(_))));

    workflow.set_total_cost("45.00");
    workflow.set_price_per_unit("1.50");
    workflow.set_odometer("10050");
    workflow.set_location("Main St");
    workflow.submit().await.unwrap();
    assert_eq!(workflow.phase(), Phase::Success);

    let request = state.last();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/fuel-logs");
    assert!(authorized_request(&request));
    assert_eq!(
        request.body.unwrap(),
        json!({
            "vehicleId": "V1",
            "fuelAmount": 30.0,
            "fuelCost": 45.0,
            "location": "Main St",
            "odometer": 10050,
            "paymentMethod": "Cash"
        })
    );
}

#[tokio::test]
async fn test_odometer_below_last_reading_is_never_sent() {
    let (base, state) = spawn_backend().await;
    let client = logged_in_client(&base).await;
    let mut workflow = FuelLogWorkflow::new(client);

    workflow
        .select_vehicle(VehicleId::Text("V1".to_string()))
        .await;
    workflow.set_total_cost("45.00");
    workflow.set_price_per_unit("1.50");
    workflow.set_odometer("9999");
    workflow.set_location("Main St");

    let err = workflow.submit().await.unwrap_err();
    assert!(matches!(
        err,
        FuelLogError::Validation(ValidationError::OdometerNotIncreasing { last: 10000 })
    ));
    assert!(state.requests().iter().all(|r| r.path != "/fuel-logs"));
}
