use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use once_cell::sync::Lazy;
use reqwest::{redirect::Policy, Client, Response};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

// "alice:secret" / "bob:secret" etc.
const ALICE: &str = "Basic YWxpY2U6c2VjcmV0";
const BOB: &str = "Basic Ym9iOnNlY3JldA==";
const GHOST: &str = "Basic Z2hvc3Q6c2VjcmV0";
const FLAKY: &str = "Basic Zmxha3k6c2VjcmV0";
const NOAUDIT: &str = "Basic bm9hdWRpdDpzZWNyZXQ=";

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));
static UPSTREAM: Lazy<String> = Lazy::new(spawn_upstream);

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Stand-in for the auth and GraphQL endpoints, on its own runtime thread so
/// it outlives any single test.
fn spawn_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind upstream");
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("upstream runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let app = Router::new()
                .route("/auth", post(mock_auth))
                .route("/graphql", post(mock_graphql));
            axum::serve(listener, app).await.unwrap();
        });
    });

    format!("http://{addr}")
}

async fn mock_auth(headers: HeaderMap) -> axum::response::Response {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    match auth {
        ALICE => Json(json!("token-alice")).into_response(),
        BOB => Json(json!({ "token": "token-alice" })).into_response(),
        GHOST => Json(json!("token-ghost")).into_response(),
        FLAKY => Json(json!("token-flaky")).into_response(),
        NOAUDIT => Json(json!("token-noaudit")).into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "User does not exist or password incorrect" })),
        )
            .into_response(),
    }
}

async fn mock_graphql(headers: HeaderMap, Json(body): Json<Value>) -> axum::response::Response {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();
    let query = body["query"].as_str().unwrap_or_default();
    let is_audit = query.contains("audit(");

    match (token.as_str(), is_audit) {
        ("token-flaky", _) => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        ("token-ghost", false) => Json(json!({ "data": { "user": [] } })).into_response(),
        ("token-noaudit", true) => {
            Json(json!({ "errors": [{ "message": "field 'audit' not found" }] })).into_response()
        }
        (_, false) => Json(profile_payload()).into_response(),
        (_, true) => {
            assert!(query.contains("_eq: 42"), "audit query must use the user id");
            Json(audit_payload()).into_response()
        }
    }
}

fn profile_payload() -> Value {
    json!({
        "data": {
            "user": [{
                "id": 42,
                "login": "alice",
                "auditRatio": 1.5,
                "totalUp": 1500000,
                "totalDown": 1000000,
                "attrs": { "firstName": "Alice", "lastName": "Liddell", "gender": "Female" }
            }],
            "transaction_aggregate": { "aggregate": { "sum": { "amount": 1500000 } } },
            "progressionSkill": [{
                "transactions": [
                    { "type": "skill_front", "amount": 40 },
                    { "type": "skill_front", "amount": 20 },
                    { "type": "skill_go", "amount": 10 }
                ]
            }],
            "recentProj": [
                { "object": { "type": "project", "name": "graphql" } },
                { "object": { "type": "project", "name": "forum" } }
            ]
        }
    })
}

fn audit_payload() -> Value {
    let audit = |at: Value, path: &str, login: &str, code: Value| {
        json!({
            "createdAt": "2024-04-30T09:00:00+00:00",
            "auditedAt": at,
            "group": {
                "path": path,
                "captain": { "id": 1, "firstName": "X", "lastName": "Y", "login": login }
            },
            "private": { "code": code }
        })
    };
    json!({
        "data": {
            "audit": [
                audit(json!("2024-05-02T10:00:00+00:00"), "/bahrain/bh-module/forum", "amy", json!("c0de")),
                audit(json!("2024-05-01T10:00:00+00:00"), "/bahrain/bh-module/ascii-art", "ben", json!("")),
                { "auditedAt": null, "group": null, "private": null },
                audit(Value::Null, "/bahrain/bh-module/groupie-tracker", "cat", json!("c0de"))
            ]
        }
    })
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/login")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let upstream = UPSTREAM.as_str();
    let child = Command::new(env!("CARGO_BIN_EXE_profile_dashboard"))
        .env("PORT", port.to_string())
        .env("AUTH_URL", format!("{upstream}/auth"))
        .env("GRAPHQL_URL", format!("{upstream}/graphql"))
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

fn client() -> Client {
    Client::builder().redirect(Policy::none()).build().unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Signs in and returns the `name=value` part of the session cookie.
async fn sign_in(base_url: &str, username: &str) -> String {
    let response = client()
        .post(format!("{base_url}/login"))
        .form(&[("username", username), ("password", "secret")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile");
    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|value| value.to_str().ok())
        .expect("session cookie");
    cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn http_bad_credentials_show_generic_message() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = client()
        .post(format!("{}/login", server.base_url))
        .form(&[("username", "mallory"), ("password", "guess")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get("set-cookie").is_none());
    assert!(response.headers().get("location").is_none());
    let body = response.text().await.unwrap();
    assert!(body.contains("Invalid username or password"));
    assert!(!body.contains("password incorrect"));
}

#[tokio::test]
async fn http_profile_without_session_redirects_to_login() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = client()
        .get(format!("{}/profile", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let root = client().get(format!("{}/", server.base_url)).send().await.unwrap();
    assert_eq!(location(&root), "/login");
}

#[tokio::test]
async fn http_profile_renders_every_section() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let cookie = sign_in(&server.base_url, "alice").await;

    let root = client()
        .get(format!("{}/", server.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(location(&root), "/profile");

    let response = client()
        .get(format!("{}/profile?width=600", server.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Welcome, Alice Liddell (alice)!"));
    assert!(html.contains("1.5 MB"));
    assert!(html.contains("1.5 - It&#39;s good"));
    assert!(html.contains(">Frontend</text>"));
    assert!(html.contains("1. graphql"));
    assert!(html.contains("amy - forum"));
    assert!(html.contains(r#"class="status-pass""#));
    assert!(html.contains(r#"class="status-fail""#));
    assert!(html.contains(r#"class="status-pending""#));
}

#[tokio::test]
async fn http_api_profile_exposes_chart_geometry() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let cookie = sign_in(&server.base_url, "bob").await;

    let view: Value = client()
        .get(format!("{}/api/profile?width=600", server.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(view["xp_total"], "1.5 MB");
    assert_eq!(view["chart_width"], 600);
    assert_eq!(view["skills"][0]["name"], "frontend");
    assert_eq!(view["skills"][0]["amount"], 60.0);
    assert_eq!(view["radar"]["axes"].as_array().unwrap().len(), 2);
    assert_eq!(view["radar"]["rings"].as_array().unwrap().len(), 10);
    assert_eq!(view["ratio"]["done"]["width"], 500.0);
    assert_eq!(view["ratio"]["done"]["label"], "1.50 MB ↑");
    assert_eq!(view["ratio"]["received"]["label"], "1.00 MB ↓");

    let audits = view["audits"].as_array().unwrap();
    assert_eq!(audits.len(), 3);
    assert_eq!(audits[0]["title"], "amy - forum");
    assert_eq!(audits[0]["status"], "pass");
    assert_eq!(audits[1]["status"], "fail");
    assert_eq!(audits[2]["status"], "pending");
}

#[tokio::test]
async fn http_missing_user_clears_session() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let cookie = sign_in(&server.base_url, "ghost").await;

    let response = client()
        .get(format!("{}/profile", server.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let root = client()
        .get(format!("{}/", server.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(location(&root), "/login");
}

#[tokio::test]
async fn http_query_failure_clears_session() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let cookie = sign_in(&server.base_url, "flaky").await;

    let response = client()
        .get(format!("{}/api/profile", server.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let root = client()
        .get(format!("{}/", server.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(location(&root), "/login");
}

#[tokio::test]
async fn http_bad_audit_response_degrades_without_redirect() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let cookie = sign_in(&server.base_url, "noaudit").await;

    let response = client()
        .get(format!("{}/profile", server.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Audit history is unavailable"));
    assert!(html.contains("Welcome, Alice Liddell (alice)!"));
}

#[tokio::test]
async fn http_logout_drops_the_token() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let cookie = sign_in(&server.base_url, "alice").await;

    let response = client()
        .post(format!("{}/logout", server.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let profile = client()
        .get(format!("{}/profile", server.base_url))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(location(&profile), "/login");
}
