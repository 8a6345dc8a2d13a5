// [apps/broker/tests/execute_scenarios.rs]
//! End-to-end exercises of the `/execute` pipeline against real worker
//! HTTP servers (wiremock), covering the literal scenarios this mesh's
//! contract is built around: pricing, strategy-based routing, affinity
//! loss, insufficient credits, charged task failures, and round-robin
//! under a mid-sequence health flip.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zakuro_broker::config::BrokerConfig;
use zakuro_broker::routes::build_router;
use zakuro_broker::state::AppState;
use zakuro_models::worker::{HardwareDescriptor, Pricing, Resources};
use zakuro_registry::ProbeSample;

fn test_config() -> BrokerConfig {
    BrokerConfig {
        port: 0,
        peers: String::new(),
        p2p_enabled: false,
        database_url: None,
        turso_auth_token: None,
        worker_auth_token: None,
        discovery_interval_secs: 5,
        reservation_ttl_secs: 300,
        instance_ttl_secs: 1800,
        worker_expire_secs: 300,
    }
}

fn sample(name: &str, pricing: Pricing, cpus_total: f64) -> ProbeSample {
    sample_with_latency(name, pricing, cpus_total, 1.0)
}

/// A single `upsert_from_probe` call sets `ewma_latency_ms` to exactly
/// `rtt_ms` (the blend formula degenerates to an identity on first
/// insert), so this is the only helper the latency-sensitive scenarios need.
fn sample_with_latency(name: &str, pricing: Pricing, cpus_total: f64, rtt_ms: f64) -> ProbeSample {
    ProbeSample {
        name: name.to_string(),
        worker_type: "cpu".to_string(),
        resources: Resources {
            cpus_total,
            cpus_available: cpus_total,
            memory_total_bytes: 4 << 30,
            memory_available_bytes: 4 << 30,
            gpus_total: 0,
            gpus_available: 0,
        },
        pricing,
        tags: vec![],
        hardware: HardwareDescriptor::default(),
        rtt_ms,
    }
}

fn pricing(cpu_price_per_sec: f64, min_charge: f64) -> Pricing {
    Pricing {
        cpu_price_per_sec,
        memory_price_per_gib_sec: 0.0,
        gpu_price_per_sec: 0.0,
        min_charge,
    }
}

async fn execute(
    router: axum::Router,
    user: &str,
    requirements: Option<Value>,
    instance_action: Option<&str>,
    instance_id: Option<&str>,
    body: Vec<u8>,
) -> axum::response::Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/execute")
        .header("X-Zakuro-User", user);
    if let Some(reqs) = requirements {
        builder = builder.header("X-Zakuro-Requirements", reqs.to_string());
    }
    if let Some(action) = instance_action {
        builder = builder.header("X-Zakuro-Instance-Action", action);
    }
    if let Some(id) = instance_id {
        builder = builder.header("X-Zakuro-Instance-Id", id);
    }
    let request = builder.body(Body::from(body)).unwrap();
    router.oneshot(request).await.unwrap()
}

fn header_f64(response: &axum::response::Response, name: &str) -> f64 {
    response
        .headers()
        .get(name)
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap()
}

/// Scenario 1: one worker, price 0.001/cpu-sec, request {cpus:1, duration:2},
/// best_price. Asserts the cost header tracks the broker-observed duration
/// within a small tolerance (real wall-clock, not the client's estimate).
#[tokio::test]
async fn scenario_1_single_worker_charges_observed_duration() {
    let worker = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"result": 42}))
                .set_delay(std::time::Duration::from_millis(2000)),
        )
        .mount(&worker)
        .await;

    let state = AppState::bootstrap(test_config()).await.unwrap();
    state
        .registry
        .upsert_from_probe(&worker.address().to_string(), sample("w1", pricing(0.001, 0.0), 4.0));
    state.ledger.add("u1", 10_000_000, "seed");

    let router = build_router(state);
    let response = execute(
        router,
        "u1",
        Some(json!({"cpus": 1, "memory_bytes": 0, "gpus": 0, "estimated_duration_secs": 2, "strategy": "best_price"})),
        None,
        None,
        br#"{"func": "add", "args": [1, 2], "kwargs": {}}"#.to_vec(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cost = header_f64(&response, "X-Zakuro-Cost");
    let remaining = header_f64(&response, "X-Zakuro-Credits-Remaining");
    assert_eq!(response.headers().get("X-Zakuro-Worker").unwrap(), "w1");
    // Expected ~0.002 (1 cpu * 0.001/s * ~2s); allow for scheduling jitter
    // around the simulated 2s worker latency.
    assert!((cost - 0.002).abs() < 0.0005, "cost={cost}");
    assert!((remaining - (10.0 - cost)).abs() < 1e-6);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let decoded: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(decoded["result"], 42);
}

/// Scenario 2: two workers, cheaper-but-slower `w1` vs pricier-but-faster
/// `w2`. `best_price` must route to `w1`; `best_latency` must route to `w2`.
#[tokio::test]
async fn scenario_2_strategy_changes_routing() {
    let w1 = MockServer::start().await;
    let w2 = MockServer::start().await;
    for worker in [&w1, &w2] {
        Mock::given(method("POST"))
            .and(path("/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "ok"})))
            .mount(worker)
            .await;
    }

    let state = AppState::bootstrap(test_config()).await.unwrap();
    state.registry.upsert_from_probe(
        &w1.address().to_string(),
        sample_with_latency("w1", pricing(0.001, 0.0), 4.0, 50.0),
    );
    state.registry.upsert_from_probe(
        &w2.address().to_string(),
        sample_with_latency("w2", pricing(0.002, 0.0), 4.0, 10.0),
    );
    state.ledger.add("u1", 10_000_000, "seed");

    let best_price = execute(
        build_router(state.clone()),
        "u1",
        Some(json!({"strategy": "best_price"})),
        None,
        None,
        br#"{"func": "noop", "args": [], "kwargs": {}}"#.to_vec(),
    )
    .await;
    assert_eq!(best_price.headers().get("X-Zakuro-Worker").unwrap(), "w1");

    let best_latency = execute(
        build_router(state),
        "u1",
        Some(json!({"strategy": "best_latency"})),
        None,
        None,
        br#"{"func": "noop", "args": [], "kwargs": {}}"#.to_vec(),
    )
    .await;
    assert_eq!(best_latency.headers().get("X-Zakuro-Worker").unwrap(), "w2");
}

/// Scenario 3: `create_instance` binds `inst_A` to `w1`; once `w1` goes
/// unhealthy, a `call_method` against `inst_A` fails with `AffinityLost`
/// and never reaches the ledger.
#[tokio::test]
async fn scenario_3_affinity_lost_when_owning_worker_unhealthy() {
    let worker = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"instance_id": "inst_A"})))
        .mount(&worker)
        .await;

    let state = AppState::bootstrap(test_config()).await.unwrap();
    let endpoint = worker.address().to_string();
    state.registry.upsert_from_probe(&endpoint, sample("w1", pricing(0.001, 0.0), 4.0));
    state.ledger.add("u1", 10_000_000, "seed");

    let created = execute(
        build_router(state.clone()),
        "u1",
        None,
        None,
        None,
        br#"{"action": "create_instance", "instance_id": "inst_A", "klass": "Counter", "args": [], "kwargs": {}}"#.to_vec(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::OK);
    assert_eq!(state.affinity.len(), 1);
    let balance_before_call = state.ledger.balance_micros("u1");

    state.registry.mark_unhealthy(&endpoint);

    let called = execute(
        build_router(state.clone()),
        "u1",
        None,
        Some("call_method"),
        Some("inst_A"),
        br#"{"action": "call_method", "instance_id": "inst_A", "method": "incr", "args": [], "kwargs": {}}"#.to_vec(),
    )
    .await;

    assert_eq!(called.status(), StatusCode::GONE);
    assert_eq!(state.ledger.balance_micros("u1"), balance_before_call);
}

/// Scenario 4: a user with balance below the pre-authorization upper bound
/// is rejected with 402 before the worker is ever contacted.
#[tokio::test]
async fn scenario_4_insufficient_credits_never_contacts_worker() {
    let state = AppState::bootstrap(test_config()).await.unwrap();
    // Never-dialed endpoint: the reservation must fail before any attempt
    // to reach it.
    state
        .registry
        .upsert_from_probe("127.0.0.1:1", sample("w1", pricing(0.01, 0.0), 4.0));
    state.ledger.add("u2", 1_000, "seed");

    let response = execute(
        build_router(state.clone()),
        "u2",
        None,
        None,
        None,
        br#"{"func": "add", "args": [1, 2], "kwargs": {}}"#.to_vec(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(state.ledger.balance_micros("u2"), 1_000);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let decoded: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(decoded["error"]["error_type"], "InsufficientCredits");
}

/// Scenario 5: the worker runs for ~500ms and returns a task-level error
/// encoded in a 200 body. The broker still settles the compute that ran.
#[tokio::test]
async fn scenario_5_task_error_still_settles_observed_cost() {
    let worker = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"error": {"error_type": "ValueError", "message": "boom"}}))
                .set_delay(std::time::Duration::from_millis(500)),
        )
        .mount(&worker)
        .await;

    let state = AppState::bootstrap(test_config()).await.unwrap();
    state
        .registry
        .upsert_from_probe(&worker.address().to_string(), sample("w1", pricing(0.004, 0.0001), 4.0));
    state.ledger.add("u1", 10_000_000, "seed");

    let response = execute(
        build_router(state),
        "u1",
        None,
        None,
        None,
        br#"{"func": "raise", "args": [], "kwargs": {}}"#.to_vec(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cost = header_f64(&response, "X-Zakuro-Cost");
    // max(min_charge, 0.5s * 1cpu * 0.004/s) = max(0.0001, 0.002) = 0.002
    assert!((cost - 0.002).abs() < 0.0008, "cost={cost}");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let decoded: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(decoded["error"]["error_type"], "ValueError");
}

/// Scenario 6: round-robin over three workers cycles `w1,w2,w3,...`; once
/// `w2` goes unhealthy mid-sequence, the rotation skips it without
/// resetting the cursor.
#[tokio::test]
async fn scenario_6_round_robin_skips_unhealthy_mid_sequence() {
    let mut servers = Vec::new();
    for _ in 0..3 {
        servers.push(MockServer::start().await);
    }
    // Name workers in ascending endpoint order so the selector's
    // endpoint-sorted round-robin indexing lines up with w1 < w2 < w3,
    // independent of which OS-assigned port landed where.
    servers.sort_by_key(|s| s.address().to_string());

    let state = AppState::bootstrap(test_config()).await.unwrap();
    let mut endpoints = Vec::new();
    for (i, worker) in servers.iter().enumerate() {
        let name = format!("w{}", i + 1);
        Mock::given(method("POST"))
            .and(path("/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "ok"})))
            .mount(worker)
            .await;
        let endpoint = worker.address().to_string();
        state.registry.upsert_from_probe(&endpoint, sample(&name, pricing(0.001, 0.0), 4.0));
        endpoints.push(endpoint);
    }
    state.ledger.add("u1", 10_000_000, "seed");

    let mut order = Vec::new();
    for i in 0..9 {
        if i == 4 {
            state.registry.mark_unhealthy(&endpoints[1]);
        }
        let response = execute(
            build_router(state.clone()),
            "u1",
            Some(json!({"strategy": "round_robin"})),
            None,
            None,
            br#"{"func": "noop", "args": [], "kwargs": {}}"#.to_vec(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        order.push(
            response
                .headers()
                .get("X-Zakuro-Worker")
                .unwrap()
                .to_str()
                .unwrap()
                .to_string(),
        );
    }

    assert_eq!(
        order,
        vec!["w1", "w2", "w3", "w1", "w3", "w1", "w3", "w1", "w3"]
    );
}
