use axum::http::{self, Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http_body_util::BodyExt;
use mock_server::{app, ErrorRecord, AGENT_KEY, API_KEY};
use serde_json::{json, Value};
use tower::ServiceExt;

fn authorization() -> String {
    format!("Basic {}", STANDARD.encode(format!("{AGENT_KEY}:{API_KEY}")))
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, authorization())
        .body(String::new())
        .unwrap()
}

fn post(uri: &str, body: Option<Value>) -> Request<String> {
    let builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::AUTHORIZATION, authorization());
    match body {
        Some(body) => builder
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .unwrap(),
        None => builder.body(String::new()).unwrap(),
    }
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

async fn send(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn create_customer(app: &Router, reference: &str) {
    let resp = send(
        app,
        post(
            "/v1/Customer",
            Some(json!({"ReferenceCustomer": reference, "Email": "ada@example.com"})),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- auth ---

#[tokio::test]
async fn missing_credentials_return_401_record() {
    let resp = app()
        .oneshot(Request::builder().uri("/v1/Features").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let record: ErrorRecord = body_json(resp).await;
    assert_eq!(record.code, "Error.Api.Unauthorized");
}

#[tokio::test]
async fn wrong_credentials_return_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v1/Features")
                .header(http::header::AUTHORIZATION, "Basic d3Jvbmc6a2V5")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- customers ---

#[tokio::test]
async fn save_and_retrieve_customer() {
    let app = app();
    create_customer(&app, "cust-42").await;

    let resp = send(&app, get("/v1/Customer?ReferenceCustomer=cust-42")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let customer: Value = body_json(resp).await;
    assert_eq!(customer["ReferenceCustomer"], "cust-42");
    assert_eq!(customer["Email"], "ada@example.com");
    assert_eq!(customer["Id"], 1);
}

#[tokio::test]
async fn save_customer_updates_in_place() {
    let app = app();
    create_customer(&app, "cust-42").await;
    let resp = send(
        &app,
        post("/v1/Customer", Some(json!({"ReferenceCustomer": "cust-42", "Name": "Ada"}))),
    )
    .await;
    let customer: Value = body_json(resp).await;
    assert_eq!(customer["Id"], 1);
    assert_eq!(customer["Name"], "Ada");
    assert_eq!(customer["Email"], "ada@example.com");
}

#[tokio::test]
async fn invalid_customer_returns_422_array() {
    let resp = app()
        .oneshot(post("/v1/Customer", Some(json!({"Email": "not-an-email"}))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let errors: Vec<ErrorRecord> = body_json(resp).await;
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].field.as_deref(), Some("ReferenceCustomer"));
    assert_eq!(errors[1].field.as_deref(), Some("Email"));
}

#[tokio::test]
async fn unknown_customer_returns_404_record() {
    let resp = app()
        .oneshot(get("/v1/Customer?ReferenceCustomer=ghost"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let record: ErrorRecord = body_json(resp).await;
    assert_eq!(record.code, "Error.Customer.NotFound");
}

#[tokio::test]
async fn empty_customer_list_returns_204() {
    let resp = app().oneshot(get("/v1/Customers")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn customer_list_is_paginated() {
    let app = app();
    for i in 0..3 {
        create_customer(&app, &format!("cust-{i}")).await;
    }
    let resp = send(&app, get("/v1/Customers?Page=2&SizePage=2")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = body_json(resp).await;
    assert_eq!(page["Page"], 2);
    assert_eq!(page["Count"], 1);
    assert_eq!(page["TotalItems"], 3);
    assert_eq!(page["Items"][0]["ReferenceCustomer"], "cust-2");
}

#[tokio::test]
async fn billing_address_lifecycle() {
    let app = app();
    create_customer(&app, "cust-42").await;

    let resp = send(&app, get("/v1/CustomerBillingAddress?ReferenceCustomer=cust-42")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(
        &app,
        post(
            "/v1/CustomerBillingAddress?ReferenceCustomer=cust-42",
            Some(json!({"City": "Lyon", "Country": "FR"})),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&app, get("/v1/CustomerBillingAddress?ReferenceCustomer=cust-42")).await;
    let address: Value = body_json(resp).await;
    assert_eq!(address["City"], "Lyon");
}

// --- features and usages ---

#[tokio::test]
async fn visible_features_only() {
    let resp = app()
        .oneshot(get("/v1/Features?IsVisible=true"))
        .await
        .unwrap();
    let page: Value = body_json(resp).await;
    let refs: Vec<&str> = page["Items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["ReferenceFeature"].as_str().unwrap())
        .collect();
    assert_eq!(refs, vec!["seats", "api-calls", "sso"]);
}

#[tokio::test]
async fn usage_increment_accumulates() {
    let app = app();
    create_customer(&app, "cust-42").await;
    for _ in 0..2 {
        let resp = send(
            &app,
            post(
                "/v1/Usage",
                Some(json!({
                    "ReferenceCustomer": "cust-42",
                    "ReferenceFeature": "api-calls",
                    "Increment": 5,
                    "DateStamp": "2024-03-01T12:00:00Z"
                })),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
    let resp = send(
        &app,
        get("/v1/Feature?ReferenceFeature=api-calls&ReferenceCustomer=cust-42"),
    )
    .await;
    let feature: Value = body_json(resp).await;
    assert_eq!(feature["QuantityCurrent"], 10);
}

#[tokio::test]
async fn usage_without_date_stamp_is_rejected() {
    let app = app();
    create_customer(&app, "cust-42").await;
    let resp = send(
        &app,
        post(
            "/v1/Usage",
            Some(json!({
                "ReferenceCustomer": "cust-42",
                "ReferenceFeature": "seats",
                "Increment": 1
            })),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let errors: Vec<ErrorRecord> = body_json(resp).await;
    assert_eq!(errors[0].field.as_deref(), Some("DateStamp"));
}

// --- subscriptions ---

#[tokio::test]
async fn create_subscription_without_references_reports_both() {
    let resp = app()
        .oneshot(post("/v1/Subscription", Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let errors: Vec<ErrorRecord> = body_json(resp).await;
    assert_eq!(errors.len(), 2);
}

#[tokio::test]
async fn subscription_lifecycle() {
    let app = app();
    create_customer(&app, "cust-42").await;

    let resp = send(
        &app,
        post(
            "/v1/Subscription",
            Some(json!({"ReferenceCustomer": "cust-42", "ReferenceOffer": "pro-monthly"})),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = body_json(resp).await;
    assert_eq!(created["StateSubscription"], "InitiatedAgent");
    let id = created["Id"].as_i64().unwrap();

    let resp = send(&app, post(&format!("/v1/Subscription/{id}/Start"), None)).await;
    let started: Value = body_json(resp).await;
    assert_eq!(started["StateSubscription"], "Running");

    let resp = send(
        &app,
        post(
            &format!("/v1/Subscription/{id}/Suspension?StateSubscription=SuspendedAgent"),
            None,
        ),
    )
    .await;
    let suspended: Value = body_json(resp).await;
    assert_eq!(suspended["StateSubscription"], "SuspendedAgent");

    let resp = send(
        &app,
        post(&format!("/v1/Subscription/{id}/Termination?Immediate=true"), None),
    )
    .await;
    let terminated: Value = body_json(resp).await;
    assert_eq!(terminated["StateSubscription"], "TerminatedAgent");

    let resp = send(&app, post(&format!("/v1/Subscription/{id}/Start"), None)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_subscription_is_bare_404() {
    let resp = app()
        .oneshot(get("/v1/Subscription?IdSubscription=999"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn ensure_billable_requires_address() {
    let app = app();
    create_customer(&app, "cust-42").await;
    let resp = send(
        &app,
        post(
            "/v1/Subscription?ensureBillable=true",
            Some(json!({"ReferenceCustomer": "cust-42", "ReferenceOffer": "pro-monthly"})),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let errors: Vec<ErrorRecord> = body_json(resp).await;
    assert_eq!(errors[0].code, "Error.Api.Customer.NotBillable");
}

#[tokio::test]
async fn date_term_in_past_is_rejected() {
    let app = app();
    create_customer(&app, "cust-42").await;
    let resp = send(
        &app,
        post(
            "/v1/Subscription",
            Some(json!({"ReferenceCustomer": "cust-42", "ReferenceOffer": "free"})),
        ),
    )
    .await;
    let id = body_json::<Value>(resp).await["Id"].as_i64().unwrap();

    let resp = send(
        &app,
        post(
            &format!("/v1/Subscription/{id}/DateTerm"),
            Some(json!({"DateTerm": "2001-01-01T00:00:00Z"})),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
