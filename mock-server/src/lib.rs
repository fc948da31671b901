//! In-memory ProAbono API used by the client's integration tests.
//!
//! Covers customers, billing addresses, features, offers, usages and the
//! subscription lifecycle of a single segment. Error behavior mirrors the
//! hosted API: 401 with an error record on bad credentials, 422 with an
//! array of records for invalid input, 404 with a record for unknown
//! customers, a bare 404 for unknown subscriptions and 204 for empty lists.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{debug, warn};

pub const AGENT_KEY: &str = "agent-key";
pub const API_KEY: &str = "api-key";
pub const SEGMENT: &str = "default";

const ID_SEGMENT: i64 = 1;
const DEFAULT_SIZE_PAGE: usize = 10;
const MAX_SIZE_PAGE: usize = 1000;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorRecord {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorRecord {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }

    fn on(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Customer {
    pub id: i64,
    pub id_segment: i64,
    pub reference_customer: String,
    pub reference_segment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CustomerWithUsage {
    #[serde(flatten)]
    customer: Customer,
    quantity_current: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity_included: Option<i32>,
    is_enabled: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Feature {
    pub id: i64,
    pub reference_feature: String,
    pub type_feature: String,
    pub is_visible: bool,
    pub title_localized: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_included: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_current: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
}

impl Feature {
    fn is_on_off(&self) -> bool {
        self.type_feature == "OnOff"
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Offer {
    pub id: i64,
    pub id_segment: i64,
    pub reference_offer: String,
    pub reference_segment: String,
    pub name: String,
    pub currency: String,
    pub is_visible: bool,
    pub amount_recurrence: i32,
    pub duration_recurrence: i32,
    pub unit_recurrence: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Usage {
    pub id_feature: i64,
    pub id_customer: i64,
    pub id_segment: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_subscription: Option<i64>,
    pub reference_feature: String,
    pub reference_customer: String,
    pub reference_segment: String,
    pub type_feature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_current: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_included: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    pub date_stamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subscription {
    pub id: i64,
    pub id_customer: i64,
    pub id_customer_buyer: i64,
    pub id_offer: i64,
    pub id_segment: i64,
    pub reference_customer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_customer_buyer: Option<String>,
    pub reference_offer: String,
    pub reference_segment: String,
    pub state_subscription: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_localized: Option<String>,
    pub amount_recurrence: i32,
    pub duration_recurrence: i32,
    pub unit_recurrence: String,
    pub count_days_trial: i32,
    pub date_update: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_term: Option<DateTime<Utc>>,
}

impl Subscription {
    fn is_terminated(&self) -> bool {
        self.state_subscription.starts_with("Terminated")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Page<T> {
    pub page: usize,
    pub size_page: usize,
    pub count: usize,
    pub total_items: usize,
    pub items: Vec<T>,
    pub date_generated: DateTime<Utc>,
}

/// Query string members accepted across endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Params {
    #[serde(alias = "referenceCustomer")]
    pub reference_customer: Option<String>,
    pub reference_feature: Option<String>,
    pub reference_offer: Option<String>,
    pub reference_segment: Option<String>,
    pub id_subscription: Option<i64>,
    pub is_visible: Option<bool>,
    pub state_subscription: Option<String>,
    pub immediate: Option<bool>,
    pub date_termination: Option<DateTime<Utc>>,
    #[serde(rename = "tryStart")]
    pub try_start: Option<bool>,
    #[serde(rename = "ensureBillable")]
    pub ensure_billable: Option<bool>,
    pub page: Option<usize>,
    pub size_page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SaveCustomer {
    pub reference_customer: Option<String>,
    pub reference_segment: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UpdateUsage {
    pub reference_customer: Option<String>,
    pub reference_feature: Option<String>,
    pub increment: Option<i32>,
    pub quantity_current: Option<i32>,
    pub is_enabled: Option<bool>,
    pub date_stamp: Option<DateTime<Utc>>,
    pub id_subscription: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateSubscription {
    pub reference_customer: Option<String>,
    pub reference_offer: Option<String>,
    pub reference_customer_buyer: Option<String>,
    pub date_start: Option<DateTime<Utc>>,
    pub amount_recurrence: Option<i32>,
    pub duration_recurrence: Option<i32>,
    pub unit_recurrence: Option<String>,
    pub title_localized: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DateTerm {
    pub date_term: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

pub enum Failure {
    Unauthorized,
    NotFound(ErrorRecord),
    /// 404 without a body.
    Missing,
    Invalid(Vec<ErrorRecord>),
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        match self {
            Failure::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorRecord::new(
                    "Error.Api.Unauthorized",
                    "Invalid agent key or API key",
                )),
            )
                .into_response(),
            Failure::NotFound(record) => (StatusCode::NOT_FOUND, Json(record)).into_response(),
            Failure::Missing => StatusCode::NOT_FOUND.into_response(),
            Failure::Invalid(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
            }
        }
    }
}

fn invalid(record: ErrorRecord) -> Failure {
    Failure::Invalid(vec![record])
}

fn customer_not_found(reference: &str) -> Failure {
    Failure::NotFound(ErrorRecord::new(
        "Error.Customer.NotFound",
        format!("Customer '{reference}' not found"),
    ))
}

fn feature_not_found(reference: &str) -> Failure {
    Failure::NotFound(ErrorRecord::new(
        "Error.Feature.NotFound",
        format!("Feature '{reference}' not found"),
    ))
}

fn offer_not_found(reference: &str) -> Failure {
    Failure::NotFound(ErrorRecord::new(
        "Error.Offer.NotFound",
        format!("Offer '{reference}' not found"),
    ))
}

fn required(value: Option<&str>, field: &str, errors: &mut Vec<ErrorRecord>) {
    if value.is_none_or(|v| v.trim().is_empty()) {
        errors.push(
            ErrorRecord::new(
                &format!("Error.Api.{field}.Required"),
                format!("{field} is required"),
            )
            .on(field),
        );
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct UsageRecord {
    quantity: i32,
    enabled: bool,
    id_subscription: Option<i64>,
    date_stamp: DateTime<Utc>,
}

#[derive(Default)]
struct Store {
    customers: BTreeMap<String, Customer>,
    billing_addresses: HashMap<String, Value>,
    usages: BTreeMap<(String, String), UsageRecord>,
    subscriptions: BTreeMap<i64, Subscription>,
    next_customer_id: i64,
    next_subscription_id: i64,
}

impl Store {
    fn customer(&self, reference: &str) -> Result<&Customer, Failure> {
        self.customers
            .get(reference)
            .ok_or_else(|| customer_not_found(reference))
    }

    fn subscription_mut(&mut self, id: i64) -> Result<&mut Subscription, Failure> {
        self.subscriptions.get_mut(&id).ok_or(Failure::Missing)
    }

    fn usage(&self, customer: &Customer, feature: &Feature) -> Usage {
        let record = self
            .usages
            .get(&(customer.reference_customer.clone(), feature.reference_feature.clone()));
        let on_off = feature.is_on_off();
        Usage {
            id_feature: feature.id,
            id_customer: customer.id,
            id_segment: ID_SEGMENT,
            id_subscription: record.and_then(|r| r.id_subscription),
            reference_feature: feature.reference_feature.clone(),
            reference_customer: customer.reference_customer.clone(),
            reference_segment: SEGMENT.to_string(),
            type_feature: feature.type_feature.clone(),
            quantity_current: (!on_off).then(|| record.map_or(0, |r| r.quantity)),
            quantity_included: feature.quantity_included,
            is_enabled: on_off.then(|| record.is_some_and(|r| r.enabled)),
            date_stamp: record.map_or_else(Utc::now, |r| r.date_stamp),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
    authorization: Arc<str>,
}

fn features() -> Vec<Feature> {
    let feature = |id, reference: &str, kind: &str, is_visible, quantity_included| Feature {
        id,
        reference_feature: reference.to_string(),
        type_feature: kind.to_string(),
        is_visible,
        title_localized: reference.replace('-', " "),
        quantity_included,
        quantity_current: None,
        is_enabled: None,
    };
    vec![
        feature(1, "seats", "Limitation", true, Some(5)),
        feature(2, "api-calls", "Consumption", true, None),
        feature(3, "sso", "OnOff", true, None),
        feature(4, "beta", "OnOff", false, None),
    ]
}

fn find_feature(reference: &str) -> Result<Feature, Failure> {
    features()
        .into_iter()
        .find(|f| f.reference_feature == reference)
        .ok_or_else(|| feature_not_found(reference))
}

fn offers() -> Vec<Offer> {
    let offer = |id, reference: &str, amount, unit: &str| Offer {
        id,
        id_segment: ID_SEGMENT,
        reference_offer: reference.to_string(),
        reference_segment: SEGMENT.to_string(),
        name: reference.replace('-', " "),
        currency: "EUR".to_string(),
        is_visible: true,
        amount_recurrence: amount,
        duration_recurrence: 1,
        unit_recurrence: unit.to_string(),
    };
    vec![
        offer(10, "free", 0, "Month"),
        offer(11, "pro-monthly", 1900, "Month"),
        offer(12, "pro-yearly", 19000, "Year"),
    ]
}

fn find_offer(reference: &str) -> Result<Offer, Failure> {
    offers()
        .into_iter()
        .find(|o| o.reference_offer == reference)
        .ok_or_else(|| offer_not_found(reference))
}

fn paginate<T: Serialize>(items: Vec<T>, params: &Params) -> Response {
    if items.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    let page = params.page.unwrap_or(1).max(1);
    let size_page = params
        .size_page
        .unwrap_or(DEFAULT_SIZE_PAGE)
        .clamp(1, MAX_SIZE_PAGE);
    let Some(offset) = (page - 1).checked_mul(size_page) else {
        return StatusCode::NO_CONTENT.into_response();
    };
    let total_items = items.len();
    let items: Vec<T> = items.into_iter().skip(offset).take(size_page).collect();
    Json(Page {
        page,
        size_page,
        count: items.len(),
        total_items,
        items,
        date_generated: Utc::now(),
    })
    .into_response()
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Router accepting the default `AGENT_KEY` / `API_KEY` credentials.
pub fn app() -> Router {
    app_with_credentials(AGENT_KEY, API_KEY)
}

pub fn app_with_credentials(agent_key: &str, api_key: &str) -> Router {
    let token = STANDARD.encode(format!("{agent_key}:{api_key}"));
    let state = AppState {
        store: Arc::new(RwLock::new(Store::default())),
        authorization: Arc::from(format!("Basic {token}")),
    };
    Router::new()
        .route("/v1/Customer", get(retrieve_customer).post(save_customer))
        .route("/v1/Customer/Anonymization", post(anonymize_customer))
        .route("/v1/Customers", get(list_customers))
        .route(
            "/v1/CustomerBillingAddress",
            get(retrieve_billing_address).post(save_billing_address),
        )
        .route("/v1/Feature", get(retrieve_feature))
        .route("/v1/Features", get(list_features))
        .route("/v1/Offer", get(retrieve_offer))
        .route("/v1/Offers", get(list_offers))
        .route("/v1/Usage", get(retrieve_usage).post(update_usage))
        .route("/v1/Usages", get(list_usages))
        .route(
            "/v1/Subscription",
            get(retrieve_subscription).post(create_subscription),
        )
        .route("/v1/Subscriptions", get(list_subscriptions))
        .route("/v1/Subscription/{id}/Suspension", post(suspend_subscription))
        .route("/v1/Subscription/{id}/Start", post(start_subscription))
        .route("/v1/Subscription/{id}/Termination", post(terminate_subscription))
        .route("/v1/Subscription/{id}/Upgrade", post(upgrade_subscription))
        .route("/v1/Subscription/{id}/DateTerm", post(update_date_term))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_basic_auth))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == &*state.authorization);
    if !authorized {
        warn!(path = %request.uri().path(), "rejected request with bad credentials");
        return Failure::Unauthorized.into_response();
    }
    next.run(request).await
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

async fn save_customer(
    State(state): State<AppState>,
    Json(input): Json<SaveCustomer>,
) -> Result<Json<Customer>, Failure> {
    let mut errors = Vec::new();
    required(input.reference_customer.as_deref(), "ReferenceCustomer", &mut errors);
    if input.email.as_deref().is_some_and(|e| !e.contains('@')) {
        errors.push(
            ErrorRecord::new("Error.Customer.Email.Invalid", "Email is invalid").on("Email"),
        );
    }
    if input.reference_segment.as_deref().is_some_and(|s| s != SEGMENT) {
        errors.push(
            ErrorRecord::new("Error.Segment.NotFound", "Segment not found").on("ReferenceSegment"),
        );
    }
    let reference = match input.reference_customer {
        Some(reference) if errors.is_empty() => reference,
        _ => return Err(Failure::Invalid(errors)),
    };

    let mut store = state.store.write().await;
    if !store.customers.contains_key(&reference) {
        store.next_customer_id += 1;
        let id = store.next_customer_id;
        debug!(reference = %reference, id, "creating customer");
        store.customers.insert(
            reference.clone(),
            Customer {
                id,
                id_segment: ID_SEGMENT,
                reference_customer: reference.clone(),
                reference_segment: SEGMENT.to_string(),
                email: None,
                name: None,
                language: None,
            },
        );
    }
    let customer = store
        .customers
        .get_mut(&reference)
        .ok_or_else(|| customer_not_found(&reference))?;
    if input.email.is_some() {
        customer.email = input.email;
    }
    if input.name.is_some() {
        customer.name = input.name;
    }
    if input.language.is_some() {
        customer.language = input.language;
    }
    Ok(Json(customer.clone()))
}

async fn retrieve_customer(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Customer>, Failure> {
    let reference = params.reference_customer.unwrap_or_default();
    let store = state.store.read().await;
    store.customer(&reference).cloned().map(Json)
}

async fn anonymize_customer(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Customer>, Failure> {
    let reference = params.reference_customer.unwrap_or_default();
    let mut store = state.store.write().await;
    store.billing_addresses.remove(&reference);
    let customer = store
        .customers
        .get_mut(&reference)
        .ok_or_else(|| customer_not_found(&reference))?;
    customer.email = None;
    customer.name = None;
    Ok(Json(customer.clone()))
}

async fn list_customers(State(state): State<AppState>, Query(params): Query<Params>) -> Response {
    let store = state.store.read().await;
    match &params.reference_feature {
        Some(reference_feature) => {
            let Ok(feature) = find_feature(reference_feature) else {
                return StatusCode::NO_CONTENT.into_response();
            };
            let items: Vec<CustomerWithUsage> = store
                .customers
                .values()
                .filter(|c| {
                    store
                        .usages
                        .contains_key(&(c.reference_customer.clone(), reference_feature.clone()))
                })
                .map(|c| {
                    let usage = store.usage(c, &feature);
                    CustomerWithUsage {
                        customer: c.clone(),
                        quantity_current: usage.quantity_current.unwrap_or_default(),
                        quantity_included: usage.quantity_included,
                        is_enabled: usage.is_enabled.unwrap_or(true),
                    }
                })
                .collect();
            paginate(items, &params)
        }
        None => {
            let items: Vec<Customer> = store
                .customers
                .values()
                .filter(|c| {
                    params
                        .reference_segment
                        .as_deref()
                        .is_none_or(|s| s == c.reference_segment)
                })
                .cloned()
                .collect();
            paginate(items, &params)
        }
    }
}

async fn retrieve_billing_address(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Response, Failure> {
    let reference = params.reference_customer.unwrap_or_default();
    let store = state.store.read().await;
    store.customer(&reference)?;
    Ok(match store.billing_addresses.get(&reference) {
        Some(address) => Json(address.clone()).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

async fn save_billing_address(
    State(state): State<AppState>,
    Query(params): Query<Params>,
    Json(address): Json<Value>,
) -> Result<Json<Value>, Failure> {
    let reference = params.reference_customer.unwrap_or_default();
    if !address.is_object() {
        return Err(invalid(ErrorRecord::new(
            "Error.Api.Address.Invalid",
            "Address must be an object",
        )));
    }
    let mut store = state.store.write().await;
    store.customer(&reference)?;
    store.billing_addresses.insert(reference, address.clone());
    Ok(Json(address))
}

// ---------------------------------------------------------------------------
// Features and offers
// ---------------------------------------------------------------------------

async fn retrieve_feature(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Feature>, Failure> {
    let mut feature = find_feature(params.reference_feature.as_deref().unwrap_or_default())?;
    if let Some(reference_customer) = &params.reference_customer {
        let store = state.store.read().await;
        let usage = store.usage(store.customer(reference_customer)?, &feature);
        feature.quantity_current = usage.quantity_current;
        feature.is_enabled = usage.is_enabled;
    }
    Ok(Json(feature))
}

async fn list_features(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Response, Failure> {
    let store = state.store.read().await;
    let customer = match &params.reference_customer {
        Some(reference) => Some(store.customer(reference)?),
        None => None,
    };
    let items: Vec<Feature> = features()
        .into_iter()
        .filter(|f| params.is_visible.is_none_or(|visible| f.is_visible == visible))
        .map(|mut f| {
            if let Some(customer) = customer {
                let usage = store.usage(customer, &f);
                f.quantity_current = usage.quantity_current;
                f.is_enabled = usage.is_enabled;
            }
            f
        })
        .collect();
    Ok(paginate(items, &params))
}

async fn retrieve_offer(Query(params): Query<Params>) -> Result<Json<Offer>, Failure> {
    find_offer(params.reference_offer.as_deref().unwrap_or_default()).map(Json)
}

async fn list_offers(Query(params): Query<Params>) -> Response {
    let items: Vec<Offer> = offers()
        .into_iter()
        .filter(|o| params.is_visible.is_none_or(|visible| o.is_visible == visible))
        .collect();
    paginate(items, &params)
}

// ---------------------------------------------------------------------------
// Usages
// ---------------------------------------------------------------------------

async fn retrieve_usage(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Usage>, Failure> {
    let feature = find_feature(params.reference_feature.as_deref().unwrap_or_default())?;
    let store = state.store.read().await;
    let reference_customer = match (params.id_subscription, params.reference_customer) {
        (Some(id), _) => store
            .subscriptions
            .get(&id)
            .map(|s| s.reference_customer.clone())
            .ok_or(Failure::Missing)?,
        (None, reference) => reference.unwrap_or_default(),
    };
    let customer = store.customer(&reference_customer)?;
    Ok(Json(store.usage(customer, &feature)))
}

async fn update_usage(
    State(state): State<AppState>,
    Json(input): Json<UpdateUsage>,
) -> Result<Json<Usage>, Failure> {
    let mut errors = Vec::new();
    required(input.reference_customer.as_deref(), "ReferenceCustomer", &mut errors);
    required(input.reference_feature.as_deref(), "ReferenceFeature", &mut errors);
    if input.date_stamp.is_none() {
        errors.push(
            ErrorRecord::new("Error.Api.DateStamp.Required", "DateStamp is required")
                .on("DateStamp"),
        );
    }
    let changes = [
        input.increment.is_some(),
        input.quantity_current.is_some(),
        input.is_enabled.is_some(),
    ];
    if changes.iter().filter(|c| **c).count() != 1 {
        errors.push(ErrorRecord::new(
            "Error.Api.Usage.Change",
            "Exactly one of Increment, QuantityCurrent or IsEnabled is required",
        ));
    }
    if !errors.is_empty() {
        return Err(Failure::Invalid(errors));
    }

    let reference_customer = input.reference_customer.unwrap_or_default();
    let feature = find_feature(input.reference_feature.as_deref().unwrap_or_default())?;
    if feature.is_on_off() != input.is_enabled.is_some() {
        return Err(invalid(
            ErrorRecord::new(
                "Error.Api.Usage.TypeMismatch",
                format!("Feature '{}' is {}", feature.reference_feature, feature.type_feature),
            )
            .on("ReferenceFeature"),
        ));
    }

    let mut store = state.store.write().await;
    store.customer(&reference_customer)?;
    let record = store
        .usages
        .entry((reference_customer.clone(), feature.reference_feature.clone()))
        .or_insert(UsageRecord {
            quantity: 0,
            enabled: false,
            id_subscription: None,
            date_stamp: Utc::now(),
        });
    if let Some(increment) = input.increment {
        record.quantity += increment;
    }
    if let Some(quantity) = input.quantity_current {
        record.quantity = quantity;
    }
    if let Some(enabled) = input.is_enabled {
        record.enabled = enabled;
    }
    if input.id_subscription.is_some() {
        record.id_subscription = input.id_subscription;
    }
    if let Some(date_stamp) = input.date_stamp {
        record.date_stamp = date_stamp;
    }
    let customer = store.customer(&reference_customer)?;
    Ok(Json(store.usage(customer, &feature)))
}

async fn list_usages(State(state): State<AppState>, Query(params): Query<Params>) -> Response {
    let store = state.store.read().await;
    let subscription_customer = params
        .id_subscription
        .and_then(|id| store.subscriptions.get(&id))
        .map(|s| s.reference_customer.clone());
    if params.id_subscription.is_some() && subscription_customer.is_none() {
        return Failure::Missing.into_response();
    }
    let reference_customer = subscription_customer.or_else(|| params.reference_customer.clone());

    let items: Vec<Usage> = store
        .usages
        .keys()
        .filter(|(customer, feature)| {
            reference_customer
                .as_deref()
                .is_none_or(|c| c == customer.as_str())
                && params
                    .reference_feature
                    .as_deref()
                    .is_none_or(|f| f == feature.as_str())
        })
        .filter_map(|(customer, feature)| {
            let customer = store.customers.get(customer)?;
            let feature = find_feature(feature).ok()?;
            Some(store.usage(customer, &feature))
        })
        .collect();
    paginate(items, &params)
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

async fn create_subscription(
    State(state): State<AppState>,
    Query(params): Query<Params>,
    Json(input): Json<CreateSubscription>,
) -> Result<Json<Subscription>, Failure> {
    let mut errors = Vec::new();
    required(input.reference_customer.as_deref(), "ReferenceCustomer", &mut errors);
    required(input.reference_offer.as_deref(), "ReferenceOffer", &mut errors);
    if !errors.is_empty() {
        return Err(Failure::Invalid(errors));
    }
    let reference_customer = input.reference_customer.unwrap_or_default();
    let offer = find_offer(input.reference_offer.as_deref().unwrap_or_default())?;

    let mut store = state.store.write().await;
    let customer = store.customer(&reference_customer)?.clone();
    let buyer = match &input.reference_customer_buyer {
        Some(reference) => store.customer(reference)?.clone(),
        None => customer.clone(),
    };
    let billable = store.billing_addresses.contains_key(&buyer.reference_customer);
    if params.ensure_billable == Some(true) && !billable {
        return Err(invalid(ErrorRecord::new(
            "Error.Api.Customer.NotBillable",
            "Customer is not billable",
        )));
    }

    let now = Utc::now();
    let running = params.try_start == Some(true) && (billable || offer.amount_recurrence == 0);
    store.next_subscription_id += 1;
    let subscription = Subscription {
        id: store.next_subscription_id,
        id_customer: customer.id,
        id_customer_buyer: buyer.id,
        id_offer: offer.id,
        id_segment: ID_SEGMENT,
        reference_customer: customer.reference_customer.clone(),
        reference_customer_buyer: input.reference_customer_buyer,
        reference_offer: offer.reference_offer,
        reference_segment: SEGMENT.to_string(),
        state_subscription: if running { "Running" } else { "InitiatedAgent" }.to_string(),
        title_localized: input.title_localized,
        amount_recurrence: input.amount_recurrence.unwrap_or(offer.amount_recurrence),
        duration_recurrence: input.duration_recurrence.unwrap_or(offer.duration_recurrence),
        unit_recurrence: input.unit_recurrence.unwrap_or(offer.unit_recurrence),
        count_days_trial: 0,
        date_update: now,
        date_start: Some(input.date_start.unwrap_or(now)),
        date_term: None,
    };
    debug!(id = subscription.id, state = %subscription.state_subscription, "created subscription");
    store.subscriptions.insert(subscription.id, subscription.clone());
    Ok(Json(subscription))
}

async fn retrieve_subscription(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Subscription>, Failure> {
    let store = state.store.read().await;
    if let Some(id) = params.id_subscription {
        return store
            .subscriptions
            .get(&id)
            .cloned()
            .map(Json)
            .ok_or(Failure::Missing);
    }
    let reference = params.reference_customer.unwrap_or_default();
    store.customer(&reference)?;
    store
        .subscriptions
        .values()
        .rev()
        .find(|s| s.reference_customer == reference)
        .cloned()
        .map(Json)
        .ok_or_else(|| {
            Failure::NotFound(ErrorRecord::new(
                "Error.Subscription.NotFound",
                format!("Customer '{reference}' has no subscription"),
            ))
        })
}

async fn list_subscriptions(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Response {
    let store = state.store.read().await;
    let items: Vec<Subscription> = store
        .subscriptions
        .values()
        .filter(|s| {
            params
                .reference_customer
                .as_deref()
                .is_none_or(|c| c == s.reference_customer)
        })
        .cloned()
        .collect();
    paginate(items, &params)
}

async fn suspend_subscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<Params>,
) -> Result<Json<Subscription>, Failure> {
    let target = params
        .state_subscription
        .unwrap_or_else(|| "SuspendedAgent".to_string());
    if !target.starts_with("Suspended") {
        return Err(invalid(
            ErrorRecord::new(
                "Error.Api.StateSubscription.Invalid",
                format!("'{target}' is not a suspended state"),
            )
            .on("StateSubscription"),
        ));
    }
    let mut store = state.store.write().await;
    let subscription = store.subscription_mut(id)?;
    if subscription.is_terminated() {
        return Err(invalid(ErrorRecord::new(
            "Error.Subscription.Terminated",
            "Subscription is terminated",
        )));
    }
    subscription.state_subscription = target;
    subscription.date_update = Utc::now();
    Ok(Json(subscription.clone()))
}

async fn start_subscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Subscription>, Failure> {
    let mut store = state.store.write().await;
    let subscription = store.subscription_mut(id)?;
    if subscription.is_terminated() {
        return Err(invalid(ErrorRecord::new(
            "Error.Subscription.Terminated",
            "Subscription is terminated",
        )));
    }
    subscription.state_subscription = "Running".to_string();
    subscription.date_update = Utc::now();
    Ok(Json(subscription.clone()))
}

async fn terminate_subscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<Params>,
) -> Result<Json<Subscription>, Failure> {
    let mut store = state.store.write().await;
    let subscription = store.subscription_mut(id)?;
    let now = Utc::now();
    if params.immediate == Some(true) {
        subscription.state_subscription = "TerminatedAgent".to_string();
        subscription.date_term = Some(params.date_termination.unwrap_or(now));
    } else {
        subscription.date_term = Some(
            params
                .date_termination
                .unwrap_or_else(|| now + Duration::days(30)),
        );
    }
    subscription.date_update = now;
    Ok(Json(subscription.clone()))
}

async fn upgrade_subscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<Params>,
) -> Result<Json<Subscription>, Failure> {
    let offer = find_offer(params.reference_offer.as_deref().unwrap_or_default())?;
    let mut store = state.store.write().await;
    let subscription = store.subscription_mut(id)?;
    subscription.id_offer = offer.id;
    subscription.reference_offer = offer.reference_offer;
    subscription.amount_recurrence = offer.amount_recurrence;
    subscription.duration_recurrence = offer.duration_recurrence;
    subscription.unit_recurrence = offer.unit_recurrence;
    subscription.date_update = Utc::now();
    Ok(Json(subscription.clone()))
}

async fn update_date_term(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<DateTerm>,
) -> Result<Json<Subscription>, Failure> {
    let now = Utc::now();
    let date_term = match input.date_term {
        Some(date) if date > now => date,
        _ => {
            return Err(invalid(
                ErrorRecord::new("Error.Api.DateTerm.Invalid", "DateTerm must be in the future")
                    .on("DateTerm"),
            ))
        }
    };
    let mut store = state.store.write().await;
    let subscription = store.subscription_mut(id)?;
    subscription.date_term = Some(date_term);
    subscription.date_update = now;
    Ok(Json(subscription.clone()))
}
