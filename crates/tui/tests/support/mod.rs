//! In-memory stand-in for the expense service.
//!
//! Stores records behind a mutex and serves the same routes and JSON the
//! real service does, plus switches for failure injection: reject writes
//! with a chosen status, or delay the list route past the client's budget.

#![allow(dead_code)] // each test binary uses its own subset

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};

use api_types::expense::{Expense, ExpenseCreate, ExpenseUpdate};
use api_types::summary::{CategorySummary, MonthlySummary};
use api_types::{Category, MoneyCents, PaymentMethod};

#[derive(Clone, Default)]
pub struct StubService {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    expenses: Vec<Expense>,
    next_id: i64,
    reject_writes: Option<(StatusCode, String)>,
    list_delay: Option<Duration>,
}

impl Inner {
    fn take_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl StubService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds an ephemeral port and serves in the background. Returns the
    /// base URL to point a client at.
    pub async fn spawn(&self) -> String {
        spawn_router(router(self.clone())).await
    }

    pub fn seed(&self, expenses: Vec<Expense>) {
        let mut inner = self.lock();
        inner.next_id = expenses.iter().map(|e| e.id).max().unwrap_or(0);
        inner.expenses = expenses;
    }

    /// Makes every write route answer with the given status and body.
    pub fn reject_writes(&self, status: StatusCode, body: &str) {
        self.lock().reject_writes = Some((status, body.to_string()));
    }

    pub fn accept_writes(&self) {
        self.lock().reject_writes = None;
    }

    /// Stalls the list route; pair with a client whose timeout is shorter.
    pub fn delay_list(&self, delay: Duration) {
        self.lock().list_delay = Some(delay);
    }

    pub fn clear_list_delay(&self) {
        self.lock().list_delay = None;
    }

    /// Snapshot of what the service currently stores.
    pub fn stored(&self) -> Vec<Expense> {
        self.lock().expenses.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }
}

pub fn router(stub: StubService) -> Router {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/{id}",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        .route("/expenses/summary/category", get(category_summary))
        .route("/expenses/summary/monthly", get(monthly_summary))
        .with_state(stub)
}

/// Serves any router on an ephemeral port; used directly by tests that
/// need a route the stub does not model (e.g. a garbage body).
pub async fn spawn_router(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub local addr");

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router).await {
            tracing::error!("stub service failed: {err}");
        }
    });

    format!("http://{addr}")
}

/// A stored record with fixed timestamps, category Other, paid by card.
pub fn expense(id: i64, title: &str, cents: i64, date: &str) -> Expense {
    let stamp: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
    Expense {
        id,
        title: title.to_string(),
        amount: MoneyCents::new(cents),
        category: Category::Other,
        date: date.parse().unwrap(),
        description: None,
        payment_method: PaymentMethod::Card,
        created_at: stamp,
        updated_at: stamp,
    }
}

async fn list_expenses(State(stub): State<StubService>) -> Json<Vec<Expense>> {
    // Copy the delay out so the lock is not held across the sleep.
    let delay = stub.lock().list_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    Json(stub.stored())
}

async fn get_expense(State(stub): State<StubService>, Path(id): Path<i64>) -> Response {
    let inner = stub.lock();
    match inner.expenses.iter().find(|e| e.id == id) {
        Some(expense) => Json(expense.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "expense not found").into_response(),
    }
}

async fn create_expense(
    State(stub): State<StubService>,
    Json(payload): Json<ExpenseCreate>,
) -> Response {
    let mut inner = stub.lock();
    if let Some((status, body)) = inner.reject_writes.clone() {
        return (status, body).into_response();
    }

    let now = Utc::now();
    let expense = Expense {
        id: inner.take_id(),
        title: payload.title,
        amount: payload.amount,
        category: payload.category,
        date: payload.date,
        description: payload.description,
        payment_method: payload.payment_method,
        created_at: now,
        updated_at: now,
    };
    inner.expenses.push(expense.clone());
    (StatusCode::CREATED, Json(expense)).into_response()
}

async fn update_expense(
    State(stub): State<StubService>,
    Path(id): Path<i64>,
    Json(patch): Json<ExpenseUpdate>,
) -> Response {
    let mut inner = stub.lock();
    if let Some((status, body)) = inner.reject_writes.clone() {
        return (status, body).into_response();
    }

    let Some(stored) = inner.expenses.iter_mut().find(|e| e.id == id) else {
        return (StatusCode::NOT_FOUND, "expense not found").into_response();
    };

    if let Some(title) = patch.title {
        stored.title = title;
    }
    if let Some(amount) = patch.amount {
        stored.amount = amount;
    }
    if let Some(category) = patch.category {
        stored.category = category;
    }
    if let Some(date) = patch.date {
        stored.date = date;
    }
    if let Some(description) = patch.description {
        stored.description = Some(description);
    }
    if let Some(payment_method) = patch.payment_method {
        stored.payment_method = payment_method;
    }
    stored.updated_at = Utc::now();

    Json(stored.clone()).into_response()
}

async fn delete_expense(State(stub): State<StubService>, Path(id): Path<i64>) -> Response {
    let mut inner = stub.lock();
    if let Some((status, body)) = inner.reject_writes.clone() {
        return (status, body).into_response();
    }

    let before = inner.expenses.len();
    inner.expenses.retain(|e| e.id != id);
    if inner.expenses.len() == before {
        return (StatusCode::NOT_FOUND, "expense not found").into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn category_summary(State(stub): State<StubService>) -> Json<Vec<CategorySummary>> {
    let expenses = stub.stored();
    let mut rows: Vec<CategorySummary> = Category::ALL
        .iter()
        .filter_map(|&category| {
            let mut total = MoneyCents::ZERO;
            let mut count = 0u64;
            for expense in expenses.iter().filter(|e| e.category == category) {
                total += expense.amount;
                count += 1;
            }
            (count > 0).then_some(CategorySummary {
                category,
                total,
                count,
            })
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    Json(rows)
}

async fn monthly_summary(State(stub): State<StubService>) -> Json<Vec<MonthlySummary>> {
    use std::collections::BTreeMap;

    let mut months: BTreeMap<String, (MoneyCents, u64)> = BTreeMap::new();
    for expense in stub.stored() {
        let key = expense.date.format("%Y-%m").to_string();
        let entry = months.entry(key).or_insert((MoneyCents::ZERO, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    let rows = months
        .into_iter()
        .map(|(month, (total, count))| MonthlySummary {
            month,
            total,
            count,
        })
        .collect();
    Json(rows)
}
