mod support;

use std::time::Duration;

use axum::{Router, routing::get};
use reqwest::StatusCode;

use api_types::expense::{ExpenseCreate, ExpenseUpdate};
use api_types::{Category, MoneyCents, PaymentMethod};
use spese_tui::client::{ApiError, Client};

use support::StubService;

const BUDGET: Duration = Duration::from_millis(500);

fn client(base_url: &str) -> Client {
    Client::new(base_url, BUDGET).unwrap()
}

fn create_payload(title: &str, cents: i64, date: &str) -> ExpenseCreate {
    ExpenseCreate {
        title: title.to_string(),
        amount: MoneyCents::new(cents),
        category: Category::Food,
        date: date.parse().unwrap(),
        description: None,
        payment_method: PaymentMethod::Card,
    }
}

#[tokio::test]
async fn lists_whatever_the_service_stores() {
    let stub = StubService::new();
    stub.seed(vec![
        support::expense(1, "Coffee", 3_00, "2024-02-01"),
        support::expense(2, "Rent", 900_00, "2024-02-02"),
    ]);
    let client = client(&stub.spawn().await);

    let expenses = client.list().await.unwrap();
    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0].title, "Coffee");
    assert_eq!(expenses[1].amount, MoneyCents::new(900_00));
}

#[tokio::test]
async fn create_returns_the_record_with_server_identity() {
    let stub = StubService::new();
    let client = client(&stub.spawn().await);

    let created = client
        .create(&create_payload("Groceries", 42_50, "2024-02-10"))
        .await
        .unwrap();

    assert_eq!(created.id, 1);
    assert_eq!(created.amount, MoneyCents::new(42_50));
    assert_eq!(created.category, Category::Food);
    assert_eq!(stub.stored().len(), 1);
}

#[tokio::test]
async fn update_patches_only_the_sent_fields() {
    let stub = StubService::new();
    stub.seed(vec![support::expense(5, "Gym", 30_00, "2024-02-05")]);
    let client = client(&stub.spawn().await);

    let patch = ExpenseUpdate {
        title: Some("Gym membership".to_string()),
        ..ExpenseUpdate::default()
    };
    let updated = client.update(5, &patch).await.unwrap();

    assert_eq!(updated.title, "Gym membership");
    assert_eq!(updated.amount, MoneyCents::new(30_00));
    assert_eq!(updated.payment_method, PaymentMethod::Card);
}

#[tokio::test]
async fn get_finds_by_id_and_reports_missing_as_rejected() {
    let stub = StubService::new();
    stub.seed(vec![support::expense(3, "Cinema", 15_00, "2024-02-03")]);
    let client = client(&stub.spawn().await);

    let found = client.get(3).await.unwrap();
    assert_eq!(found.title, "Cinema");

    let err = client.get(99).await.unwrap_err();
    match err {
        ApiError::Rejected { status, body } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert!(body.contains("not found"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn delete_removes_the_record() {
    let stub = StubService::new();
    stub.seed(vec![
        support::expense(1, "Coffee", 3_00, "2024-02-01"),
        support::expense(2, "Rent", 900_00, "2024-02-02"),
    ]);
    let client = client(&stub.spawn().await);

    client.delete(1).await.unwrap();

    let remaining = stub.stored();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, 2);
}

#[tokio::test]
async fn slow_service_times_out_within_the_budget() {
    let stub = StubService::new();
    stub.delay_list(Duration::from_secs(5));
    let base_url = stub.spawn().await;
    let client = Client::new(&base_url, Duration::from_millis(100)).unwrap();

    let err = client.list().await.unwrap_err();
    assert_eq!(err, ApiError::Timeout);
}

#[tokio::test]
async fn dead_service_reports_unreachable() {
    // Bind and drop so the port is valid but nothing answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(&format!("http://{addr}"));
    let err = client.list().await.unwrap_err();
    assert!(matches!(err, ApiError::Unreachable(_)), "got {err:?}");
}

#[tokio::test]
async fn rejected_write_carries_status_and_body() {
    let stub = StubService::new();
    stub.reject_writes(StatusCode::UNPROCESSABLE_ENTITY, "title too long");
    let client = client(&stub.spawn().await);

    let err = client
        .create(&create_payload("x", 1_00, "2024-02-01"))
        .await
        .unwrap_err();

    match err {
        ApiError::Rejected { status, body } => {
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(body, "title too long");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }

    assert!(stub.stored().is_empty());
}

#[tokio::test]
async fn undecodable_success_body_is_a_rejection() {
    let router = Router::new().route("/expenses", get(|| async { "definitely not json" }));
    let base_url = support::spawn_router(router).await;
    let client = client(&base_url);

    let err = client.list().await.unwrap_err();
    match err {
        ApiError::Rejected { status, .. } => assert_eq!(status, StatusCode::OK),
        other => panic!("expected Rejected, got {other:?}"),
    }
}
