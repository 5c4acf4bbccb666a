mod support;

use std::time::Duration;

use reqwest::StatusCode;

use api_types::expense::{ExpenseCreate, ExpenseUpdate};
use api_types::{Category, MoneyCents, PaymentMethod};
use spese_tui::cache::ExpenseCache;
use spese_tui::client::{ApiError, Client};

use support::StubService;

fn client(base_url: &str) -> Client {
    Client::new(base_url, Duration::from_millis(200)).unwrap()
}

fn create_payload(title: &str, cents: i64, date: &str) -> ExpenseCreate {
    ExpenseCreate {
        title: title.to_string(),
        amount: MoneyCents::new(cents),
        category: Category::Food,
        date: date.parse().unwrap(),
        description: None,
        payment_method: PaymentMethod::Cash,
    }
}

#[tokio::test]
async fn refresh_populates_the_list_and_both_summaries() {
    let stub = StubService::new();
    let mut food = support::expense(1, "Groceries", 42_50, "2024-02-10");
    food.category = Category::Food;
    stub.seed(vec![food, support::expense(2, "Bus", 2_50, "2024-03-01")]);

    let client = client(&stub.spawn().await);
    let mut cache = ExpenseCache::default();
    cache.refresh(&client).await.unwrap();

    assert_eq!(cache.expenses().map(|records| records.len()), Some(2));
    assert!(!cache.list().is_stale());

    let categories = cache.by_category().data().unwrap();
    assert!(categories.iter().any(|s| s.category == Category::Food));

    let months = cache.by_month().data().unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].month, "2024-02");
}

#[tokio::test]
async fn create_shows_up_exactly_once_after_the_reload() {
    let stub = StubService::new();
    stub.seed(vec![support::expense(1, "Coffee", 3_00, "2024-02-01")]);
    let client = client(&stub.spawn().await);
    let mut cache = ExpenseCache::default();
    cache.refresh(&client).await.unwrap();

    let created = cache
        .create(&client, &create_payload("Groceries", 42_50, "2024-02-10"))
        .await
        .unwrap();
    assert_eq!(created.id, 2);

    let records = cache.expenses().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records.iter().filter(|e| e.title == "Groceries").count(),
        1
    );
    // The view holds the server's record, not a local echo of the form.
    let stored = records.iter().find(|e| e.title == "Groceries").unwrap();
    assert_eq!(stored.id, created.id);
    assert_eq!(stored.created_at, created.created_at);
}

#[tokio::test]
async fn delete_drops_the_record_from_the_view() {
    let stub = StubService::new();
    stub.seed(vec![
        support::expense(1, "Coffee", 3_00, "2024-02-01"),
        support::expense(2, "Rent", 900_00, "2024-02-02"),
    ]);
    let client = client(&stub.spawn().await);
    let mut cache = ExpenseCache::default();
    cache.refresh(&client).await.unwrap();

    cache.delete(&client, 1).await.unwrap();

    let records = cache.expenses().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, 2);
    assert!(!cache.list().is_stale());
}

#[tokio::test]
async fn timeout_keeps_the_previous_list_readable() {
    let stub = StubService::new();
    stub.seed(vec![support::expense(1, "Coffee", 3_00, "2024-02-01")]);
    let client = client(&stub.spawn().await);
    let mut cache = ExpenseCache::default();
    cache.refresh(&client).await.unwrap();

    stub.delay_list(Duration::from_secs(2));
    let err = cache.refresh(&client).await.unwrap_err();
    assert_eq!(err, ApiError::Timeout);

    // Previous value stays on screen, flagged stale with the error.
    assert_eq!(cache.expenses().map(|records| records.len()), Some(1));
    assert!(cache.list().is_stale());
    assert_eq!(cache.list().error(), Some(&ApiError::Timeout));

    // Recovery clears both marks.
    stub.clear_list_delay();
    cache.refresh(&client).await.unwrap();
    assert!(!cache.list().is_stale());
    assert!(cache.list().error().is_none());
}

#[tokio::test]
async fn failed_update_leaves_the_cached_record_untouched() {
    let stub = StubService::new();
    stub.seed(vec![support::expense(7, "Gym", 30_00, "2024-02-05")]);
    let client = client(&stub.spawn().await);
    let mut cache = ExpenseCache::default();
    cache.refresh(&client).await.unwrap();

    stub.reject_writes(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    let patch = ExpenseUpdate {
        title: Some("Gym membership".to_string()),
        ..ExpenseUpdate::default()
    };
    let err = cache.update(&client, 7, &patch).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected { .. }));

    let records = cache.expenses().unwrap();
    assert_eq!(records[0].title, "Gym");
    assert_eq!(stub.stored()[0].title, "Gym");
}

#[tokio::test]
async fn summaries_follow_the_list_through_mutations() {
    let stub = StubService::new();
    let client = client(&stub.spawn().await);
    let mut cache = ExpenseCache::default();
    cache.refresh(&client).await.unwrap();
    assert!(cache.by_category().data().unwrap().is_empty());

    cache
        .create(&client, &create_payload("Groceries", 42_50, "2024-02-10"))
        .await
        .unwrap();

    let categories = cache.by_category().data().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].category, Category::Food);
    assert_eq!(categories[0].total, MoneyCents::new(42_50));
    assert_eq!(categories[0].count, 1);

    let months = cache.by_month().data().unwrap();
    assert_eq!(months.len(), 1);
    assert_eq!(months[0].month, "2024-02");
    assert_eq!(months[0].total, MoneyCents::new(42_50));
}

#[tokio::test]
async fn mutation_reports_ok_even_when_the_reload_fails() {
    let stub = StubService::new();
    stub.seed(vec![support::expense(1, "Coffee", 3_00, "2024-02-01")]);
    let client = client(&stub.spawn().await);
    let mut cache = ExpenseCache::default();
    cache.refresh(&client).await.unwrap();

    // Only the list route stalls; the write itself goes through.
    stub.delay_list(Duration::from_secs(2));
    let created = cache
        .create(&client, &create_payload("Groceries", 42_50, "2024-02-10"))
        .await;
    assert!(created.is_ok());
    assert_eq!(stub.stored().len(), 2);

    // The view still shows the pre-mutation snapshot, marked stale with
    // the reload error; nothing pretends the fetch worked.
    assert_eq!(cache.expenses().map(|records| records.len()), Some(1));
    assert!(cache.list().is_stale());
    assert_eq!(cache.list().error(), Some(&ApiError::Timeout));

    // The summaries were reachable and already include the new record.
    let categories = cache.by_category().data().unwrap();
    assert!(categories.iter().any(|s| s.category == Category::Food));
}
