//! Integration tests against a live MySQL server
//!
//! Set `TEST_MYSQL_URL` to a DSN such as
//! `root:secret@tcp(127.0.0.1:3306)/relstore_test?charset=utf8mb4` to run them;
//! they are skipped otherwise. Each test works on its own table.

use relstore::prelude::*;
use std::sync::Arc;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, FromRow)]
struct Product {
    #[serde(skip_serializing)]
    id: u64,
    name: String,
    category: String,
    price: f64,
}

#[derive(Debug, FromRow)]
struct CategoryTotal {
    category: String,
    count: i64,
}

impl Product {
    fn new(name: &str, category: &str, price: f64) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            category: category.to_string(),
            price,
        }
    }
}

/// Registry with one `default` alias, or `None` when no server is configured
async fn setup(table: &str) -> Option<(RelStore, TableStore<Product>)> {
    let dsn = match std::env::var("TEST_MYSQL_URL") {
        Ok(dsn) => dsn,
        Err(_) => {
            eprintln!("TEST_MYSQL_URL not set, skipping");
            return None;
        }
    };

    let handle = ConnectionHandle::connect("default", &dsn, PoolLimits::default(), false)
        .await
        .expect("connect to test database");

    sqlx::query(&format!("DROP TABLE IF EXISTS `{}`", table))
        .execute(handle.pool())
        .await
        .expect("drop table");
    sqlx::query(&format!(
        "CREATE TABLE `{}` (
            id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
            name VARCHAR(64) NOT NULL UNIQUE,
            category VARCHAR(32) NOT NULL,
            price DOUBLE NOT NULL
        )",
        table
    ))
    .execute(handle.pool())
    .await
    .expect("create table");

    let relstore = RelStore::from_registry(Arc::new(ConnectionRegistry::from_handles([handle])));
    let store = relstore.store::<Product>("default", table).expect("table store");
    Some((relstore, store))
}

async fn seed(store: &TableStore<Product>) {
    let rows = [
        Product::new("ring", "gold", 120.0),
        Product::new("chain", "gold", 80.5),
        Product::new("coin", "gold", 40.0),
        Product::new("spoon", "silver", 15.0),
        Product::new("tray", "silver", 60.0),
    ];
    for row in &rows {
        store.create(row, None).await.expect("seed row");
    }
}

#[tokio::test]
async fn test_create_and_count() {
    let Some((relstore, store)) = setup("it_product_count").await else {
        return;
    };
    seed(&store).await;

    let gold = Filters::new().with("category", "gold");
    assert_eq!(store.count(&gold, None).await.unwrap(), 3);
    assert_eq!(store.count(&Filters::new(), None).await.unwrap(), 5);

    let cheap = Filters::new().with("price < ?", 50.0);
    assert_eq!(store.count(&cheap, None).await.unwrap(), 2);

    let named = Filters::new().with("name", vec!["ring", "tray", "missing"]);
    assert_eq!(store.count(&named, None).await.unwrap(), 2);

    assert_eq!(
        store.distinct_count(&Filters::new(), &["category"], None).await.unwrap(),
        2
    );

    relstore.close().await;
}

#[tokio::test]
async fn test_update_and_delete() {
    let Some((relstore, store)) = setup("it_product_update").await else {
        return;
    };
    seed(&store).await;

    let mut data = Values::new();
    data.insert("price".to_string(), SqlValue::Float(99.0));

    let ring = Filters::new().with("name", "ring");
    assert_eq!(store.update(&data, &ring, None, None).await.unwrap(), 1);

    let err = store.update(&data, &Filters::new(), None, None).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));

    let err = store.update(&Values::new(), &ring, None, None).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));

    let silver = Filters::new().with("category", "silver");
    assert_eq!(store.update(&data, &silver, Some(1), None).await.unwrap(), 1);

    assert_eq!(store.delete(&silver, None).await.unwrap(), 2);
    assert_eq!(store.count(&Filters::new(), None).await.unwrap(), 3);

    relstore.close().await;
}

#[tokio::test]
async fn test_sum() {
    let Some((relstore, store)) = setup("it_product_sum").await else {
        return;
    };

    let total = store.sum("price", &Filters::new(), None).await.unwrap();
    assert_eq!(total, 0.0);

    seed(&store).await;
    let silver = Filters::new().with("category", "silver");
    assert_eq!(store.sum("price", &silver, None).await.unwrap(), 75.0);

    relstore.close().await;
}

#[tokio::test]
async fn test_list_and_total_is_independent_of_page_size() {
    let Some((relstore, store)) = setup("it_product_paging").await else {
        return;
    };
    seed(&store).await;

    let gold = Filters::new().with("category", "gold");
    let mut records = Vec::new();

    let total = store
        .list_and_total(&gold, Page::new(1, 2).unwrap(), &mut records, &["price desc"], None)
        .await
        .unwrap();
    assert_eq!(total, 3);
    let names: Vec<_> = records.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["ring", "chain"]);

    let total = store
        .list_and_total(&gold, Page::new(2, 2).unwrap(), &mut records, &["price desc"], None)
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "coin");

    store
        .list_no_page(&Filters::new(), &mut records, &["name"], None)
        .await
        .unwrap();
    assert_eq!(records.len(), 5);

    relstore.close().await;
}

#[tokio::test]
async fn test_query_one_leaves_record_unchanged_when_missing() {
    let Some((relstore, store)) = setup("it_product_query_one").await else {
        return;
    };
    seed(&store).await;

    let mut record = Product::new("placeholder", "none", -1.0);
    let missing = Filters::new().with("name", "missing");
    store.query_one(&missing, &mut record, &[], None).await.unwrap();
    assert_eq!(record, Product::new("placeholder", "none", -1.0));

    let gold = Filters::new().with("category", "gold");
    store.query_one(&gold, &mut record, &["price asc"], None).await.unwrap();
    assert_eq!(record.name, "coin");
    assert!(record.id > 0);

    let mut again = Product::default();
    store.query_one(&gold, &mut again, &["price asc"], None).await.unwrap();
    assert_eq!(again, record);

    relstore.close().await;
}

#[tokio::test]
async fn test_group_by() {
    let Some((relstore, store)) = setup("it_product_group").await else {
        return;
    };
    seed(&store).await;

    let grouped = relstore
        .store::<CategoryTotal>("default", store.table_name())
        .unwrap();
    let mut totals = Vec::new();
    grouped
        .list_and_group_by(
            &Filters::new(),
            &mut totals,
            &["category", "COUNT(1) AS count"],
            "category",
            None,
        )
        .await
        .unwrap();

    totals.sort_by(|a, b| a.category.cmp(&b.category));
    assert_eq!(totals.len(), 2);
    assert_eq!((totals[0].category.as_str(), totals[0].count), ("gold", 3));
    assert_eq!((totals[1].category.as_str(), totals[1].count), ("silver", 2));

    relstore.close().await;
}

#[derive(Debug, FromRow)]
struct Category {
    category: String,
}

/// Stock rows: ring in A and B, chain in A, spoon in B
async fn seed_stock(relstore: &RelStore, products: &str, stock: &str) {
    let pool = relstore.registry().resolve("default").unwrap().pool();

    sqlx::query(&format!("DROP TABLE IF EXISTS `{}`", stock))
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(&format!(
        "CREATE TABLE `{}` (product_id BIGINT UNSIGNED NOT NULL, warehouse CHAR(1) NOT NULL)",
        stock
    ))
    .execute(pool)
    .await
    .unwrap();

    for (warehouse, names) in [("A", "'ring', 'chain'"), ("B", "'ring', 'spoon'")] {
        sqlx::query(&format!(
            "INSERT INTO `{}` (product_id, warehouse) SELECT id, ? FROM `{}` WHERE name IN ({})",
            stock, products, names
        ))
        .bind(warehouse)
        .execute(pool)
        .await
        .unwrap();
    }
}

#[tokio::test]
async fn test_join_operations() {
    let Some((relstore, store)) = setup("it_product_join").await else {
        return;
    };
    seed(&store).await;
    seed_stock(&relstore, "it_product_join", "it_join_stock").await;

    let join = "JOIN it_join_stock s ON s.product_id = it_product_join.id";
    let fields = ["it_product_join.*"];
    let order = ["it_product_join.name"];

    let in_a = Filters::new().with("s.warehouse", "A");
    let mut records = Vec::new();
    store
        .list_with_join(&in_a, &fields, join, Page::default(), &mut records, &order, None)
        .await
        .unwrap();
    let names: Vec<_> = records.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["chain", "ring"]);

    let total = store
        .list_and_total_by_join(
            &Filters::new(),
            &fields,
            join,
            Page::new(1, 2).unwrap(),
            &mut records,
            &order,
            None,
        )
        .await
        .unwrap();
    assert_eq!(total, 4);
    assert_eq!(records.len(), 2);

    let in_b = Filters::new().with("s.warehouse", "B");
    assert_eq!(store.total_by_join(&in_b, join, None).await.unwrap(), 2);

    relstore.close().await;
}

#[tokio::test]
async fn test_distinct() {
    let Some((relstore, store)) = setup("it_product_distinct").await else {
        return;
    };
    seed(&store).await;

    let categories = relstore
        .store::<Category>("default", store.table_name())
        .unwrap();
    let mut rows = Vec::new();
    categories
        .distinct(
            &Filters::new(),
            &["category"],
            &mut rows,
            Page::default(),
            &["category desc"],
            None,
        )
        .await
        .unwrap();

    let names: Vec<_> = rows.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(names, vec!["silver", "gold"]);

    categories
        .distinct(
            &Filters::new(),
            &["category"],
            &mut rows,
            Page::new(2, 1).unwrap(),
            &["category desc"],
            None,
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].category, "gold");

    relstore.close().await;
}

#[tokio::test]
async fn test_duplicate_key_is_a_unique_violation() {
    let Some((relstore, store)) = setup("it_product_unique").await else {
        return;
    };

    store.create(&Product::new("ring", "gold", 1.0), None).await.unwrap();
    let err = store
        .create(&Product::new("ring", "gold", 2.0), None)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::ConstraintViolation(_)));
    assert!(is_unique_violation(Some(&err)));

    relstore.close().await;
}

#[tokio::test]
async fn test_transaction_rollback_discards_writes() {
    let Some((relstore, store)) = setup("it_product_tx").await else {
        return;
    };
    seed(&store).await;

    let mut tx = relstore.begin("default").await.unwrap();
    let gold = Filters::new().with("category", "gold");
    assert_eq!(store.delete(&gold, Some(&mut tx)).await.unwrap(), 3);
    assert_eq!(store.count(&Filters::new(), Some(&mut tx)).await.unwrap(), 2);
    relstore.rollback(tx).await.unwrap();

    assert_eq!(store.count(&gold, None).await.unwrap(), 3);

    let mut tx = store.begin_transaction().await.unwrap();
    store
        .create(&Product::new("bar", "gold", 500.0), Some(&mut tx))
        .await
        .unwrap();
    relstore.commit(tx).await.unwrap();
    assert_eq!(store.count(&gold, None).await.unwrap(), 4);

    relstore.close().await;
}
