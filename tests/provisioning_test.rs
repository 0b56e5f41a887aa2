use std::collections::HashSet;

use bookviewer::db;
use bookviewer::domain::{BookcaseFilter, BookcaseRepository, DomainError};
use bookviewer::infrastructure::SeaOrmBookcaseRepository;
use bookviewer::models::{bookcase, bookcase_slot};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, Statement,
};

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    // In-memory SQLite for testing
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

// Helper to create a test user
async fn create_test_user(db: &DatabaseConnection, username: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let account = bookviewer::models::user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set("hash".to_string()),
        role: Set("user".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = bookviewer::models::user::Entity::insert(account)
        .exec(db)
        .await
        .expect("Failed to create user");
    res.last_insert_id
}

// Helper to create a bookcase row without any slots, bypassing the
// provisioner
async fn create_bare_bookcase(db: &DatabaseConnection, owner_id: i32, name: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let case = bookcase::ActiveModel {
        user_id: Set(owner_id),
        name: Set(name.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = bookcase::Entity::insert(case)
        .exec(db)
        .await
        .expect("Failed to create bookcase");
    res.last_insert_id
}

#[tokio::test]
async fn test_provisioning_creates_complete_grid() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "owner").await;
    let repo = SeaOrmBookcaseRepository::new(db.clone());

    let case = repo
        .create_with_slots(owner, "Living Room".to_string(), 3, 4)
        .await
        .expect("Provisioning failed");
    assert_eq!(case.slot_count, 12);

    let slots = bookcase_slot::Entity::find()
        .filter(bookcase_slot::Column::BookcaseId.eq(case.id))
        .all(&db)
        .await
        .expect("Find slots failed");
    assert_eq!(slots.len(), 12);

    // Every (shelf, position) pair exists exactly once, and no others
    let coords: HashSet<(i32, i32)> = slots
        .iter()
        .map(|s| (s.bookshelf_number, s.number))
        .collect();
    assert_eq!(coords.len(), 12);
    for shelf in 1..=3 {
        for number in 1..=4 {
            assert!(
                coords.contains(&(shelf, number)),
                "missing slot ({}, {})",
                shelf,
                number
            );
        }
    }
}

#[tokio::test]
async fn test_provisioning_boundary_dimensions() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "owner").await;
    let repo = SeaOrmBookcaseRepository::new(db.clone());

    let smallest = repo
        .create_with_slots(owner, "Single Slot".to_string(), 1, 1)
        .await
        .expect("1x1 provisioning failed");
    assert_eq!(smallest.slot_count, 1);

    let largest = repo
        .create_with_slots(owner, "Wall Unit".to_string(), 10, 10)
        .await
        .expect("10x10 provisioning failed");
    assert_eq!(largest.slot_count, 100);

    let count = bookcase_slot::Entity::find()
        .filter(bookcase_slot::Column::BookcaseId.eq(largest.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(count, 100);
}

#[tokio::test]
async fn test_provisioning_rejects_out_of_range_dimensions() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "owner").await;
    let repo = SeaOrmBookcaseRepository::new(db.clone());

    for (shelf_count, shelf_capacity) in [(0, 5), (11, 5), (5, 0), (5, 11), (-1, 3)] {
        let result = repo
            .create_with_slots(owner, "Bad".to_string(), shelf_count, shelf_capacity)
            .await;
        assert!(
            matches!(result, Err(DomainError::Validation(_))),
            "expected validation error for ({}, {})",
            shelf_count,
            shelf_capacity
        );
    }

    // Rejected before any write: nothing was persisted
    let cases = bookcase::Entity::find().count(&db).await.unwrap();
    assert_eq!(cases, 0);
}

#[tokio::test]
async fn test_provisioning_is_atomic_on_mid_write_failure() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "owner").await;
    let repo = SeaOrmBookcaseRepository::new(db.clone());

    // Simulate a storage fault on the slot batch: the slots table is
    // gone, so the bulk insert inside the transaction must fail.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "DROP TABLE bookcase_slots".to_owned(),
    ))
    .await
    .expect("Drop table failed");

    let result = repo
        .create_with_slots(owner, "Doomed".to_string(), 2, 2)
        .await;
    assert!(result.is_err(), "Expected provisioning to fail");

    // The bookcase insert preceded the fault, but the rollback must
    // have removed it: no partially provisioned bookcase is visible.
    let cases = bookcase::Entity::find().count(&db).await.unwrap();
    assert_eq!(cases, 0, "Bookcase must not survive a failed provisioning");
}

#[tokio::test]
async fn test_duplicate_bookcase_name_per_owner_conflicts() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "owner").await;
    let other = create_test_user(&db, "other").await;
    let repo = SeaOrmBookcaseRepository::new(db.clone());

    repo.create_with_slots(owner, "Living Room".to_string(), 2, 2)
        .await
        .expect("First provisioning failed");

    let duplicate = repo
        .create_with_slots(owner, "Living Room".to_string(), 2, 2)
        .await;
    assert!(matches!(duplicate, Err(DomainError::Conflict(_))));

    // The same name under a different owner is fine
    repo.create_with_slots(other, "Living Room".to_string(), 2, 2)
        .await
        .expect("Provisioning for another owner failed");

    // The loser left nothing behind
    let count = bookcase::Entity::find().count(&db).await.unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_duplicate_slot_coordinate_is_rejected() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "owner").await;
    let repo = SeaOrmBookcaseRepository::new(db.clone());

    let case = repo
        .create_with_slots(owner, "Living Room".to_string(), 2, 2)
        .await
        .expect("Provisioning failed");

    // A second slot at an already-used coordinate violates the
    // (bookcase, shelf, slot) uniqueness invariant
    let duplicate = bookcase_slot::ActiveModel {
        bookcase_id: Set(case.id),
        bookshelf_number: Set(1),
        number: Set(1),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };
    let result = duplicate.insert(&db).await;
    assert!(result.is_err(), "Expected duplicate coordinate to fail");
}

#[tokio::test]
async fn test_slot_count_aggregation() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "owner").await;
    let repo = SeaOrmBookcaseRepository::new(db.clone());

    let a = repo
        .create_with_slots(owner, "A".to_string(), 2, 3)
        .await
        .unwrap();
    let b = create_bare_bookcase(&db, owner, "B").await;
    let c = repo
        .create_with_slots(owner, "C".to_string(), 4, 5)
        .await
        .unwrap();
    // Outside the input set; must never appear in the result
    let d = repo
        .create_with_slots(owner, "D".to_string(), 1, 2)
        .await
        .unwrap();

    let counts = repo.count_slots(&[a.id, b, c.id]).await.unwrap();

    assert_eq!(counts.get(&a.id).copied(), Some(6));
    assert_eq!(counts.get(&c.id).copied(), Some(20));
    // Zero-slot bookcases are omitted; lookups default to zero
    assert!(!counts.contains_key(&b));
    assert_eq!(counts.get(&b).copied().unwrap_or(0), 0);
    assert!(!counts.contains_key(&d.id));
}

#[tokio::test]
async fn test_list_bookcases_annotates_slot_counts() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "owner").await;
    let stranger = create_test_user(&db, "stranger").await;
    let repo = SeaOrmBookcaseRepository::new(db.clone());

    repo.create_with_slots(owner, "Living Room".to_string(), 3, 4)
        .await
        .unwrap();
    repo.create_with_slots(owner, "Office".to_string(), 2, 5)
        .await
        .unwrap();
    repo.create_with_slots(stranger, "Bedroom".to_string(), 1, 1)
        .await
        .unwrap();

    let page = repo
        .find_all(
            owner,
            BookcaseFilter {
                sort: Some("name_asc".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.bookcases.len(), 2);
    assert_eq!(page.bookcases[0].name, "Living Room");
    assert_eq!(page.bookcases[0].slot_count, 12);
    assert_eq!(page.bookcases[1].name, "Office");
    assert_eq!(page.bookcases[1].slot_count, 10);
}
