//! SeaORM implementation of BookcaseRepository
//!
//! Owns the two pieces with real invariants: provisioning a bookcase's
//! slot grid atomically, and the grouped slot-count aggregation the
//! dashboard list displays.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr, TransactionTrait,
};

use crate::domain::{
    Bookcase, BookcaseFilter, BookcaseRepository, DomainError, PaginatedBookcases, Slot,
};
use crate::models::{book, bookcase, bookcase_slot};

/// Bounds on shelf count and shelf capacity. The form enforces the
/// same range; the repository rejects out-of-range values anyway so a
/// caller bypassing the form cannot provision a degenerate grid.
pub const MIN_SHELF_DIMENSION: i32 = 1;
pub const MAX_SHELF_DIMENSION: i32 = 10;

/// SeaORM-based implementation of BookcaseRepository
pub struct SeaOrmBookcaseRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookcaseRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolve one of the owner's bookcases. A bookcase that exists
    /// but belongs to another owner is indistinguishable from a
    /// missing one.
    async fn find_owned(
        &self,
        owner_id: i32,
        id: i32,
    ) -> Result<Option<bookcase::Model>, DomainError> {
        let model = bookcase::Entity::find_by_id(id)
            .filter(bookcase::Column::UserId.eq(owner_id))
            .one(&self.db)
            .await?;
        Ok(model)
    }

    fn to_dto(model: bookcase::Model, slot_count: i64) -> Bookcase {
        Bookcase {
            id: model.id,
            name: model.name,
            slot_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn duplicate_name_conflict(e: sea_orm::DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            DomainError::Conflict("name: you already have a bookcase with this name".to_string())
        }
        _ => e.into(),
    }
}

#[async_trait]
impl BookcaseRepository for SeaOrmBookcaseRepository {
    async fn find_all(
        &self,
        owner_id: i32,
        filter: BookcaseFilter,
    ) -> Result<PaginatedBookcases, DomainError> {
        let mut query = bookcase::Entity::find().filter(bookcase::Column::UserId.eq(owner_id));

        if let Some(name) = &filter.name
            && !name.is_empty()
        {
            query = query.filter(bookcase::Column::Name.contains(name));
        }

        match filter.sort.as_deref() {
            Some("name_asc") => query = query.order_by_asc(bookcase::Column::Name),
            Some("name_desc") => query = query.order_by_desc(bookcase::Column::Name),
            // newest first, the dashboard default
            _ => query = query.order_by_desc(bookcase::Column::Id),
        }

        let (cases, total) = if let Some(limit) = filter.limit {
            let page = filter.page.unwrap_or(0);
            let paginator = query.paginate(&self.db, limit);
            let total = paginator.num_items().await.unwrap_or(0);
            let items = paginator.fetch_page(page).await?;
            (items, total)
        } else {
            let items = query.all(&self.db).await?;
            let total = items.len() as u64;
            (items, total)
        };

        let ids: Vec<i32> = cases.iter().map(|c| c.id).collect();
        let counts = self.count_slots(&ids).await?;

        let bookcases = cases
            .into_iter()
            .map(|c| {
                let slot_count = counts.get(&c.id).copied().unwrap_or(0);
                Self::to_dto(c, slot_count)
            })
            .collect();

        Ok(PaginatedBookcases { bookcases, total })
    }

    async fn find_by_id(&self, owner_id: i32, id: i32) -> Result<Option<Bookcase>, DomainError> {
        let model = self.find_owned(owner_id, id).await?;

        match model {
            Some(model) => {
                let counts = self.count_slots(&[model.id]).await?;
                let slot_count = counts.get(&model.id).copied().unwrap_or(0);
                Ok(Some(Self::to_dto(model, slot_count)))
            }
            None => Ok(None),
        }
    }

    async fn create_with_slots(
        &self,
        owner_id: i32,
        name: String,
        shelf_count: i32,
        shelf_capacity: i32,
    ) -> Result<Bookcase, DomainError> {
        for (field, value) in [
            ("shelf_count", shelf_count),
            ("shelf_capacity", shelf_capacity),
        ] {
            if !(MIN_SHELF_DIMENSION..=MAX_SHELF_DIMENSION).contains(&value) {
                return Err(DomainError::Validation(format!(
                    "{}: must be between {} and {}",
                    field, MIN_SHELF_DIMENSION, MAX_SHELF_DIMENSION
                )));
            }
        }

        let now = chrono::Utc::now().to_rfc3339();

        // The bookcase row and its full slot grid are one atomic unit:
        // a failure anywhere below rolls back everything, so a
        // partially provisioned bookcase is never observable.
        let txn = self.db.begin().await?;

        let case = bookcase::ActiveModel {
            user_id: Set(owner_id),
            name: Set(name),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(duplicate_name_conflict)?;

        let slots: Vec<bookcase_slot::ActiveModel> = (1..=shelf_count)
            .flat_map(|shelf_number| {
                let created_at = now.clone();
                let bookcase_id = case.id;
                (1..=shelf_capacity).map(move |slot_number| bookcase_slot::ActiveModel {
                    bookcase_id: Set(bookcase_id),
                    bookshelf_number: Set(shelf_number),
                    number: Set(slot_number),
                    created_at: Set(created_at.clone()),
                    ..Default::default()
                })
            })
            .collect();

        bookcase_slot::Entity::insert_many(slots).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            "Provisioned bookcase {} with {} slots ({} shelves x {})",
            case.id,
            shelf_count * shelf_capacity,
            shelf_count,
            shelf_capacity
        );

        let slot_count = i64::from(shelf_count) * i64::from(shelf_capacity);
        Ok(Self::to_dto(case, slot_count))
    }

    async fn rename(&self, owner_id: i32, id: i32, name: String) -> Result<Bookcase, DomainError> {
        let existing = self
            .find_owned(owner_id, id)
            .await?
            .ok_or(DomainError::NotFound)?;

        let counts = self.count_slots(&[existing.id]).await?;
        let slot_count = counts.get(&existing.id).copied().unwrap_or(0);

        let mut active: bookcase::ActiveModel = existing.into();
        active.name = Set(name);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active
            .update(&self.db)
            .await
            .map_err(duplicate_name_conflict)?;

        Ok(Self::to_dto(result, slot_count))
    }

    async fn delete(&self, owner_id: i32, id: i32) -> Result<(), DomainError> {
        self.find_owned(owner_id, id)
            .await?
            .ok_or(DomainError::NotFound)?;

        // Cascades to the slot grid; books referencing those slots
        // have their reference cleared and survive as unplaced.
        let result = bookcase::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }

    async fn count_slots(&self, bookcase_ids: &[i32]) -> Result<HashMap<i32, i64>, DomainError> {
        if bookcase_ids.is_empty() {
            return Ok(HashMap::new());
        }

        // One grouped count restricted to the displayed bookcases, not
        // a global scan. Bookcases with zero slots simply have no row.
        let rows: Vec<(i32, i64)> = bookcase_slot::Entity::find()
            .select_only()
            .column(bookcase_slot::Column::BookcaseId)
            .column_as(bookcase_slot::Column::Id.count(), "total")
            .filter(bookcase_slot::Column::BookcaseId.is_in(bookcase_ids.iter().copied()))
            .group_by(bookcase_slot::Column::BookcaseId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().collect())
    }

    async fn find_slots(
        &self,
        owner_id: i32,
        bookcase_id: Option<i32>,
    ) -> Result<Vec<Slot>, DomainError> {
        let mut query = bookcase_slot::Entity::find()
            .join(JoinType::InnerJoin, bookcase_slot::Relation::Bookcase.def())
            .filter(bookcase::Column::UserId.eq(owner_id));

        if let Some(id) = bookcase_id {
            query = query.filter(bookcase_slot::Column::BookcaseId.eq(id));
        }

        let slots = query
            .order_by_asc(bookcase_slot::Column::BookcaseId)
            .order_by_asc(bookcase_slot::Column::BookshelfNumber)
            .order_by_asc(bookcase_slot::Column::Number)
            .all(&self.db)
            .await?;

        // Annotate occupancy without filtering occupied slots out: the
        // book form offers every slot of the owner's bookcases.
        let slot_ids: Vec<i32> = slots.iter().map(|s| s.id).collect();
        let occupancy: HashMap<i32, i32> = if slot_ids.is_empty() {
            HashMap::new()
        } else {
            book::Entity::find()
                .filter(book::Column::BookcaseSlotId.is_in(slot_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .filter_map(|b| b.bookcase_slot_id.map(|slot_id| (slot_id, b.id)))
                .collect()
        };

        Ok(slots
            .into_iter()
            .map(|s| Slot {
                id: s.id,
                bookcase_id: s.bookcase_id,
                bookshelf_number: s.bookshelf_number,
                number: s.number,
                book_id: occupancy.get(&s.id).copied(),
            })
            .collect())
    }
}
