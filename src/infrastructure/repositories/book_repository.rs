//! SeaORM implementation of BookRepository
//!
//! A book's visibility is derived through the slot it occupies: every
//! guarded query joins book -> slot -> bookcase and compares the
//! bookcase owner against the acting user. Unplaced books fall out of
//! the inner join and are invisible.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
};

use crate::domain::{BookFilter, BookInput, BookRepository, DomainError, PaginatedBooks};
use crate::models::Book;
use crate::models::{book, book_author, bookcase, bookcase_slot};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolve a book visible to the owner. Missing and not-owned are
    /// indistinguishable; both come back as None.
    async fn find_owned(&self, owner_id: i32, id: i32) -> Result<Option<book::Model>, DomainError> {
        let model = book::Entity::find_by_id(id)
            .join(JoinType::InnerJoin, book::Relation::BookcaseSlot.def())
            .join(JoinType::InnerJoin, bookcase_slot::Relation::Bookcase.def())
            .filter(bookcase::Column::UserId.eq(owner_id))
            .one(&self.db)
            .await?;
        Ok(model)
    }

    /// The selected slot must sit in one of the acting owner's
    /// bookcases; anything else is rejected before any write.
    async fn resolve_owned_slot(
        &self,
        owner_id: i32,
        slot_id: i32,
    ) -> Result<bookcase_slot::Model, DomainError> {
        bookcase_slot::Entity::find_by_id(slot_id)
            .join(JoinType::InnerJoin, bookcase_slot::Relation::Bookcase.def())
            .filter(bookcase::Column::UserId.eq(owner_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                DomainError::Validation(
                    "bookcase_slot: slot does not belong to one of your bookcases".to_string(),
                )
            })
    }

    /// A slot holds at most one book. The UNIQUE constraint on the
    /// slot reference backs this check against races.
    async fn ensure_slot_free(
        &self,
        slot_id: i32,
        exclude_book: Option<i32>,
    ) -> Result<(), DomainError> {
        let mut query = book::Entity::find().filter(book::Column::BookcaseSlotId.eq(slot_id));
        if let Some(book_id) = exclude_book {
            query = query.filter(book::Column::Id.ne(book_id));
        }

        if query.one(&self.db).await?.is_some() {
            return Err(DomainError::Conflict(
                "bookcase_slot: slot is already occupied".to_string(),
            ));
        }

        Ok(())
    }

    async fn validate_input(
        &self,
        owner_id: i32,
        input: &BookInput,
        exclude_book: Option<i32>,
    ) -> Result<(), DomainError> {
        if book_author::Entity::find_by_id(input.author_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(DomainError::Validation(
                "author: unknown author".to_string(),
            ));
        }

        if let Some(slot_id) = input.bookcase_slot_id {
            self.resolve_owned_slot(owner_id, slot_id).await?;
            self.ensure_slot_free(slot_id, exclude_book).await?;
        }

        Ok(())
    }

    // Enrich the DTO with the display columns the dashboard table
    // shows, fetched per row.
    async fn to_dto(&self, model: book::Model) -> Result<Book, DomainError> {
        let mut dto = Book::from(model.clone());

        if let Some(author) = model
            .find_related(book_author::Entity)
            .one(&self.db)
            .await?
        {
            dto.author_name = Some(format!("{} {}", author.firstname, author.lastname));
        }

        if let Some(slot) = model
            .find_related(bookcase_slot::Entity)
            .one(&self.db)
            .await?
        {
            dto.bookshelf_number = Some(slot.bookshelf_number);
            dto.number = Some(slot.number);

            if let Some(case) = slot.find_related(bookcase::Entity).one(&self.db).await? {
                dto.bookcase_name = Some(case.name);
            }
        }

        Ok(dto)
    }
}

fn occupied_slot_conflict(e: sea_orm::DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::Conflict(
            "bookcase_slot: slot is already occupied".to_string(),
        ),
        _ => e.into(),
    }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(
        &self,
        owner_id: i32,
        filter: BookFilter,
    ) -> Result<PaginatedBooks, DomainError> {
        let mut query = book::Entity::find()
            .join(JoinType::InnerJoin, book::Relation::BookcaseSlot.def())
            .join(JoinType::InnerJoin, bookcase_slot::Relation::Bookcase.def())
            .join(JoinType::InnerJoin, book::Relation::Author.def())
            .filter(bookcase::Column::UserId.eq(owner_id));

        if let Some(name) = &filter.name
            && !name.is_empty()
        {
            query = query.filter(book::Column::Name.contains(name));
        }

        if let Some(author_name) = &filter.author_name
            && !author_name.is_empty()
        {
            let cond = Condition::any()
                .add(book_author::Column::Firstname.contains(author_name))
                .add(book_author::Column::Lastname.contains(author_name));
            query = query.filter(cond);
        }

        if let Some(bookcase_name) = &filter.bookcase_name
            && !bookcase_name.is_empty()
        {
            query = query.filter(bookcase::Column::Name.contains(bookcase_name));
        }

        if let Some(shelf) = filter.bookshelf_number {
            query = query.filter(bookcase_slot::Column::BookshelfNumber.eq(shelf));
        }

        if let Some(number) = filter.number {
            query = query.filter(bookcase_slot::Column::Number.eq(number));
        }

        match filter.sort.as_deref() {
            Some("name_asc") => query = query.order_by_asc(book::Column::Name),
            Some("name_desc") => query = query.order_by_desc(book::Column::Name),
            Some("author_asc") => query = query.order_by_asc(book_author::Column::Firstname),
            Some("bookcase_asc") => query = query.order_by_asc(bookcase::Column::Name),
            Some("position_asc") => {
                query = query
                    .order_by_asc(bookcase_slot::Column::BookshelfNumber)
                    .order_by_asc(bookcase_slot::Column::Number)
            }
            _ => query = query.order_by_desc(book::Column::Id),
        }

        let (books, total) = if let Some(limit) = filter.limit {
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

        let mut book_dtos = Vec::with_capacity(books.len());
        for book_model in books {
            book_dtos.push(self.to_dto(book_model).await?);
        }

        Ok(PaginatedBooks {
            books: book_dtos,
            total,
        })
    }

    async fn find_by_id(&self, owner_id: i32, id: i32) -> Result<Option<Book>, DomainError> {
        let model = self.find_owned(owner_id, id).await?;

        match model {
            Some(model) => Ok(Some(self.to_dto(model).await?)),
            None => Ok(None),
        }
    }

    async fn create(&self, owner_id: i32, input: BookInput) -> Result<Book, DomainError> {
        self.validate_input(owner_id, &input, None).await?;

        let now = chrono::Utc::now().to_rfc3339();

        let new_book = book::ActiveModel {
            name: Set(input.name),
            author_id: Set(input.author_id),
            bookcase_slot_id: Set(input.bookcase_slot_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_book
            .insert(&self.db)
            .await
            .map_err(occupied_slot_conflict)?;

        self.to_dto(result).await
    }

    async fn update(&self, owner_id: i32, id: i32, input: BookInput) -> Result<Book, DomainError> {
        let existing = self
            .find_owned(owner_id, id)
            .await?
            .ok_or(DomainError::NotFound)?;

        self.validate_input(owner_id, &input, Some(id)).await?;

        let mut active: book::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.author_id = Set(input.author_id);
        active.bookcase_slot_id = Set(input.bookcase_slot_id);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active
            .update(&self.db)
            .await
            .map_err(occupied_slot_conflict)?;

        self.to_dto(result).await
    }

    async fn delete(&self, owner_id: i32, id: i32) -> Result<(), DomainError> {
        self.find_owned(owner_id, id)
            .await?
            .ok_or(DomainError::NotFound)?;

        let result = book::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }

    async fn set_picture(&self, owner_id: i32, id: i32, path: String) -> Result<Book, DomainError> {
        let existing = self
            .find_owned(owner_id, id)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: book::ActiveModel = existing.into();
        active.picture = Set(Some(path));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active.update(&self.db).await?;

        self.to_dto(result).await
    }
}
