//! SeaORM implementation of AuthorRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};

use crate::domain::{Author, AuthorFilter, AuthorRepository, DomainError, PaginatedAuthors};
use crate::models::book_author::{ActiveModel, Column, Entity as AuthorEntity, Model};

/// SeaORM-based implementation of AuthorRepository
pub struct SeaOrmAuthorRepository {
    db: DatabaseConnection,
}

impl SeaOrmAuthorRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_dto(model: Model) -> Author {
    Author {
        id: model.id,
        firstname: model.firstname,
        lastname: model.lastname,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn duplicate_author_conflict(e: sea_orm::DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::Conflict(
            "firstname, lastname: an author with this name already exists".to_string(),
        ),
        _ => e.into(),
    }
}

#[async_trait]
impl AuthorRepository for SeaOrmAuthorRepository {
    async fn find_all(&self, filter: AuthorFilter) -> Result<PaginatedAuthors, DomainError> {
        let mut query = AuthorEntity::find();

        if let Some(firstname) = &filter.firstname
            && !firstname.is_empty()
        {
            query = query.filter(Column::Firstname.contains(firstname));
        }

        if let Some(lastname) = &filter.lastname
            && !lastname.is_empty()
        {
            query = query.filter(Column::Lastname.contains(lastname));
        }

        if let Some(q) = &filter.query
            && !q.is_empty()
        {
            let cond = Condition::any()
                .add(Column::Firstname.contains(q))
                .add(Column::Lastname.contains(q));
            query = query.filter(cond);
        }

        match filter.sort.as_deref() {
            Some("firstname_asc") => query = query.order_by_asc(Column::Firstname),
            Some("firstname_desc") => query = query.order_by_desc(Column::Firstname),
            Some("lastname_asc") => query = query.order_by_asc(Column::Lastname),
            Some("lastname_desc") => query = query.order_by_desc(Column::Lastname),
            _ => query = query.order_by_desc(Column::Id),
        }

        let (authors, total) = if let Some(limit) = filter.limit {
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

        Ok(PaginatedAuthors {
            authors: authors.into_iter().map(to_dto).collect(),
            total,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, DomainError> {
        let author = AuthorEntity::find_by_id(id).one(&self.db).await?;

        Ok(author.map(to_dto))
    }

    async fn create(&self, firstname: String, lastname: String) -> Result<Author, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let author = ActiveModel {
            firstname: Set(firstname),
            lastname: Set(lastname),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = author
            .insert(&self.db)
            .await
            .map_err(duplicate_author_conflict)?;

        Ok(to_dto(result))
    }

    async fn update(
        &self,
        id: i32,
        firstname: String,
        lastname: String,
    ) -> Result<Author, DomainError> {
        let existing = AuthorEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.firstname = Set(firstname);
        active.lastname = Set(lastname);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active
            .update(&self.db)
            .await
            .map_err(duplicate_author_conflict)?;

        Ok(to_dto(result))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        // Cascades to the author's books.
        let result = AuthorEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }
}
