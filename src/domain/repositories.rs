//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.
//!
//! Every operation on owner-scoped entities takes the acting owner's id
//! and performs an explicit ownership check; an entity that exists but
//! belongs to someone else is reported as `NotFound`.

use std::collections::HashMap;

use async_trait::async_trait;

use super::DomainError;
use crate::models::Book;

/// Filter criteria for bookcase queries
#[derive(Debug, Default, Clone)]
pub struct BookcaseFilter {
    pub name: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Bookcase data for API responses, annotated with its slot count
#[derive(Debug, Clone, serde::Serialize)]
pub struct Bookcase {
    pub id: i32,
    pub name: String,
    pub slot_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Paginated bookcases with total count
#[derive(Debug)]
pub struct PaginatedBookcases {
    pub bookcases: Vec<Bookcase>,
    pub total: u64,
}

/// A slot with its occupancy annotation. `book_id` is the book
/// currently placed in the slot, if any; occupied slots are still
/// listed in the selection set offered to owners.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Slot {
    pub id: i32,
    pub bookcase_id: i32,
    pub bookshelf_number: i32,
    pub number: i32,
    pub book_id: Option<i32>,
}

/// Repository trait for Bookcase and its slots
#[async_trait]
pub trait BookcaseRepository: Send + Sync {
    /// Find the owner's bookcases matching the filter, each annotated
    /// with its slot count
    async fn find_all(
        &self,
        owner_id: i32,
        filter: BookcaseFilter,
    ) -> Result<PaginatedBookcases, DomainError>;

    /// Find one of the owner's bookcases by id
    async fn find_by_id(&self, owner_id: i32, id: i32) -> Result<Option<Bookcase>, DomainError>;

    /// Create a bookcase and provision its full slot grid atomically:
    /// `shelf_count * shelf_capacity` slots covering every
    /// `(bookshelf_number, number)` pair, 1-based. Either the bookcase
    /// and all of its slots are persisted, or nothing is.
    ///
    /// Provisioning happens exactly once, at creation time; resizing is
    /// unsupported and only the name is editable afterwards.
    async fn create_with_slots(
        &self,
        owner_id: i32,
        name: String,
        shelf_count: i32,
        shelf_capacity: i32,
    ) -> Result<Bookcase, DomainError>;

    /// Rename a bookcase. The only supported mutation post-creation.
    async fn rename(&self, owner_id: i32, id: i32, name: String) -> Result<Bookcase, DomainError>;

    /// Delete a bookcase. Cascades to its slots; books referencing
    /// those slots become unplaced rather than being deleted.
    async fn delete(&self, owner_id: i32, id: i32) -> Result<(), DomainError>;

    /// Grouped slot count for the given bookcases only. Bookcases with
    /// zero slots are absent from the map; callers default missing
    /// keys to zero. No ordering guarantee.
    async fn count_slots(&self, bookcase_ids: &[i32]) -> Result<HashMap<i32, i64>, DomainError>;

    /// List slots across the owner's bookcases, optionally restricted
    /// to one bookcase, with occupancy annotation. This is the
    /// selection set offered by the book form; occupied slots are not
    /// filtered out.
    async fn find_slots(
        &self,
        owner_id: i32,
        bookcase_id: Option<i32>,
    ) -> Result<Vec<Slot>, DomainError>;
}

/// Filter criteria for author queries
#[derive(Debug, Default, Clone)]
pub struct AuthorFilter {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub query: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Author data for API responses
#[derive(Debug, Clone, serde::Serialize)]
pub struct Author {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Paginated authors with total count
#[derive(Debug)]
pub struct PaginatedAuthors {
    pub authors: Vec<Author>,
    pub total: u64,
}

/// Repository trait for BookAuthor. Authors are not owner-scoped.
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Find all authors matching the filter
    async fn find_all(&self, filter: AuthorFilter) -> Result<PaginatedAuthors, DomainError>;

    /// Find an author by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, DomainError>;

    /// Create a new author
    async fn create(&self, firstname: String, lastname: String) -> Result<Author, DomainError>;

    /// Update an author's name pair
    async fn update(
        &self,
        id: i32,
        firstname: String,
        lastname: String,
    ) -> Result<Author, DomainError>;

    /// Delete an author. Cascades to the author's books.
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Filter criteria for book queries
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    pub name: Option<String>,
    pub author_name: Option<String>,
    pub bookcase_name: Option<String>,
    pub bookshelf_number: Option<i32>,
    pub number: Option<i32>,
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Input for creating or updating a book
#[derive(Debug, Clone, serde::Deserialize)]
pub struct BookInput {
    pub name: String,
    pub author_id: i32,
    pub bookcase_slot_id: Option<i32>,
}

/// Paginated books with total count
#[derive(Debug)]
pub struct PaginatedBooks {
    pub books: Vec<Book>,
    pub total: u64,
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find the owner's placed books matching the filter. Visibility is
    /// derived through the slot each book occupies; unplaced books are
    /// excluded.
    async fn find_all(
        &self,
        owner_id: i32,
        filter: BookFilter,
    ) -> Result<PaginatedBooks, DomainError>;

    /// Find a single book by ID, scoped through its slot's bookcase
    async fn find_by_id(&self, owner_id: i32, id: i32) -> Result<Option<Book>, DomainError>;

    /// Create a new book. The selected slot, if any, must belong to
    /// one of the owner's bookcases and must be free.
    async fn create(&self, owner_id: i32, input: BookInput) -> Result<Book, DomainError>;

    /// Update an existing book, including moving it to another owned
    /// free slot or unplacing it
    async fn update(&self, owner_id: i32, id: i32, input: BookInput) -> Result<Book, DomainError>;

    /// Delete a book by ID
    async fn delete(&self, owner_id: i32, id: i32) -> Result<(), DomainError>;

    /// Store the path of an uploaded picture on the book
    async fn set_picture(&self, owner_id: i32, id: i32, path: String) -> Result<Book, DomainError>;
}
