use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// At most one book per slot; NULL means the book is unplaced
    /// (its slot was deleted along with its bookcase).
    #[sea_orm(unique)]
    pub bookcase_slot_id: Option<i32>,
    pub author_id: i32,
    pub name: String,
    pub picture: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bookcase_slot::Entity",
        from = "Column::BookcaseSlotId",
        to = "super::bookcase_slot::Column::Id"
    )]
    BookcaseSlot,
    #[sea_orm(
        belongs_to = "super::book_author::Entity",
        from = "Column::AuthorId",
        to = "super::book_author::Column::Id"
    )]
    Author,
}

impl Related<super::bookcase_slot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookcaseSlot.def()
    }
}

impl Related<super::book_author::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses, enriched with the display columns the
// dashboard table shows: bookcase name, shelf and slot coordinates,
// and the author's full name.
#[derive(Debug, Serialize, Deserialize)]
pub struct Book {
    pub id: Option<i32>,
    pub name: String,
    pub author_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    pub bookcase_slot_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookcase_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookshelf_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<Model> for Book {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            name: model.name,
            author_id: model.author_id,
            author_name: None,
            bookcase_slot_id: model.bookcase_slot_id,
            bookcase_name: None,
            bookshelf_number: None,
            number: None,
            picture: model.picture,
            created_at: Some(model.created_at),
            updated_at: Some(model.updated_at),
        }
    }
}
