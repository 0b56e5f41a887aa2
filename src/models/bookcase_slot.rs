use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A `(bookshelf_number, number)` coordinate within a bookcase, both
/// 1-based. Slots are created only in bulk when their bookcase is
/// provisioned and are immutable afterwards, so there is no
/// `updated_at` column. A slot holds at most one book.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookcase_slots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub bookcase_id: i32,
    pub bookshelf_number: i32,
    pub number: i32,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bookcase::Entity",
        from = "Column::BookcaseId",
        to = "super::bookcase::Column::Id"
    )]
    Bookcase,
    #[sea_orm(has_one = "super::book::Entity")]
    Book,
}

impl Related<super::bookcase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookcase.def()
    }
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
