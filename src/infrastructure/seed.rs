use sea_orm::*;

use crate::domain::{BookInput, BookRepository, BookcaseRepository, DomainError};
use crate::infrastructure::auth::hash_password;
use crate::infrastructure::repositories::{SeaOrmBookRepository, SeaOrmBookcaseRepository};
use crate::models::{book_author, bookcase, user};

fn seed_err(e: DomainError) -> DbErr {
    DbErr::Custom(e.to_string())
}

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    // 1. Create Users
    let admin_password = hash_password("admin").unwrap();
    let user_password = hash_password("user").unwrap();

    let admin = user::ActiveModel {
        username: Set("admin".to_owned()),
        password_hash: Set(admin_password),
        role: Set("admin".to_owned()),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        updated_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    let normal_user = user::ActiveModel {
        username: Set("user".to_owned()),
        password_hash: Set(user_password),
        role: Set("user".to_owned()),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        updated_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    user::Entity::insert(admin)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec(db)
        .await?;

    user::Entity::insert(normal_user)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec(db)
        .await?;

    let admin = user::Entity::find()
        .filter(user::Column::Username.eq("admin"))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::Custom("admin user missing after seed".to_owned()))?;

    // Seeding is not idempotent past this point (provisioning the same
    // bookcase twice would trip the name constraint), so bail out if
    // the admin already has furniture.
    let existing = bookcase::Entity::find()
        .filter(bookcase::Column::UserId.eq(admin.id))
        .count(db)
        .await?;
    if existing > 0 {
        tracing::info!("Demo data already present, skipping seed");
        return Ok(());
    }

    // 2. Create bookcases with their slot grids
    let bookcase_repo = SeaOrmBookcaseRepository::new(db.clone());
    let book_repo = SeaOrmBookRepository::new(db.clone());

    let living_room = bookcase_repo
        .create_with_slots(admin.id, "Living Room".to_owned(), 3, 4)
        .await
        .map_err(seed_err)?;
    bookcase_repo
        .create_with_slots(admin.id, "Office".to_owned(), 2, 5)
        .await
        .map_err(seed_err)?;

    // 3. Create Authors
    let authors = [
        ("Frank", "Herbert"),
        ("J.R.R.", "Tolkien"),
        ("Isaac", "Asimov"),
    ];

    for (firstname, lastname) in authors {
        let author = book_author::ActiveModel {
            firstname: Set(firstname.to_owned()),
            lastname: Set(lastname.to_owned()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        book_author::Entity::insert(author)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    book_author::Column::Firstname,
                    book_author::Column::Lastname,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(db)
            .await?;
    }

    // 4. Place a few books on the Living Room shelves
    let slots = bookcase_repo
        .find_slots(admin.id, Some(living_room.id))
        .await
        .map_err(seed_err)?;

    let titles = [
        ("Dune", "Frank", "Herbert"),
        ("The Hobbit", "J.R.R.", "Tolkien"),
        ("Foundation", "Isaac", "Asimov"),
    ];

    for ((name, firstname, lastname), slot) in titles.iter().zip(slots.iter()) {
        let author = book_author::Entity::find()
            .filter(book_author::Column::Firstname.eq(*firstname))
            .filter(book_author::Column::Lastname.eq(*lastname))
            .one(db)
            .await?
            .ok_or_else(|| DbErr::Custom(format!("author {} {} missing", firstname, lastname)))?;

        book_repo
            .create(
                admin.id,
                BookInput {
                    name: (*name).to_string(),
                    author_id: author.id,
                    bookcase_slot_id: Some(slot.id),
                },
            )
            .await
            .map_err(seed_err)?;
    }

    Ok(())
}
