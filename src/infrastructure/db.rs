use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Create users table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create bookcases table. An owner cannot have two bookcases with
    // the same name; deleting an owner removes their bookcases.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS bookcases (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, name),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create bookcase_slots table. One row per (shelf, position)
    // coordinate, created in bulk at bookcase creation and removed
    // together with the bookcase.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS bookcase_slots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            bookcase_id INTEGER NOT NULL,
            bookshelf_number INTEGER NOT NULL,
            number INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (bookcase_id, bookshelf_number, number),
            FOREIGN KEY (bookcase_id) REFERENCES bookcases(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_bookcase_slots_bookcase_id ON bookcase_slots(bookcase_id);
        "#
        .to_owned(),
    ))
    .await?;

    // Create book_authors table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS book_authors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            firstname TEXT NOT NULL,
            lastname TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (firstname, lastname)
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create books table. The UNIQUE slot reference keeps the
    // slot/book relation one-to-one (SQLite permits many NULLs, so any
    // number of books can be unplaced). Deleting a slot clears the
    // reference instead of deleting the book; deleting an author
    // removes the author's books.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            bookcase_slot_id INTEGER UNIQUE,
            author_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            picture TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (bookcase_slot_id) REFERENCES bookcase_slots(id) ON DELETE SET NULL,
            FOREIGN KEY (author_id) REFERENCES book_authors(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_books_author_id ON books(author_id);
        "#
        .to_owned(),
    ))
    .await?;

    Ok(())
}
