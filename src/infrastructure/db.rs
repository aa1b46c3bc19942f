use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        sql.to_owned(),
    ))
    .await?;
    Ok(())
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Reservations and payments reference their parents. A parent with
    // children cannot be deleted.
    execute(db, "PRAGMA foreign_keys = ON").await?;

    // Owner account (single hotel, single owner)
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY NOT NULL,
            email TEXT NOT NULL UNIQUE,
            full_name TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS hotel_settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            name TEXT NOT NULL,
            timezone TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    // Email uniqueness is a business rule only, so no UNIQUE constraint here.
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS guests (
            id TEXT PRIMARY KEY NOT NULL,
            full_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone_number TEXT,
            address TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS rooms (
            id TEXT PRIMARY KEY NOT NULL,
            room_number TEXT NOT NULL UNIQUE,
            room_type TEXT NOT NULL,
            rate REAL NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS reservations (
            id TEXT PRIMARY KEY NOT NULL,
            guest_id TEXT NOT NULL,
            room_id TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'confirmed', 'checked_in', 'checked_out', 'cancelled')),
            created_at TEXT NOT NULL,
            CHECK (end_date > start_date),
            FOREIGN KEY (guest_id) REFERENCES guests(id) ON DELETE RESTRICT,
            FOREIGN KEY (room_id) REFERENCES rooms(id) ON DELETE RESTRICT
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_reservations_guest_id ON reservations(guest_id)",
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_reservations_dates ON reservations(start_date, end_date)",
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS payments (
            id TEXT PRIMARY KEY NOT NULL,
            reservation_id TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            payment_date TEXT NOT NULL,
            payment_method TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (reservation_id) REFERENCES reservations(id) ON DELETE RESTRICT
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS audit_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            action_type TEXT NOT NULL,
            target_table TEXT NOT NULL,
            record_id TEXT,
            change_description TEXT NOT NULL,
            user_id TEXT,
            timestamp TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_audit_log_record_id ON audit_log(record_id)",
    )
    .await?;

    Ok(())
}
