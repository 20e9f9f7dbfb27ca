use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

const CREATE_MATERIALS_TABLE: &str = r#"
    CREATE TABLE a001_materials (
        id TEXT PRIMARY KEY NOT NULL,
        codice TEXT,
        codicenet TEXT,
        descrizione TEXT,
        data_acquisto TEXT,
        giacenza_torino REAL,
        giacenza_milano REAL,
        giacenza_genova REAL,
        giacenza_bologna REAL,
        giacenza_roma REAL,
        importo REAL,
        sconto REAL
    );
"#;

const CREATE_SERVICE_ORDERS_TABLE: &str = r#"
    CREATE TABLE a002_service_orders (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        MesePresentazione TEXT,
        RTC TEXT,
        NumeroOrdine TEXT,
        Cliente TEXT,
        PuntoVendita TEXT,
        Citta TEXT,
        DataIntervento TEXT,
        Descrizione TEXT,
        Importo REAL,
        Stato TEXT,
        Note TEXT,
        DataInserimento TEXT
    );
"#;

const CREATE_EDIT_LOG_TABLE: &str = r#"
    CREATE TABLE sys_grid_edit_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        grid TEXT NOT NULL,
        row_id TEXT NOT NULL,
        field TEXT NOT NULL,
        old_value TEXT,
        new_value TEXT,
        changed_at TEXT NOT NULL
    );
"#;

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/app.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    ensure_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

/// Creates the grid tables that do not exist yet.
pub async fn ensure_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    let tables = [
        ("a001_materials", CREATE_MATERIALS_TABLE),
        ("a002_service_orders", CREATE_SERVICE_ORDERS_TABLE),
        ("sys_grid_edit_log", CREATE_EDIT_LOG_TABLE),
    ];

    for (name, create_sql) in tables {
        if table_exists(conn, name).await? {
            continue;
        }
        tracing::info!("Creating {} table", name);
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_sql.to_string(),
        ))
        .await?;
    }
    Ok(())
}

async fn table_exists(conn: &DatabaseConnection, name: &str) -> anyhow::Result<bool> {
    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type='table' AND name = ?",
            [name.into()],
        ))
        .await?;
    Ok(!rows.is_empty())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

/// Single-connection in-memory database with the grid schema, for tests.
#[cfg(test)]
pub async fn memory_connection() -> DatabaseConnection {
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).min_connections(1);
    let conn = Database::connect(options)
        .await
        .expect("in-memory sqlite");
    ensure_schema(&conn).await.expect("schema bootstrap");
    conn
}
