use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Проверить наличие таблицы и создать её при отсутствии
async fn ensure_table(
    conn: &DatabaseConnection,
    name: &str,
    create_sql: &str,
) -> anyhow::Result<()> {
    let check = format!(
        "SELECT name FROM sqlite_master WHERE type='table' AND name='{}';",
        name
    );
    let existing = conn
        .query_all(Statement::from_string(DatabaseBackend::Sqlite, check))
        .await?;

    if existing.is_empty() {
        tracing::info!("Creating {} table", name);
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_sql.to_string(),
        ))
        .await?;
    }
    Ok(())
}

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

    ensure_table(
        &conn,
        "a001_organization",
        r#"
        CREATE TABLE a001_organization (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            full_name TEXT NOT NULL,
            inn TEXT NOT NULL DEFAULT '',
            kpp TEXT NOT NULL DEFAULT '',
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_posted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
    "#,
    )
    .await?;

    ensure_table(
        &conn,
        "a002_warehouse",
        r#"
        CREATE TABLE a002_warehouse (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            organization_id TEXT NOT NULL,
            address TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 1,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_posted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
    "#,
    )
    .await?;

    ensure_table(
        &conn,
        "a003_supplier",
        r#"
        CREATE TABLE a003_supplier (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            inn TEXT NOT NULL DEFAULT '',
            kpp TEXT NOT NULL DEFAULT '',
            is_blocked INTEGER NOT NULL DEFAULT 0,
            block_reason TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_posted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
    "#,
    )
    .await?;

    ensure_table(
        &conn,
        "a004_nomenclature",
        r#"
        CREATE TABLE a004_nomenclature (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            article TEXT NOT NULL DEFAULT '',
            unit TEXT NOT NULL DEFAULT '',
            is_folder INTEGER NOT NULL DEFAULT 0,
            parent_id TEXT,
            default_internal_code TEXT NOT NULL DEFAULT '',
            default_supplier_code TEXT NOT NULL DEFAULT '',
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_posted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
    "#,
    )
    .await?;

    ensure_table(
        &conn,
        "a005_purchase_order",
        r#"
        CREATE TABLE a005_purchase_order (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            document_no TEXT NOT NULL,
            document_date TEXT NOT NULL,
            organization_id TEXT NOT NULL,
            supplier_key TEXT NOT NULL,
            state TEXT NOT NULL DEFAULT 'draft',
            lines_json TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_posted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
    "#,
    )
    .await?;

    ensure_table(
        &conn,
        "a006_goods_receipt",
        r#"
        CREATE TABLE a006_goods_receipt (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            document_no TEXT NOT NULL,
            document_date TEXT NOT NULL,
            organization_id TEXT NOT NULL,
            warehouse_id TEXT NOT NULL,
            supplier_key TEXT NOT NULL,
            kind TEXT NOT NULL DEFAULT 'purchase',
            status TEXT NOT NULL DEFAULT 'draft',
            order_ref TEXT,
            urgent INTEGER NOT NULL DEFAULT 0,
            fast_track INTEGER NOT NULL DEFAULT 0,
            total_amount REAL NOT NULL DEFAULT 0,
            regularization_required INTEGER NOT NULL DEFAULT 0,
            regularization_deadline TEXT,
            reason TEXT,
            created_by TEXT NOT NULL DEFAULT '',
            is_deleted INTEGER NOT NULL DEFAULT 0,
            is_posted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
    "#,
    )
    .await?;

    // Единственный арбитр уникальности номера в серии (организация, номер).
    // Сканирование перед вставкой — лишь подсказка для кандидата.
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "CREATE UNIQUE INDEX IF NOT EXISTS ux_a006_goods_receipt_no \
         ON a006_goods_receipt(organization_id, document_no);"
            .to_string(),
    ))
    .await?;

    ensure_table(
        &conn,
        "a006_goods_receipt_line",
        r#"
        CREATE TABLE a006_goods_receipt_line (
            id TEXT PRIMARY KEY NOT NULL,
            receipt_id TEXT NOT NULL,
            line_no INTEGER NOT NULL,
            nomenclature_key TEXT NOT NULL,
            qty_expected REAL NOT NULL DEFAULT 0,
            qty_received REAL NOT NULL DEFAULT 0,
            qty_accepted REAL NOT NULL DEFAULT 0,
            qty_rejected REAL NOT NULL DEFAULT 0,
            unit_price REAL NOT NULL DEFAULT 0,
            amount REAL NOT NULL DEFAULT 0,
            internal_code TEXT,
            supplier_code TEXT,
            lot TEXT,
            expiry_date TEXT
        );
    "#,
    )
    .await?;

    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "CREATE INDEX IF NOT EXISTS ix_a006_line_receipt \
         ON a006_goods_receipt_line(receipt_id);"
            .to_string(),
    ))
    .await?;

    ensure_table(
        &conn,
        "a007_receipt_policy",
        r#"
        CREATE TABLE a007_receipt_policy (
            organization_id TEXT PRIMARY KEY NOT NULL,
            fast_track_total_ceiling REAL NOT NULL,
            fast_track_line_ceiling REAL NOT NULL,
            fast_track_warn_threshold REAL NOT NULL,
            fast_track_grace_days INTEGER NOT NULL,
            updated_at TEXT
        );
    "#,
    )
    .await?;

    ensure_table(
        &conn,
        "invoice_raw_storage",
        r#"
        CREATE TABLE invoice_raw_storage (
            id TEXT PRIMARY KEY NOT NULL,
            source_system TEXT NOT NULL,
            invoice_no TEXT NOT NULL,
            supplier_key TEXT NOT NULL,
            raw_json TEXT NOT NULL,
            fetched_at TEXT NOT NULL,
            processed INTEGER NOT NULL DEFAULT 0,
            processed_at TEXT,
            created_at TEXT NOT NULL
        );
    "#,
    )
    .await?;

    ensure_table(
        &conn,
        "system_log",
        r#"
        CREATE TABLE system_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            source TEXT NOT NULL,
            category TEXT NOT NULL,
            message TEXT NOT NULL
        );
    "#,
    )
    .await?;

    ensure_table(
        &conn,
        "system_audit",
        r#"
        CREATE TABLE system_audit (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            entity_kind TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            organization_id TEXT NOT NULL,
            principal TEXT NOT NULL,
            status TEXT NOT NULL,
            links_json TEXT NOT NULL DEFAULT '[]',
            message TEXT NOT NULL
        );
    "#,
    )
    .await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}
