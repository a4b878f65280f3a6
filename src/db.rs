use sqlx::SqlitePool;

use crate::error::Result;

/// Create the reference schema if missing / 참조 스키마 생성
///
/// The dataset itself is produced by the ETL pipeline; this only guarantees the tables
/// exist so a fresh database file (or a test database) can be opened.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS characters (
            id TEXT PRIMARY KEY,
            char TEXT NOT NULL UNIQUE,
            codepoint INTEGER NOT NULL DEFAULT 0,
            strokes INTEGER,
            radical TEXT,
            unihan_def TEXT,
            grade_level INTEGER,
            created_at TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS readings (
            id TEXT PRIMARY KEY,
            character_id TEXT NOT NULL,
            "type" TEXT NOT NULL,
            value TEXT NOT NULL,
            is_primary INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (character_id) REFERENCES characters(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS decompositions (
            character_id TEXT PRIMARY KEY,
            ids TEXT,
            components TEXT NOT NULL DEFAULT '[]',
            confidence REAL NOT NULL DEFAULT 0.0,
            FOREIGN KEY (character_id) REFERENCES characters(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS phonetic_classes (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS character_phonetic_class (
            character_id TEXT NOT NULL,
            phonetic_class_id TEXT NOT NULL,
            PRIMARY KEY (character_id, phonetic_class_id),
            FOREIGN KEY (character_id) REFERENCES characters(id) ON DELETE CASCADE,
            FOREIGN KEY (phonetic_class_id) REFERENCES phonetic_classes(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meaning_senses (
            id TEXT PRIMARY KEY,
            character_id TEXT NOT NULL,
            label TEXT NOT NULL,
            short_gloss TEXT,
            example TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (character_id) REFERENCES characters(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meaning_edges (
            id TEXT PRIMARY KEY,
            character_id TEXT NOT NULL,
            parent_sense_id TEXT NOT NULL,
            child_sense_id TEXT NOT NULL,
            relation TEXT NOT NULL,
            note TEXT,
            FOREIGN KEY (character_id) REFERENCES characters(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lessons (
            id INTEGER PRIMARY KEY,
            number INTEGER NOT NULL UNIQUE,
            title TEXT NOT NULL,
            theme TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS radical_details (
            character_id TEXT PRIMARY KEY,
            radical_number INTEGER NOT NULL UNIQUE,
            lesson_id INTEGER,
            explanation TEXT,
            shuowen_chinese TEXT,
            shuowen_korean TEXT,
            variants TEXT NOT NULL DEFAULT '[]',
            reading_hun TEXT,
            reading_eum TEXT,
            FOREIGN KEY (character_id) REFERENCES characters(id) ON DELETE CASCADE,
            FOREIGN KEY (lesson_id) REFERENCES lessons(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS radical_children (
            radical_char TEXT NOT NULL,
            child_char TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (radical_char, child_char)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS character_details (
            character_id TEXT PRIMARY KEY,
            explanation TEXT,
            shuowen_chinese TEXT,
            shuowen_korean TEXT,
            FOREIGN KEY (character_id) REFERENCES characters(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Lookup indexes for foreign-key and text-match access paths / 조회용 인덱스
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_readings_character ON readings(character_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_readings_value ON readings(value)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cpc_class ON character_phonetic_class(phonetic_class_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_senses_character ON meaning_senses(character_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_edges_character ON meaning_edges(character_id)")
        .execute(pool)
        .await?;

    tracing::debug!("Reference schema ready");
    Ok(())
}
