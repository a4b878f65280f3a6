//! SQLite-backed reference store / SQLite 참조 저장소
//!
//! Read-only from the application's point of view. The pool is opened in WAL mode with a
//! busy timeout so the ETL loader can refresh the file while the server reads it.

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, Pool, QueryBuilder, Sqlite};

use super::{CharacterFilter, HanjaStore, RadicalScope};
use crate::db;
use crate::error::{HanjaError, Result};
use crate::models::{
    Character, CharacterDetailRow, Decomposition, Lesson, MeaningEdge, MeaningSense,
    RadicalChild, RadicalDetail, Reading,
};

const CHARACTER_COLUMNS: &str =
    "id, char, codepoint, strokes, radical, unihan_def, grade_level, created_at";
const READING_COLUMNS: &str = r#"id, character_id, "type", value, is_primary"#;

#[derive(sqlx::FromRow)]
struct DecompositionRow {
    character_id: String,
    ids: Option<String>,
    components: String,
    confidence: f64,
}

impl TryFrom<DecompositionRow> for Decomposition {
    type Error = HanjaError;

    fn try_from(row: DecompositionRow) -> Result<Self> {
        let components: Vec<String> = serde_json::from_str(&row.components).map_err(|e| {
            HanjaError::Decode(format!("decompositions.components of {}: {}", row.character_id, e))
        })?;
        Ok(Decomposition {
            character_id: row.character_id,
            ids: row.ids,
            components,
            confidence: row.confidence,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MeaningEdgeRow {
    id: String,
    character_id: String,
    parent_sense_id: String,
    child_sense_id: String,
    relation: String,
    note: Option<String>,
}

impl TryFrom<MeaningEdgeRow> for MeaningEdge {
    type Error = HanjaError;

    fn try_from(row: MeaningEdgeRow) -> Result<Self> {
        Ok(MeaningEdge {
            relation: row.relation.parse()?,
            id: row.id,
            character_id: row.character_id,
            parent_sense_id: row.parent_sense_id,
            child_sense_id: row.child_sense_id,
            note: row.note,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RadicalDetailRow {
    character_id: String,
    radical_number: i64,
    lesson_id: Option<i64>,
    explanation: Option<String>,
    shuowen_chinese: Option<String>,
    shuowen_korean: Option<String>,
    variants: String,
    reading_hun: Option<String>,
    reading_eum: Option<String>,
}

impl TryFrom<RadicalDetailRow> for RadicalDetail {
    type Error = HanjaError;

    fn try_from(row: RadicalDetailRow) -> Result<Self> {
        let variants: Vec<String> = serde_json::from_str(&row.variants).map_err(|e| {
            HanjaError::Decode(format!("radical_details.variants of #{}: {}", row.radical_number, e))
        })?;
        Ok(RadicalDetail {
            character_id: row.character_id,
            radical_number: row.radical_number,
            lesson_id: row.lesson_id,
            explanation: row.explanation,
            shuowen_chinese: row.shuowen_chinese,
            shuowen_korean: row.shuowen_korean,
            variants,
            reading_hun: row.reading_hun,
            reading_eum: row.reading_eum,
        })
    }
}

/// Escape LIKE wildcards so user input matches literally / LIKE 와일드카드 이스케이프
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Append ` IN (?, ?, ...)` with one bind per value
fn push_in_list(qb: &mut QueryBuilder<'_, Sqlite>, values: &[String]) {
    qb.push(" IN (");
    let mut sep = qb.separated(", ");
    for v in values {
        sep.push_bind(v.clone());
    }
    sep.push_unseparated(")");
}

/// SQLite reference store
#[derive(Clone)]
pub struct SqliteStore {
    db: Pool<Sqlite>,
}

impl SqliteStore {
    /// Use an existing pool / 기존 연결 풀 사용
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Open the dataset file and make sure the schema exists / 데이터베이스 열기
    pub async fn connect(url: &str) -> Result<Self> {
        let db = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(url)
            .await?;

        sqlx::query("PRAGMA journal_mode=WAL").execute(&db).await?;
        sqlx::query("PRAGMA busy_timeout=5000").execute(&db).await?;

        db::run_migrations(&db).await?;
        tracing::info!("Reference store opened: {}", url);

        Ok(Self { db })
    }

    /// Private in-memory database; one connection so every query sees the same data
    pub async fn in_memory() -> Result<Self> {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        db::run_migrations(&db).await?;
        Ok(Self { db })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.db
    }

    pub async fn close(&self) {
        self.db.close().await;
    }
}

#[async_trait]
impl HanjaStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn character_by_glyph(&self, glyph: &str) -> Result<Option<Character>> {
        let sql = format!("SELECT {} FROM characters WHERE char = ?", CHARACTER_COLUMNS);
        let row = sqlx::query_as::<_, Character>(&sql)
            .bind(glyph)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn characters_by_ids(&self, ids: &[String]) -> Result<Vec<Character>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM characters WHERE id",
            CHARACTER_COLUMNS
        ));
        push_in_list(&mut qb, ids);
        qb.push(" ORDER BY id");
        Ok(qb.build_query_as::<Character>().fetch_all(&self.db).await?)
    }

    async fn characters_by_glyphs(&self, glyphs: &[String]) -> Result<Vec<Character>> {
        if glyphs.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM characters WHERE char",
            CHARACTER_COLUMNS
        ));
        push_in_list(&mut qb, glyphs);
        qb.push(" ORDER BY id");
        Ok(qb.build_query_as::<Character>().fetch_all(&self.db).await?)
    }

    async fn character_page(
        &self,
        filter: &CharacterFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Character>, u64)> {
        fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &CharacterFilter) {
            qb.push(" WHERE 1 = 1");
            if let Some(strokes) = filter.strokes {
                qb.push(" AND strokes = ").push_bind(strokes);
            }
            if let Some(radical) = &filter.radical {
                qb.push(" AND radical = ").push_bind(radical.clone());
            }
        }

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM characters");
        push_filter(&mut count_qb, filter);
        let (total,): (i64,) = count_qb.build_query_as().fetch_one(&self.db).await?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM characters", CHARACTER_COLUMNS));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY strokes ASC, id ASC LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(offset as i64);
        let rows = qb.build_query_as::<Character>().fetch_all(&self.db).await?;

        Ok((rows, total.max(0) as u64))
    }

    async fn character_count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM characters")
            .fetch_one(&self.db)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn characters_window(&self, offset: u64, limit: u64) -> Result<Vec<Character>> {
        let sql = format!(
            "SELECT {} FROM characters ORDER BY id LIMIT ? OFFSET ?",
            CHARACTER_COLUMNS
        );
        let rows = sqlx::query_as::<_, Character>(&sql)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn readings_for(&self, character_id: &str) -> Result<Vec<Reading>> {
        let sql = format!(
            "SELECT {} FROM readings WHERE character_id = ? ORDER BY is_primary DESC, id ASC",
            READING_COLUMNS
        );
        let rows = sqlx::query_as::<_, Reading>(&sql)
            .bind(character_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn primary_readings(&self, character_ids: &[String]) -> Result<Vec<Reading>> {
        if character_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM readings WHERE is_primary = 1 AND character_id",
            READING_COLUMNS
        ));
        push_in_list(&mut qb, character_ids);
        qb.push(" ORDER BY character_id, id");
        Ok(qb.build_query_as::<Reading>().fetch_all(&self.db).await?)
    }

    async fn search_readings(&self, needle: &str, limit: usize) -> Result<Vec<Reading>> {
        let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
        let sql = format!(
            r#"SELECT {} FROM readings WHERE lower(value) LIKE ? ESCAPE '\' ORDER BY id LIMIT ?"#,
            READING_COLUMNS
        );
        let rows = sqlx::query_as::<_, Reading>(&sql)
            .bind(pattern)
            .bind(limit as i64)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn decomposition_for(&self, character_id: &str) -> Result<Option<Decomposition>> {
        let row: Option<DecompositionRow> = sqlx::query_as(
            "SELECT character_id, ids, components, confidence FROM decompositions WHERE character_id = ?",
        )
        .bind(character_id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Decomposition::try_from).transpose()
    }

    async fn decompositions_for(&self, character_ids: &[String]) -> Result<Vec<Decomposition>> {
        if character_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT character_id, ids, components, confidence FROM decompositions WHERE character_id",
        );
        push_in_list(&mut qb, character_ids);
        qb.push(" ORDER BY character_id");
        let rows = qb.build_query_as::<DecompositionRow>().fetch_all(&self.db).await?;
        rows.into_iter().map(Decomposition::try_from).collect()
    }

    async fn phonetic_class_ids(&self, character_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT phonetic_class_id FROM character_phonetic_class WHERE character_id = ? ORDER BY phonetic_class_id",
        )
        .bind(character_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn phonetic_class_members(&self, class_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT character_id FROM character_phonetic_class WHERE phonetic_class_id = ? ORDER BY character_id",
        )
        .bind(class_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn meaning_senses(&self, character_id: &str) -> Result<Vec<MeaningSense>> {
        let rows = sqlx::query_as::<_, MeaningSense>(
            "SELECT id, character_id, label, short_gloss, example, sort_order FROM meaning_senses WHERE character_id = ? ORDER BY sort_order, id",
        )
        .bind(character_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn meaning_edges(&self, character_id: &str) -> Result<Vec<MeaningEdge>> {
        let rows: Vec<MeaningEdgeRow> = sqlx::query_as(
            "SELECT id, character_id, parent_sense_id, child_sense_id, relation, note FROM meaning_edges WHERE character_id = ? ORDER BY id",
        )
        .bind(character_id)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(MeaningEdge::try_from).collect()
    }

    async fn character_detail_row(&self, character_id: &str) -> Result<Option<CharacterDetailRow>> {
        let row = sqlx::query_as::<_, CharacterDetailRow>(
            "SELECT character_id, explanation, shuowen_chinese, shuowen_korean FROM character_details WHERE character_id = ?",
        )
        .bind(character_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn lessons(&self) -> Result<Vec<Lesson>> {
        let rows = sqlx::query_as::<_, Lesson>("SELECT id, number, title, theme FROM lessons ORDER BY number")
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn lesson_by_number(&self, number: i64) -> Result<Option<Lesson>> {
        let row = sqlx::query_as::<_, Lesson>("SELECT id, number, title, theme FROM lessons WHERE number = ?")
            .bind(number)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn radical_details(&self, scope: RadicalScope) -> Result<Vec<RadicalDetail>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT character_id, radical_number, lesson_id, explanation, shuowen_chinese, shuowen_korean, variants, reading_hun, reading_eum FROM radical_details",
        );
        match scope {
            RadicalScope::All => {}
            RadicalScope::Lesson(id) => {
                qb.push(" WHERE lesson_id = ").push_bind(id);
            }
            RadicalScope::Number(n) => {
                qb.push(" WHERE radical_number = ").push_bind(n);
            }
        }
        qb.push(" ORDER BY radical_number");
        let rows = qb.build_query_as::<RadicalDetailRow>().fetch_all(&self.db).await?;
        rows.into_iter().map(RadicalDetail::try_from).collect()
    }

    async fn radical_children(&self, radical_char: &str) -> Result<Vec<RadicalChild>> {
        let rows = sqlx::query_as::<_, RadicalChild>(
            "SELECT radical_char, child_char, sort_order FROM radical_children WHERE radical_char = ? ORDER BY sort_order ASC",
        )
        .bind(radical_char)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
