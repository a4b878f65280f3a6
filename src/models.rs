//! Row and view types / 행 및 뷰 타입
//!
//! Row types mirror the tables of the reference store one-to-one. View types are
//! assembled in memory by the resolvers and are never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HanjaError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Character {
    pub id: String,
    /// Glyph, or a synthetic `img:NNN:CC` key for glyphs with no code point / 글자 또는 합성 키
    pub char: String,
    pub codepoint: i64,
    pub strokes: Option<i64>,
    pub radical: Option<String>,
    pub unihan_def: Option<String>,
    pub grade_level: Option<i64>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    pub id: String,
    pub character_id: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub reading_type: String,
    pub value: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub character_id: String,
    /// Ideographic description sequence / 구조식
    pub ids: Option<String>,
    pub components: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PhoneticClass {
    pub id: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CharacterPhoneticClass {
    pub character_id: String,
    pub phonetic_class_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MeaningSense {
    pub id: String,
    pub character_id: String,
    pub label: String,
    pub short_gloss: Option<String>,
    pub example: Option<String>,
    pub sort_order: i64,
}

/// Semantic relation carried by a meaning edge / 의미 관계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Extension,
    Metaphor,
    Specialization,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Extension => "extension",
            Relation::Metaphor => "metaphor",
            Relation::Specialization => "specialization",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relation {
    type Err = HanjaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "extension" => Ok(Relation::Extension),
            "metaphor" => Ok(Relation::Metaphor),
            "specialization" => Ok(Relation::Specialization),
            other => Err(HanjaError::Decode(format!("unknown meaning relation: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeaningEdge {
    pub id: String,
    pub character_id: String,
    pub parent_sense_id: String,
    pub child_sense_id: String,
    pub relation: Relation,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lesson {
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub theme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadicalDetail {
    pub character_id: String,
    /// Traditional radical number 1-214 / 부수 번호
    pub radical_number: i64,
    pub lesson_id: Option<i64>,
    pub explanation: Option<String>,
    pub shuowen_chinese: Option<String>,
    pub shuowen_korean: Option<String>,
    pub variants: Vec<String>,
    /// Native meaning reading (훈) / 훈
    pub reading_hun: Option<String>,
    /// Sound reading (음) / 음
    pub reading_eum: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RadicalChild {
    pub radical_char: String,
    pub child_char: String,
    pub sort_order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CharacterDetailRow {
    pub character_id: String,
    pub explanation: Option<String>,
    pub shuowen_chinese: Option<String>,
    pub shuowen_korean: Option<String>,
}

// ─── Views / 뷰 ───

/// Character with its readings (primary first) and decomposition / 한자 상세
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDetail {
    #[serde(flatten)]
    pub character: Character,
    pub readings: Vec<Reading>,
    pub decomposition: Option<Decomposition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDetailInfo {
    pub character_id: String,
    pub explanation: Option<String>,
    pub shuowen_chinese: Option<String>,
    pub shuowen_korean: Option<String>,
    pub character: Character,
    pub reading: String,
}

/// Character annotated with its primary reading / 대표음이 붙은 한자
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterWithReading {
    #[serde(flatten)]
    pub character: Character,
    pub reading: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneticSibling {
    pub char: String,
    pub reading: String,
    pub meaning: Option<String>,
    pub character_id: String,
}

/// Characters sharing one phonetic class plus the inferred root component / 음계열
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneticSiblingSet {
    pub phonetic_root: Option<String>,
    pub siblings: Vec<PhoneticSibling>,
}

impl PhoneticSiblingSet {
    /// A class with fewer than two members is not a derivation series
    pub fn is_series(&self) -> bool {
        self.siblings.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeaningTreeNode {
    pub id: String,
    pub label: String,
    pub short_gloss: Option<String>,
    pub example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<Relation>,
    pub children: Vec<MeaningTreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadicalWithCharacter {
    #[serde(flatten)]
    pub detail: RadicalDetail,
    pub character: Character,
    pub lesson: Option<Lesson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedCharacter {
    pub id: String,
    pub char: String,
    pub strokes: Option<i64>,
    pub unihan_def: Option<String>,
    pub reading: String,
}
