//! Error taxonomy / 오류 분류
//!
//! Absence of a row is not an error at the store layer: lookups return `None` or an
//! empty list. `NotFound` is raised only by loaders that need a row to continue.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HanjaError {
    /// Requested character/radical/lesson key has no matching row / 찾을 수 없음
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// Transport failure talking to the store / 저장소 오류
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Row came back in a shape we cannot read / 데이터 형식 오류
    #[error("malformed row: {0}")]
    Decode(String),

    /// Rows are readable but violate a structural assumption / 데이터 무결성 오류
    #[error("data integrity violation: {0}")]
    DataIntegrity(String),

    /// Device-local persistence failure / 로컬 저장 오류
    #[error("local persistence error: {0}")]
    Persistence(String),
}

impl HanjaError {
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        HanjaError::NotFound { kind, key: key.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HanjaError::NotFound { .. })
    }
}

impl From<serde_json::Error> for HanjaError {
    fn from(e: serde_json::Error) -> Self {
        HanjaError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HanjaError>;
