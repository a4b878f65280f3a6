//! Spaced repetition intervals / 간격 반복 복습
//!
//! The interval grows with the net number of correct answers and is capped at the last
//! table entry.

use chrono::{DateTime, Duration, Utc};

/// Review intervals in days / 복습 간격(일)
pub const INTERVALS: [i64; 7] = [1, 3, 7, 14, 30, 60, 120];

/// Days until the next review / 다음 복습까지 일수
pub fn next_interval(correct: u32, wrong: u32) -> i64 {
    let net = correct.saturating_sub(wrong) as usize;
    INTERVALS[net.min(INTERVALS.len() - 1)]
}

pub fn next_review_date(correct: u32, wrong: u32, now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(next_interval(correct, wrong))
}

/// Never-scheduled items are always due / 복습 시기 여부
pub fn is_review_due(next_review_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    next_review_at.map_or(true, |at| at <= now)
}
