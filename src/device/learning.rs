//! Recents, favorites, streak and onboarding prefs / 학습 기록
//!
//! Thin typed views over `LocalStore` keys.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{keys, LocalStore};
use crate::error::Result;
use crate::notify::Notifier;

/// Recently viewed list length / 최근 본 한자 최대 개수
pub const MAX_RECENT: usize = 20;

/// Most-recent-first, de-duplicated glyph list / 최근 본 한자
#[derive(Clone)]
pub struct RecentChars {
    store: LocalStore,
}

impl RecentChars {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<String> {
        self.store.read(keys::RECENT, Vec::new())
    }

    /// Move `glyph` to the front, dropping the oldest beyond the cap / 조회 기록
    pub fn visit(&self, glyph: &str) -> Result<Vec<String>> {
        self.store.update(keys::RECENT, Vec::new(), |prev: Vec<String>| {
            let mut next = Vec::with_capacity(MAX_RECENT);
            next.push(glyph.to_string());
            next.extend(prev.into_iter().filter(|g| g != glyph));
            next.truncate(MAX_RECENT);
            next
        })
    }
}

/// Favorite glyphs in insertion order / 즐겨찾기
#[derive(Clone)]
pub struct Favorites {
    store: LocalStore,
    notifier: Notifier,
}

impl Favorites {
    pub fn new(store: LocalStore, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub fn list(&self) -> Vec<String> {
        self.store.read(keys::FAVORITES, Vec::new())
    }

    pub fn is_favorite(&self, glyph: &str) -> bool {
        self.list().iter().any(|g| g == glyph)
    }

    /// Add or remove; returns whether `glyph` is now a favorite / 즐겨찾기 전환
    pub fn toggle(&self, glyph: &str) -> Result<bool> {
        let mut added = false;
        self.store.update(keys::FAVORITES, Vec::new(), |mut list: Vec<String>| {
            if let Some(pos) = list.iter().position(|g| g == glyph) {
                list.remove(pos);
            } else {
                list.push(glyph.to_string());
                added = true;
            }
            list
        })?;
        self.notifier
            .toast(if added { "즐겨찾기 추가" } else { "즐겨찾기 해제" });
        Ok(added)
    }
}

/// Consecutive mission days / 연속 학습일
#[derive(Clone)]
pub struct Streak {
    store: LocalStore,
}

impl Streak {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn current(&self) -> u32 {
        self.store.read(keys::STREAK, 0)
    }

    pub fn last_mission(&self) -> Option<NaiveDate> {
        let raw: String = self.store.read(keys::LAST_MISSION, String::new());
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok()
    }

    /// Count a finished mission; at most once per day / 미션 완료 기록
    ///
    /// A missed day does not reset the count.
    pub fn complete_mission(&self, today: NaiveDate) -> Result<u32> {
        self.store.transaction(|| {
            if self.last_mission() == Some(today) {
                return Ok(self.current());
            }
            let streak = self.store.update(keys::STREAK, 0u32, |s| s + 1)?;
            self.store
                .write(keys::LAST_MISSION, &today.format("%Y-%m-%d").to_string())?;
            tracing::debug!("Mission completed on {}, streak {}", today, streak);
            Ok(streak)
        })
    }
}

/// Onboarding answers / 온보딩 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prefs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_minutes: Option<u32>,
    #[serde(default)]
    pub onboarded: bool,
}

impl Prefs {
    pub fn load(store: &LocalStore) -> Self {
        store.read(keys::PREFS, Prefs::default())
    }

    pub fn save(&self, store: &LocalStore) -> Result<()> {
        store.write(keys::PREFS, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_dedupe_and_order() {
        let recents = RecentChars::new(LocalStore::in_memory());
        recents.visit("江").unwrap();
        recents.visit("河").unwrap();
        let list = recents.visit("江").unwrap();
        assert_eq!(list, vec!["江", "河"]);
    }

    #[test]
    fn test_recent_cap() {
        let recents = RecentChars::new(LocalStore::in_memory());
        for i in 0..25u32 {
            let glyph = char::from_u32(0x4E00 + i).unwrap().to_string();
            recents.visit(&glyph).unwrap();
        }
        let list = recents.list();
        assert_eq!(list.len(), MAX_RECENT);
        assert_eq!(list[0], char::from_u32(0x4E00 + 24).unwrap().to_string());
    }

    #[tokio::test]
    async fn test_favorite_toggle_with_toast() {
        let notifier = Notifier::new();
        let mut toasts = notifier.subscribe();
        let favorites = Favorites::new(LocalStore::in_memory(), notifier);

        assert!(favorites.toggle("木").unwrap());
        assert!(favorites.toggle("水").unwrap());
        assert_eq!(favorites.list(), vec!["木", "水"]);
        assert!(!favorites.toggle("木").unwrap());
        assert!(!favorites.is_favorite("木"));
        assert!(favorites.is_favorite("水"));

        assert_eq!(toasts.recv().await.unwrap().message, "즐겨찾기 추가");
        assert_eq!(toasts.recv().await.unwrap().message, "즐겨찾기 추가");
        assert_eq!(toasts.recv().await.unwrap().message, "즐겨찾기 해제");
    }

    #[test]
    fn test_streak_once_per_day() {
        let streak = Streak::new(LocalStore::in_memory());
        let day1 = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let day3 = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();

        assert_eq!(streak.complete_mission(day1).unwrap(), 1);
        assert_eq!(streak.complete_mission(day1).unwrap(), 1);
        assert_eq!(streak.last_mission(), Some(day1));
        assert_eq!(streak.complete_mission(day3).unwrap(), 2);
    }

    #[test]
    fn test_streak_counts_parallel_completions_once() {
        let local = LocalStore::in_memory();
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let streak = Streak::new(local.clone());
                scope.spawn(move || streak.complete_mission(day).unwrap());
            }
        });

        assert_eq!(Streak::new(local).current(), 1);
    }

    #[test]
    fn test_prefs_camel_case() {
        let store = LocalStore::in_memory();
        let prefs = Prefs {
            goal: Some("culture".to_string()),
            study_minutes: Some(10),
            onboarded: true,
        };
        prefs.save(&store).unwrap();
        let raw: serde_json::Value = store.read(keys::PREFS, serde_json::Value::Null);
        assert_eq!(raw["studyMinutes"], 10);
        assert_eq!(Prefs::load(&store), prefs);
    }
}
