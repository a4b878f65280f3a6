//! Review queue / 복습 대기열

use serde::{Deserialize, Serialize};

use super::{keys, LocalStore, RecentChars};
use crate::error::Result;
use crate::srs;
use crate::store::{primary_reading_of, HanjaStore};
use crate::view::LoaderHandle;

/// How many recents seed an empty queue / 초기 복습 개수
pub const SEED_FROM_RECENT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub char: String,
    pub reading: String,
    pub meaning: String,
    pub character_id: String,
    pub correct_count: u32,
    pub wrong_count: u32,
}

impl ReviewItem {
    /// Days until this item should come back / 다음 복습 간격
    pub fn interval_days(&self) -> i64 {
        srs::next_interval(self.correct_count, self.wrong_count)
    }
}

#[derive(Clone)]
pub struct ReviewQueue {
    store: LocalStore,
}

impl ReviewQueue {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn items(&self) -> Vec<ReviewItem> {
        self.store.read(keys::REVIEW_QUEUE, Vec::new())
    }

    /// Seed an empty queue from recently viewed characters / 최근 본 한자로 초기화
    ///
    /// A non-empty queue is returned unchanged. Recents missing from the reference store
    /// are skipped; nothing is written when no item could be built.
    pub async fn initialize_from_recents(&self, hanja: &dyn HanjaStore) -> Result<Vec<ReviewItem>> {
        self.initialize_unless(hanja, || false).await
    }

    /// Initialize through a page loader; nothing is written once it is cancelled / 로더 경유 초기화
    pub async fn load_into(
        &self,
        hanja: &dyn HanjaStore,
        loader: &LoaderHandle<Vec<ReviewItem>>,
    ) -> bool {
        let watch = loader.clone();
        loader
            .run(self.initialize_unless(hanja, move || watch.is_cancelled()))
            .await
    }

    async fn initialize_unless(
        &self,
        hanja: &dyn HanjaStore,
        cancelled: impl Fn() -> bool,
    ) -> Result<Vec<ReviewItem>> {
        let queue = self.items();
        if !queue.is_empty() {
            return Ok(queue);
        }

        let recents = RecentChars::new(self.store.clone()).list();
        let mut seeded = Vec::new();
        for glyph in recents.iter().take(SEED_FROM_RECENT) {
            let Some(character) = hanja.character_by_glyph(glyph).await? else {
                tracing::debug!("Recent '{}' not in store, not queued", glyph);
                continue;
            };
            let reading = primary_reading_of(hanja, &character.id).await?;
            seeded.push(ReviewItem {
                char: character.char,
                reading,
                meaning: character.unihan_def.unwrap_or_default(),
                character_id: character.id,
                correct_count: 0,
                wrong_count: 0,
            });
        }

        if seeded.is_empty() {
            return Ok(seeded);
        }
        if cancelled() {
            tracing::debug!("Review queue init cancelled, nothing written");
            return Ok(seeded);
        }
        // Another caller may have filled the queue while the store was queried
        self.store
            .update(keys::REVIEW_QUEUE, Vec::new(), |current: Vec<ReviewItem>| {
                if current.is_empty() {
                    seeded
                } else {
                    current
                }
            })
    }

    /// Count an answer for the item at `index`; out of range is ignored / 정답·오답 기록
    pub fn record_answer(&self, index: usize, correct: bool) -> Result<Option<ReviewItem>> {
        let mut answered = None;
        self.store
            .update(keys::REVIEW_QUEUE, Vec::new(), |mut queue: Vec<ReviewItem>| {
                if let Some(item) = queue.get_mut(index) {
                    if correct {
                        item.correct_count += 1;
                    } else {
                        item.wrong_count += 1;
                    }
                    answered = Some(item.clone());
                }
                queue
            })?;
        Ok(answered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::*;
    use crate::store::{Dataset, MemoryStore};
    use crate::view::{LoadState, ViewLoader};

    fn hanja() -> MemoryStore {
        MemoryStore::new(Dataset {
            characters: vec![
                character("c1", "江", "river"),
                character("c2", "河", "river"),
                character("c3", "湖", "lake"),
            ],
            readings: vec![reading("r1", "c1", "강", true), reading("r2", "c2", "하", true)],
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_initialize_from_recents() {
        let local = LocalStore::in_memory();
        let recents = RecentChars::new(local.clone());
        for glyph in ["湖", "海", "河", "江"] {
            recents.visit(glyph).unwrap();
        }
        let queue = ReviewQueue::new(local.clone());
        let items = queue.initialize_from_recents(&hanja()).await.unwrap();

        let glyphs: Vec<&str> = items.iter().map(|i| i.char.as_str()).collect();
        // 海 is unknown to the store
        assert_eq!(glyphs, vec!["江", "河", "湖"]);
        assert_eq!(items[0].reading, "강");
        assert_eq!(items[2].reading, "");
        assert_eq!(queue.items(), items);
    }

    #[tokio::test]
    async fn test_load_into_reports_loaded_queue() {
        let local = LocalStore::in_memory();
        RecentChars::new(local.clone()).visit("江").unwrap();
        let queue = ReviewQueue::new(local);
        let loader: ViewLoader<Vec<ReviewItem>> = ViewLoader::new();

        assert!(queue.load_into(&hanja(), &loader.handle()).await);
        let items = loader.state().loaded().cloned().unwrap();
        assert_eq!(items[0].char, "江");
    }

    #[tokio::test]
    async fn test_cancelled_init_writes_nothing() {
        let local = LocalStore::in_memory();
        RecentChars::new(local.clone()).visit("江").unwrap();
        let queue = ReviewQueue::new(local);
        let loader: ViewLoader<Vec<ReviewItem>> = ViewLoader::new();
        let handle = loader.handle();
        drop(loader);

        queue
            .initialize_unless(&hanja(), || handle.is_cancelled())
            .await
            .unwrap();
        assert!(queue.items().is_empty());
        assert_eq!(handle.state(), LoadState::Idle);
    }

    #[tokio::test]
    async fn test_initialize_keeps_existing_queue() {
        let local = LocalStore::in_memory();
        RecentChars::new(local.clone()).visit("江").unwrap();
        let queue = ReviewQueue::new(local.clone());
        let existing = vec![ReviewItem {
            char: "河".to_string(),
            reading: "하".to_string(),
            meaning: "river".to_string(),
            character_id: "c2".to_string(),
            correct_count: 2,
            wrong_count: 0,
        }];
        local.write(keys::REVIEW_QUEUE, &existing).unwrap();

        let items = queue.initialize_from_recents(&hanja()).await.unwrap();
        assert_eq!(items, existing);
    }

    #[tokio::test]
    async fn test_record_answer_and_interval() {
        let local = LocalStore::in_memory();
        RecentChars::new(local.clone()).visit("江").unwrap();
        let queue = ReviewQueue::new(local.clone());
        queue.initialize_from_recents(&hanja()).await.unwrap();

        queue.record_answer(0, true).unwrap();
        let item = queue.record_answer(0, true).unwrap().unwrap();
        assert_eq!(item.correct_count, 2);
        assert_eq!(item.interval_days(), 7);
        assert!(queue.record_answer(9, true).unwrap().is_none());
    }

    #[test]
    fn test_item_json_is_camel_case() {
        let item = ReviewItem {
            char: "江".to_string(),
            reading: "강".to_string(),
            meaning: "river".to_string(),
            character_id: "c1".to_string(),
            correct_count: 1,
            wrong_count: 0,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["characterId"], "c1");
        assert_eq!(json["correctCount"], 1);
    }
}
