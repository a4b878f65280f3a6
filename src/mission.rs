//! Daily mission quiz / 오늘의 미션
//!
//! Three rounds. Each round draws a random window of four consecutive characters; the
//! first is the target and the other three supply wrong options.
//! Round 0 asks the reading, round 1 a component (reading again when the target has no
//! decomposition), round 2 the meaning.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::device::Streak;
use crate::error::Result;
use crate::store::{primary_reading_map, HanjaStore};

pub const MISSION_ROUNDS: usize = 3;

/// Characters drawn per round / 라운드당 한자 수
pub const WINDOW: u64 = 4;

/// Wrong options for component questions / 부품 오답 후보
pub const FAKE_COMPONENTS: [&str; 8] = ["口", "木", "火", "水", "金", "土", "日", "月"];

/// Shown when a character has no primary reading
pub const MISSING_READING: &str = "?";

/// Shown when a character has no definition
pub const UNKNOWN_MEANING: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Reading,
    Component,
    Meaning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub char: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

/// Shuffle options and track where the answer went / 선택지 섞기
pub fn shuffle_with_answer<R: Rng + ?Sized>(
    options: Vec<String>,
    correct: usize,
    rng: &mut R,
) -> (Vec<String>, usize) {
    let mut order: Vec<usize> = (0..options.len()).collect();
    order.shuffle(rng);
    let correct_index = order.iter().position(|&i| i == correct).unwrap_or(correct);
    let shuffled = order.iter().map(|&i| options[i].clone()).collect();
    (shuffled, correct_index)
}

fn question<R: Rng + ?Sized>(
    kind: QuestionKind,
    glyph: &str,
    text: String,
    options: Vec<String>,
    rng: &mut R,
) -> QuizQuestion {
    let (options, correct_index) = shuffle_with_answer(options, 0, rng);
    QuizQuestion {
        kind,
        char: glyph.to_string(),
        question: text,
        options,
        correct_index,
    }
}

/// Build today's questions / 미션 문제 생성
///
/// Fewer than [`WINDOW`] characters in the store yields no questions.
pub async fn generate_mission<R: Rng + Send>(
    store: &dyn HanjaStore,
    rng: &mut R,
) -> Result<Vec<QuizQuestion>> {
    let count = store.character_count().await?;
    if count < WINDOW {
        tracing::debug!("Only {} characters, no mission", count);
        return Ok(Vec::new());
    }

    let mut questions = Vec::with_capacity(MISSION_ROUNDS);
    for round in 0..MISSION_ROUNDS {
        let offset = rng.gen_range(0..=count - WINDOW);
        let window = store.characters_window(offset, WINDOW).await?;
        if window.len() < WINDOW as usize {
            continue;
        }

        let ids: Vec<String> = window.iter().map(|c| c.id.clone()).collect();
        let readings = primary_reading_map(store.primary_readings(&ids).await?);
        let reading_of = |id: &str| {
            readings
                .get(id)
                .cloned()
                .unwrap_or_else(|| MISSING_READING.to_string())
        };

        let target = &window[0];
        let target_reading = reading_of(&target.id);
        let reading_options = || {
            std::iter::once(target_reading.clone())
                .chain(window[1..].iter().map(|c| reading_of(&c.id)))
                .collect::<Vec<_>>()
        };
        let reading_question = format!("\"{}\"의 음은?", target.char);

        let q = match round {
            0 => question(QuestionKind::Reading, &target.char, reading_question, reading_options(), rng),
            1 => match store.decomposition_for(&target.id).await? {
                Some(d) if !d.components.is_empty() => {
                    let options: Vec<String> = std::iter::once(d.components[0].clone())
                        .chain(
                            FAKE_COMPONENTS
                                .iter()
                                .filter(|c| !d.components.iter().any(|own| own == *c))
                                .take(3)
                                .map(|c| c.to_string()),
                        )
                        .collect();
                    question(
                        QuestionKind::Component,
                        &target.char,
                        format!("\"{}\"에 포함된 부분은?", target.char),
                        options,
                        rng,
                    )
                }
                _ => question(QuestionKind::Reading, &target.char, reading_question, reading_options(), rng),
            },
            _ => {
                let meaning = |def: &Option<String>| def.clone().unwrap_or_else(|| UNKNOWN_MEANING.to_string());
                let options = std::iter::once(meaning(&target.unihan_def))
                    .chain(window[1..].iter().map(|c| meaning(&c.unihan_def)))
                    .collect();
                question(
                    QuestionKind::Meaning,
                    &target.char,
                    format!("\"{}\" ({})의 뜻은?", target.char, target_reading),
                    options,
                    rng,
                )
            }
        };
        questions.push(q);
    }

    tracing::debug!("Generated {} mission questions", questions.len());
    Ok(questions)
}

/// Result of a played mission / 미션 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionOutcome {
    pub score: usize,
    pub total: usize,
    pub streak: u32,
}

/// Correct option text of a question, looked up again in the store / 정답 재확인
///
/// `None` when the question's character is gone from the store.
async fn expected_answer(store: &dyn HanjaStore, q: &QuizQuestion) -> Result<Option<String>> {
    let Some(character) = store.character_by_glyph(&q.char).await? else {
        return Ok(None);
    };
    let expected = match q.kind {
        QuestionKind::Reading => {
            let readings = store.primary_readings(&[character.id.clone()]).await?;
            primary_reading_map(readings)
                .remove(&character.id)
                .unwrap_or_else(|| MISSING_READING.to_string())
        }
        QuestionKind::Component => match store.decomposition_for(&character.id).await? {
            Some(d) if !d.components.is_empty() => d.components[0].clone(),
            _ => return Ok(None),
        },
        QuestionKind::Meaning => character.unihan_def.unwrap_or_else(|| UNKNOWN_MEANING.to_string()),
    };
    Ok(Some(expected))
}

/// Score the answers and count the day toward the streak / 미션 채점
///
/// The client's `correct_index` is not trusted: the picked option must equal the
/// answer rederived from the store. Missing answers count as wrong.
pub async fn finish_mission(
    store: &dyn HanjaStore,
    questions: &[QuizQuestion],
    answers: &[usize],
    streak: &Streak,
    today: NaiveDate,
) -> Result<MissionOutcome> {
    let mut score = 0;
    for (q, &picked) in questions.iter().zip(answers) {
        let Some(option) = q.options.get(picked) else {
            continue;
        };
        if expected_answer(store, q).await?.as_deref() == Some(option.as_str()) {
            score += 1;
        }
    }
    let streak = streak.complete_mission(today)?;
    Ok(MissionOutcome {
        score,
        total: questions.len(),
        streak,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::LocalStore;
    use crate::store::memory::fixtures::*;
    use crate::store::{Dataset, MemoryStore};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Four characters so every window is the same one
    fn four() -> Dataset {
        let mut chars = vec![
            character("c1", "江", "river"),
            character("c2", "河", "stream"),
            character("c3", "湖", "lake"),
            character("c4", "海", "sea"),
        ];
        chars[3].unihan_def = None;
        Dataset {
            characters: chars,
            readings: vec![
                reading("r1", "c1", "강", true),
                reading("r2", "c2", "하", true),
                reading("r3", "c3", "호", true),
            ],
            decompositions: vec![decomposition("c1", &["水", "工"])],
            ..Default::default()
        }
    }

    fn answer(q: &QuizQuestion) -> &str {
        &q.options[q.correct_index]
    }

    #[test]
    fn test_shuffle_tracks_answer() {
        let mut rng = StdRng::seed_from_u64(1);
        let options: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        for _ in 0..20 {
            let (shuffled, idx) = shuffle_with_answer(options.clone(), 2, &mut rng);
            assert_eq!(shuffled[idx], "c");
            let mut sorted = shuffled.clone();
            sorted.sort();
            assert_eq!(sorted, options);
        }
    }

    #[tokio::test]
    async fn test_question_shapes() {
        let store = MemoryStore::new(four());
        let mut rng = StdRng::seed_from_u64(42);
        let qs = generate_mission(&store, &mut rng).await.unwrap();
        assert_eq!(qs.len(), 3);

        assert_eq!(qs[0].kind, QuestionKind::Reading);
        assert_eq!(qs[0].question, "\"江\"의 음은?");
        assert_eq!(answer(&qs[0]), "강");
        assert!(qs[0].options.contains(&MISSING_READING.to_string()));

        assert_eq!(qs[1].kind, QuestionKind::Component);
        assert_eq!(answer(&qs[1]), "水");
        // 水 belongs to 江, so it is not a fake
        let mut fakes: Vec<&str> = qs[1].options.iter().map(|s| s.as_str()).filter(|s| *s != "水").collect();
        fakes.sort();
        let mut expected = vec!["口", "木", "火"];
        expected.sort();
        assert_eq!(fakes, expected);

        assert_eq!(qs[2].kind, QuestionKind::Meaning);
        assert_eq!(qs[2].question, "\"江\" (강)의 뜻은?");
        assert_eq!(answer(&qs[2]), "river");
        assert!(qs[2].options.contains(&"unknown".to_string()));
    }

    #[tokio::test]
    async fn test_component_round_falls_back_to_reading() {
        let mut data = four();
        data.decompositions.clear();
        let store = MemoryStore::new(data);
        let mut rng = StdRng::seed_from_u64(3);
        let qs = generate_mission(&store, &mut rng).await.unwrap();
        assert_eq!(qs[1].kind, QuestionKind::Reading);
        assert_eq!(answer(&qs[1]), "강");
    }

    #[tokio::test]
    async fn test_too_few_characters() {
        let mut data = four();
        data.characters.pop();
        let store = MemoryStore::new(data);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(generate_mission(&store, &mut rng).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_finish_mission_scores_and_counts_streak() {
        let store = MemoryStore::new(four());
        let mut rng = StdRng::seed_from_u64(9);
        let qs = generate_mission(&store, &mut rng).await.unwrap();
        let answers: Vec<usize> = vec![qs[0].correct_index, (qs[1].correct_index + 1) % 4];

        let streak = Streak::new(LocalStore::in_memory());
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let outcome = finish_mission(&store, &qs, &answers, &streak, today).await.unwrap();
        assert_eq!(outcome, MissionOutcome { score: 1, total: 3, streak: 1 });
    }

    #[tokio::test]
    async fn test_finish_mission_ignores_client_answer_key() {
        let store = MemoryStore::new(four());
        let mut rng = StdRng::seed_from_u64(9);
        let mut qs = generate_mission(&store, &mut rng).await.unwrap();
        // Point every answer key at a wrong option and answer accordingly
        for q in qs.iter_mut() {
            q.correct_index = (q.correct_index + 1) % q.options.len();
        }
        let answers: Vec<usize> = qs.iter().map(|q| q.correct_index).collect();

        let streak = Streak::new(LocalStore::in_memory());
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let outcome = finish_mission(&store, &qs, &answers, &streak, today).await.unwrap();
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.total, 3);
    }

    #[test]
    fn test_question_json_shape() {
        let q = QuizQuestion {
            kind: QuestionKind::Meaning,
            char: "江".to_string(),
            question: "q".to_string(),
            options: vec![],
            correct_index: 0,
        };
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["type"], "meaning");
        assert_eq!(json["correctIndex"], 0);
    }
}
