//! Random word selection.
//!
//! Every function takes the random source as a parameter so callers can pass
//! a seeded generator in tests.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::evaluation::answers_match;
use crate::types::Word;

/// Wrong options shown next to the correct answer in multiple-choice mode.
pub const DISTRACTOR_COUNT: usize = 3;

/// Maximum number of words in a daily challenge.
pub const DAILY_CHALLENGE_SIZE: usize = 10;

/// Pick one candidate uniformly at random.
pub fn pick_word<'a, R: Rng + ?Sized>(candidates: &'a [Word], rng: &mut R) -> Option<&'a Word> {
    candidates.choose(rng)
}

/// Build shuffled multiple-choice options: the correct answer plus up to
/// [`DISTRACTOR_COUNT`] distractors.
///
/// Distractors equal to the correct answer or to an earlier distractor
/// (ignoring case) are skipped, so fewer options come back when there are not
/// enough distinct alternatives.
pub fn build_options<R, I>(correct: &str, distractors: I, rng: &mut R) -> Vec<String>
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = String>,
{
    let mut options = vec![correct.to_string()];

    for candidate in distractors {
        if options.len() > DISTRACTOR_COUNT {
            break;
        }
        if options.iter().any(|o| answers_match(o, &candidate)) {
            continue;
        }
        options.push(candidate);
    }

    options.shuffle(rng);
    options
}

/// Sample up to [`DAILY_CHALLENGE_SIZE`] distinct words.
pub fn pick_challenge_words<R: Rng + ?Sized>(words: &[Word], rng: &mut R) -> Vec<Word> {
    words
        .choose_multiple(rng, DAILY_CHALLENGE_SIZE)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    fn words(n: i64) -> Vec<Word> {
        (1..=n)
            .map(|i| Word {
                id: i,
                original: format!("original {}", i),
                translation: format!("translation {}", i),
                language_id: 1,
            })
            .collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pick_from_empty_is_none() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pick_word(&[], &mut rng).is_none());
    }

    #[test]
    fn test_pick_is_deterministic_for_seed() {
        let pool = words(20);
        let a = pick_word(&pool, &mut StdRng::seed_from_u64(42)).unwrap().id;
        let b = pick_word(&pool, &mut StdRng::seed_from_u64(42)).unwrap().id;
        assert_eq!(a, b);
    }

    #[test]
    fn test_pick_covers_every_candidate() {
        let pool = words(3);
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts: HashMap<i64, usize> = HashMap::new();
        for _ in 0..3000 {
            *counts.entry(pick_word(&pool, &mut rng).unwrap().id).or_default() += 1;
        }
        assert_eq!(counts.len(), 3);
        assert!(counts.values().all(|&c| c > 800));
    }

    #[test]
    fn test_options_hold_correct_answer_and_three_distractors() {
        let mut rng = StdRng::seed_from_u64(3);
        let options = build_options("dog", strings(&["cat", "bird", "fish", "cow"]), &mut rng);

        assert_eq!(options.len(), 4);
        assert!(options.contains(&"dog".to_string()));
        assert!(!options.contains(&"cow".to_string()));
    }

    #[test]
    fn test_options_degrade_with_few_alternatives() {
        let mut rng = StdRng::seed_from_u64(3);
        let options = build_options("dog", strings(&["cat"]), &mut rng);

        let set: HashSet<_> = options.iter().cloned().collect();
        assert_eq!(set, HashSet::from(["dog".to_string(), "cat".to_string()]));
    }

    #[test]
    fn test_options_without_alternatives() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(build_options("dog", Vec::<String>::new(), &mut rng), strings(&["dog"]));
    }

    #[test]
    fn test_duplicate_translations_are_skipped() {
        let mut rng = StdRng::seed_from_u64(5);
        let options = build_options("dog", strings(&["DOG", "cat", "Cat", "fish"]), &mut rng);

        let mut sorted = options.clone();
        sorted.sort();
        assert_eq!(sorted, strings(&["cat", "dog", "fish"]));
    }

    #[test]
    fn test_shuffle_is_deterministic_for_seed() {
        let a = build_options("a", strings(&["b", "c", "d"]), &mut StdRng::seed_from_u64(9));
        let b = build_options("a", strings(&["b", "c", "d"]), &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_challenge_is_capped_and_distinct() {
        let mut rng = StdRng::seed_from_u64(11);
        let picked = pick_challenge_words(&words(25), &mut rng);

        assert_eq!(picked.len(), DAILY_CHALLENGE_SIZE);
        let ids: HashSet<_> = picked.iter().map(|w| w.id).collect();
        assert_eq!(ids.len(), DAILY_CHALLENGE_SIZE);
    }

    #[test]
    fn test_challenge_with_few_words_takes_all() {
        let mut rng = StdRng::seed_from_u64(11);
        assert_eq!(pick_challenge_words(&words(4), &mut rng).len(), 4);
        assert!(pick_challenge_words(&[], &mut rng).is_empty());
    }
}
