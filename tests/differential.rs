use std::io::Cursor;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use test_log::test;

use timed_pattern::answer::{sort_answers, Answer, AnswerCounter, AnswerSink};
use timed_pattern::automaton::TimedAutomaton;
use timed_pattern::bm::{BoyerMoore, MatcherConfig};
use timed_pattern::fixtures::{self, FixtureParams, NUM_CASES};
use timed_pattern::naive;
use timed_pattern::word::{Encoding, LazyWord, TimedEvent, TimedWord};

/// Cases cheap enough to precompute in a test; the 100-state chain is left
/// to the benchmarks.
fn cases() -> Vec<(usize, TimedAutomaton)> {
    let params = FixtureParams::default();
    (0..NUM_CASES)
        .filter(|&n| n != 5)
        .map(|n| (n, fixtures::case(n, &params).unwrap()))
        .collect()
}

/// Time steps are scaled so that the interesting guards of the pattern are hit.
fn time_scale(n: usize) -> f64 {
    match n {
        3 => 8.0,
        9 | 10 => 5.0,
        13 | 14 => 60.0,
        _ => 1.0,
    }
}

fn random_word(rng: &mut ChaCha8Rng, ta: &TimedAutomaton, scale: f64, max_len: usize) -> TimedWord {
    const STEPS: [f64; 5] = [0.0, 0.5, 1.0, 1.5, 0.25];
    let alphabet = ta.alphabet();
    let len = rng.random_range(0..=max_len);
    let mut time = 0.0;
    let mut events = Vec::with_capacity(len);
    for _ in 0..len {
        time += STEPS[rng.random_range(0..STEPS.len())] * scale;
        let symbol = alphabet[rng.random_range(0..alphabet.len())];
        events.push(TimedEvent::new(symbol, time));
    }
    TimedWord::new(events).unwrap()
}

fn sorted(mut answers: Vec<Answer>) -> Vec<Answer> {
    sort_answers(&mut answers);
    answers
}

fn online(ta: &TimedAutomaton, word: &TimedWord, encoding: Encoding) -> Vec<Answer> {
    let mut bytes = Vec::new();
    word.write(&mut bytes, encoding).unwrap();
    let mut source = LazyWord::new(Cursor::new(bytes), encoding).unwrap();
    let mut answers = Vec::new();
    naive::match_online(ta, &mut source, &mut answers).unwrap();
    assert_eq!(source.buffered(), 0);
    answers
}

#[test]
fn test_boyer_moore_agrees_with_reference() {
    for (n, ta) in cases() {
        let matcher = BoyerMoore::new(ta.clone());
        let mut rng = ChaCha8Rng::seed_from_u64(n as u64);
        let mut total = 0;
        for _ in 0..100 {
            let word = random_word(&mut rng, &ta, time_scale(n), 14);
            let expected = sorted(naive::match_word(&ta, &word));
            let actual = sorted(matcher.match_word(&word));
            assert_eq!(actual, expected, "case {} ({}) on {:?}", n, fixtures::name(n), word);
            total += expected.len();
        }
        log::info!("case {}: {} answers", n, total);
    }
}

#[test]
fn test_online_agrees_with_reference() {
    for (n, ta) in cases() {
        let mut rng = ChaCha8Rng::seed_from_u64(1000 + n as u64);
        for i in 0..30 {
            let word = random_word(&mut rng, &ta, time_scale(n), 10);
            let encoding = if i % 2 == 0 { Encoding::Text } else { Encoding::Binary };
            let expected = sorted(naive::match_word(&ta, &word));
            let actual = sorted(online(&ta, &word, encoding));
            assert_eq!(actual, expected, "case {} ({}) on {:?}", n, fixtures::name(n), word);
        }
    }
}

#[test]
fn test_matcher_options_do_not_change_answers() {
    let ta = fixtures::phi4();
    let configs = [
        MatcherConfig::default(),
        MatcherConfig {
            use_skip_table: false,
            ..MatcherConfig::default()
        },
        MatcherConfig {
            share_product_automaton: false,
            ..MatcherConfig::default()
        },
    ];
    let matchers: Vec<BoyerMoore> = configs.iter().map(|&c| BoyerMoore::with_config(ta.clone(), c)).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..50 {
        let word = random_word(&mut rng, &ta, 1.0, 20);
        let expected = sorted(naive::match_word(&ta, &word));
        for matcher in &matchers {
            assert_eq!(sorted(matcher.match_word(&word)), expected);
        }
    }
}

#[test]
fn test_counting_sink() {
    let ta = fixtures::ta4();
    let matcher = BoyerMoore::new(ta.clone());
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..20 {
        let word = random_word(&mut rng, &ta, 1.0, 16);
        let mut counter = AnswerCounter::default();
        matcher.match_into(&word, &mut counter);
        assert_eq!(counter.emitted(), naive::match_word(&ta, &word).len());
    }
}
