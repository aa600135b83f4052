//! Reference matchers.
//!
//! These simulate the pattern from every position of the word without any
//! precomputation. They are slow on long words but simple, and serve as the
//! oracle for [`BoyerMoore`][crate::bm::BoyerMoore].

use crate::answer::{Answer, AnswerSink};
use crate::automaton::TimedAutomaton;
use crate::error::Result;
use crate::scan::{emit_tail_immediate, emit_window_immediate, immediate_durations, run_window, Window};
use crate::word::{TimedWord, WordSource};

/// Returns every match of `ta` in `word`.
///
/// # Examples
///
/// ```
/// use timed_pattern::automaton::{TaEdge, TimedAutomaton};
/// use timed_pattern::naive::match_word;
/// use timed_pattern::word::TimedWord;
///
/// let ta = TimedAutomaton::from_edges(3, [TaEdge::new(0, 1, 'a'), TaEdge::new(1, 2, '$')], vec![0], vec![2], vec![])?;
/// let word = TimedWord::new(vec![('a', 1.0).into(), ('b', 2.0).into(), ('a', 3.0).into()])?;
/// assert_eq!(match_word(&ta, &word).len(), 2);
/// # Ok::<(), timed_pattern::error::Error>(())
/// ```
pub fn match_word(ta: &TimedAutomaton, word: &TimedWord) -> Vec<Answer> {
    let mut answers = Vec::new();
    match_into(ta, word, &mut answers);
    answers
}

/// Like [`match_word`], but hands the answers to `sink`.
///
/// Windows are scanned from the last position of the word to the first.
pub fn match_into(ta: &TimedAutomaton, word: &TimedWord, sink: &mut impl AnswerSink) {
    let events = word.events();
    let Some(last) = events.last() else {
        return;
    };
    let durations = immediate_durations(ta);
    emit_tail_immediate(&durations, last.time, sink);

    for i in (0..events.len()).rev() {
        let previous = i.checked_sub(1).map(|p| events[p].time);
        emit_window_immediate(&durations, previous, events[i].time, sink);
        run_window(ta, events, i, |_| 1, sink);
    }
    log::debug!("naive matcher: {} answers over {} events", sink.emitted(), events.len());
}

/// Streaming matcher: scans windows from the first position of the word to
/// the last, and releases each position of `word` once no window needs it.
///
/// Produces the same answers as [`match_into`], in a different order.
pub fn match_online(ta: &TimedAutomaton, word: &mut impl WordSource, sink: &mut impl AnswerSink) -> Result<()> {
    let len = word.len();
    if len == 0 {
        return Ok(());
    }
    let durations = immediate_durations(ta);

    let mut previous = None;
    for i in 0..len {
        let first = word.get(i)?;
        emit_window_immediate(&durations, previous, first.time, sink);

        let mut window = Window::open(ta, previous, first.time);
        let mut event = first;
        let mut j = i;
        while !window.is_exhausted() && j < len {
            let next = if j + 1 < len { Some(word.get(j + 1)?) } else { None };
            window.step(event, next.map(|e| e.time), sink);
            j += 1;
            if let Some(next) = next {
                event = next;
            }
        }

        previous = Some(first.time);
        word.advance_front(i + 1)?;
    }

    if let Some(last_time) = previous {
        emit_tail_immediate(&durations, last_time, sink);
    }
    log::debug!("online matcher: {} answers over {} events", sink.emitted(), len);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use test_log::test;

    use crate::answer::{sort_answers, AnswerCounter, Bound, Interval};
    use crate::automaton::TaEdge;
    use crate::fixtures;
    use crate::types::Constraint;
    use crate::word::{Encoding, LazyWord};

    fn word(pairs: &[(char, f64)]) -> TimedWord {
        TimedWord::new(pairs.iter().map(|&p| p.into()).collect()).unwrap()
    }

    #[test]
    fn test_a_then_b() {
        let ta = fixtures::ta0();
        let answers = match_word(&ta, &word(&[('a', 1.0), ('b', 2.0)]));
        assert_eq!(
            answers,
            vec![Answer {
                begin: Interval::new(Bound::closed(0.0), Bound::open(1.0)),
                end: Interval::new(Bound::open(2.0), Bound::INFINITY),
                duration: Interval::ANY,
            }]
        );
    }

    #[test]
    fn test_empty_word() {
        let ta = fixtures::ta0();
        assert!(match_word(&ta, &TimedWord::default()).is_empty());
        let mut counter = AnswerCounter::default();
        match_online(&ta, &mut TimedWord::default(), &mut counter).unwrap();
        assert_eq!(counter.emitted(), 0);
    }

    #[test]
    fn test_strict_and_non_strict_end_guard() {
        // `a`, then the end less than (or at most) 2 after the `a`.
        let pattern = |c: Constraint| {
            TimedAutomaton::from_edges(
                3,
                [TaEdge::new(0, 1, 'a').reset([0]), TaEdge::new(1, 2, '$').guard([c])],
                vec![0],
                vec![2],
                vec![2],
            )
            .unwrap()
        };
        let w = word(&[('a', 1.0)]);
        let lt = match_word(&pattern(Constraint::lt(0, 2)), &w);
        let le = match_word(&pattern(Constraint::le(0, 2)), &w);
        assert_eq!(lt.len(), 1);
        assert_eq!(le.len(), 1);
        assert_eq!(lt[0].end.upper, Bound::open(3.0));
        assert_eq!(le[0].end.upper, Bound::closed(3.0));
    }

    #[test]
    fn test_immediate_match() {
        // The end right away, within 1 time unit.
        let ta = TimedAutomaton::from_edges(
            2,
            [TaEdge::new(0, 1, '$').guard([Constraint::le(0, 1)])],
            vec![0],
            vec![1],
            vec![1],
        )
        .unwrap();
        let answers = match_word(&ta, &word(&[('a', 1.0), ('a', 2.0)]));
        // One per window plus one after the last event.
        assert_eq!(answers.len(), 3);
        assert!(answers.iter().all(|a| a.duration == Interval::new_closed(0.0, 1.0)));
        assert!(answers.iter().any(|a| a.begin.lower == Bound::closed(2.0) && a.begin.upper == Bound::INFINITY));
    }

    #[test]
    fn test_online_agrees_with_backward() {
        let w = word(&[
            ('a', 0.3),
            ('a', 0.9),
            ('b', 1.1),
            ('a', 1.7),
            ('b', 2.4),
            ('a', 2.5),
            ('b', 3.9),
        ]);
        for ta in [fixtures::ta0(), fixtures::ta1(), fixtures::ta2()] {
            let mut expected = match_word(&ta, &w);

            let mut buf = Vec::new();
            w.write(&mut buf, Encoding::Text).unwrap();
            let mut lazy = LazyWord::new(Cursor::new(buf), Encoding::Text).unwrap();
            let mut actual = Vec::new();
            match_online(&ta, &mut lazy, &mut actual).unwrap();
            assert_eq!(lazy.buffered(), 0);

            sort_answers(&mut expected);
            sort_answers(&mut actual);
            assert_eq!(actual, expected);
        }
    }
}
