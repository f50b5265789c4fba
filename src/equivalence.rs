use itertools::Itertools;
use tracing::debug;

use crate::diagnostics::{
    CounterexampleType, DifferenceString, LanguageComparison, ValidationError,
};
use crate::fsa::{is_epsilon, Fsa};
use crate::isomorphism;
use crate::minimization::minimize;
use crate::run::{accepts, trace};
use crate::validation::validate;

/// Default length bound for the enumeration fallback and the standalone
/// equivalence check.
pub const DEFAULT_MAX_LENGTH: usize = 5;

/// Default cap on the number of difference strings collected.
pub const DEFAULT_MAX_DIFFERENCES: usize = 10;

/// Outcome of the language-equivalence decision: the comparison itself plus
/// the isomorphism diagnostics explaining a difference, phrased against the
/// student's minimized automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceReport {
    /// Equivalence verdict with counterexample, if one was found in bound.
    pub comparison: LanguageComparison,
    /// Element-level diagnostics from the isomorphism check; empty iff the
    /// languages are equivalent.
    pub diagnostics: Vec<ValidationError>,
}

/// Enumerates all words over a symbol set in length order, ties broken
/// lexicographically under the given symbol ordering, starting with the empty
/// word. Yields words up to and including `max_length` symbols.
#[derive(Debug, Clone)]
pub struct LengthLexWords<'a> {
    symbols: Vec<&'a str>,
    max_length: usize,
    /// Digit indices of the next word; `None` once exhausted.
    digits: Option<Vec<usize>>,
}

impl<'a> LengthLexWords<'a> {
    /// Creates the enumeration over `symbols` for lengths `0..=max_length`.
    pub fn new(symbols: Vec<&'a str>, max_length: usize) -> Self {
        Self {
            symbols,
            max_length,
            digits: Some(Vec::new()),
        }
    }
}

impl<'a> Iterator for LengthLexWords<'a> {
    type Item = Vec<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut digits = self.digits.take()?;
        let word: Vec<&str> = digits.iter().map(|&d| self.symbols[d]).collect();

        // Advance the odometer, rightmost digit fastest; on wrap-around the
        // next longer length starts at all zeros. `digits` stays taken once
        // the enumeration is exhausted.
        let mut pos = digits.len();
        loop {
            if pos == 0 {
                let next_len = digits.len() + 1;
                if next_len <= self.max_length && !self.symbols.is_empty() {
                    self.digits = Some(vec![0; next_len]);
                }
                break;
            }
            pos -= 1;
            digits[pos] += 1;
            if digits[pos] < self.symbols.len() {
                self.digits = Some(digits);
                break;
            }
            digits[pos] = 0;
        }

        Some(word)
    }
}

/// The union alphabet in a fixed order: the student's symbols as given,
/// followed by the expected automaton's symbols not already present.
fn union_alphabet<'a>(student: &'a Fsa, expected: &'a Fsa) -> Vec<&'a str> {
    student
        .alphabet
        .iter()
        .chain(
            expected
                .alphabet
                .iter()
                .filter(|s| !student.alphabet.contains(s.as_str())),
        )
        .map(String::as_str)
        .filter(|s| !is_epsilon(s))
        .collect()
}

/// Renders a word for display; the empty word shows as `"ε"`.
fn display_word(word: &[&str]) -> String {
    if word.is_empty() {
        "ε".to_string()
    } else {
        word.iter().join("")
    }
}

/// Decides whether `student` and `expected` accept the same language.
///
/// Both automata are normalized (determinized if necessary, then minimized)
/// and handed to the isomorphism checker; clean diagnostics mean equivalence.
/// Otherwise a counterexample is searched by enumerating words over the union
/// alphabet in length-lexicographic order up to `max_length`. The languages
/// provably differ even when no counterexample fits the bound, so the verdict
/// stays negative in that case and the diagnostics carry the explanation.
pub fn same_language(student: &Fsa, expected: &Fsa, max_length: usize) -> EquivalenceReport {
    let student_min = minimize(student);
    let expected_min = minimize(expected);
    let diagnostics = isomorphism::check(&student_min, &expected_min);
    if diagnostics.is_empty() {
        debug!("minimized automata are isomorphic");
        return EquivalenceReport {
            comparison: LanguageComparison::equivalent(),
            diagnostics,
        };
    }

    let counterexample = first_disagreement(student, expected, max_length);
    debug!(
        "automata differ, counterexample within bound {}: {:?}",
        max_length, counterexample
    );
    let (counterexample, counterexample_type) = match counterexample {
        Some((word, expected_accepts)) => (
            Some(display_word(&word)),
            Some(if expected_accepts {
                CounterexampleType::ShouldAccept
            } else {
                CounterexampleType::ShouldReject
            }),
        ),
        None => (None, None),
    };

    EquivalenceReport {
        comparison: LanguageComparison {
            are_equivalent: false,
            counterexample,
            counterexample_type,
        },
        diagnostics,
    }
}

/// The first word (in enumeration order) on which the automata disagree,
/// together with the expected automaton's verdict on it.
fn first_disagreement<'a>(
    student: &'a Fsa,
    expected: &'a Fsa,
    max_length: usize,
) -> Option<(Vec<&'a str>, bool)> {
    for word in LengthLexWords::new(union_alphabet(student, expected), max_length) {
        let student_accepts = accepts(student, word.iter().copied());
        let expected_accepts = accepts(expected, word.iter().copied());
        if student_accepts != expected_accepts {
            return Some((word, expected_accepts));
        }
    }
    None
}

/// Collects up to `max_count` words witnessing the difference between the two
/// automata, each with the traces of both runs. Structural errors on either
/// side yield an empty collection; the validator owns those findings.
pub fn generate_difference_strings(
    student: &Fsa,
    expected: &Fsa,
    max_length: usize,
    max_count: usize,
) -> Vec<DifferenceString> {
    if !validate(student).is_empty() || !validate(expected).is_empty() {
        return Vec::new();
    }

    let mut differences = Vec::new();
    for word in LengthLexWords::new(union_alphabet(student, expected), max_length) {
        if differences.len() >= max_count {
            break;
        }
        let student_run = trace(student, word.iter().copied());
        let expected_run = trace(expected, word.iter().copied());
        if student_run.accepted != expected_run.accepted {
            differences.push(DifferenceString {
                string: display_word(&word),
                student_accepts: student_run.accepted,
                expected_accepts: expected_run.accepted,
                student_trace: student_run.labels(),
                expected_trace: expected_run.labels(),
            });
        }
    }
    differences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::accepts_str;

    #[test]
    fn words_come_in_length_then_lex_order() {
        let words: Vec<String> = LengthLexWords::new(vec!["a", "b"], 2)
            .map(|w| w.concat())
            .collect();
        assert_eq!(words, ["", "a", "b", "aa", "ab", "ba", "bb"]);
    }

    #[test]
    fn empty_symbol_set_yields_only_the_empty_word() {
        let words: Vec<Vec<&str>> = LengthLexWords::new(vec![], 3).collect();
        assert_eq!(words, vec![Vec::<&str>::new()]);
    }

    /// Two-state DFA for a(a|b)*.
    fn a_then_anything_small() -> Fsa {
        Fsa::builder()
            .with_alphabet(["a", "b"])
            .with_edges([("s0", "a", "s1"), ("s1", "a", "s1"), ("s1", "b", "s1")])
            .with_accepting(["s1"])
            .into_fsa("s0")
    }

    /// Four-state non-minimal DFA for the same language.
    fn a_then_anything_large() -> Fsa {
        Fsa::builder()
            .with_edges([
                ("r0", "a", "r1"),
                ("r1", "a", "r2"),
                ("r1", "b", "r3"),
                ("r2", "a", "r2"),
                ("r2", "b", "r3"),
                ("r3", "a", "r2"),
                ("r3", "b", "r3"),
            ])
            .with_accepting(["r1", "r2", "r3"])
            .into_fsa("r0")
    }

    #[test]
    fn equivalence_through_minimization() {
        let report = same_language(&a_then_anything_small(), &a_then_anything_large(), 5);
        assert!(report.comparison.are_equivalent);
        assert!(report.diagnostics.is_empty());
        assert!(report.comparison.counterexample.is_none());
    }

    #[test]
    fn shortest_counterexample_is_found_first() {
        // Student accepts (a|b)*a, expected wants (a|b)*ab; they already
        // disagree on "a", which the student accepts and the expected rejects.
        let student = Fsa::builder()
            .with_edges([
                ("q0", "a", "q1"),
                ("q0", "b", "q0"),
                ("q1", "a", "q1"),
                ("q1", "b", "q0"),
            ])
            .with_accepting(["q1"])
            .into_fsa("q0");
        let expected = Fsa::builder()
            .with_edges([
                ("p0", "a", "p1"),
                ("p0", "b", "p0"),
                ("p1", "a", "p1"),
                ("p1", "b", "p2"),
                ("p2", "a", "p1"),
                ("p2", "b", "p0"),
            ])
            .with_accepting(["p2"])
            .into_fsa("p0");
        let report = same_language(&student, &expected, 5);
        assert!(!report.comparison.are_equivalent);
        assert_eq!(report.comparison.counterexample.as_deref(), Some("a"));
        assert_eq!(
            report.comparison.counterexample_type,
            Some(CounterexampleType::ShouldReject)
        );
        assert!(!report.diagnostics.is_empty());
    }

    #[test]
    fn positive_verdict_is_sound_up_to_the_bound() {
        let left = a_then_anything_small();
        let right = a_then_anything_large();
        assert!(same_language(&left, &right, 5).comparison.are_equivalent);
        for k in [3, 5, 7] {
            for word in LengthLexWords::new(vec!["a", "b"], k) {
                assert_eq!(
                    accepts(&left, word.iter().copied()),
                    accepts(&right, word.iter().copied()),
                    "soundness violated on {word:?}"
                );
            }
        }
    }

    #[test]
    fn difference_strings_carry_both_traces() {
        let student = Fsa::builder()
            .with_edges([("q0", "a", "q1"), ("q1", "a", "q0")])
            .with_accepting(["q0"])
            .into_fsa("q0");
        let expected = Fsa::builder()
            .with_edges([("p0", "a", "p1"), ("p1", "a", "p0")])
            .with_accepting(["p1"])
            .into_fsa("p0");
        let diffs = generate_difference_strings(&student, &expected, 3, 10);
        // They disagree on every word: ε, a, aa, aaa.
        assert_eq!(diffs.len(), 4);
        assert_eq!(diffs[0].string, "ε");
        assert!(diffs[0].student_accepts);
        assert!(!diffs[0].expected_accepts);
        assert_eq!(diffs[0].student_trace, ["q0"]);
        assert_eq!(diffs[0].expected_trace, ["p0"]);
        assert_eq!(diffs[1].string, "a");
        assert_eq!(diffs[1].student_trace, ["q0", "q1"]);
        assert_eq!(
            diffs[1].difference_type(),
            CounterexampleType::ShouldAccept
        );
    }

    #[test]
    fn difference_collection_respects_the_cap() {
        let student = Fsa::builder()
            .with_edges([("q0", "a", "q0")])
            .with_accepting(["q0"])
            .into_fsa("q0");
        let expected = Fsa::builder()
            .with_alphabet(["a"])
            .with_states(["p0"])
            .into_fsa("p0");
        let diffs = generate_difference_strings(&student, &expected, 6, 3);
        assert_eq!(diffs.len(), 3);
    }

    #[test]
    fn union_alphabet_reaches_symbols_of_both_sides() {
        // The student never uses 'b', but the expected language needs it, so
        // enumeration must still try words containing 'b'.
        let student = Fsa::builder()
            .with_edges([("q0", "a", "q0")])
            .with_accepting(["q0"])
            .into_fsa("q0");
        let expected = Fsa::builder()
            .with_edges([("p0", "a", "p0"), ("p0", "b", "p0")])
            .with_accepting(["p0"])
            .into_fsa("p0");
        let report = same_language(&student, &expected, 4);
        assert!(!report.comparison.are_equivalent);
        assert_eq!(report.comparison.counterexample.as_deref(), Some("b"));
        assert_eq!(
            report.comparison.counterexample_type,
            Some(CounterexampleType::ShouldAccept)
        );
        assert!(!accepts_str(&student, "b"));
        assert!(accepts_str(&expected, "b"));
    }
}
