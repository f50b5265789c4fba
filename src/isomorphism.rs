use std::collections::VecDeque;

use itertools::Itertools;
use tracing::trace;

use crate::diagnostics::{ErrorCode, Highlight, ValidationError};
use crate::fsa::Fsa;
use crate::math::{Bijection, Set};

/// Decides whether two reduced DFAs over the same alphabet are isomorphic, and
/// if not, explains why in element-level diagnostics phrased against the
/// student side (the first argument). An empty result means the automata are
/// isomorphic and hence accept the same language.
///
/// Callers are expected to minimize both automata first; the checker itself
/// only walks transition structure and does not normalize.
///
/// The structural pre-checks (alphabet, state count, accepting count) abort
/// the pairing walk since a bijection cannot exist; every mismatch found
/// during the walk itself is collected rather than aborting.
pub fn check(student: &Fsa, expected: &Fsa) -> Vec<ValidationError> {
    let pre = pre_checks(student, expected);
    if !pre.is_empty() {
        return pre;
    }

    let mut errors = Vec::new();
    let mut pairing: Bijection<String, String> = Bijection::new();
    let mut accept_flagged: Set<String> = Set::default();
    let mut queue: VecDeque<(String, String)> = VecDeque::new();

    pairing.insert(student.initial.clone(), expected.initial.clone());
    acceptance_mismatch(
        student,
        expected,
        &student.initial,
        &expected.initial,
        &mut accept_flagged,
        &mut errors,
    );
    queue.push_back((student.initial.clone(), expected.initial.clone()));

    while let Some((p, q)) = queue.pop_front() {
        for symbol in &student.alphabet {
            let ps = student.dfa_successor(&p, symbol);
            let qs = expected.dfa_successor(&q, symbol);
            match (ps, qs) {
                (None, None) => {}
                (Some(ps), None) => {
                    trace!("student has surplus transition ({p}, {symbol}, {ps})");
                    errors.push(
                        ValidationError::error(
                            ErrorCode::LanguageMismatch,
                            format!(
                                "Extra transition from '{p}' on '{symbol}' to '{ps}' (this transition should not exist)"
                            ),
                        )
                        .with_highlight(Highlight::transition(p.clone(), symbol.clone(), ps))
                        .with_suggestion("Remove this transition or redirect it appropriately"),
                    );
                }
                (None, Some(qs)) => {
                    trace!("student is missing a transition from ({p}, {symbol})");
                    errors.push(
                        ValidationError::error(
                            ErrorCode::MissingTransition,
                            format!(
                                "Missing transition from '{p}' on '{symbol}' (expected to go to '{qs}')"
                            ),
                        )
                        .with_highlight(Highlight::transition(p.clone(), symbol.clone(), qs))
                        .with_suggestion(format!("Add a transition from '{p}' on '{symbol}'")),
                    );
                }
                (Some(ps), Some(qs)) => {
                    acceptance_mismatch(student, expected, ps, qs, &mut accept_flagged, &mut errors);
                    let already_left = pairing.get_by_left(ps);
                    let already_right = pairing.get_by_right(qs);
                    match (already_left, already_right) {
                        (Some(mapped), _) if mapped != qs => {
                            errors.push(wrong_destination(&p, symbol, ps, already_right));
                        }
                        (None, Some(other)) if other != ps => {
                            errors.push(wrong_destination(&p, symbol, ps, Some(other)));
                        }
                        (Some(_), _) => {} // consistently paired already
                        (None, None) => {
                            pairing.insert(ps.to_string(), qs.to_string());
                            queue.push_back((ps.to_string(), qs.to_string()));
                        }
                        (None, Some(_)) => {} // unreachable: other == ps contradicts None on the left
                    }
                }
            }
        }
    }

    errors
}

/// The fast structural failures: differing alphabets, state counts or
/// accepting counts rule out a bijection outright.
fn pre_checks(student: &Fsa, expected: &Fsa) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let missing: Vec<&str> = expected
        .alphabet
        .iter()
        .filter(|s| !student.alphabet.contains(s.as_str()))
        .map(String::as_str)
        .collect();
    let surplus: Vec<&str> = student
        .alphabet
        .iter()
        .filter(|s| !expected.alphabet.contains(s.as_str()))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() || !surplus.is_empty() {
        let mut parts = Vec::new();
        if !missing.is_empty() {
            parts.push(format!("missing {{{}}}", missing.iter().join(", ")));
        }
        if !surplus.is_empty() {
            parts.push(format!("unexpected {{{}}}", surplus.iter().join(", ")));
        }
        errors.push(
            ValidationError::error(
                ErrorCode::LanguageMismatch,
                format!("The alphabets differ: {}", parts.join(", ")),
            )
            .with_highlight(Highlight::General)
            .with_suggestion("Use exactly the symbols of the expected alphabet"),
        );
    }

    if student.num_states() != expected.num_states() {
        errors.push(
            ValidationError::error(
                ErrorCode::LanguageMismatch,
                format!(
                    "The minimal automaton for the expected language has {} state(s), yours reduces to {}",
                    expected.num_states(),
                    student.num_states()
                ),
            )
            .with_highlight(Highlight::General),
        );
    }

    if student.accepting.len() != expected.accepting.len() {
        errors.push(
            ValidationError::error(
                ErrorCode::LanguageMismatch,
                format!(
                    "The minimal automaton for the expected language has {} accepting state(s), yours reduces to {}",
                    expected.accepting.len(),
                    student.accepting.len()
                ),
            )
            .with_highlight(Highlight::General),
        );
    }

    errors
}

/// Flags a state whose acceptance disagrees with its partner, at most once per
/// student state.
fn acceptance_mismatch(
    student: &Fsa,
    expected: &Fsa,
    p: &str,
    q: &str,
    flagged: &mut Set<String>,
    errors: &mut Vec<ValidationError>,
) {
    let student_accepts = student.is_accepting(p);
    if student_accepts == expected.is_accepting(q) || !flagged.insert(p.to_string()) {
        return;
    }
    let error = if student_accepts {
        ValidationError::error(
            ErrorCode::LanguageMismatch,
            format!("State '{p}' should not be an accepting state"),
        )
        .with_highlight(Highlight::accept(p))
        .with_suggestion(format!("Remove '{p}' from the accept states"))
    } else {
        ValidationError::error(
            ErrorCode::LanguageMismatch,
            format!("State '{p}' should be an accepting state"),
        )
        .with_highlight(Highlight::accept(p))
        .with_suggestion(format!("Add '{p}' to the accept states"))
    };
    errors.push(error);
}

fn wrong_destination(
    from: &str,
    symbol: &str,
    actual: &str,
    intended: Option<&String>,
) -> ValidationError {
    let (message, suggestion) = match intended {
        Some(dest) => (
            format!(
                "Transition from '{from}' on '{symbol}' goes to '{actual}' but should go to '{dest}'"
            ),
            format!("Change the destination of this transition to '{dest}'"),
        ),
        None => (
            format!(
                "Transition from '{from}' on '{symbol}' goes to '{actual}', which does not match the expected structure"
            ),
            "Redirect this transition".to_string(),
        ),
    };
    ValidationError::error(ErrorCode::LanguageMismatch, message)
        .with_highlight(Highlight::transition(from, symbol, actual))
        .with_suggestion(suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimization::minimize;

    fn even_as(names: [&str; 2], accepting_first: bool) -> Fsa {
        let accepting = if accepting_first { names[0] } else { names[1] };
        Fsa::builder()
            .with_edges([
                (names[0], "a", names[1]),
                (names[0], "b", names[0]),
                (names[1], "a", names[0]),
                (names[1], "b", names[1]),
            ])
            .with_accepting([accepting])
            .into_fsa(names[0])
    }

    #[test]
    fn renamed_automata_are_isomorphic() {
        let left = even_as(["even", "odd"], true);
        let right = even_as(["s0", "s1"], true);
        assert!(check(&left, &right).is_empty());
    }

    #[test]
    fn acceptance_flip_is_reported_on_the_accept_marker() {
        let student = even_as(["even", "odd"], true);
        let expected = even_as(["even", "odd"], false);
        let errors = check(&student, &expected);
        assert!(!errors.is_empty());
        assert!(errors
            .iter()
            .any(|e| matches!(e.highlight, Some(Highlight::AcceptState { .. }))));
    }

    #[test]
    fn alphabet_mismatch_is_a_fast_failure() {
        let student = Fsa::builder()
            .with_edges([("q0", "a", "q0")])
            .with_accepting(["q0"])
            .into_fsa("q0");
        let expected = Fsa::builder()
            .with_edges([("q0", "b", "q0")])
            .with_accepting(["q0"])
            .into_fsa("q0");
        let errors = check(&student, &expected);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::LanguageMismatch);
        assert_eq!(errors[0].highlight, Some(Highlight::General));
        assert!(errors[0].message.contains('b'));
    }

    #[test]
    fn missing_transition_names_the_source_and_symbol() {
        let student = Fsa::builder()
            .with_alphabet(["a", "b"])
            .with_edges([("q0", "a", "q1"), ("q1", "a", "q0")])
            .with_accepting(["q1"])
            .into_fsa("q0");
        let expected = Fsa::builder()
            .with_alphabet(["a", "b"])
            .with_edges([("p0", "a", "p1"), ("p1", "a", "p0"), ("p0", "b", "p0")])
            .with_accepting(["p1"])
            .into_fsa("p0");
        // Same state and accepting counts, so the walk runs.
        let errors = check(&student, &expected);
        assert!(errors
            .iter()
            .any(|e| e.code == ErrorCode::MissingTransition && e.message.contains("'q0'")));
    }

    #[test]
    fn wrong_destination_is_reported_on_the_student_transition() {
        let student = Fsa::builder()
            .with_alphabet(["a"])
            .with_edges([("m0", "a", "m1"), ("m1", "a", "m0")])
            .with_accepting(["m0"])
            .into_fsa("m0");
        let expected = Fsa::builder()
            .with_alphabet(["a"])
            .with_edges([("n0", "a", "n1"), ("n1", "a", "n1")])
            .with_accepting(["n0"])
            .into_fsa("n0");
        let errors = check(&student, &expected);
        assert!(errors.iter().any(|e| {
            e.code == ErrorCode::LanguageMismatch
                && matches!(e.highlight, Some(Highlight::Transition { .. }))
        }));
    }

    #[test]
    fn minimized_equivalents_check_clean() {
        // a(a|b)* drawn small and drawn with redundant states.
        let small = Fsa::builder()
            .with_edges([
                ("s0", "a", "s1"),
                ("s1", "a", "s1"),
                ("s1", "b", "s1"),
            ])
            .with_accepting(["s1"])
            .into_fsa("s0");
        let redundant = Fsa::builder()
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
            .into_fsa("r0");
        assert!(check(&minimize(&small), &minimize(&redundant)).is_empty());
    }
}
