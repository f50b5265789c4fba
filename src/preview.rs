use itertools::Itertools;

use crate::diagnostics::{Severity, ValidationError};
use crate::fsa::Fsa;
use crate::reachability::{find_dead_states, find_unreachable_states};
use crate::validation::validate;

/// Number of findings shown per severity before the report is cut off.
const MAX_SHOWN: usize = 5;

/// Pre-submission report: a formatted message for immediate display, the
/// one-line profile of a valid automaton, and the raw findings the message
/// was rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// Human-readable report.
    pub feedback: String,
    /// Short profile of the automaton (kind, state and transition counts),
    /// present when it has no blocking errors.
    pub summary: Option<String>,
    /// The findings behind the report, blocking errors first.
    pub diagnostics: Vec<ValidationError>,
}

/// Checks an automaton before it is submitted for full evaluation: structural
/// validation plus the reachability analyzers, rendered as a plain-text
/// report.
///
/// A structurally valid automaton gets a success message with its profile
/// (`DFA (Deterministic)` or `NFA (Non-deterministic)`, state and transition
/// counts) and its alphabet; blocking errors are numbered with their
/// suggestions indented below; warnings follow as a non-blocking list. At
/// most five findings are shown per severity.
pub fn preview(fsa: &Fsa) -> Preview {
    let mut diagnostics = validate(fsa);
    diagnostics.extend(find_unreachable_states(fsa));
    diagnostics.extend(find_dead_states(fsa));

    let errors: Vec<&ValidationError> = diagnostics
        .iter()
        .filter(|e| e.severity == Severity::Error)
        .collect();
    let warnings: Vec<&ValidationError> = diagnostics
        .iter()
        .filter(|e| e.severity != Severity::Error)
        .collect();

    let mut lines: Vec<String> = Vec::new();
    let mut summary = None;

    if errors.is_empty() {
        let profile = profile_line(fsa);
        lines.push(if warnings.is_empty() {
            "Great! Your FSA is structurally valid and ready for submission.".to_string()
        } else {
            "Looking good! Your FSA is structurally valid.".to_string()
        });
        lines.push(String::new());
        lines.push(format!("Summary: {profile}"));
        lines.push(format!(
            "Alphabet: {{{}}}",
            fsa.alphabet.iter().map(|s| format!("'{s}'")).join(", ")
        ));
        summary = Some(profile);
    } else {
        lines.push(if errors.len() == 1 {
            "There's an issue with your FSA that needs to be fixed:".to_string()
        } else {
            format!(
                "There are {} issues with your FSA that need to be fixed:",
                errors.len()
            )
        });
        lines.push(String::new());
        for (i, err) in errors.iter().take(MAX_SHOWN).enumerate() {
            lines.push(format!("  {}. {}", i + 1, err.message));
            if let Some(suggestion) = &err.suggestion {
                lines.push(format!("     >> {suggestion}"));
            }
            lines.push(String::new());
        }
        if errors.len() > MAX_SHOWN {
            lines.push(format!(
                "  ... and {} more issue(s)",
                errors.len() - MAX_SHOWN
            ));
        }
    }

    if !warnings.is_empty() {
        lines.push(String::new());
        lines.push("Some things to consider (not blocking, but worth checking):".to_string());
        lines.push(String::new());
        for warn in warnings.iter().take(MAX_SHOWN) {
            lines.push(format!("  - {}", warn.message));
            if let Some(suggestion) = &warn.suggestion {
                lines.push(format!("    >> {suggestion}"));
            }
        }
        if warnings.len() > MAX_SHOWN {
            lines.push(format!(
                "  ... and {} more suggestion(s)",
                warnings.len() - MAX_SHOWN
            ));
        }
    }

    Preview {
        feedback: lines.join("\n"),
        summary,
        diagnostics,
    }
}

/// One-line profile of the automaton: its kind plus state and transition
/// counts, singular or plural per count.
fn profile_line(fsa: &Fsa) -> String {
    let kind = if fsa.is_deterministic() {
        "DFA (Deterministic)"
    } else {
        "NFA (Non-deterministic)"
    };
    let state_word = if fsa.num_states() == 1 {
        "state"
    } else {
        "states"
    };
    let transition_word = if fsa.num_transitions() == 1 {
        "transition"
    } else {
        "transitions"
    };
    format!(
        "{kind} with {} {state_word} and {} {transition_word}",
        fsa.num_states(),
        fsa.num_transitions()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_automaton_gets_a_profiled_success_message() {
        let fsa = Fsa::builder()
            .with_edges([("q0", "a", "q1"), ("q1", "a", "q0")])
            .with_accepting(["q1"])
            .into_fsa("q0");
        let preview = preview(&fsa);
        assert!(preview.diagnostics.is_empty());
        assert!(preview.feedback.starts_with(
            "Great! Your FSA is structurally valid and ready for submission."
        ));
        assert!(preview
            .feedback
            .contains("Summary: DFA (Deterministic) with 2 states and 2 transitions"));
        assert!(preview.feedback.contains("Alphabet: {'a'}"));
        assert_eq!(
            preview.summary.as_deref(),
            Some("DFA (Deterministic) with 2 states and 2 transitions")
        );
    }

    #[test]
    fn nondeterministic_automaton_is_profiled_as_an_nfa() {
        let fsa = Fsa::builder()
            .with_edges([("q0", "a", "q0"), ("q0", "a", "q1")])
            .with_accepting(["q1"])
            .into_fsa("q0");
        let preview = preview(&fsa);
        assert_eq!(
            preview.summary.as_deref(),
            Some("NFA (Non-deterministic) with 2 states and 2 transitions")
        );
    }

    #[test]
    fn errors_are_numbered_with_suggestions() {
        let fsa = Fsa::builder()
            .with_states(["q0"])
            .with_alphabet(["a"])
            .with_edges([("q0", "a", "q1")])
            .with_accepting(["q0"])
            .into_fsa("q0");
        let preview = preview(&fsa);
        assert!(preview
            .feedback
            .starts_with("There's an issue with your FSA"));
        assert!(preview.feedback.contains("  1. "));
        assert!(preview.feedback.contains(">> Add state 'q1'"));
        assert!(preview.summary.is_none());
    }

    #[test]
    fn valid_with_warnings_keeps_the_profile_and_lists_them() {
        let fsa = Fsa::builder()
            .with_states(["q0", "q1", "island"])
            .with_alphabet(["a"])
            .with_edges([("q0", "a", "q1")])
            .with_accepting(["q1"])
            .into_fsa("q0");
        let preview = preview(&fsa);
        assert!(preview
            .feedback
            .starts_with("Looking good! Your FSA is structurally valid."));
        assert!(preview
            .feedback
            .contains("Summary: DFA (Deterministic) with 3 states and 1 transition"));
        assert!(preview.feedback.contains("Some things to consider"));
        assert!(preview.feedback.contains("- State 'island' is unreachable"));
        assert!(preview.summary.is_some());
    }

    #[test]
    fn long_reports_are_cut_off() {
        // Ten unknown accept states produce ten blocking errors.
        let fsa = Fsa::builder()
            .with_states(["q0"])
            .with_alphabet(["a"])
            .with_accepting((0..10).map(|i| format!("ghost{i}")))
            .into_fsa("q0");
        let preview = preview(&fsa);
        assert!(preview.feedback.contains("... and 5 more issue(s)"));
        assert!(!preview.feedback.contains("  6. "));
    }
}
