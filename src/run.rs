use itertools::Itertools;

use crate::closure::{epsilon_closure_of_set, epsilon_closures};
use crate::fsa::Fsa;
use crate::math::OrderedSet;

/// The outcome of running an automaton on a word: acceptance plus the
/// configuration set after every step. For a DFA every configuration is a
/// singleton and the trace degenerates to a linear sequence of states; for an
/// NFA each entry is the full set of states the automaton could be in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Whether the final configuration intersects the accepting set.
    pub accepted: bool,
    /// Configuration sets, starting with the ε-closure of the initial state
    /// and followed by one entry per consumed symbol. Once empty, the run
    /// stays empty but the trace keeps recording.
    pub configurations: Vec<OrderedSet<String>>,
}

impl Run {
    /// Renders each configuration for a trace display: a singleton shows as
    /// the bare state id, larger sets as `{a,b}`, the empty set as `∅`.
    pub fn labels(&self) -> Vec<String> {
        self.configurations
            .iter()
            .map(|cfg| match cfg.len() {
                0 => "∅".to_string(),
                1 => cfg.iter().next().cloned().unwrap_or_default(),
                _ => format!("{{{}}}", cfg.iter().join(",")),
            })
            .collect()
    }
}

/// Decides acceptance of `word`, a sequence of alphabet symbols, via the
/// configuration-set recurrence. A symbol outside the alphabet empties the
/// configuration, which amounts to rejection; it is never an error.
pub fn accepts<'w, W>(fsa: &Fsa, word: W) -> bool
where
    W: IntoIterator<Item = &'w str>,
{
    trace(fsa, word).accepted
}

/// [`accepts`] for a plain string, reading each character as one symbol.
pub fn accepts_str(fsa: &Fsa, input: &str) -> bool {
    trace_str(fsa, input).accepted
}

/// Runs `word` through the automaton, recording the configuration set after
/// each symbol.
pub fn trace<'w, W>(fsa: &Fsa, word: W) -> Run
where
    W: IntoIterator<Item = &'w str>,
{
    let closures = epsilon_closures(fsa);
    let symbols = fsa.symbol_map();

    let mut current: OrderedSet<&str> = if fsa.contains_state(&fsa.initial) {
        closures[fsa.initial.as_str()].clone()
    } else {
        OrderedSet::new()
    };
    let mut configurations = vec![to_owned_set(&current)];

    for symbol in word {
        let mut moved: OrderedSet<&str> = OrderedSet::new();
        if fsa.alphabet.contains(symbol) {
            for &q in &current {
                if let Some(targets) = symbols.get(&(q, symbol)) {
                    moved.extend(targets.iter().copied());
                }
            }
        }
        current = epsilon_closure_of_set(fsa, moved.iter().copied());
        configurations.push(to_owned_set(&current));
    }

    let accepted = current.iter().any(|q| fsa.is_accepting(q));
    Run {
        accepted,
        configurations,
    }
}

/// [`trace`] for a plain string, reading each character as one symbol.
pub fn trace_str(fsa: &Fsa, input: &str) -> Run {
    let symbols: Vec<String> = input.chars().map(String::from).collect();
    trace(fsa, symbols.iter().map(String::as_str))
}

fn to_owned_set(set: &OrderedSet<&str>) -> OrderedSet<String> {
    set.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// DFA for the language "ends with ab" over {a, b}.
    fn ends_with_ab() -> Fsa {
        Fsa::builder()
            .with_edges([
                ("q0", "a", "q1"),
                ("q0", "b", "q0"),
                ("q1", "a", "q1"),
                ("q1", "b", "q2"),
                ("q2", "a", "q1"),
                ("q2", "b", "q0"),
            ])
            .with_accepting(["q2"])
            .into_fsa("q0")
    }

    #[test]
    fn acceptance_on_a_dfa() {
        let dfa = ends_with_ab();
        assert!(accepts_str(&dfa, "ab"));
        assert!(accepts_str(&dfa, "aab"));
        assert!(!accepts_str(&dfa, "ba"));
        assert!(!accepts_str(&dfa, ""));
    }

    #[test]
    fn dfa_trace_is_linear() {
        let run = trace_str(&ends_with_ab(), "aab");
        assert!(run.accepted);
        assert_eq!(run.labels(), ["q0", "q1", "q1", "q2"]);
    }

    #[test]
    fn nfa_trace_records_configuration_sets() {
        let nfa = Fsa::builder()
            .with_edges([("q0", "a", "q0"), ("q0", "a", "q1")])
            .with_accepting(["q1"])
            .into_fsa("q0");
        let run = trace_str(&nfa, "aa");
        assert!(run.accepted);
        assert_eq!(run.labels(), ["q0", "{q0,q1}", "{q0,q1}"]);
    }

    #[test]
    fn unknown_symbol_rejects_instead_of_erroring() {
        let dfa = ends_with_ab();
        let run = trace_str(&dfa, "axb");
        assert!(!run.accepted);
        // The configuration empties at the unknown symbol and stays empty.
        assert_eq!(run.labels(), ["q0", "q1", "∅", "∅"]);
    }

    #[test]
    fn epsilon_closure_seeds_the_initial_configuration() {
        let nfa = Fsa::builder()
            .with_alphabet(["a"])
            .with_edges([("q0", "ε", "q1"), ("q1", "a", "q2")])
            .with_accepting(["q1"])
            .into_fsa("q0");
        let run = trace_str(&nfa, "");
        assert!(run.accepted);
        assert_eq!(run.labels(), ["{q0,q1}"]);
    }

    #[test]
    fn empty_configuration_continues_the_trace() {
        let dfa = Fsa::builder()
            .with_alphabet(["a", "b"])
            .with_edges([("q0", "a", "q0")])
            .with_accepting(["q0"])
            .into_fsa("q0");
        let run = trace_str(&dfa, "ba");
        assert!(!run.accepted);
        assert_eq!(run.labels(), ["q0", "∅", "∅"]);
    }
}
