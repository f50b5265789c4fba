use std::collections::VecDeque;

use itertools::Itertools;
use tracing::trace;

use crate::closure::{epsilon_closure_of_set, epsilon_closures};
use crate::fsa::{is_epsilon, Fsa, Transition};
use crate::math::{OrderedSet, Set};

/// The canonical name of a subset state: the member ids sorted and
/// comma-separated, surrounded by braces.
pub(crate) fn subset_name<'a, I: IntoIterator<Item = &'a str>>(states: I) -> String {
    format!("{{{}}}", states.into_iter().sorted().join(","))
}

/// Converts an NFA (possibly with ε-transitions) into an equivalent DFA via
/// the subset construction. The result's states are the discovered subsets of
/// input states under their canonical names, its start state is the ε-closure
/// of the input's initial state, and a subset is accepting iff it intersects
/// the input's accepting set. The alphabet is preserved exactly.
///
/// Where a subset has no successors on a symbol, no transition is added: the
/// result may be partial, and no trap state is invented.
pub fn subset_construction(nfa: &Fsa) -> Fsa {
    let closures = epsilon_closures(nfa);
    let symbols = nfa.symbol_map();

    let initial: OrderedSet<&str> = if nfa.contains_state(&nfa.initial) {
        closures[nfa.initial.as_str()].clone()
    } else {
        // Ill-formed input; validation reports it, here we fall back to the
        // bare initial so the construction still terminates.
        epsilon_closure_of_set(nfa, [nfa.initial.as_str()])
    };

    let mut discovered: Set<OrderedSet<&str>> = Set::default();
    let mut queue: VecDeque<OrderedSet<&str>> = VecDeque::new();
    let mut transitions: Vec<Transition> = Vec::new();

    discovered.insert(initial.clone());
    queue.push_back(initial.clone());

    while let Some(subset) = queue.pop_front() {
        let from_name = subset_name(subset.iter().copied());
        for symbol in nfa.alphabet.iter().filter(|s| !is_epsilon(s.as_str())) {
            let mut moved: OrderedSet<&str> = OrderedSet::new();
            for &q in &subset {
                if let Some(targets) = symbols.get(&(q, symbol.as_str())) {
                    moved.extend(targets.iter().copied());
                }
            }
            if moved.is_empty() {
                continue;
            }
            let next: OrderedSet<&str> = moved
                .iter()
                .flat_map(|q| closures.get(q).cloned().unwrap_or_else(|| [*q].into()))
                .collect();
            transitions.push(Transition::new(
                from_name.clone(),
                symbol.clone(),
                subset_name(next.iter().copied()),
            ));
            if discovered.insert(next.clone()) {
                trace!("discovered subset state {}", subset_name(next.iter().copied()));
                queue.push_back(next);
            }
        }
    }

    let states: Vec<String> = discovered
        .iter()
        .map(|s| subset_name(s.iter().copied()))
        .collect();
    let accepting: Vec<String> = discovered
        .iter()
        .filter(|s| s.iter().any(|q| nfa.is_accepting(q)))
        .map(|s| subset_name(s.iter().copied()))
        .collect();
    let initial_name = subset_name(initial.iter().copied());

    Fsa::new(
        states,
        nfa.alphabet.iter().cloned(),
        transitions,
        initial_name,
        accepting,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::accepts_str;

    fn a_or_aa_nfa() -> Fsa {
        Fsa::builder()
            .with_edges([
                ("q0", "a", "q0"),
                ("q0", "a", "q1"),
                ("q0", "b", "q1"),
                ("q1", "b", "q1"),
                ("q1", "a", "q0"),
            ])
            .with_accepting(["q1"])
            .into_fsa("q0")
    }

    #[test_log::test]
    fn output_is_deterministic_and_epsilon_free() {
        let dfa = subset_construction(&a_or_aa_nfa());
        assert!(dfa.is_deterministic());
        assert!(!dfa.has_epsilon_transitions());
    }

    #[test]
    fn states_carry_canonical_subset_names() {
        let dfa = subset_construction(&a_or_aa_nfa());
        assert_eq!(dfa.initial, "{q0}");
        assert!(dfa.contains_state("{q0,q1}"));
    }

    #[test]
    fn epsilon_closure_seeds_the_start_state() {
        let nfa = Fsa::builder()
            .with_alphabet(["a"])
            .with_edges([("q0", "ε", "q1"), ("q1", "a", "q2")])
            .with_accepting(["q2"])
            .into_fsa("q0");
        let dfa = subset_construction(&nfa);
        assert_eq!(dfa.initial, "{q0,q1}");
        assert!(accepts_str(&dfa, "a"));
        assert!(!accepts_str(&dfa, ""));
    }

    #[test]
    fn language_is_preserved() {
        let nfa = a_or_aa_nfa();
        let dfa = subset_construction(&nfa);
        for input in ["", "a", "b", "ab", "ba", "aa", "bb", "aab", "bab", "abab"] {
            assert_eq!(
                accepts_str(&nfa, input),
                accepts_str(&dfa, input),
                "disagreement on {input:?}"
            );
        }
    }

    #[test]
    fn missing_moves_leave_the_dfa_partial() {
        let nfa = Fsa::builder()
            .with_alphabet(["a", "b"])
            .with_edges([("q0", "a", "q1")])
            .with_accepting(["q1"])
            .into_fsa("q0");
        let dfa = subset_construction(&nfa);
        // No subset ever moves on 'b', so no trap state is invented for it.
        assert!(dfa.is_deterministic());
        assert!(!dfa.is_complete());
        assert_eq!(dfa.num_states(), 2);
    }
}
