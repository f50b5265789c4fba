use std::collections::VecDeque;

use crate::diagnostics::{ErrorCode, Highlight, ValidationError};
use crate::fsa::Fsa;
use crate::math::{Map, Set};

/// All states reachable from the initial state over the forward graph,
/// ε-edges included. Empty when the initial state is not part of the state
/// set; the structural validator owns that finding.
pub fn reachable_states(fsa: &Fsa) -> Set<&str> {
    if !fsa.contains_state(&fsa.initial) {
        return Set::default();
    }
    let mut forward: Map<&str, Set<&str>> = Map::default();
    for t in &fsa.transitions {
        forward.entry(t.from.as_str()).or_default().insert(t.to.as_str());
    }

    let mut visited: Set<&str> = Set::default();
    visited.insert(fsa.initial.as_str());
    let mut queue: VecDeque<&str> = VecDeque::from([fsa.initial.as_str()]);
    while let Some(state) = queue.pop_front() {
        if let Some(targets) = forward.get(state) {
            for &t in targets {
                if fsa.contains_state(t) && visited.insert(t) {
                    queue.push_back(t);
                }
            }
        }
    }
    visited
}

/// The states of `fsa` that the forward BFS from the initial state never
/// visits, in input state order.
pub fn unreachable_state_ids(fsa: &Fsa) -> Vec<String> {
    if !fsa.contains_state(&fsa.initial) {
        return Vec::new();
    }
    let reached = reachable_states(fsa);
    fsa.states
        .iter()
        .filter(|s| !reached.contains(s.as_str()))
        .cloned()
        .collect()
}

/// Emits one `UNREACHABLE_STATE` warning per state the initial state cannot
/// reach.
pub fn find_unreachable_states(fsa: &Fsa) -> Vec<ValidationError> {
    unreachable_state_ids(fsa)
        .into_iter()
        .map(|state| {
            ValidationError::warning(
                ErrorCode::UnreachableState,
                format!("State '{state}' is unreachable from the initial state"),
            )
            .with_highlight(Highlight::state(state.clone()))
            .with_suggestion(format!(
                "Add a transition to state '{state}' from a reachable state, or remove it if unnecessary"
            ))
        })
        .collect()
}

/// All states that can reach an accepting state, computed by BFS from the
/// accepting set over the reverse graph. ε-edges count as ordinary edges for
/// this purpose.
pub fn coreachable_states(fsa: &Fsa) -> Set<&str> {
    let predecessors = fsa.predecessor_map();
    let mut visited: Set<&str> = fsa
        .accepting
        .iter()
        .filter(|s| fsa.contains_state(s.as_str()))
        .map(String::as_str)
        .collect();
    let mut queue: VecDeque<&str> = visited.iter().copied().collect();
    while let Some(state) = queue.pop_front() {
        if let Some(preds) = predecessors.get(state) {
            for &p in preds {
                if fsa.contains_state(p) && visited.insert(p) {
                    queue.push_back(p);
                }
            }
        }
    }
    visited
}

/// The dead states, in input state order: a state is dead iff it is not
/// accepting and no accepting state is reachable from it. With an empty
/// accepting set, every state is dead.
pub fn dead_state_ids(fsa: &Fsa) -> Vec<String> {
    let alive = coreachable_states(fsa);
    fsa.states
        .iter()
        .filter(|s| !alive.contains(s.as_str()))
        .cloned()
        .collect()
}

/// Emits one `DEAD_STATE` warning per state that cannot reach the accepting
/// set.
pub fn find_dead_states(fsa: &Fsa) -> Vec<ValidationError> {
    dead_state_ids(fsa)
        .into_iter()
        .map(|state| {
            ValidationError::warning(
                ErrorCode::DeadState,
                format!("State '{state}' is dead (cannot reach any accepting state)"),
            )
            .with_highlight(Highlight::state(state.clone()))
            .with_suggestion(format!(
                "Add a transition from state '{state}' to a state that can reach an accept state, or make state '{state}' accepting"
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bfs_reaches_exactly_the_connected_part() {
        let fsa = Fsa::builder()
            .with_states(["q0", "q1", "q2", "island"])
            .with_alphabet(["a"])
            .with_edges([
                ("q0", "a", "q1"),
                ("q1", "a", "q2"),
                ("island", "a", "q1"),
            ])
            .with_accepting(["q2"])
            .into_fsa("q0");
        assert_eq!(unreachable_state_ids(&fsa), vec!["island".to_string()]);
        let warnings = find_unreachable_states(&fsa);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, ErrorCode::UnreachableState);
        assert_eq!(warnings[0].highlight, Some(Highlight::state("island")));
    }

    #[test]
    fn epsilon_edges_count_for_reachability() {
        let fsa = Fsa::builder()
            .with_alphabet(["a"])
            .with_edges([("q0", "ε", "q1")])
            .with_accepting(["q1"])
            .into_fsa("q0");
        assert!(unreachable_state_ids(&fsa).is_empty());
    }

    #[test]
    fn self_loop_without_exit_is_dead() {
        // q1 loops forever and can never come back to the accepting q0.
        let fsa = Fsa::builder()
            .with_edges([("q0", "a", "q1"), ("q1", "a", "q1")])
            .with_accepting(["q0"])
            .into_fsa("q0");
        let warnings = find_dead_states(&fsa);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, ErrorCode::DeadState);
        assert_eq!(warnings[0].highlight, Some(Highlight::state("q1")));
    }

    #[test]
    fn dead_iff_no_accepting_state_reachable() {
        let fsa = Fsa::builder()
            .with_edges([
                ("q0", "a", "q1"),
                ("q1", "b", "q2"),
                ("q3", "a", "q3"),
            ])
            .with_accepting(["q2"])
            .into_fsa("q0");
        assert_eq!(dead_state_ids(&fsa), vec!["q3".to_string()]);
    }

    #[test]
    fn empty_accepting_set_makes_every_state_dead() {
        let fsa = Fsa::builder()
            .with_edges([("q0", "a", "q1")])
            .into_fsa("q0");
        assert_eq!(
            dead_state_ids(&fsa),
            vec!["q0".to_string(), "q1".to_string()]
        );
    }

    #[test]
    fn invalid_initial_yields_no_unreachable_findings() {
        let fsa = Fsa::builder()
            .with_states(["q0"])
            .with_alphabet(["a"])
            .into_fsa("elsewhere");
        assert!(find_unreachable_states(&fsa).is_empty());
    }
}
