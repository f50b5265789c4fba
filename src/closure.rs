use std::collections::VecDeque;

use crate::fsa::Fsa;
use crate::math::{Map, OrderedSet, Set};

/// Computes the ε-closure of a single state: all states reachable from `state`
/// by zero or more spontaneous transitions, including `state` itself. Cycles
/// terminate through the membership test on the accumulator.
pub fn epsilon_closure<'a>(fsa: &'a Fsa, state: &'a str) -> OrderedSet<&'a str> {
    closure_from(&fsa.epsilon_map(), [state])
}

/// Computes the ε-closure of a set of states, i.e. the union of the individual
/// closures.
pub fn epsilon_closure_of_set<'a, I>(fsa: &'a Fsa, states: I) -> OrderedSet<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    closure_from(&fsa.epsilon_map(), states)
}

/// Computes the ε-closures of all states in one pass, keyed by state. With no
/// ε-transitions every closure is the identity `{q}`.
pub fn epsilon_closures(fsa: &Fsa) -> Map<&str, OrderedSet<&str>> {
    let eps = fsa.epsilon_map();
    fsa.states
        .iter()
        .map(|q| (q.as_str(), closure_from(&eps, [q.as_str()])))
        .collect()
}

/// Breadth-first expansion over the ε-edge view. The expansion order does not
/// matter for the fixed point, only for the visit sequence.
fn closure_from<'a, I>(eps: &Map<&'a str, Set<&'a str>>, seeds: I) -> OrderedSet<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut closure: OrderedSet<&str> = seeds.into_iter().collect();
    let mut queue: VecDeque<&str> = closure.iter().copied().collect();
    while let Some(q) = queue.pop_front() {
        if let Some(targets) = eps.get(q) {
            for &t in targets {
                if closure.insert(t) {
                    queue.push_back(t);
                }
            }
        }
    }
    closure
}
