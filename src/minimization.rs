use std::collections::VecDeque;

use bit_set::BitSet;
use tracing::{debug, trace};

use crate::determinize::subset_construction;
use crate::fsa::{Fsa, Transition};
use crate::math::{Map, Partition};
use crate::reachability::reachable_states;

/// Drops every state the initial state cannot reach, along with all incident
/// transitions. Leaves an automaton with an undefined initial state untouched;
/// the structural validator owns that finding.
pub fn remove_unreachable_states(fsa: &Fsa) -> Fsa {
    if !fsa.contains_state(&fsa.initial) {
        return fsa.clone();
    }
    let reached = reachable_states(fsa);
    Fsa::new(
        fsa.states
            .iter()
            .filter(|s| reached.contains(s.as_str()))
            .cloned(),
        fsa.alphabet.iter().cloned(),
        fsa.transitions
            .iter()
            .filter(|t| reached.contains(t.from.as_str()) && reached.contains(t.to.as_str()))
            .cloned(),
        fsa.initial.clone(),
        fsa.accepting
            .iter()
            .filter(|s| reached.contains(s.as_str()))
            .cloned(),
    )
}

/// Produces the minimal automaton for the language of `fsa`. Non-deterministic
/// input is determinized first; unreachable states are removed; then Hopcroft
/// partition refinement merges indistinguishable states.
///
/// The result is canonically named: the block containing the initial state
/// becomes `M0` and further blocks are named `M1, M2, …` in the order a
/// breadth-first walk over the block graph discovers them, exploring symbols
/// in alphabet order. This makes the output reproducible and lets two
/// minimized automata be compared structurally.
pub fn minimize(fsa: &Fsa) -> Fsa {
    let dfa = if fsa.is_deterministic() {
        fsa.clone()
    } else {
        debug!("input is non-deterministic, running subset construction first");
        subset_construction(fsa)
    };
    let trimmed = remove_unreachable_states(&dfa);
    if trimmed.states.is_empty() || !trimmed.contains_state(&trimmed.initial) {
        return trimmed;
    }
    let table = DfaTable::new(&trimmed);
    let blocks = refine(&table, &trimmed);
    debug!(
        "refinement stabilized with {} block(s) for {} state(s)",
        blocks.len(),
        table.states.len()
    );
    rebuild(&trimmed, &table, &blocks)
}

/// Whether `fsa` already has as few states as its language permits, judged by
/// comparing the state count against the minimized automaton. Partial automata
/// compare against the equally partial minimization result, so the probe is
/// symmetric.
pub fn is_minimal(fsa: &Fsa) -> bool {
    minimize(fsa).num_states() == fsa.num_states()
}

/// Runs Hopcroft refinement on a deterministic automaton as given (no
/// determinization, no trimming) and reports the classes of indistinguishable
/// states under their original ids.
pub fn hopcroft_partition(fsa: &Fsa) -> Partition<String> {
    let table = DfaTable::new(fsa);
    let blocks = refine(&table, fsa);
    Partition::new(
        blocks
            .iter()
            .map(|block| block.iter().map(|q| table.states[q].to_string())),
    )
}

/// Dense view of a DFA: states indexed `0..n` in input order, successors as
/// per-state symbol maps, accepting states as a bit set.
struct DfaTable<'a> {
    states: Vec<&'a str>,
    succ: Vec<Map<&'a str, usize>>,
    accepting: BitSet,
}

impl<'a> DfaTable<'a> {
    fn new(dfa: &'a Fsa) -> Self {
        let states: Vec<&str> = dfa.states.iter().map(String::as_str).collect();
        let index: Map<&str, usize> = states.iter().enumerate().map(|(i, s)| (*s, i)).collect();
        let mut succ: Vec<Map<&str, usize>> = vec![Map::default(); states.len()];
        for t in dfa.transitions.iter().filter(|t| !t.is_epsilon()) {
            if let (Some(&from), Some(&to)) = (index.get(t.from.as_str()), index.get(t.to.as_str()))
            {
                succ[from].entry(t.symbol.as_str()).or_insert(to);
            }
        }
        let accepting = dfa
            .accepting
            .iter()
            .filter_map(|s| index.get(s.as_str()).copied())
            .collect();
        Self {
            states,
            succ,
            accepting,
        }
    }
}

/// Hopcroft's worklist refinement. Starts from the accepting/non-accepting
/// split, seeds the worklist with the smaller of the two blocks, and splits
/// every block that a splitter's preimage cuts in two, pushing the smaller
/// part (or both, if the cut block was itself queued).
fn refine(table: &DfaTable<'_>, dfa: &Fsa) -> Vec<BitSet> {
    let n = table.states.len();
    let accepting = table.accepting.clone();
    let mut non_accepting: BitSet = (0..n).collect();
    non_accepting.difference_with(&accepting);

    let mut partition: Vec<BitSet> = Vec::new();
    let mut worklist: VecDeque<usize> = VecDeque::new();
    let mut queued: Vec<bool> = Vec::new();

    for block in [accepting, non_accepting] {
        if !block.is_empty() {
            partition.push(block);
            queued.push(false);
        }
    }
    match partition.len() {
        0 => return partition,
        1 => {
            worklist.push_back(0);
            queued[0] = true;
        }
        _ => {
            let smaller = if partition[0].len() <= partition[1].len() {
                0
            } else {
                1
            };
            worklist.push_back(smaller);
            queued[smaller] = true;
        }
    }

    while let Some(a_idx) = worklist.pop_front() {
        queued[a_idx] = false;
        let splitter = partition[a_idx].clone();

        for symbol in &dfa.alphabet {
            let preimage: BitSet = (0..n)
                .filter(|&q| {
                    table.succ[q]
                        .get(symbol.as_str())
                        .is_some_and(|t| splitter.contains(*t))
                })
                .collect();
            if preimage.is_empty() {
                continue;
            }

            let mut y = 0;
            while y < partition.len() {
                let mut inside = partition[y].clone();
                inside.intersect_with(&preimage);
                if inside.is_empty() || inside.len() == partition[y].len() {
                    y += 1;
                    continue;
                }
                let mut outside = partition[y].clone();
                outside.difference_with(&preimage);
                trace!(
                    "splitting block of size {} into {} + {} on '{symbol}'",
                    partition[y].len(),
                    inside.len(),
                    outside.len()
                );

                partition[y] = inside;
                partition.push(outside);
                let new_idx = partition.len() - 1;
                queued.push(false);

                if queued[y] {
                    queued[new_idx] = true;
                    worklist.push_back(new_idx);
                } else {
                    let smaller = if partition[y].len() <= partition[new_idx].len() {
                        y
                    } else {
                        new_idx
                    };
                    queued[smaller] = true;
                    worklist.push_back(smaller);
                }
                y += 1;
            }
        }
    }

    partition
}

/// Collapses each block into one state, walking the block graph breadth-first
/// from the initial block to assign the canonical `M_k` names. Transitions of
/// a block are taken from its first member in input state order; a stable
/// refinement guarantees all members agree.
fn rebuild(dfa: &Fsa, table: &DfaTable<'_>, blocks: &[BitSet]) -> Fsa {
    let n = table.states.len();
    let mut block_of: Vec<usize> = vec![0; n];
    for (b, block) in blocks.iter().enumerate() {
        for q in block.iter() {
            block_of[q] = b;
        }
    }

    let initial_idx = table
        .states
        .iter()
        .position(|s| *s == dfa.initial)
        .expect("initial state survives trimming");
    let initial_block = block_of[initial_idx];

    let mut name_of: Map<usize, String> = Map::default();
    let mut order: Vec<usize> = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::new();
    name_of.insert(initial_block, "M0".to_string());
    order.push(initial_block);
    queue.push_back(initial_block);

    let mut transitions: Vec<Transition> = Vec::new();
    while let Some(b) = queue.pop_front() {
        let rep = blocks[b].iter().next().expect("blocks are non-empty");
        for symbol in &dfa.alphabet {
            let Some(&target) = table.succ[rep].get(symbol.as_str()) else {
                continue;
            };
            let tb = block_of[target];
            if !name_of.contains_key(&tb) {
                name_of.insert(tb, format!("M{}", order.len()));
                order.push(tb);
                queue.push_back(tb);
            }
            transitions.push(Transition::new(
                name_of[&b].clone(),
                symbol.clone(),
                name_of[&tb].clone(),
            ));
        }
    }

    let states: Vec<String> = order.iter().map(|b| name_of[b].clone()).collect();
    let accepting: Vec<String> = order
        .iter()
        .filter(|b| !blocks[**b].is_disjoint(&table.accepting))
        .map(|b| name_of[b].clone())
        .collect();

    Fsa::new(
        states,
        dfa.alphabet.iter().cloned(),
        transitions,
        "M0",
        accepting,
    )
}
