use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::math::{Map, Set};

/// The canonical internal spelling of the ε-marker. Input may spell it as
/// `"ε"`, `"epsilon"` or the empty string; construction normalizes all three
/// to this sentinel.
pub const EPSILON: &str = "ε";

/// Returns `true` if `symbol` is one of the three accepted spellings of ε.
pub fn is_epsilon(symbol: &str) -> bool {
    matches!(symbol, EPSILON | "epsilon" | "")
}

/// A single transition `δ(from, symbol) ∋ to`. The symbol may be the ε-marker,
/// in which case the transition is spontaneous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// Source state identifier.
    #[serde(rename = "from_state")]
    pub from: String,
    /// Destination state identifier.
    #[serde(rename = "to_state")]
    pub to: String,
    /// Input symbol consumed by the transition.
    pub symbol: String,
}

impl Transition {
    /// Creates a new transition, normalizing any accepted ε spelling of the
    /// symbol to the internal sentinel.
    pub fn new(from: impl Into<String>, symbol: impl Into<String>, to: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            from: from.into(),
            to: to.into(),
            symbol: if is_epsilon(&symbol) {
                EPSILON.to_string()
            } else {
                symbol
            },
        }
    }

    /// Whether this transition is spontaneous.
    pub fn is_epsilon(&self) -> bool {
        is_epsilon(&self.symbol)
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} --{}--> {})", self.from, self.symbol, self.to)
    }
}

/// A finite-state automaton given as a 5-tuple. Values are immutable after
/// construction; the analysis passes consume them read-only and allocate any
/// derived structure per call.
///
/// The states, the alphabet and the accepting set preserve the order in which
/// they were given, which keeps diagnostics reproducible: errors are reported
/// in input order and the isomorphism check walks symbols in alphabet order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawFsa")]
pub struct Fsa {
    /// Q: the set of state identifiers.
    pub states: Set<String>,
    /// Σ: the input alphabet, excluding the ε-marker.
    pub alphabet: Set<String>,
    /// δ: the transition relation as a multiset of triples.
    pub transitions: Vec<Transition>,
    /// q₀: the starting state.
    #[serde(rename = "initial_state")]
    pub initial: String,
    /// F: the accepting states.
    #[serde(rename = "accept_states")]
    pub accepting: Set<String>,
}

/// Wire shape of an [`Fsa`], used so that deserialization runs through
/// [`Fsa::new`] and picks up ε-normalization.
#[derive(Deserialize)]
struct RawFsa {
    states: Vec<String>,
    alphabet: Vec<String>,
    #[serde(default)]
    transitions: Vec<Transition>,
    initial_state: String,
    #[serde(default)]
    accept_states: Vec<String>,
}

impl From<RawFsa> for Fsa {
    fn from(raw: RawFsa) -> Self {
        Fsa::new(
            raw.states,
            raw.alphabet,
            raw.transitions
                .into_iter()
                .map(|t| (t.from, t.symbol, t.to)),
            raw.initial_state,
            raw.accept_states,
        )
    }
}

impl Fsa {
    /// Creates an automaton from the parts of the 5-tuple. Transition symbols
    /// spelled `"epsilon"` or `""` are normalized to [`EPSILON`]; everything
    /// else is taken as given, including ill-formed input, which the
    /// [structural validator](crate::validation::validate) reports rather than
    /// this constructor rejecting it.
    pub fn new<S, A, T, I, C>(states: S, alphabet: A, transitions: T, initial: I, accepting: C) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
        T: IntoIterator,
        T::Item: IntoTransition,
        I: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            states: states.into_iter().map(Into::into).collect(),
            alphabet: alphabet.into_iter().map(Into::into).collect(),
            transitions: transitions
                .into_iter()
                .map(IntoTransition::into_transition)
                .collect(),
            initial: initial.into(),
            accepting: accepting.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns a [`FsaBuilder`] for assembling an automaton edge by edge.
    pub fn builder() -> FsaBuilder {
        FsaBuilder::default()
    }

    /// The number of states.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// The number of transitions, counting duplicates.
    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// Whether `id` names a state of this automaton.
    pub fn contains_state(&self, id: &str) -> bool {
        self.states.contains(id)
    }

    /// Whether `id` is an accepting state.
    pub fn is_accepting(&self, id: &str) -> bool {
        self.accepting.contains(id)
    }

    /// Whether any spontaneous transition exists.
    pub fn has_epsilon_transitions(&self) -> bool {
        self.transitions.iter().any(Transition::is_epsilon)
    }

    /// Builds the non-ε successor view `(from, symbol) → {to}`.
    pub fn symbol_map(&self) -> Map<(&str, &str), Set<&str>> {
        let mut map: Map<(&str, &str), Set<&str>> = Map::default();
        for t in self.transitions.iter().filter(|t| !t.is_epsilon()) {
            map.entry((t.from.as_str(), t.symbol.as_str()))
                .or_default()
                .insert(t.to.as_str());
        }
        map
    }

    /// Builds the spontaneous successor view `from → {to}`.
    pub fn epsilon_map(&self) -> Map<&str, Set<&str>> {
        let mut map: Map<&str, Set<&str>> = Map::default();
        for t in self.transitions.iter().filter(|t| t.is_epsilon()) {
            map.entry(t.from.as_str()).or_default().insert(t.to.as_str());
        }
        map
    }

    /// Builds the reverse transition view `to → {from}`, treating ε-edges as
    /// ordinary edges. This is the graph the dead-state analyzer walks.
    pub fn predecessor_map(&self) -> Map<&str, Set<&str>> {
        let mut map: Map<&str, Set<&str>> = Map::default();
        for t in &self.transitions {
            map.entry(t.to.as_str()).or_default().insert(t.from.as_str());
        }
        map
    }

    /// All states reachable from `from` on the non-ε `symbol` in a single step.
    pub fn successors<'a>(&'a self, from: &str, symbol: &str) -> Set<&'a str> {
        self.transitions
            .iter()
            .filter(|t| !t.is_epsilon() && t.from == from && t.symbol == symbol)
            .map(|t| t.to.as_str())
            .collect()
    }

    /// The unique successor of `from` on `symbol` in a deterministic automaton.
    /// Returns the first matching target if the automaton happens not to be
    /// deterministic after all.
    pub fn dfa_successor<'a>(&'a self, from: &str, symbol: &str) -> Option<&'a str> {
        self.transitions
            .iter()
            .find(|t| !t.is_epsilon() && t.from == from && t.symbol == symbol)
            .map(|t| t.to.as_str())
    }

    /// Whether the automaton is deterministic: no ε-transitions and at most one
    /// distinct successor per `(state, symbol)` pair.
    pub fn is_deterministic(&self) -> bool {
        if self.has_epsilon_transitions() {
            return false;
        }
        self.symbol_map().values().all(|targets| targets.len() <= 1)
    }

    /// Whether the automaton is complete: deterministic, with exactly one
    /// successor for every `(state, symbol)` pair.
    pub fn is_complete(&self) -> bool {
        if !self.is_deterministic() {
            return false;
        }
        let map = self.symbol_map();
        self.states
            .iter()
            .cartesian_product(self.alphabet.iter())
            .all(|(q, a)| map.contains_key(&(q.as_str(), a.as_str())))
    }
}

/// Conversion into a [`Transition`], so constructors and the builder accept
/// plain `(from, symbol, to)` tuples alongside ready-made transitions.
pub trait IntoTransition {
    /// Performs the conversion.
    fn into_transition(self) -> Transition;
}

impl IntoTransition for Transition {
    fn into_transition(self) -> Transition {
        Transition::new(self.from, self.symbol, self.to)
    }
}

impl<F: Into<String>, S: Into<String>, T: Into<String>> IntoTransition for (F, S, T) {
    fn into_transition(self) -> Transition {
        Transition::new(self.0, self.1, self.2)
    }
}

/// Helper struct for assembling automata, mainly in tests and fixtures. States
/// and alphabet may be given explicitly; when omitted they are inferred from
/// the edges, the initial state and the accepting set, in order of appearance.
///
/// # Example
///
/// ```
/// use fsa_grader::prelude::*;
///
/// let fsa = Fsa::builder()
///     .with_edges([("q0", "a", "q1"), ("q1", "b", "q0")])
///     .with_accepting(["q1"])
///     .into_fsa("q0");
/// assert_eq!(fsa.num_states(), 2);
/// assert_eq!(fsa.alphabet.len(), 2);
/// ```
#[derive(Default)]
pub struct FsaBuilder {
    states: Option<Vec<String>>,
    alphabet: Option<Vec<String>>,
    edges: Vec<Transition>,
    accepting: Vec<String>,
}

impl FsaBuilder {
    /// Sets the state set explicitly, disabling inference from edges.
    pub fn with_states<I>(mut self, states: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.states = Some(states.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the alphabet explicitly, disabling inference from edge symbols.
    pub fn with_alphabet<I>(mut self, alphabet: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.alphabet = Some(alphabet.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a batch of edges.
    pub fn with_edges<I>(mut self, edges: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoTransition,
    {
        self.edges
            .extend(edges.into_iter().map(IntoTransition::into_transition));
        self
    }

    /// Marks the given states as accepting.
    pub fn with_accepting<I>(mut self, accepting: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.accepting
            .extend(accepting.into_iter().map(Into::into));
        self
    }

    /// Finishes the build, designating `initial` as the starting state.
    pub fn into_fsa(self, initial: impl Into<String>) -> Fsa {
        let initial = initial.into();
        let states = self.states.unwrap_or_else(|| {
            let mut seen: Set<String> = Set::default();
            seen.insert(initial.clone());
            for edge in &self.edges {
                seen.insert(edge.from.clone());
                seen.insert(edge.to.clone());
            }
            for acc in &self.accepting {
                seen.insert(acc.clone());
            }
            seen.into_iter().collect()
        });
        let alphabet = self.alphabet.unwrap_or_else(|| {
            let mut seen: Set<String> = Set::default();
            for edge in self.edges.iter().filter(|e| !e.is_epsilon()) {
                seen.insert(edge.symbol.clone());
            }
            seen.into_iter().collect()
        });
        Fsa::new(states, alphabet, self.edges, initial, self.accepting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsilon_spellings_normalize() {
        let fsa = Fsa::builder()
            .with_alphabet(["a"])
            .with_edges([("q0", "ε", "q1"), ("q1", "epsilon", "q2"), ("q2", "", "q0")])
            .into_fsa("q0");
        assert!(fsa.transitions.iter().all(|t| t.symbol == EPSILON));
        assert!(fsa.has_epsilon_transitions());
    }

    #[test]
    fn builder_infers_states_and_alphabet() {
        let fsa = Fsa::builder()
            .with_edges([("q0", "a", "q1"), ("q1", "b", "q2")])
            .with_accepting(["q2", "q3"])
            .into_fsa("q0");
        assert_eq!(
            fsa.states.iter().collect::<Vec<_>>(),
            ["q0", "q1", "q2", "q3"]
        );
        assert_eq!(fsa.alphabet.iter().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn determinism_and_completeness_probes() {
        let complete = Fsa::builder()
            .with_edges([
                ("q0", "a", "q1"),
                ("q0", "b", "q0"),
                ("q1", "a", "q1"),
                ("q1", "b", "q0"),
            ])
            .with_accepting(["q1"])
            .into_fsa("q0");
        assert!(complete.is_deterministic());
        assert!(complete.is_complete());

        let partial = Fsa::builder()
            .with_alphabet(["a", "b"])
            .with_edges([("q0", "a", "q1")])
            .into_fsa("q0");
        assert!(partial.is_deterministic());
        assert!(!partial.is_complete());

        let nondet = Fsa::builder()
            .with_edges([("q0", "a", "q1"), ("q0", "a", "q2")])
            .into_fsa("q0");
        assert!(!nondet.is_deterministic());
    }

    #[test]
    fn duplicate_transitions_do_not_break_determinism() {
        let fsa = Fsa::builder()
            .with_edges([("q0", "a", "q1"), ("q0", "a", "q1")])
            .into_fsa("q0");
        assert!(fsa.is_deterministic());
        assert_eq!(fsa.num_transitions(), 2);
    }

    #[test]
    fn deserializes_the_wire_shape() {
        let fsa: Fsa = serde_json::from_str(
            r#"{
                "states": ["q0", "q1"],
                "alphabet": ["a"],
                "transitions": [
                    {"from_state": "q0", "to_state": "q1", "symbol": "a"},
                    {"from_state": "q1", "to_state": "q0", "symbol": "epsilon"}
                ],
                "initial_state": "q0",
                "accept_states": ["q1"]
            }"#,
        )
        .unwrap();
        assert_eq!(fsa.initial, "q0");
        assert_eq!(fsa.transitions[1].symbol, EPSILON);
        assert!(fsa.is_accepting("q1"));
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let fsa = Fsa::builder()
            .with_edges([("q0", "a", "q1")])
            .with_accepting(["q1"])
            .into_fsa("q0");
        let json = serde_json::to_value(&fsa).unwrap();
        assert_eq!(json["initial_state"], "q0");
        assert_eq!(json["transitions"][0]["from_state"], "q0");
        assert_eq!(json["accept_states"][0], "q1");
    }
}
