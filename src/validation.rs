use crate::diagnostics::{ErrorCode, Highlight, StructuralInfo, ValidationError};
use crate::fsa::{is_epsilon, Fsa};
use crate::math::Set;
use crate::reachability::{dead_state_ids, unreachable_state_ids};

/// Structurally validates the 5-tuple. All checks run unconditionally so that
/// a student sees every problem at once; nothing short-circuits. The returned
/// list is deterministic: equal inputs produce equal lists in equal order.
///
/// Determinism and completeness are deliberately not checked here; those are
/// property probes, not well-formedness.
pub fn validate(fsa: &Fsa) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if fsa.states.is_empty() {
        errors.push(
            ValidationError::error(ErrorCode::EmptyStates, "The FSA has no states defined")
                .with_suggestion("Add at least one state to the FSA"),
        );
    }
    for state in fsa.states.iter().filter(|s| s.is_empty()) {
        errors.push(
            ValidationError::error(
                ErrorCode::InvalidState,
                "State identifiers must be non-empty strings",
            )
            .with_highlight(Highlight::state(state.clone()))
            .with_suggestion("Give every state a non-empty name"),
        );
    }

    if fsa.alphabet.is_empty() {
        errors.push(
            ValidationError::error(ErrorCode::EmptyAlphabet, "The alphabet is empty")
                .with_suggestion("Add at least one symbol to the alphabet"),
        );
    }
    for symbol in fsa.alphabet.iter().filter(|s| is_epsilon(s.as_str())) {
        errors.push(
            ValidationError::error(
                ErrorCode::InvalidSymbol,
                format!("The alphabet must not contain the ε-marker '{symbol}'"),
            )
            .with_highlight(Highlight::symbol(symbol.clone()))
            .with_suggestion("Remove the ε-marker from the alphabet; ε-transitions do not consume a symbol"),
        );
    }

    if !fsa.contains_state(&fsa.initial) {
        errors.push(
            ValidationError::error(
                ErrorCode::InvalidInitial,
                format!("The initial state '{}' is not defined in the FSA", fsa.initial),
            )
            .with_highlight(Highlight::initial(fsa.initial.clone()))
            .with_suggestion("Include the initial state in your FSA or change your initial state"),
        );
    }

    for acc in fsa.accepting.iter().filter(|a| !fsa.contains_state(a.as_str())) {
        errors.push(
            ValidationError::error(
                ErrorCode::InvalidAccept,
                format!("The accept state '{acc}' is not defined in the FSA"),
            )
            .with_highlight(Highlight::accept(acc.clone()))
            .with_suggestion("Include the accept state in your FSA or change your accept state"),
        );
    }

    for t in &fsa.transitions {
        let highlight = Highlight::transition(t.from.clone(), t.symbol.clone(), t.to.clone());
        if !fsa.contains_state(&t.from) {
            errors.push(
                ValidationError::error(
                    ErrorCode::InvalidTransitionSource,
                    format!(
                        "The source state '{}' in transition on '{}' is not defined",
                        t.from, t.symbol
                    ),
                )
                .with_highlight(highlight.clone())
                .with_suggestion(format!(
                    "Add state '{}' to the FSA or change the transition source",
                    t.from
                )),
            );
        }
        if !fsa.contains_state(&t.to) {
            errors.push(
                ValidationError::error(
                    ErrorCode::InvalidTransitionDest,
                    format!(
                        "The destination state '{}' in transition on '{}' is not defined",
                        t.to, t.symbol
                    ),
                )
                .with_highlight(highlight.clone())
                .with_suggestion(format!(
                    "Add state '{}' to the FSA or change the transition destination",
                    t.to
                )),
            );
        }
        if !t.is_epsilon() && !fsa.alphabet.contains(&t.symbol) {
            errors.push(
                ValidationError::error(
                    ErrorCode::InvalidTransitionSymbol,
                    format!("The transition symbol '{}' is not in the alphabet", t.symbol),
                )
                .with_highlight(highlight)
                .with_suggestion(format!(
                    "Add symbol '{}' to the alphabet or change the transition symbol",
                    t.symbol
                )),
            );
        }
    }

    let mut seen: Set<(&str, &str, &str)> = Set::default();
    for t in &fsa.transitions {
        if !seen.insert((t.from.as_str(), t.symbol.as_str(), t.to.as_str())) {
            errors.push(
                ValidationError::warning(
                    ErrorCode::DuplicateTransition,
                    format!(
                        "Transition from '{}' on '{}' to '{}' is listed more than once",
                        t.from, t.symbol, t.to
                    ),
                )
                .with_highlight(Highlight::transition(
                    t.from.clone(),
                    t.symbol.clone(),
                    t.to.clone(),
                ))
                .with_suggestion("Remove the duplicate transition"),
            );
        }
    }

    errors
}

/// Emits one `NOT_DETERMINISTIC` finding per determinism violation: every
/// ε-transition, and every `(state, symbol)` pair with more than one distinct
/// successor. An empty result means the automaton is a DFA.
pub fn determinism_errors(fsa: &Fsa) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for t in fsa.transitions.iter().filter(|t| t.is_epsilon()) {
        errors.push(
            ValidationError::error(
                ErrorCode::NotDeterministic,
                format!(
                    "Non-deterministic: ε-transition from '{}' to '{}'",
                    t.from, t.to
                ),
            )
            .with_highlight(Highlight::transition(
                t.from.clone(),
                t.symbol.clone(),
                t.to.clone(),
            ))
            .with_suggestion("Remove the ε-transition or convert to an NFA-permitted exercise"),
        );
    }

    let mut flagged: Set<(&str, &str)> = Set::default();
    let map = fsa.symbol_map();
    for t in fsa.transitions.iter().filter(|t| !t.is_epsilon()) {
        let key = (t.from.as_str(), t.symbol.as_str());
        if map[&key].len() > 1 && flagged.insert(key) {
            errors.push(
                ValidationError::error(
                    ErrorCode::NotDeterministic,
                    format!(
                        "Non-deterministic: multiple transitions from '{}' on symbol '{}'",
                        t.from, t.symbol
                    ),
                )
                .with_highlight(Highlight::transition(
                    t.from.clone(),
                    t.symbol.clone(),
                    t.to.clone(),
                ))
                .with_suggestion(
                    "Remove the conflicting transitions or convert to an NFA if nondeterminism is intended",
                ),
            );
        }
    }

    errors
}

/// Emits one `MISSING_TRANSITION` finding per `(state, symbol)` pair without
/// an outgoing transition. Only meaningful for deterministic automata; the
/// pipeline reports non-determinism separately before consulting this.
pub fn completeness_errors(fsa: &Fsa) -> Vec<ValidationError> {
    let map = fsa.symbol_map();
    let mut errors = Vec::new();
    for state in &fsa.states {
        for symbol in fsa.alphabet.iter().filter(|s| !is_epsilon(s.as_str())) {
            if !map.contains_key(&(state.as_str(), symbol.as_str())) {
                errors.push(
                    ValidationError::error(
                        ErrorCode::MissingTransition,
                        format!(
                            "Missing transition from state '{state}' on symbol '{symbol}' to make the FSA complete"
                        ),
                    )
                    .with_highlight(Highlight::state_on(state.clone(), symbol.clone()))
                    .with_suggestion(format!(
                        "Add a transition from state '{state}' on symbol '{symbol}'"
                    )),
                );
            }
        }
    }
    errors
}

/// Gathers the structural profile of the automaton: the property probes plus
/// the reachability analysis, with the offender lists in input state order.
pub fn structural_info(fsa: &Fsa) -> StructuralInfo {
    StructuralInfo {
        is_deterministic: fsa.is_deterministic(),
        is_complete: fsa.is_complete(),
        num_states: fsa.num_states(),
        num_transitions: fsa.num_transitions(),
        unreachable_states: unreachable_state_ids(fsa),
        dead_states: dead_state_ids(fsa),
    }
}
