#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this crate easier. Importing everything,
/// i.e. `use fsa_grader::prelude::*;` should be enough to work with the crate.
pub mod prelude {
    pub use super::{
        closure::{epsilon_closure, epsilon_closure_of_set, epsilon_closures},
        correction::{
            evaluate, feedback, Answer, EvaluationMode, ExpectedType, Params, TestCase, Verbosity,
        },
        determinize::subset_construction,
        diagnostics::{
            CounterexampleType, DifferenceString, ErrorCode, FsaFeedback, Highlight,
            LanguageComparison, Severity, StructuralInfo, TestResult, ValidationError, Verdict,
        },
        equivalence::{
            generate_difference_strings, same_language, EquivalenceReport, LengthLexWords,
            DEFAULT_MAX_DIFFERENCES, DEFAULT_MAX_LENGTH,
        },
        fsa::{is_epsilon, Fsa, FsaBuilder, Transition, EPSILON},
        isomorphism,
        math,
        minimization::{is_minimal, minimize, remove_unreachable_states},
        preview::{preview, Preview},
        reachability::{
            dead_state_ids, find_dead_states, find_unreachable_states, unreachable_state_ids,
        },
        run::{accepts, accepts_str, trace, trace_str, Run},
        validation::{completeness_errors, determinism_errors, structural_info, validate},
    };
}

/// This module contains some definitions of mathematical objects which are used
/// throughout the crate and do not really fit to the top level.
pub mod math;

/// The core automaton value type and its derived transition table views.
pub mod fsa;

/// Diagnostic value types: error codes, severities, highlights and the feedback
/// records that carry them.
pub mod diagnostics;

/// Structural validation of a single automaton plus the determinism and
/// completeness probes.
pub mod validation;

/// Per-state and bulk ε-closure computation.
pub mod closure;

/// Subset construction, turning an NFA or ε-NFA into an equivalent DFA.
pub mod determinize;

/// Unreachable-state removal and Hopcroft partition-refinement minimization.
pub mod minimization;

/// Reachability and co-reachability analysis: unreachable and dead states.
pub mod reachability;

/// Simulation of an automaton on a single word, with tracing.
pub mod run;

/// Canonical BFS-pairing isomorphism check with element-level diagnostics.
pub mod isomorphism;

/// Language equivalence: minimize-then-isomorphism with a bounded enumeration
/// fallback, and difference-string generation.
pub mod equivalence;

/// The externally visible correction pipeline and its configuration.
pub mod correction;

/// Pre-submission validation formatting.
pub mod preview;
