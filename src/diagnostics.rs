use serde::{Deserialize, Serialize};

/// Closed set of machine-readable codes attached to every diagnostic. The
/// frontend dispatches on these to decide how an error is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum ErrorCode {
    InvalidState,
    InvalidInitial,
    InvalidAccept,
    InvalidSymbol,
    InvalidTransitionSource,
    InvalidTransitionDest,
    InvalidTransitionSymbol,
    MissingTransition,
    DuplicateTransition,
    UnreachableState,
    DeadState,
    WrongAutomatonType,
    NotDeterministic,
    NotComplete,
    LanguageMismatch,
    TestCaseFailed,
    EmptyStates,
    EmptyAlphabet,
    EvaluationError,
}

/// How serious a diagnostic is. Only [`Severity::Error`] findings gate
/// correctness; warnings and infos flow through to the feedback untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A reference to the exact automaton element at fault, for a graphical editor
/// to mark. Tagged on `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Highlight {
    /// A plain state. The optional symbol narrows the finding to one input
    /// symbol at that state, e.g. for a missing outgoing transition.
    State {
        /// State identifier.
        state_id: String,
        /// Input symbol involved, if the finding concerns one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        symbol: Option<String>,
    },
    /// A specific transition.
    Transition {
        /// Source state of the transition.
        from_state: String,
        /// Destination state of the transition.
        to_state: String,
        /// Symbol of the transition.
        symbol: String,
    },
    /// The initial-state marker.
    InitialState {
        /// State identifier.
        state_id: String,
    },
    /// An accept-state marker.
    AcceptState {
        /// State identifier.
        state_id: String,
    },
    /// A symbol of the alphabet itself.
    AlphabetSymbol {
        /// The offending symbol.
        symbol: String,
    },
    /// No single element is at fault.
    General,
}

impl Highlight {
    /// Highlight a state.
    pub fn state(state_id: impl Into<String>) -> Self {
        Highlight::State {
            state_id: state_id.into(),
            symbol: None,
        }
    }

    /// Highlight a state together with the input symbol concerned.
    pub fn state_on(state_id: impl Into<String>, symbol: impl Into<String>) -> Self {
        Highlight::State {
            state_id: state_id.into(),
            symbol: Some(symbol.into()),
        }
    }

    /// Highlight a transition.
    pub fn transition(
        from: impl Into<String>,
        symbol: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Highlight::Transition {
            from_state: from.into(),
            to_state: to.into(),
            symbol: symbol.into(),
        }
    }

    /// Highlight the initial-state marker.
    pub fn initial(state_id: impl Into<String>) -> Self {
        Highlight::InitialState {
            state_id: state_id.into(),
        }
    }

    /// Highlight an accept-state marker.
    pub fn accept(state_id: impl Into<String>) -> Self {
        Highlight::AcceptState {
            state_id: state_id.into(),
        }
    }

    /// Highlight an alphabet symbol.
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Highlight::AlphabetSymbol {
            symbol: symbol.into(),
        }
    }
}

/// A single finding: what went wrong, how bad it is, where it is and what to
/// do about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Human-readable description of the finding.
    pub message: String,
    /// Machine-readable code.
    pub code: ErrorCode,
    /// Severity of the finding.
    pub severity: Severity,
    /// Element to mark in the editor, if one can be pinpointed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlight>,
    /// Actionable advice for fixing the finding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    /// Creates an error-severity finding.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            severity: Severity::Error,
            highlight: None,
            suggestion: None,
        }
    }

    /// Creates a warning-severity finding.
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    /// Attaches a highlight.
    pub fn with_highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = Some(highlight);
        self
    }

    /// Attaches a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Structural properties of an automaton, reported alongside the diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralInfo {
    /// Whether the automaton is deterministic.
    pub is_deterministic: bool,
    /// Whether the automaton is complete.
    pub is_complete: bool,
    /// Number of states.
    pub num_states: usize,
    /// Number of transitions, counting duplicates.
    pub num_transitions: usize,
    /// States not reachable from the initial state.
    pub unreachable_states: Vec<String>,
    /// States from which no accepting state is reachable.
    pub dead_states: Vec<String>,
}

/// Outcome of evaluating the automaton on a single test input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// The test input string.
    pub input: String,
    /// Expected outcome, `true` meaning accept.
    pub expected: bool,
    /// What the student's automaton actually did.
    pub actual: bool,
    /// Whether actual matched expected.
    pub passed: bool,
    /// Configuration trace recorded during the run, one entry per step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<String>>,
}

/// Which way a counterexample cuts, always from the student's viewpoint:
/// `ShouldAccept` means the expected language contains the string but the
/// student's automaton rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum CounterexampleType {
    ShouldAccept,
    ShouldReject,
}

/// Verdict of comparing the student's language against the expected one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageComparison {
    /// Whether the two automata accept the same language.
    pub are_equivalent: bool,
    /// A string the two automata disagree on, if one was found within the
    /// enumeration bound. The empty word is rendered as `"ε"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterexample: Option<String>,
    /// Direction of the disagreement, from the student's viewpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterexample_type: Option<CounterexampleType>,
}

impl LanguageComparison {
    /// The comparison that reports equivalence.
    pub fn equivalent() -> Self {
        Self {
            are_equivalent: true,
            counterexample: None,
            counterexample_type: None,
        }
    }
}

/// A string witnessing a difference between the student's and the expected
/// automaton, with the runs of both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferenceString {
    /// The witnessing string; the empty word is rendered as `"ε"`.
    pub string: String,
    /// Whether the student's automaton accepts it.
    pub student_accepts: bool,
    /// Whether the expected automaton accepts it.
    pub expected_accepts: bool,
    /// Per-step configuration trace of the student's run.
    pub student_trace: Vec<String>,
    /// Per-step configuration trace of the expected run.
    pub expected_trace: Vec<String>,
}

impl DifferenceString {
    /// Direction of the difference, from the student's viewpoint.
    pub fn difference_type(&self) -> CounterexampleType {
        if self.expected_accepts {
            CounterexampleType::ShouldAccept
        } else {
            CounterexampleType::ShouldReject
        }
    }
}

/// Structured feedback for one evaluation, shaped for rendering on a
/// graphical editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FsaFeedback {
    /// One-line summary of the outcome.
    pub summary: String,
    /// Findings of severity `error`.
    pub errors: Vec<ValidationError>,
    /// Findings of severity `warning` or `info`.
    pub warnings: Vec<ValidationError>,
    /// Structural analysis, omitted at minimal verbosity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structural: Option<StructuralInfo>,
    /// Language comparison, present on the reference-automaton route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguageComparison>,
    /// Per-input results, present on the test-case route and for generated
    /// difference strings.
    pub test_results: Vec<TestResult>,
    /// Free-form improvement hints.
    pub hints: Vec<String>,
}

/// The complete result of one evaluation, the outermost value handed back to
/// the service boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Overall correctness.
    pub is_correct: bool,
    /// Human-readable feedback message for the student.
    pub feedback: String,
    /// Normalized score in `[0, 1]`, present only in partial-credit mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Detailed structured feedback.
    pub fsa_feedback: FsaFeedback,
}
