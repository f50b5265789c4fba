use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diagnostics::{
    ErrorCode, FsaFeedback, Highlight, LanguageComparison, Severity, StructuralInfo, TestResult,
    ValidationError, Verdict,
};
use crate::equivalence::{generate_difference_strings, same_language, DEFAULT_MAX_DIFFERENCES};
use crate::fsa::Fsa;
use crate::math::Set;
use crate::minimization::minimize;
use crate::reachability::{find_dead_states, find_unreachable_states};
use crate::run::trace_str;
use crate::validation::{completeness_errors, determinism_errors, structural_info, validate};

/// How the final verdict is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// Language equivalence decides correctness.
    Strict,
    /// Same as strict; kept distinct on the wire for configuration
    /// compatibility.
    #[default]
    Lenient,
    /// Additionally computes a partial-credit score.
    Partial,
}

/// Which kind of automaton the exercise demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExpectedType {
    /// The submission must be deterministic.
    #[serde(rename = "DFA")]
    Dfa,
    /// Non-determinism is expected but not required.
    #[serde(rename = "NFA")]
    Nfa,
    /// Anything goes.
    #[default]
    #[serde(rename = "any")]
    Any,
}

/// How much detail flows into the composed feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Verdict and findings only: no hints, no structural profile, no
    /// per-input results.
    Minimal,
    /// Findings with suggestions and per-input results without traces.
    #[default]
    Standard,
    /// Everything, including traces and derived tips.
    Detailed,
}

/// Configuration of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// How the verdict is derived.
    pub evaluation_mode: EvaluationMode,
    /// Expected automaton kind; `DFA` rejects non-deterministic submissions.
    pub expected_type: ExpectedType,
    /// Feedback detail level.
    pub feedback_verbosity: Verbosity,
    /// Whether to report a non-minimal submission.
    pub check_minimality: bool,
    /// Whether every `(state, symbol)` pair must have a transition.
    pub check_completeness: bool,
    /// When false, all highlights are stripped from the findings.
    pub highlight_errors: bool,
    /// When false, the counterexample string is withheld.
    pub show_counterexample: bool,
    /// Length bound for counterexample enumeration.
    pub max_test_length: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            evaluation_mode: EvaluationMode::default(),
            expected_type: ExpectedType::default(),
            feedback_verbosity: Verbosity::default(),
            check_minimality: false,
            check_completeness: false,
            highlight_errors: true,
            show_counterexample: true,
            max_test_length: 10,
        }
    }
}

/// A single input/expected pair of the test-case route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Input string; each character is read as one symbol.
    pub input: String,
    /// Whether the automaton should accept it.
    pub expected: bool,
    /// Free-form note, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The expected-language specification, tagged on `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Answer {
    /// A list of input/expected pairs, each simulated individually.
    TestCases(Vec<TestCase>),
    /// A reference automaton to compare languages against.
    ReferenceFsa(Fsa),
    /// Reserved; evaluation reports the route as unsupported.
    Regex(String),
    /// Reserved; evaluation reports the route as unsupported.
    Grammar(String),
}

/// Evaluates a student automaton against the expected-language specification
/// under the given configuration, composing the complete verdict.
///
/// Fatal structural errors skip the semantic stages, since simulation on an
/// ill-formed automaton is undefined, but the returned feedback is still
/// fully populated. Warnings never gate correctness.
pub fn evaluate(student: &Fsa, answer: &Answer, params: &Params) -> Verdict {
    let structural_findings = validate(student);
    if structural_findings
        .iter()
        .any(|e| e.severity == Severity::Error)
    {
        return structural_failure(structural_findings, params);
    }

    let mut findings = structural_findings;
    let info = structural_info(student);
    findings.extend(find_unreachable_states(student));
    findings.extend(find_dead_states(student));

    let mut constraints_ok = true;
    if params.expected_type == ExpectedType::Dfa && !info.is_deterministic {
        debug!("expected a DFA but the submission is non-deterministic");
        constraints_ok = false;
        findings.push(
            ValidationError::error(
                ErrorCode::WrongAutomatonType,
                "Your automaton must be deterministic (a DFA)",
            )
            .with_suggestion(
                "Remove ε-transitions and make sure no state has two transitions on the same symbol",
            ),
        );
        findings.extend(determinism_errors(student));
    }
    if params.check_completeness && !info.is_complete {
        constraints_ok = false;
        findings.push(
            ValidationError::error(
                ErrorCode::NotComplete,
                "Your automaton is not complete: some (state, symbol) pairs have no transition",
            )
            .with_suggestion("Add the missing transitions, for example to a trap state"),
        );
        if info.is_deterministic {
            findings.extend(completeness_errors(student));
        } else {
            findings.push(ValidationError::error(
                ErrorCode::NotDeterministic,
                "Cannot check completeness for a non-deterministic FSA",
            ));
        }
    }

    let minimality_hint = if params.check_minimality {
        let minimal_states = minimize(student).num_states();
        (minimal_states < student.num_states()).then(|| {
            format!(
                "Your automaton has {} states, but an equivalent automaton with {} states exists",
                student.num_states(),
                minimal_states
            )
        })
    } else {
        None
    };

    let mut test_results: Vec<TestResult> = Vec::new();
    let mut language: Option<LanguageComparison> = None;
    let mut score: Option<f64> = None;
    let route_ok = match answer {
        Answer::TestCases(cases) => {
            let mut passed = 0usize;
            for case in cases {
                let run = trace_str(student, &case.input);
                if run.accepted == case.expected {
                    passed += 1;
                } else {
                    let (should, was) = if case.expected {
                        ("accepted", "rejected")
                    } else {
                        ("rejected", "accepted")
                    };
                    findings.push(
                        ValidationError::error(
                            ErrorCode::TestCaseFailed,
                            format!("String '{}' should be {should} but was {was}", case.input),
                        )
                        .with_suggestion(format!("Trace your automaton on '{}'", case.input)),
                    );
                }
                test_results.push(TestResult {
                    input: case.input.clone(),
                    expected: case.expected,
                    actual: run.accepted,
                    passed: run.accepted == case.expected,
                    trace: Some(run.labels()),
                });
            }
            if params.evaluation_mode == EvaluationMode::Partial {
                score = Some(if cases.is_empty() {
                    1.0
                } else {
                    passed as f64 / cases.len() as f64
                });
            }
            passed == cases.len()
        }
        Answer::ReferenceFsa(reference) => {
            if validate(reference)
                .iter()
                .any(|e| e.severity == Severity::Error)
            {
                findings.push(
                    ValidationError::error(
                        ErrorCode::EvaluationError,
                        "There is an issue with the expected answer. Please contact your instructor.",
                    )
                    .with_highlight(Highlight::General),
                );
                false
            } else {
                let report = same_language(student, reference, params.max_test_length);
                let differences = generate_difference_strings(
                    student,
                    reference,
                    params.max_test_length,
                    DEFAULT_MAX_DIFFERENCES,
                );
                findings.extend(report.diagnostics);
                for diff in &differences {
                    test_results.push(TestResult {
                        input: diff.string.clone(),
                        expected: diff.expected_accepts,
                        actual: diff.student_accepts,
                        passed: false,
                        trace: Some(diff.student_trace.clone()),
                    });
                }
                if params.evaluation_mode == EvaluationMode::Partial {
                    score = Some(
                        1.0 - (differences.len() as f64 / DEFAULT_MAX_DIFFERENCES as f64).min(1.0),
                    );
                }
                let mut comparison = report.comparison;
                if !params.show_counterexample {
                    comparison.counterexample = None;
                    comparison.counterexample_type = None;
                }
                let equivalent = comparison.are_equivalent;
                language = Some(comparison);
                equivalent
            }
        }
        Answer::Regex(_) => {
            findings.push(unsupported_route("Regular-expression"));
            false
        }
        Answer::Grammar(_) => {
            findings.push(unsupported_route("Grammar"));
            false
        }
    };

    let is_correct = constraints_ok && route_ok;
    let summary = if is_correct {
        "Your FSA is correct!".to_string()
    } else {
        summarize_errors(&findings)
    };
    let feedback_message = if is_correct {
        format!(
            "Correct! Your FSA with {} state(s) accepts exactly the right language. Well done!",
            student.num_states()
        )
    } else {
        summary.clone()
    };

    let counterexample_tip = language
        .as_ref()
        .and_then(|l| l.counterexample.clone())
        .map(|cx| format!("Try tracing your automaton on '{cx}'"));

    Verdict {
        is_correct,
        feedback: feedback_message,
        score,
        fsa_feedback: compose_feedback(
            summary,
            findings,
            Some(info),
            language,
            test_results,
            minimality_hint,
            counterexample_tip,
            params,
        ),
    }
}

/// Thin projection of [`evaluate`] returning only the structured feedback.
pub fn feedback(student: &Fsa, answer: &Answer, params: &Params) -> FsaFeedback {
    evaluate(student, answer, params).fsa_feedback
}

fn structural_failure(findings: Vec<ValidationError>, params: &Params) -> Verdict {
    let error_count = findings
        .iter()
        .filter(|e| e.severity == Severity::Error)
        .count();
    let summary = if error_count == 1 {
        "Your FSA has a structural problem that needs to be fixed first.".to_string()
    } else {
        format!("Your FSA has {error_count} structural problems to fix.")
    };
    let score = (params.evaluation_mode == EvaluationMode::Partial).then_some(0.0);
    Verdict {
        is_correct: false,
        feedback: summary.clone(),
        score,
        fsa_feedback: compose_feedback(
            summary,
            findings,
            None,
            None,
            Vec::new(),
            None,
            None,
            params,
        ),
    }
}

fn unsupported_route(kind: &str) -> ValidationError {
    ValidationError::error(
        ErrorCode::EvaluationError,
        format!("{kind} answers are not supported yet"),
    )
    .with_highlight(Highlight::General)
}

/// Buckets the error-severity findings into coarse categories and phrases a
/// one-line summary the way a tutor would.
fn summarize_errors(findings: &[ValidationError]) -> String {
    let mut categories: Set<&str> = Set::default();
    for finding in findings.iter().filter(|e| e.severity == Severity::Error) {
        let message = finding.message.to_lowercase();
        if message.contains("alphabet") {
            categories.insert("alphabet issue");
        } else if message.contains("accept") {
            categories.insert("accepting states issue");
        } else if message.contains("transition") {
            categories.insert("transition issue");
        } else if message.contains("state") {
            categories.insert("state structure issue");
        }
    }
    match categories.len() {
        0 => "Your FSA does not match the expected language.".to_string(),
        1 => format!(
            "Almost there! Your FSA has a {}.",
            categories.first().unwrap()
        ),
        _ => format!(
            "Your FSA has multiple issues: {}.",
            categories.iter().join(", ")
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn compose_feedback(
    summary: String,
    mut findings: Vec<ValidationError>,
    structural: Option<StructuralInfo>,
    language: Option<LanguageComparison>,
    test_results: Vec<TestResult>,
    minimality_hint: Option<String>,
    counterexample_tip: Option<String>,
    params: &Params,
) -> FsaFeedback {
    if !params.highlight_errors {
        for finding in &mut findings {
            finding.highlight = None;
        }
    }

    let mut hints: Vec<String> = Vec::new();
    if params.feedback_verbosity != Verbosity::Minimal {
        hints.extend(findings.iter().filter_map(|e| e.suggestion.clone()));
        hints.extend(minimality_hint);
        if params.feedback_verbosity == Verbosity::Detailed {
            if let Some(info) = &structural {
                if !info.unreachable_states.is_empty() {
                    hints.push(format!(
                        "Tip: states {{{}}} are unreachable from the start state",
                        info.unreachable_states.iter().join(", ")
                    ));
                }
                if !info.dead_states.is_empty() {
                    hints.push(format!(
                        "Tip: states {{{}}} can never reach an accepting state",
                        info.dead_states.iter().join(", ")
                    ));
                }
            }
            hints.extend(counterexample_tip);
        }
    }

    let (errors, warnings): (Vec<_>, Vec<_>) = findings
        .into_iter()
        .partition(|e| e.severity == Severity::Error);

    let (structural, test_results) = match params.feedback_verbosity {
        Verbosity::Minimal => (None, Vec::new()),
        Verbosity::Standard => (
            structural,
            test_results
                .into_iter()
                .map(|t| TestResult { trace: None, ..t })
                .collect(),
        ),
        Verbosity::Detailed => (structural, test_results),
    };

    FsaFeedback {
        summary,
        errors,
        warnings,
        structural,
        language,
        test_results,
        hints,
    }
}
