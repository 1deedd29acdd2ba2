//! Diagnostic infrastructure for error reporting
//!
//! Turns [`CheckError`]s into codespan diagnostics with source context,
//! and renders them either to a terminal or as JSON for editors.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, LabelStyle, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use termcolor::{ColorChoice, StandardStream};
use sema_types::Span;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CheckError;

/// Error code for a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    /// The code as written, e.g. `E2001`
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// A diagnostic message with source code context
pub struct Diagnostic {
    inner: CsDiagnostic<usize>,
    code: Option<ErrorCode>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self.inner = self.inner.with_code(code.0);
        self
    }

    /// Add a primary label (main error location)
    pub fn with_primary_label(self, file_id: usize, span: Span, message: impl Into<String>) -> Self {
        self.with_label(Label::primary(file_id, span.start..span.end).with_message(message))
    }

    /// Add a secondary label (related location)
    pub fn with_secondary_label(self, file_id: usize, span: Span, message: impl Into<String>) -> Self {
        self.with_label(Label::secondary(file_id, span.start..span.end).with_message(message))
    }

    fn with_label(mut self, label: Label<usize>) -> Self {
        self.inner.labels.push(label);
        self
    }

    /// Add a note (additional context)
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    /// Add a help suggestion
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    /// Error code, if one was set
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Main message
    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// Create diagnostic from a CheckError
    ///
    /// The message is the error's display text. Errors that carry more than
    /// one location or a list of members get secondary labels and notes.
    pub fn from_check_error(error: &CheckError, file_id: usize) -> Self {
        use CheckError::*;

        let diag = Diagnostic::error(error.to_string()).with_code(error.code());

        match error {
            Redeclaration { original, span, .. } => diag
                .with_primary_label(file_id, *span, "redeclared here")
                .with_secondary_label(file_id, *original, "first declared here"),

            TypeMismatch { expected, actual, span } => {
                let diag = diag.with_primary_label(file_id, *span, format!("expected `{}`", expected));
                if actual.starts_with('&') && !expected.starts_with('&') {
                    diag.with_help("dereference the value or change the expected type to a reference")
                } else {
                    diag
                }
            }

            Conformance {
                missing_members,
                mismatched_members,
                initializer_mismatch,
                span,
                ..
            } => {
                let mut diag = diag.with_primary_label(file_id, *span, "does not conform");
                if !missing_members.is_empty() {
                    diag = diag.with_note(format!("missing: {}", missing_members.join(", ")));
                }
                if !mismatched_members.is_empty() {
                    diag = diag.with_note(format!("mismatched: {}", mismatched_members.join(", ")));
                }
                if *initializer_mismatch {
                    diag = diag.with_note("initializer parameters differ");
                }
                diag
            }

            InvalidAccess { required, span, .. } => diag
                .with_primary_label(file_id, *span, "not accessible")
                .with_help(format!("use a reference authorized with `auth({})`", required)),

            MissingAccessModifier { span, .. } => diag
                .with_primary_label(file_id, *span, "access modifier required")
                .with_help("add `access(all)` or a more restrictive modifier"),

            InvalidNilCoalescingLeftType { span, .. } => diag
                .with_primary_label(file_id, *span, "not optional")
                .with_help("remove the `??`, the value can never be nil"),

            other => diag.with_primary_label(file_id, other.span(), label_for(other)),
        }
    }

    /// Emit the diagnostic to stderr with colors
    pub fn emit(&self, files: &SimpleFiles<String, String>) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        let config = codespan_reporting::term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)
    }

    /// Get the underlying codespan diagnostic (for testing/custom rendering)
    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    /// Convert to JSON representation for IDE integration
    pub fn to_json(&self, files: &SimpleFiles<String, String>) -> Result<String, serde_json::Error> {
        let json_diag = JsonDiagnostic::from_diagnostic(self, files);
        serde_json::to_string_pretty(&json_diag)
    }
}

fn label_for(error: &CheckError) -> &'static str {
    use CheckError::*;

    match error {
        NotDeclared { .. } | NotDeclaredMember { .. } => "not found",
        InvalidIntegerLiteralRange { .. } => "out of range",
        ArgumentCountMismatch { .. } | InvalidTypeArgumentCount { .. } => "in this invocation",
        MissingArgumentLabel { .. } | IncorrectArgumentLabel { .. } => "label",
        CyclicConformance { .. } | CyclicEntitlementMappingInclusion { .. } => "cycle",
        DuplicateConformance { .. } | DuplicateEntitlementMappingInclusion { .. } => "duplicate",
        _ => "here",
    }
}

/// JSON representation of a diagnostic for IDE integration
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    /// Error code (e.g., "E2001")
    pub code: Option<String>,
    /// Severity level
    pub severity: String,
    /// Main error message
    pub message: String,
    /// Source locations with labels
    pub labels: Vec<JsonLabel>,
    /// Additional notes and help
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    /// File path
    pub file: String,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    /// End line (1-indexed)
    pub end_line: usize,
    /// End column (1-indexed)
    pub end_column: usize,
    /// Label message
    pub message: Option<String>,
    /// Label style (primary or secondary)
    pub style: String,
}

impl JsonDiagnostic {
    /// Convert a Diagnostic to JSON representation
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file = files.get(label.file_id).ok()?;
                let start = file.location((), label.range.start).ok()?;
                let end = file.location((), label.range.end).ok()?;

                Some(JsonLabel {
                    file: file.name().to_string(),
                    start_line: start.line_number,
                    start_column: start.column_number,
                    end_line: end.line_number,
                    end_column: end.column_number,
                    message: Some(label.message.clone()),
                    style: match label.style {
                        LabelStyle::Primary => "primary",
                        LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Helper to create a SimpleFiles instance from source code
pub fn create_files(path: impl Into<PathBuf>, source: impl Into<String>) -> SimpleFiles<String, String> {
    let mut files = SimpleFiles::new();
    files.add(path.into().display().to_string(), source.into());
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_with_code() {
        let diag = Diagnostic::error("Test error").with_code(ErrorCode("E2001"));
        assert_eq!(diag.code(), Some(ErrorCode("E2001")));
        assert_eq!(diag.inner.severity, Severity::Error);
    }

    #[test]
    fn test_from_check_error_type_mismatch() {
        let error = CheckError::TypeMismatch {
            expected: "Int".to_string(),
            actual: "Bool".to_string(),
            span: Span::new(10, 15, 1, 10),
        };

        let diag = Diagnostic::from_check_error(&error, 0);
        assert_eq!(diag.code(), Some(ErrorCode("E2001")));
        assert_eq!(diag.message(), "mismatched types: expected `Int`, got `Bool`");
        assert_eq!(diag.inner.labels.len(), 1);
    }

    #[test]
    fn test_redeclaration_points_at_both_declarations() {
        let error = CheckError::Redeclaration {
            name: "x".to_string(),
            kind: "constant".to_string(),
            original: Span::new(4, 5, 1, 5),
            span: Span::new(17, 18, 2, 5),
        };

        let diag = Diagnostic::from_check_error(&error, 0);
        let styles: Vec<_> = diag.inner.labels.iter().map(|l| l.style).collect();
        assert_eq!(styles, vec![LabelStyle::Primary, LabelStyle::Secondary]);
        assert_eq!(diag.inner.labels[1].range, 4..5);
    }

    #[test]
    fn test_conformance_notes() {
        let error = CheckError::Conformance {
            composite: "Vault".to_string(),
            interface: "Provider".to_string(),
            missing_members: vec!["withdraw".to_string()],
            mismatched_members: Vec::new(),
            initializer_mismatch: true,
            span: Span::new(0, 5, 1, 1),
        };

        let diag = Diagnostic::from_check_error(&error, 0);
        assert_eq!(
            diag.inner.notes,
            vec!["missing: withdraw".to_string(), "initializer parameters differ".to_string()]
        );
    }

    #[test]
    fn test_json_labels() {
        let error = CheckError::NotDeclared {
            name: "foo".to_string(),
            kind: "value".to_string(),
            span: Span::new(8, 11, 1, 9),
        };

        let diag = Diagnostic::from_check_error(&error, 0);
        let files = create_files("test.cdc", "let x = foo");
        let json = diag.to_json(&files).unwrap();

        let parsed: JsonDiagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.code.as_deref(), Some("E1002"));
        assert_eq!(parsed.severity, "error");
        assert_eq!(parsed.labels.len(), 1);
        assert_eq!(parsed.labels[0].file, "test.cdc");
        assert_eq!(parsed.labels[0].start_column, 9);
        assert_eq!(parsed.labels[0].style, "primary");
    }
}
