//! Diagnostic reporting for generation rounds.
//!
//! Diagnostics are the only failure channel a round exposes. Every report
//! is also logged through `tracing`; hosts decide whether to install a
//! subscriber.

use std::fmt;

use crate::model::Declaration;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Progress information.
    Note,
    /// A failure that must fail the build.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Note => f.write_str("note"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity of the report.
    pub severity: Severity,
    /// Report text.
    pub message: String,
    /// Qualified name of the declaration the report is attached to.
    pub declaration: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.declaration {
            Some(name) => write!(f, "{}: {name}: {}", self.severity, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Receives diagnostics from a round.
pub trait DiagnosticSink {
    /// Records a diagnostic, optionally attached to a declaration.
    fn report(&mut self, severity: Severity, message: &str, declaration: Option<&Declaration>);

    /// Records a note.
    fn note(&mut self, message: &str, declaration: Option<&Declaration>) {
        self.report(Severity::Note, message, declaration);
    }

    /// Records an error.
    fn error(&mut self, message: &str, declaration: Option<&Declaration>) {
        self.report(Severity::Error, message, declaration);
    }
}

/// Sink that records every diagnostic and logs it.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collector.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// All diagnostics in report order.
    #[must_use]
    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// Error diagnostics in report order.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records
            .iter()
            .filter(|record| record.severity == Severity::Error)
    }

    /// Reports whether any error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Consumes the collector, returning its records.
    #[must_use]
    pub fn into_records(self) -> Vec<Diagnostic> {
        self.records
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, severity: Severity, message: &str, declaration: Option<&Declaration>) {
        let qualified = declaration.map(|d| d.qualify(&d.name));
        log(severity, message, qualified.as_deref());
        self.records.push(Diagnostic {
            severity,
            message: message.to_owned(),
            declaration: qualified,
        });
    }
}

fn log(severity: Severity, message: &str, declaration: Option<&str>) {
    let target = declaration.unwrap_or("-");
    match severity {
        Severity::Note => tracing::info!(declaration = target, "{message}"),
        Severity::Error => tracing::error!(declaration = target, "{message}"),
    }
}
