//! Diagnostic log owned by a path object.

/// Category of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Unpenalized groups carry a nonzero elastic-net parameter.
    UnpenalizedElasticNet,
    /// KKT verification added groups to the candidate set.
    KktExpansion,
    /// KKT failed on groups already in the candidate set; the inner
    /// tolerance was tightened.
    ToleranceTightened,
    /// The inner solver did not converge; the tolerance was relaxed.
    ToleranceRelaxed,
    /// The inner solver did not converge; the Lagrange value was skipped.
    LagrangeSkipped,
}

impl DiagnosticKind {
    /// Whether the entry signals a problem the caller should look at,
    /// as opposed to normal progress of the algorithm.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            DiagnosticKind::UnpenalizedElasticNet
                | DiagnosticKind::ToleranceRelaxed
                | DiagnosticKind::LagrangeSkipped
        )
    }
}

/// A single diagnostic entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Lagrange value the entry refers to, if any.
    pub lagrange: Option<f64>,
    pub message: String,
}

/// Append-only collection of diagnostics.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry and forward it to the `log` facade.
    pub fn push(&mut self, kind: DiagnosticKind, lagrange: Option<f64>, message: impl Into<String>) {
        let message = message.into();
        if kind.is_warning() {
            log::warn!("{}", message);
        } else {
            log::debug!("{}", message);
        }
        self.entries.push(Diagnostic {
            kind,
            lagrange,
            message,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Entries that are warnings rather than progress events.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.kind.is_warning())
    }

    /// Number of entries of the given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// Remove and return all entries.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
