use crate::source_manager::{SourceManager, SourceSpan};
use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};
use symbol_table::GlobalSymbol as Symbol;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Note,
}

/// Individual diagnostic with rich context
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub location: SourceSpan,
    pub hints: Vec<String>,
}

/// Errors raised by the lowering pass.
///
/// Every error is fatal for the translation unit: the first one aborts
/// lowering and is reported against the offending declaration or expression.
#[derive(Debug, thiserror::Error)]
pub enum LowerError {
    /// Two declarations with the same name and the same type in one scope.
    #[error("redefinition of `{name}`")]
    Redefinition {
        name: Symbol,
        first_def: SourceSpan,
        second_def: SourceSpan,
    },

    /// Same name, different type, and the overload predicate denies the pair.
    #[error("cannot overload `{name}`")]
    BadOverload {
        name: Symbol,
        first_def: SourceSpan,
        second_def: SourceSpan,
    },

    /// A lowering path requested a south-bound interface name that is not in
    /// the builtin catalog.
    #[error("unknown builtin `{name}`")]
    UnknownBuiltin { name: String },

    /// A field is read but no extraction binds it on the pipeline path.
    #[error("field `{name}` is used before it is extracted")]
    UnextractedField { name: String, location: SourceSpan },

    /// An extraction was encountered outside any decoder scope.
    #[error("extraction outside of a decoder")]
    MissingContext { location: SourceSpan },
}

impl LowerError {
    /// The source location the diagnostic should point at, if the error
    /// carries one.
    pub fn location(&self) -> Option<SourceSpan> {
        match self {
            LowerError::Redefinition { second_def, .. } => Some(*second_def),
            LowerError::BadOverload { second_def, .. } => Some(*second_def),
            LowerError::UnknownBuiltin { .. } => None,
            LowerError::UnextractedField { location, .. } => Some(*location),
            LowerError::MissingContext { location } => Some(*location),
        }
    }

    /// Convert into a renderable diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut hints = Vec::new();
        match self {
            LowerError::UnextractedField { name, .. } => {
                hints.push(format!("extract `{}` before reading it", name));
            }
            LowerError::MissingContext { .. } => {
                hints.push("extractions are only valid inside a decoder body".to_string());
            }
            _ => {}
        }
        Diagnostic {
            level: DiagnosticLevel::Error,
            message: self.to_string(),
            location: self.location().unwrap_or_default(),
            hints,
        }
    }
}

/// Configurable error formatter using annotate_snippets
pub struct ErrorFormatter {
    pub show_hints: bool,
    pub use_colors: bool,
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        ErrorFormatter {
            show_hints: true,
            use_colors: true,
        }
    }
}

impl ErrorFormatter {
    /// Format a single diagnostic with source code context
    pub fn format_diagnostic(&self, diag: &Diagnostic, source_manager: &SourceManager) -> String {
        let snippet = self.create_snippet(diag, source_manager);
        let renderer = if self.use_colors {
            Renderer::styled()
        } else {
            Renderer::plain()
        };
        let mut group = self.level(diag).primary_title(&diag.message).element(snippet);

        if self.show_hints {
            for hint in &diag.hints {
                group = group.element(Level::HELP.message(hint));
            }
        }

        let report = &[group];
        renderer.render(report).to_string()
    }

    fn level<'a>(&self, diag: &Diagnostic) -> Level<'a> {
        match diag.level {
            DiagnosticLevel::Error => Level::ERROR,
            DiagnosticLevel::Note => Level::NOTE,
        }
    }

    fn create_snippet<'a>(
        &self,
        diag: &'a Diagnostic,
        source_manager: &'a SourceManager,
    ) -> Snippet<'a, annotate_snippets::Annotation<'a>> {
        let source = source_manager.get_buffer(diag.location.source_id());
        let path = source_manager
            .get_file_info(diag.location.source_id())
            .map(|fi| fi.path.to_str().unwrap_or("<unknown>"))
            .unwrap_or("<unknown>");

        Snippet::source(source)
            .line_start(1)
            .path(path)
            .annotation(AnnotationKind::Primary.span(diag.location.range()))
    }

    /// Format multiple diagnostics
    pub fn format_diagnostics(&self, diagnostics: &[Diagnostic], source_manager: &SourceManager) -> String {
        diagnostics
            .iter()
            .map(|diag| self.format_diagnostic(diag, source_manager))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Print all diagnostics to stderr
    pub fn print_diagnostics(&self, diagnostics: &[Diagnostic], source_manager: &SourceManager) {
        for diag in diagnostics {
            let formatted = self.format_diagnostic(diag, source_manager);
            eprintln!("{}", formatted);
        }
    }
}
