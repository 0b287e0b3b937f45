use colored::Colorize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO ",
            Self::Warning => "WARN ",
            Self::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub file: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity.label(), self.file, self.message)
    }
}

/// Everything found in one validation run.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub files_checked: usize,
    diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, severity: Severity, file: &str, message: String) {
        self.diagnostics.push(Diagnostic {
            severity,
            file: file.to_string(),
            message,
        });
    }

    pub fn error(&mut self, file: &str, message: impl Into<String>) {
        self.push(Severity::Error, file, message.into());
    }

    pub fn warn(&mut self, file: &str, message: impl Into<String>) {
        self.push(Severity::Warning, file, message.into());
    }

    pub fn note(&mut self, file: &str, message: impl Into<String>) {
        self.push(Severity::Info, file, message.into());
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.severity == severity)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.with_severity(severity).count()
    }

    pub fn is_ok(&self) -> bool {
        self.count(Severity::Error) == 0
    }

    /// `PASSED (n files, w warnings)` or `FAILED (e errors, w warnings)`
    pub fn verdict(&self) -> String {
        let warnings = self.count(Severity::Warning);
        if self.is_ok() {
            format!("PASSED ({} files, {} warnings)", self.files_checked, warnings)
        } else {
            format!(
                "FAILED ({} errors, {} warnings)",
                self.count(Severity::Error),
                warnings
            )
        }
    }

    pub fn print(&self) {
        println!("Files checked: {}", self.files_checked);
        println!();

        for (severity, heading) in [
            (Severity::Info, "--- Info ---"),
            (Severity::Warning, "--- Warnings ---"),
            (Severity::Error, "--- Errors ---"),
        ] {
            if self.count(severity) == 0 {
                continue;
            }
            println!("{}", heading);
            for diagnostic in self.with_severity(severity) {
                let line = format!("  {}", diagnostic);
                match severity {
                    Severity::Info => println!("{}", line),
                    Severity::Warning => println!("{}", line.yellow()),
                    Severity::Error => println!("{}", line.red()),
                }
            }
            println!();
        }

        println!("{}", "=".repeat(60));
        let verdict = format!("  {}", self.verdict());
        if self.is_ok() {
            println!("{}", verdict.green());
        } else {
            println!("{}", verdict.red());
        }
        println!("{}", "=".repeat(60));
    }
}
