//! Diagnostics: stable error codes, severities, and the single structured
//! error value every compiler stage returns on failure.
//!
//! Diagnostics are values, never exceptions: each stage is total and
//! returns `Result<T, Diagnostic>`, and the driver stops at the first one
//! it sees (see `portc-drv`). There is deliberately no diagnostic list.

use crate::span::{Range, SourceFile};
use std::fmt;

/// One of the stable `E001`..`E017` diagnostic identifiers.
///
/// The numbering is part of the compiler's external contract — tooling and
/// course material may reference a code directly — so variants must never
/// be renumbered once assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// E001: an internal table produced a severity/code pairing that isn't
    /// one of the defined diagnostics. Always an internal compiler error.
    InvalidErrType,
    /// E002: an invariant the earlier passes were supposed to guarantee
    /// did not hold. Indicates a compiler bug, not a user error.
    InternalCompilerError,
    /// E003: the source file could not be read.
    FileError,
    /// E004: a lexeme (number, char, string) was malformed.
    InvalidSymbol,
    /// E005: tokens remained after a complete `Module` was parsed.
    ExpectedEOF,
    /// E006: the current token's kind was not one of the expected kinds.
    ExpectedSymbol,
    /// E007: a required grammar production was absent.
    ExpectedProd,
    /// E008: a name was already bound in the same scope.
    NameAlreadyDefined,
    /// E009: an identifier reference did not resolve to any reachable symbol.
    SymbolNotDeclared,
    /// E010: a value's type is not assignable to its target's type.
    VarNotAssignable,
    /// E011: an `if`/`while`/`for` condition did not type-check to Integer.
    InvalidTypeForCond,
    /// E012: a binary operator's operands had unequal types.
    OpUnequalTypes,
    /// E013: an operator was applied to operands of the wrong type.
    ExpectedTypeOp,
    /// E014: the source file's stem is not a valid identifier.
    InvalidFileName,
    /// E015: no procedure named `entrada` was declared.
    NoEntryPoint,
    /// E016: `entrada` was declared with the wrong signature.
    WrongEntryType,
    /// E017: a call argument's type is not assignable to its parameter,
    /// or the call's arity does not match the callee's.
    ArgNotAssignable,
}

impl DiagnosticCode {
    /// The stable `E0NN` string form used in rendered diagnostics.
    pub const fn as_str(self) -> &'static str {
        use DiagnosticCode::*;
        match self {
            InvalidErrType => "E001",
            InternalCompilerError => "E002",
            FileError => "E003",
            InvalidSymbol => "E004",
            ExpectedEOF => "E005",
            ExpectedSymbol => "E006",
            ExpectedProd => "E007",
            NameAlreadyDefined => "E008",
            SymbolNotDeclared => "E009",
            VarNotAssignable => "E010",
            InvalidTypeForCond => "E011",
            OpUnequalTypes => "E012",
            ExpectedTypeOp => "E013",
            InvalidFileName => "E014",
            NoEntryPoint => "E015",
            WrongEntryType => "E016",
            ArgNotAssignable => "E017",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic severity. Every diagnostic this compiler produces today is
/// `Error` (there are no warnings in the core pipeline), but the type is
/// kept open for future non-fatal diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single structured compiler error.
///
/// Carries everything the driver needs to print
/// `<file>:<line>:<col> error: <message>` followed by a source excerpt,
/// without needing access to any other compiler state.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    /// Absent only for diagnostics raised before a file has been read
    /// (e.g. `InvalidFileName`, which is checked against the path alone).
    pub location: Option<Location>,
}

/// Where a diagnostic occurred: a file name plus the offending range.
#[derive(Clone, Debug)]
pub struct Location {
    pub file: String,
    pub range: Range,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self { code, severity: Severity::Error, message: message.into(), location: None }
    }

    pub fn at(code: DiagnosticCode, message: impl Into<String>, file: impl Into<String>, range: Range) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            location: Some(Location { file: file.into(), range }),
        }
    }

    /// Render the `<file>:<line>:<col>` + excerpt form described in §7,
    /// given the source file the diagnostic's range lives in (if any).
    pub fn render(&self, source: Option<&SourceFile>) -> String {
        let mut out = String::new();
        if let Some(loc) = &self.location {
            let pos = loc.range.begin;
            out.push_str(&format!("{}:{} {}: {}\n", loc.file, pos, self.severity, self.message));
            if let Some(src) = source {
                push_excerpt(&mut out, src, loc.range);
            }
        } else {
            out.push_str(&format!("{}: {}\n", self.severity, self.message));
        }
        out
    }
}

fn push_excerpt(out: &mut String, src: &SourceFile, range: Range) {
    let Some(line) = src.line(range.begin.line) else { return };
    out.push_str(line);
    out.push('\n');
    let caret_col = range.begin.column as usize;
    let width = if range.is_empty() || range.end.line != range.begin.line {
        1
    } else {
        (range.end.column - range.begin.column).max(1) as usize
    };
    out.push_str(&" ".repeat(caret_col));
    out.push_str(&"^".repeat(width));
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

impl std::error::Error for Diagnostic {}
