//! portc-drv - the pipeline driver.
//!
//! A pure, sequential composition: read file -> lex -> parse -> resolve ->
//! type-check -> emit. The first diagnostic raised by any stage aborts the
//! pipeline; there is no error recovery.

use portc_sem::Analysis;
use portc_util::span::SourceMap;
use portc_util::{Diagnostic, DiagnosticCode, Interner, Range};
use std::path::{Path, PathBuf};

/// What `Session::compile` should produce.
///
/// Mirrors the external CLI's mutually-exclusive mode flags; `Config` is
/// constructed directly by callers/tests rather than parsed from `argv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitMode {
    /// Stop after lexing and report the token stream.
    Lex,
    /// Stop after parsing and report the AST.
    Ast,
    /// Stop after type-checking and report the resolved, typed module.
    Module,
    /// Run the full pipeline and emit C source text.
    EmitC,
}

/// Invocation options for one compilation.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub emit: EmitMode,
}

impl Config {
    pub fn new(input: impl Into<PathBuf>, emit: EmitMode) -> Self {
        Self { input: input.into(), emit }
    }
}

/// What a successful compile produced, depending on `Config::emit`.
#[derive(Debug)]
pub enum Output {
    Lex(Vec<portc_lex::Lexeme>),
    Ast(portc_par::Module),
    Module { module: portc_par::Module, analysis: Analysis },
    EmitC(String),
}

/// Everything that can go wrong outside the compiler stages themselves.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("could not read {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error(transparent)]
    Diagnostic(#[from] Diagnostic),
}

/// Mutable compilation state: source map and symbol interner. One `Session`
/// compiles one module.
pub struct Session {
    pub config: Config,
    pub sources: SourceMap,
    pub interner: Interner,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config, sources: SourceMap::new(), interner: Interner::new() }
    }

    /// Runs the pipeline for `self.config.input` up through `self.config.emit`.
    pub fn compile(&mut self) -> Result<Output, CompileError> {
        let path = self.config.input.clone();
        let module_name = module_name_of(&path)?;

        let content = std::fs::read_to_string(&path)
            .map_err(|source| CompileError::Io { path: path.clone(), source })?;
        let file = path.to_string_lossy().into_owned();
        let file_id = self.sources.add_file(file.clone(), content);
        let source = self.sources.file(file_id).expect("just inserted").content().to_string();

        if self.config.emit == EmitMode::Lex {
            return Ok(Output::Lex(lex_all(&source, &file)?));
        }

        let module = portc_par::parse(&source, file.clone())?;
        if self.config.emit == EmitMode::Ast {
            return Ok(Output::Ast(module));
        }

        let analysis = portc_sem::analyze(&module, &file)?;
        if self.config.emit == EmitMode::Module {
            return Ok(Output::Module { module, analysis });
        }

        let c_source = portc_gen::emit(&module_name, &module, &analysis)
            .map_err(|e| Diagnostic::new(DiagnosticCode::InternalCompilerError, e.to_string()))?;
        Ok(Output::EmitC(c_source))
    }

    /// Renders a `CompileError` the way a user should see it: a `Diagnostic`
    /// with a location gets the `<file>:<line>:<col>` form plus the source
    /// excerpt and caret from §7, looked up in this session's already-loaded
    /// source map; everything else falls back to its `Display` form.
    pub fn render_error(&self, err: &CompileError) -> String {
        match err {
            CompileError::Diagnostic(d) => {
                let source = d.location.as_ref().and_then(|loc| self.sources.find_by_name(&loc.file));
                d.render(source)
            }
            CompileError::Io { .. } => err.to_string(),
        }
    }
}

/// Entry point for the `portc` binary: compiles the path given as the
/// first CLI argument in `EmitC` mode and prints the result. On failure,
/// returns the diagnostic already rendered with its source excerpt (the
/// `Session`, and the source text it loaded, do not outlive this call).
pub fn main() -> Result<(), String> {
    let input = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("usage: portc <file.por>");
        std::process::exit(2);
    });
    let mut session = Session::new(Config::new(input, EmitMode::EmitC));
    match session.compile() {
        Ok(Output::EmitC(c)) => {
            print!("{c}");
            Ok(())
        }
        Ok(_) => unreachable!("EmitC mode always returns Output::EmitC"),
        Err(e) => Err(session.render_error(&e)),
    }
}

fn lex_all(source: &str, file: &str) -> Result<Vec<portc_lex::Lexeme>, Diagnostic> {
    let mut lexer = portc_lex::Lexer::new(source, file.to_string());
    let mut out = Vec::new();
    loop {
        let lexeme = lexer.next()?;
        let is_eof = lexeme.kind == portc_lex::TokenKind::Eof;
        out.push(lexeme);
        if is_eof {
            break;
        }
    }
    Ok(out)
}

/// The file stem (portion before the first `.`) doubles as the module name
/// and the C name-mangling prefix, so it must itself be a valid identifier.
fn module_name_of(path: &Path) -> Result<String, Diagnostic> {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let stem = file_name.split('.').next().unwrap_or("");
    let mut chars = stem.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    };
    if !valid {
        return Err(Diagnostic::at(
            DiagnosticCode::InvalidFileName,
            format!("'{file_name}' is not a valid module name: the file stem must be a letter followed by letters or digits"),
            path.to_string_lossy().into_owned(),
            Range::point(portc_util::Position::new(0, 0)),
        ));
    }
    Ok(stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_source(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    const IDENTITY: &str = r#"
inteiro entrada() {
    retorne 0;
}
"#;

    #[test]
    fn lex_mode_returns_a_token_stream_ending_in_eof() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "m.por", IDENTITY);
        let mut session = Session::new(Config::new(path, EmitMode::Lex));
        let Output::Lex(tokens) = session.compile().unwrap() else { panic!("expected Lex output") };
        assert_eq!(tokens.last().unwrap().kind, portc_lex::TokenKind::Eof);
    }

    #[test]
    fn ast_mode_stops_before_semantic_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "m.por", "inteiro entrada() { retorne naoDeclarado; }");
        let mut session = Session::new(Config::new(path, EmitMode::Ast));
        let Output::Ast(module) = session.compile().unwrap() else { panic!("expected Ast output") };
        assert_eq!(module.procedures.len(), 1);
    }

    #[test]
    fn module_mode_returns_a_typed_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "m.por", IDENTITY);
        let mut session = Session::new(Config::new(path, EmitMode::Module));
        let Output::Module { analysis, .. } = session.compile().unwrap() else { panic!("expected Module output") };
        assert!(!analysis.types.is_empty());
    }

    #[test]
    fn emit_c_mode_produces_compilable_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "m.por", IDENTITY);
        let mut session = Session::new(Config::new(path, EmitMode::EmitC));
        let Output::EmitC(c) = session.compile().unwrap() else { panic!("expected EmitC output") };
        assert!(c.contains("int main(void)"));
        assert!(c.contains("m_entrada"));
    }

    #[test]
    fn invalid_file_stem_is_rejected_before_reading_the_file() {
        let mut session = Session::new(Config::new("9bad.por", EmitMode::EmitC));
        let err = session.compile().unwrap_err();
        match err {
            CompileError::Diagnostic(d) => assert_eq!(d.code, DiagnosticCode::InvalidFileName),
            other => panic!("expected InvalidFileName diagnostic, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.por");
        let mut session = Session::new(Config::new(path, EmitMode::EmitC));
        assert!(matches!(session.compile().unwrap_err(), CompileError::Io { .. }));
    }

    #[test]
    fn undeclared_identifier_is_reported_as_a_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "m.por", "inteiro entrada() { retorne naoDeclarado; }");
        let mut session = Session::new(Config::new(path, EmitMode::EmitC));
        let err = session.compile().unwrap_err();
        match err {
            CompileError::Diagnostic(d) => assert_eq!(d.code, DiagnosticCode::SymbolNotDeclared),
            other => panic!("expected SymbolNotDeclared diagnostic, got {other:?}"),
        }
    }

    #[test]
    fn missing_entry_point_is_reported_as_a_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "m.por", "inteiro outraCoisa() { retorne 0; }");
        let mut session = Session::new(Config::new(path, EmitMode::EmitC));
        let err = session.compile().unwrap_err();
        match err {
            CompileError::Diagnostic(d) => assert_eq!(d.code, DiagnosticCode::NoEntryPoint),
            other => panic!("expected NoEntryPoint diagnostic, got {other:?}"),
        }
    }

    #[test]
    fn render_error_includes_the_source_excerpt_and_caret() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "m.por", "inteiro entrada() { x = 1; retorne 0; }");
        let mut session = Session::new(Config::new(path, EmitMode::EmitC));
        let err = session.compile().unwrap_err();
        let rendered = session.render_error(&err);
        assert!(rendered.contains("m.por"));
        assert!(rendered.contains("x = 1;"));
        assert!(rendered.contains('^'));
    }
}
