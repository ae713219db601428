//! The scripting surface being REPL'd, behind a trait so the accumulator
//! never depends on a specific grammar. The engine decides whether a buffer
//! compiles, needs more input, or can never compile; the REPL decides when
//! to ask.

mod rhai;

pub use rhai::RhaiEngine;

/// Why a source buffer failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    /// True when the failure is a missing closing bracket. In multi-line
    /// mode that usually means the user simply is not done typing.
    pub unmatched_bracket: bool,
}

/// Tri-state result of attempting to compile the accumulation buffer.
#[derive(Debug)]
pub enum CompileOutcome<U> {
    /// The buffer forms a complete executable unit.
    Ready(U),
    /// The buffer is valid so far but truncated; more input is needed.
    Incomplete,
    /// The buffer can never compile as written.
    Invalid(SyntaxError),
}

/// A pluggable language engine with a persistent namespace.
pub trait LanguageEngine {
    type Unit;

    /// Display name of the scripting language, for the banner.
    fn language(&self) -> &'static str;

    fn compile(&self, source: &str) -> CompileOutcome<Self::Unit>;

    /// Execute a compiled unit against the persistent namespace. Returns the
    /// rendered result value when the unit produced one worth printing.
    fn execute(&mut self, unit: &Self::Unit) -> Result<Option<String>, String>;

    /// Snapshot of the persistent namespace as sorted (name, const flag,
    /// value) triples.
    fn names(&self) -> Vec<(String, bool, String)>;

    /// Clear the persistent namespace.
    fn reset(&mut self);
}
