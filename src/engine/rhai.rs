use rhai::{AST, Dynamic, Engine, ParseErrorType, Scope};

use super::{CompileOutcome, LanguageEngine, SyntaxError};

/// Rhai-backed language engine.
///
/// Top-level variables live in `scope` across evaluations. Function
/// definitions are kept by merging each executed AST (with its statements
/// cleared) into `lib`, so `fn` items stay callable in later inputs.
pub struct RhaiEngine {
    engine: Engine,
    scope: Scope<'static>,
    lib: AST,
}

impl RhaiEngine {
    pub fn new() -> Self {
        let mut engine = Engine::new();

        // Safety limits
        engine.set_max_expr_depths(64, 64);
        engine.set_max_operations(1_000_000);

        Self {
            engine,
            scope: Scope::new(),
            lib: AST::empty(),
        }
    }
}

impl Default for RhaiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageEngine for RhaiEngine {
    type Unit = AST;

    fn language(&self) -> &'static str {
        "Rhai"
    }

    fn compile(&self, source: &str) -> CompileOutcome<AST> {
        match self.engine.compile(source) {
            Ok(ast) => CompileOutcome::Ready(ast),
            Err(err) => match &*err.0 {
                ParseErrorType::UnexpectedEOF => CompileOutcome::Incomplete,
                ParseErrorType::MissingToken(token, _)
                    if matches!(token.as_str(), "}" | ")" | "]") =>
                {
                    CompileOutcome::Invalid(SyntaxError {
                        message: err.to_string(),
                        unmatched_bracket: true,
                    })
                }
                _ => CompileOutcome::Invalid(SyntaxError {
                    message: err.to_string(),
                    unmatched_bracket: false,
                }),
            },
        }
    }

    fn execute(&mut self, unit: &AST) -> Result<Option<String>, String> {
        // Merge previously defined functions so they stay callable here.
        let ast = self.lib.merge(unit);

        let result = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut self.scope, &ast)
            .map_err(|e| e.to_string())?;

        self.lib = ast;
        self.lib.clear_statements();

        if result.is_unit() {
            Ok(None)
        } else {
            Ok(Some(format!("{result:?}")))
        }
    }

    fn names(&self) -> Vec<(String, bool, String)> {
        let mut names: Vec<(String, bool, String)> = self
            .scope
            .iter()
            .map(|(name, constant, value)| (name.to_string(), constant, format!("{value:?}")))
            .collect();
        names.sort();
        names
    }

    fn reset(&mut self) {
        self.scope.clear();
        self.lib = AST::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_statement_is_ready() {
        let engine = RhaiEngine::new();
        assert!(matches!(
            engine.compile("let x = 1;"),
            CompileOutcome::Ready(_)
        ));
    }

    #[test]
    fn truncated_block_is_never_ready() {
        let engine = RhaiEngine::new();
        // Classified as Incomplete or as an unmatched-bracket error depending
        // on where the parser stops; either way the buffer must not run.
        match engine.compile("if true {") {
            CompileOutcome::Ready(_) => panic!("truncated block compiled"),
            CompileOutcome::Incomplete => {}
            CompileOutcome::Invalid(err) => assert!(err.unmatched_bracket),
        }
    }

    #[test]
    fn garbage_is_invalid() {
        let engine = RhaiEngine::new();
        assert!(matches!(
            engine.compile("let = 5"),
            CompileOutcome::Invalid(_)
        ));
    }

    #[test]
    fn variables_persist_across_executions() {
        let mut engine = RhaiEngine::new();
        let CompileOutcome::Ready(first) = engine.compile("let x = 40;") else {
            panic!("compile failed");
        };
        engine.execute(&first).unwrap();

        let CompileOutcome::Ready(second) = engine.compile("x + 2") else {
            panic!("compile failed");
        };
        assert_eq!(engine.execute(&second).unwrap(), Some("42".to_string()));
    }

    #[test]
    fn functions_persist_across_executions() {
        let mut engine = RhaiEngine::new();
        let CompileOutcome::Ready(def) = engine.compile("fn double(n) { n * 2 }") else {
            panic!("compile failed");
        };
        engine.execute(&def).unwrap();

        let CompileOutcome::Ready(call) = engine.compile("double(21)") else {
            panic!("compile failed");
        };
        assert_eq!(engine.execute(&call).unwrap(), Some("42".to_string()));
    }

    #[test]
    fn runtime_error_is_surfaced() {
        let mut engine = RhaiEngine::new();
        let CompileOutcome::Ready(unit) = engine.compile("missing_fn()") else {
            panic!("compile failed");
        };
        assert!(engine.execute(&unit).is_err());
    }

    #[test]
    fn constants_are_flagged_in_the_namespace() {
        let mut engine = RhaiEngine::new();
        let CompileOutcome::Ready(unit) = engine.compile("const LIMIT = 7; let n = 1;") else {
            panic!("compile failed");
        };
        engine.execute(&unit).unwrap();

        let names = engine.names();
        assert!(names.contains(&("LIMIT".to_string(), true, "7".to_string())));
        assert!(names.contains(&("n".to_string(), false, "1".to_string())));
    }

    #[test]
    fn names_lists_scope_sorted() {
        let mut engine = RhaiEngine::new();
        let CompileOutcome::Ready(unit) = engine.compile("let b = 2; let a = 1;") else {
            panic!("compile failed");
        };
        engine.execute(&unit).unwrap();

        let names = engine.names();
        assert_eq!(names[0].0, "a");
        assert_eq!(names[1].0, "b");
    }

    #[test]
    fn reset_clears_namespace() {
        let mut engine = RhaiEngine::new();
        let CompileOutcome::Ready(unit) = engine.compile("let x = 1;") else {
            panic!("compile failed");
        };
        engine.execute(&unit).unwrap();
        assert!(!engine.names().is_empty());

        engine.reset();
        assert!(engine.names().is_empty());
    }
}
