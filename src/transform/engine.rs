//! Transform engine contract and the oxc-backed implementation.
//!
//! An engine receives typed-script source plus the loop guard to apply and
//! returns executable script text. `Ok(None)` is a legal (empty) success.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::codegen::Codegen;
use oxc::diagnostics::OxcDiagnostic;
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{TransformOptions, Transformer};
use thiserror::Error;

use super::guard::{LoopGuard, line_of};

/// Virtual file name handed to the transformer.
const SOURCE_NAME: &str = "playground.ts";

/// Failure reported by a transform engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Source is not valid typed-script syntax.
    #[error("{message}")]
    Syntax { message: String, line: Option<usize> },

    /// Any other engine failure.
    #[error("{0}")]
    Failed(String),
}

/// Source-to-source engine consumed by `LoopGuardedTransformer`.
pub trait TransformEngine {
    fn transform(&self, source: &str, guard: &LoopGuard) -> Result<Option<String>, EngineError>;
}

/// oxc pipeline: parse → instrument loops → strip types → print.
#[derive(Debug, Default, Clone, Copy)]
pub struct OxcEngine;

impl TransformEngine for OxcEngine {
    fn transform(&self, source: &str, guard: &LoopGuard) -> Result<Option<String>, EngineError> {
        let allocator = Allocator::default();
        let source_type = SourceType::ts();

        let parsed = Parser::new(&allocator, source, source_type).parse();
        if let Some(error) = parsed.errors.first() {
            return Err(syntax_error(error, source));
        }
        if parsed.panicked {
            return Err(EngineError::Failed("parser aborted".to_string()));
        }

        let instrumented = guard.instrument(source, &parsed.program);

        let reparsed = Parser::new(&allocator, &instrumented, source_type).parse();
        if let Some(error) = reparsed.errors.first() {
            return Err(EngineError::Failed(format!(
                "loop guard produced invalid source: {error}"
            )));
        }
        let mut program = reparsed.program;

        let scoping = SemanticBuilder::new()
            .build(&program)
            .semantic
            .into_scoping();
        let options = TransformOptions::default();
        let ret = Transformer::new(&allocator, Path::new(SOURCE_NAME), &options)
            .build_with_scoping(scoping, &mut program);
        if let Some(error) = ret.errors.first() {
            return Err(EngineError::Failed(error.to_string()));
        }

        Ok(Some(Codegen::new().build(&program).code))
    }
}

/// Convert a parser diagnostic, locating its first label in `source`.
fn syntax_error(error: &OxcDiagnostic, source: &str) -> EngineError {
    let line = error
        .labels
        .as_ref()
        .and_then(|labels| labels.first())
        .and_then(|label| u32::try_from(label.offset()).ok())
        .map(|offset| line_of(source, offset));

    EngineError::Syntax {
        message: error.to_string(),
        line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn run(source: &str) -> Result<String, EngineError> {
        let guard = LoopGuard::register(Duration::from_millis(100));
        OxcEngine
            .transform(source, &guard)
            .map(Option::unwrap_or_default)
    }

    fn assert_valid_js(code: &str) {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, code, SourceType::mjs()).parse();
        assert!(ret.errors.is_empty(), "not valid js:\n{code}\n{:?}", ret.errors);
    }

    #[test]
    fn test_strips_type_annotations() {
        let code = run("const greet = (name: string): string => `Hello ${name}`;").unwrap();
        assert!(code.contains("Hello"));
        assert!(code.contains("greet"));
        assert!(!code.contains(": string"));
        assert_valid_js(&code);
    }

    #[test]
    fn test_strips_type_only_declarations() {
        let source = "interface Point { x: number; y: number }\n\
                      type Id = string;\n\
                      const p: Point = { x: 1, y: 2 };\n\
                      const id: Id = 'a';\n\
                      console.log(p.x as number, id);";
        let code = run(source).unwrap();
        assert!(!code.contains("interface"));
        assert!(!code.contains("type Id"));
        assert!(!code.contains(" as number"));
        assert!(code.contains("console.log"));
        assert_valid_js(&code);
    }

    #[test]
    fn test_plain_js_passes_through() {
        let code = run("let total = 0;\nfunction add(n) { total += n; }\nadd(2);").unwrap();
        assert!(code.contains("function add"));
        assert!(code.contains("total"));
        assert_valid_js(&code);
    }

    #[test]
    fn test_loops_instrumented() {
        let code = run("while (true) { }").unwrap();
        assert!(code.contains("Date.now()"));
        assert!(code.contains("Infinite loop detected on line 1"));
        assert_valid_js(&code);
    }

    #[test]
    fn test_typed_loop_instrumented_and_stripped() {
        let source = "const xs: number[] = [1, 2, 3];\nlet sum: number = 0;\nfor (const x of xs) {\n  sum += x;\n}";
        let code = run(source).unwrap();
        assert!(code.contains("Infinite loop detected on line 3"));
        assert!(!code.contains("number"));
        assert_valid_js(&code);
    }

    #[test]
    fn test_syntax_error_reported() {
        let err = run("const x = {").unwrap_err();
        assert!(matches!(err, EngineError::Syntax { line: Some(1), .. }));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_syntax_error_line() {
        let err = run("let a = 1;\nlet b = ;\n").unwrap_err();
        match err {
            EngineError::Syntax { line, .. } => assert_eq!(line, Some(2)),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }
}
