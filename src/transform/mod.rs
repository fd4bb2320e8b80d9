//! Typed-script to executable-script transformation with loop guards.
//!
//! # Module Structure
//!
//! - `engine` - `TransformEngine` contract and the oxc implementation
//! - `guard` - loop instrumentation and the process-wide guard registry
//!
//! The transformer owns an immutable budget for its whole lifetime; build a
//! new transformer to change it.

mod engine;
mod guard;

pub use engine::{EngineError, OxcEngine, TransformEngine};
pub use guard::LoopGuard;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Transform failure surfaced to the preview pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// Invalid source syntax, with the engine's diagnostic verbatim.
    #[error("Transformation failed: {message}{}", line_suffix(.line))]
    Syntax { message: String, line: Option<usize> },

    #[error("Transformation failed: {0}")]
    Engine(String),
}

impl TransformError {
    /// Source line the failure points at, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. } => *line,
            Self::Engine(_) => None,
        }
    }
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|line| format!(" (line {line})")).unwrap_or_default()
}

impl From<EngineError> for TransformError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::Syntax { message, line } => Self::Syntax { message, line },
            EngineError::Failed(message) => Self::Engine(message),
        }
    }
}

/// Converts behavior source into guarded executable script.
pub struct LoopGuardedTransformer<E = OxcEngine> {
    engine: E,
    guard: Arc<LoopGuard>,
}

impl LoopGuardedTransformer {
    /// Transformer backed by oxc with the given loop budget.
    pub fn new(budget: Duration) -> Self {
        Self::with_engine(OxcEngine, budget)
    }
}

impl<E: TransformEngine> LoopGuardedTransformer<E> {
    pub fn with_engine(engine: E, budget: Duration) -> Self {
        Self {
            engine,
            guard: LoopGuard::register(budget),
        }
    }

    pub fn budget(&self) -> Duration {
        self.guard.budget()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Transform `source`. Blank source and an absent engine result both
    /// become empty text.
    pub fn transform(&self, source: &str) -> Result<String, TransformError> {
        if source.trim().is_empty() {
            return Ok(String::new());
        }
        let code = self.engine.transform(source, &self.guard)?;
        Ok(code.unwrap_or_default())
    }
}
