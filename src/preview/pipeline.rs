//! One pass of extract → transform → assemble.

use crate::assemble::{assemble, assemble_diagnostic};
use crate::extract::extract;
use crate::transform::{LoopGuardedTransformer, TransformEngine, TransformError};

/// Result of running the pipeline over one document snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Preview(String),
    /// Behavior failed to transform; the document shows the error instead.
    Diagnostic {
        document: String,
        error: TransformError,
    },
}

impl Rendered {
    pub fn document(&self) -> &str {
        match self {
            Self::Preview(document) | Self::Diagnostic { document, .. } => document,
        }
    }
}

/// Render `text` into a standalone document. Never fails.
pub fn render_document<E: TransformEngine>(
    text: &str,
    transformer: &LoopGuardedTransformer<E>,
) -> Rendered {
    let bundle = extract(text);
    let behavior = bundle.behavior();

    match transformer.transform(&behavior) {
        Ok(script) => Rendered::Preview(assemble(&bundle.markup, &bundle.style, &script)),
        Err(error) => Rendered::Diagnostic {
            document: assemble_diagnostic(&error.to_string()),
            error,
        },
    }
}
