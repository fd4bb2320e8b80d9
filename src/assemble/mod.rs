//! Preview document assembly.
//!
//! Wraps markup, style and behavior into one standalone HTML document.
//! Fragments are embedded verbatim: they are trusted local content.

use crate::embed::preview::{PreviewVars, preview_html};
use crate::utils::html;

/// Build the preview document from its three fragments.
pub fn assemble(markup: &str, style: &str, behavior: &str) -> String {
    preview_html().render(&PreviewVars {
        markup,
        style,
        behavior,
    })
}

/// Build the failure document shown in place of a preview.
///
/// The message is escaped and shown as preformatted text; style and
/// behavior regions stay empty.
pub fn assemble_diagnostic(message: &str) -> String {
    let markup = format!(
        "<pre style=\"color: red; padding: 1rem;\">{}</pre>",
        html::escape(message)
    );
    assemble(&markup, "", "")
}
