//! One-shot commands: `render` and `extract`.

use std::fs;
use std::io::{Write, stdout};
use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::config::PreviewSettings;
use crate::extract::{ExtractedBundle, extract};
use crate::log;
use crate::preview::{Rendered, render_document};
use crate::transform::LoopGuardedTransformer;

fn read_document(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

/// Run the pipeline once and write the document to `output` or stdout.
///
/// A transform failure still produces the diagnostic document; the
/// command succeeds either way.
pub fn render_file(file: &Path, output: Option<&Path>, settings: &PreviewSettings) -> Result<()> {
    let text = read_document(file)?;
    let transformer = LoopGuardedTransformer::new(settings.loop_guard());
    let rendered = render_document(&text, &transformer);

    if let Rendered::Diagnostic { error, .. } = &rendered {
        // stdout may carry the document itself
        eprintln!("{} {}", "[render]".bright_red().bold(), error);
    }

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, rendered.document())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log!("render"; "{} → {}", file.display(), path.display());
        }
        None => {
            let mut out = stdout().lock();
            out.write_all(rendered.document().as_bytes())?;
            out.flush()?;
        }
    }
    Ok(())
}

/// Print the extracted channels of `file`.
pub fn extract_file(file: &Path, json: bool) -> Result<()> {
    let bundle = extract(&read_document(file)?);
    let text = if json {
        serde_json::to_string_pretty(&bundle)?
    } else {
        format_bundle(&bundle)
    };
    println!("{text}");
    Ok(())
}

fn format_bundle(bundle: &ExtractedBundle) -> String {
    let channels = [
        ("markup", &bundle.markup),
        ("style", &bundle.style),
        ("behavior (plain)", &bundle.behavior_plain),
        ("behavior (typed)", &bundle.behavior_typed),
    ];

    channels
        .iter()
        .filter(|(_, body)| !body.is_empty())
        .map(|(name, body)| format!("{}\n{}", format!("== {name} ==").bold(), body))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_to_file() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("note.md");
        fs::write(&doc, "```html\n<p>hi</p>\n```\n").unwrap();
        let out = tmp.path().join("out/page.html");

        render_file(&doc, Some(&out), &PreviewSettings::default()).unwrap();
        let html = fs::read_to_string(&out).unwrap();
        assert!(html.contains("<main><p>hi</p></main>"));
    }

    #[test]
    fn test_render_failure_still_writes_diagnostic() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("note.md");
        fs::write(&doc, "```ts\nconst = ;\n```\n").unwrap();
        let out = tmp.path().join("page.html");

        render_file(&doc, Some(&out), &PreviewSettings::default()).unwrap();
        assert!(fs::read_to_string(&out).unwrap().contains("Transformation failed"));
    }

    #[test]
    fn test_missing_document_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = render_file(&tmp.path().join("nope.md"), None, &PreviewSettings::default())
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_format_bundle_skips_empty_channels() {
        let bundle = extract("```css\na{}\n```\n```js\nrun()\n```");
        let text = format_bundle(&bundle);
        assert!(text.contains("a{}"));
        assert!(text.contains("run()"));
        assert!(!text.contains("markup"));
        assert!(!text.contains("typed"));
    }
}
