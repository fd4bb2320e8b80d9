//! Embedded static resources.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `preview` - Rendered document skeleton (preview.html)
//! - `serve` - Dev server shell page and its live-navigation script
//!
//! # Usage
//!
//! ```ignore
//! use embed::preview::{PreviewVars, preview_html};
//!
//! let html = preview_html().render(&PreviewVars { markup: "<h1>Hi</h1>", style: "", behavior: "" });
//! ```

mod template;

pub use template::{Template, TemplateVars, fill};

pub mod preview {
    use super::{Template, TemplateVars, fill};

    /// Fragments embedded into the preview document.
    pub struct PreviewVars<'a> {
        pub markup: &'a str,
        pub style: &'a str,
        pub behavior: &'a str,
    }

    impl TemplateVars for PreviewVars<'_> {
        fn apply(&self, content: &str) -> String {
            fill(
                content,
                &[
                    ("__FENCEPLAY_STYLE__", self.style),
                    ("__FENCEPLAY_MARKUP__", self.markup),
                    ("__FENCEPLAY_BEHAVIOR__", self.behavior),
                ],
            )
        }
    }

    /// Standalone preview document skeleton.
    pub const fn preview_html<'a>() -> Template<PreviewVars<'a>> {
        Template::new(include_str!("preview.html"))
    }
}

pub mod serve {
    use super::{Template, TemplateVars, fill};

    const HOTRELOAD_JS: &str = include_str!(concat!(env!("OUT_DIR"), "/hotreload.min.js"));
    const SHELL_CSS: &str = include_str!(concat!(env!("OUT_DIR"), "/shell.min.css"));

    /// Variables for the serve shell page.
    pub struct ShellVars<'a> {
        pub title: &'a str,
        /// Address of the active artifact (`about:blank` when none).
        pub src: &'a str,
        pub ws_port: u16,
    }

    impl TemplateVars for ShellVars<'_> {
        fn apply(&self, content: &str) -> String {
            let port = self.ws_port.to_string();
            let script = fill(HOTRELOAD_JS, &[("__FENCEPLAY_WS_PORT__", port.as_str())]);
            let title = crate::utils::html::escape(self.title);
            let src = crate::utils::html::escape_attr(self.src);
            fill(
                content,
                &[
                    ("__FENCEPLAY_TITLE__", title.as_ref()),
                    ("__FENCEPLAY_SHELL_CSS__", SHELL_CSS),
                    ("__FENCEPLAY_SRC__", src.as_ref()),
                    ("__FENCEPLAY_HOTRELOAD_JS__", script.as_str()),
                ],
            )
        }
    }

    /// Shell page hosting the sandboxed preview iframe.
    pub const fn shell_html<'a>() -> Template<ShellVars<'a>> {
        Template::new(include_str!("serve/shell.html"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_template_placeholders() {
        let html = preview::preview_html().render(&preview::PreviewVars {
            markup: "M",
            style: "S",
            behavior: "B",
        });
        assert!(html.contains("<style>S</style>"));
        assert!(html.contains("<main>M</main>"));
        assert!(html.contains("<script>B</script>"));
        assert!(!html.contains("__FENCEPLAY_"));
    }

    #[test]
    fn test_shell_template() {
        let html = serve::shell_html().render(&serve::ShellVars {
            title: "notes.md",
            src: "/blob/3",
            ws_port: 35730,
        });
        assert!(html.contains("sandbox=\"allow-scripts\""));
        assert!(html.contains("src=\"/blob/3\""));
        assert!(html.contains("35730"));
        assert!(html.contains("<title>notes.md</title>"));
        assert!(!html.contains("__FENCEPLAY_"));
    }
}
