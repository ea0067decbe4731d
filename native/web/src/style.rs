//! Stylesheet for the generated editor markup.
//!
//! Pages that already style the editor classes leave `injectStyles` off; with
//! it on, [`inject`] appends a `<style>` element to the document root on start.

use tracing::debug;

use crate::config::BinderConfig;
use crate::dom::Dom;
use crate::error::DomError;

/// CSS class selector for `class`, escaping characters such as the `!` in
/// `!hidden`.
pub fn class_selector(class: &str) -> String {
    let mut out = String::with_capacity(class.len() + 1);
    out.push('.');
    for (index, c) in class.chars().enumerate() {
        if index == 0 && c.is_ascii_digit() {
            // A leading digit needs a code point escape.
            out.push_str(&format!("\\{:x} ", u32::from(c)));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// Generates CSS for the container, toolbar and content regions.
pub fn toolbar_css(config: &BinderConfig) -> String {
    let container = class_selector(&config.container_class);
    let toolbar = class_selector(&config.toolbar_class);
    let content = class_selector(&config.content_class);
    let toolset = class_selector(&config.toolset_class);
    let active = class_selector(&config.active_class);
    let hidden = class_selector(&config.hidden_class);

    format!(
        r#"
{hidden} {{
    display: none !important;
}}
{container} {{
    display: flex;
    flex-direction: column;
    border: 1px solid #d4d4d8;
    border-radius: 0.375rem;
}}
{toolbar} {{
    display: flex;
    flex-wrap: wrap;
    gap: 0.5rem;
    padding: 0.25rem;
    border-bottom: 1px solid #d4d4d8;
}}
{toolbar} {toolset} {{
    display: flex;
    gap: 0.125rem;
}}
{toolbar} button {{
    display: inline-flex;
    padding: 0.25rem;
    border: 0;
    border-radius: 0.25rem;
    background: transparent;
    color: inherit;
    cursor: pointer;
}}
{toolbar} button svg {{
    width: 1.25rem;
    height: 1.25rem;
}}
{toolbar} button{active} {{
    background: #e4e4e7;
}}
{content} {{
    min-height: 8rem;
    padding: 0.5rem 0.75rem;
    outline: none;
}}
"#
    )
}

/// Appends the generated stylesheet to the document root.
pub fn inject<D: Dom>(dom: &D, config: &BinderConfig) -> Result<D::Node, DomError> {
    let root = dom.root().ok_or(DomError::MissingRoot)?;
    let style = dom.create_element("style")?;
    dom.set_inner_html(&style, &toolbar_css(config));
    dom.append_child(&root, &style)?;
    debug!("toolbar stylesheet injected");
    Ok(style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryDocument;
    use pretty_assertions::assert_eq;

    #[test]
    fn selectors_escape_special_characters() {
        assert_eq!(class_selector("active"), ".active");
        assert_eq!(class_selector("!hidden"), ".\\!hidden");
        assert_eq!(class_selector("md:flex"), ".md\\:flex");
        assert_eq!(class_selector("2col"), ".\\32 col");
    }

    #[test]
    fn css_uses_configured_classes() {
        let config = BinderConfig {
            active_class: "is-on".to_string(),
            ..BinderConfig::default()
        };
        let css = toolbar_css(&config);
        assert!(css.contains(".wysiwyg-editor-toolbar button.is-on {"));
        assert!(css.contains(".\\!hidden {"));
        assert!(!css.contains(".active"));
    }

    #[test]
    fn inject_appends_style_to_root() {
        let doc = MemoryDocument::new();
        let style = inject(&doc, &BinderConfig::default()).unwrap();
        assert_eq!(doc.parent(style), Some(doc.body()));
        assert_eq!(doc.tag(style).as_deref(), Some("style"));
        assert!(doc.inner_html(style).contains(".wysiwyg-editor-content {"));
    }
}
