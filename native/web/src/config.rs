//! Binder configuration handed over from the page as JSON.
//!
//! Every field has a default matching the stock markup, so an empty string or
//! `{}` is a valid configuration. Keys are camelCase on the JS side.

use serde::Deserialize;

use crate::error::ConfigError;

/// Which elements get upgraded to a rich-text surface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostSelector {
    /// Lower-case tag name of host elements.
    pub tag: String,
    /// Marker attribute; its value is ignored.
    pub attribute: String,
}

impl Default for HostSelector {
    fn default() -> Self {
        Self {
            tag: "textarea".to_string(),
            attribute: "data-wysiwyg-editor".to_string(),
        }
    }
}

impl HostSelector {
    /// CSS selector form, e.g. `textarea[data-wysiwyg-editor]`.
    pub fn css(&self) -> String {
        format!("{}[{}]", self.tag, self.attribute)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BinderConfig {
    pub host: HostSelector,
    /// Class of the generated container that follows the host.
    pub container_class: String,
    pub toolbar_class: String,
    /// Class applied to the region the engine renders into.
    pub content_class: String,
    pub toolset_class: String,
    /// Class toggled on controls whose command is currently on.
    pub active_class: String,
    /// Class that hides the original host.
    pub hidden_class: String,
    /// Suffix appended to the host id for generated element ids.
    pub id_suffix: String,
    pub link_prompt: String,
    pub image_prompt: String,
    /// Prompt default when the selection carries no URL yet.
    pub default_url: String,
    pub inject_styles: bool,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            host: HostSelector::default(),
            container_class: "wysiwyg-editor".to_string(),
            toolbar_class: "wysiwyg-editor-toolbar".to_string(),
            content_class: "wysiwyg-editor-content".to_string(),
            toolset_class: "toolset".to_string(),
            active_class: "active".to_string(),
            hidden_class: "!hidden".to_string(),
            id_suffix: "wysiwyg-editor".to_string(),
            link_prompt: "URL".to_string(),
            image_prompt: "Image URL".to_string(),
            default_url: "https://".to_string(),
            inject_styles: false,
        }
    }
}

impl BinderConfig {
    /// Parse a configuration; blank input yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Ids for the container, toolbar and content regions of `host_id`.
    pub fn region_ids(&self, host_id: &str) -> Option<[String; 3]> {
        if host_id.is_empty() {
            return None;
        }
        let base = format!("{}-{}", host_id, self.id_suffix);
        Some([
            base.clone(),
            format!("{base}-toolbar"),
            format!("{base}-content"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_config_is_default() {
        assert_eq!(BinderConfig::from_json("  ").unwrap(), BinderConfig::default());
        assert_eq!(BinderConfig::from_json("{}").unwrap(), BinderConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = BinderConfig::from_json(
            r#"{ "activeClass": "is-on", "host": { "attribute": "data-rich" } }"#,
        )
        .unwrap();
        assert_eq!(config.active_class, "is-on");
        assert_eq!(config.host.tag, "textarea");
        assert_eq!(config.host.css(), "textarea[data-rich]");
        assert_eq!(config.hidden_class, "!hidden");
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(BinderConfig::from_json("{ activeClass").is_err());
    }

    #[test]
    fn region_ids_follow_host_id() {
        let config = BinderConfig::default();
        assert_eq!(
            config.region_ids("body").unwrap(),
            [
                "body-wysiwyg-editor".to_string(),
                "body-wysiwyg-editor-toolbar".to_string(),
                "body-wysiwyg-editor-content".to_string(),
            ]
        );
        assert!(config.region_ids("").is_none());
    }
}
