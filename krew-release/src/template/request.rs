//! Values a manifest template is rendered with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The release request for a new plugin version.
///
/// Template fields use the Go-style names of the bot's wire format:
/// `.TagName`, `.PluginName`, `.PluginOwner`, `.PluginRepo`,
/// `.PluginReleaseActor`, plus any extra entry of `values` by its key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRequest {
    pub tag_name: String,
    #[serde(default)]
    pub plugin_name: String,
    #[serde(default)]
    pub plugin_owner: String,
    #[serde(default)]
    pub plugin_repo: String,
    #[serde(default)]
    pub plugin_release_actor: String,
    /// Extra named values, e.g. per-platform asset URIs.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, String>,
}

impl ReleaseRequest {
    /// Request for `tag` with every other field empty.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag_name: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_plugin_name(mut self, name: impl Into<String>) -> Self {
        self.plugin_name = name.into();
        self
    }

    pub fn with_plugin_owner(mut self, owner: impl Into<String>) -> Self {
        self.plugin_owner = owner.into();
        self
    }

    pub fn with_plugin_repo(mut self, repo: impl Into<String>) -> Self {
        self.plugin_repo = repo.into();
        self
    }

    pub fn with_release_actor(mut self, actor: impl Into<String>) -> Self {
        self.plugin_release_actor = actor.into();
        self
    }

    /// Add an extra named value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Copy of this request with a different tag.
    pub fn with_tag(&self, tag: impl Into<String>) -> Self {
        Self {
            tag_name: tag.into(),
            ..self.clone()
        }
    }

    /// Resolve a template field name (without the leading dot).
    pub fn lookup(&self, field: &str) -> Option<&str> {
        match field {
            "TagName" => Some(&self.tag_name),
            "PluginName" => Some(&self.plugin_name),
            "PluginOwner" => Some(&self.plugin_owner),
            "PluginRepo" => Some(&self.plugin_repo),
            "PluginReleaseActor" => Some(&self.plugin_release_actor),
            other => self.values.get(other).map(String::as_str),
        }
    }

    /// Commit message for the index update.
    pub fn commit_message(&self) -> String {
        format!("new version {} of {}", self.tag_name, self.plugin_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_builtin_fields() {
        let request = ReleaseRequest::new("v0.0.2")
            .with_plugin_name("whoami")
            .with_plugin_owner("rajatjindal")
            .with_plugin_repo("kubectl-whoami")
            .with_release_actor("octocat");

        assert_eq!(request.lookup("TagName"), Some("v0.0.2"));
        assert_eq!(request.lookup("PluginName"), Some("whoami"));
        assert_eq!(request.lookup("PluginOwner"), Some("rajatjindal"));
        assert_eq!(request.lookup("PluginRepo"), Some("kubectl-whoami"));
        assert_eq!(request.lookup("PluginReleaseActor"), Some("octocat"));
        assert_eq!(request.lookup("Nope"), None);
    }

    #[test]
    fn test_lookup_extra_values() {
        let request = ReleaseRequest::new("v1").with_value("DarwinURI", "https://example.com/d");
        assert_eq!(request.lookup("DarwinURI"), Some("https://example.com/d"));
    }

    #[test]
    fn test_builtin_field_wins_over_value() {
        let request = ReleaseRequest::new("v1").with_value("TagName", "shadow");
        assert_eq!(request.lookup("TagName"), Some("v1"));
    }

    #[test]
    fn test_with_tag_keeps_other_fields() {
        let request = ReleaseRequest::new("v1").with_plugin_name("whoami");
        let retagged = request.with_tag("v2");
        assert_eq!(retagged.tag_name, "v2");
        assert_eq!(retagged.plugin_name, "whoami");
        assert_eq!(request.tag_name, "v1");
    }

    #[test]
    fn test_json_wire_format() {
        let request: ReleaseRequest = serde_json::from_str(
            r#"{"tagName":"v0.0.2","pluginName":"whoami","pluginOwner":"rajatjindal","pluginRepo":"kubectl-whoami"}"#,
        )
        .unwrap();
        assert_eq!(request.tag_name, "v0.0.2");
        assert_eq!(request.plugin_repo, "kubectl-whoami");
        assert!(request.values.is_empty());

        let json = serde_json::to_string(&ReleaseRequest::new("v1")).unwrap();
        assert!(json.contains(r#""tagName":"v1""#));
        assert!(!json.contains("values"));
    }

    #[test]
    fn test_commit_message() {
        let request = ReleaseRequest::new("v0.0.2").with_plugin_name("whoami");
        assert_eq!(request.commit_message(), "new version v0.0.2 of whoami");
    }
}
