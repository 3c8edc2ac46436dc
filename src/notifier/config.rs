use chrono::{Local, TimeZone};
use serde::{Deserialize, Deserializer};

use crate::core::config::Configurable;
use crate::core::error::{Error, Result};

/// `[alteration_notifier]` section.
///
/// ```toml
/// [alteration_notifier]
/// monitor_self = false
///
/// [alteration_notifier.role_range]
/// exclude_mode = true
/// group_list = [123456, "654321"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub role_range: RoleRangeConfig,

    /// Announce this notifier's own load/unload too
    #[serde(default)]
    pub monitor_self: bool,

    /// Name the host registers this plugin under
    #[serde(default = "default_self_name")]
    pub self_name: String,

    /// Platform segment of the origin notifications are sent to
    #[serde(default = "default_platform_id")]
    pub platform_id: String,

    #[serde(default)]
    pub messages: MessageTemplates,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            role_range: RoleRangeConfig::default(),
            monitor_self: false,
            self_name: default_self_name(),
            platform_id: default_platform_id(),
            messages: MessageTemplates::default(),
        }
    }
}

impl Configurable for NotifierConfig {
    const PREFIX: &'static str = "alteration_notifier";
}

impl NotifierConfig {
    pub fn validate(&self) -> Result<()> {
        if self.platform_id.is_empty() || self.platform_id.contains(':') {
            return Err(Error::Config(format!(
                "platform_id '{}' must be non-empty and contain no ':'",
                self.platform_id
            )));
        }
        if self.self_name.is_empty() {
            return Err(Error::Config("self_name must not be empty".to_string()));
        }
        Ok(())
    }
}

fn default_self_name() -> String {
    "astrbot_plugin_alteration_notifier".to_string()
}

fn default_platform_id() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleRangeConfig {
    /// true: notify every group seen except `group_list`;
    /// false: notify only `group_list`
    #[serde(default = "default_exclude_mode")]
    pub exclude_mode: bool,

    #[serde(default, deserialize_with = "group_ids")]
    pub group_list: Vec<String>,
}

impl Default for RoleRangeConfig {
    fn default() -> Self {
        Self {
            exclude_mode: default_exclude_mode(),
            group_list: Vec::new(),
        }
    }
}

fn default_exclude_mode() -> bool {
    true
}

// Group ids are numbers on most platforms; accept both spellings.
fn group_ids<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum GroupId {
        Number(i64),
        Text(String),
    }

    let ids = Vec::<GroupId>::deserialize(deserializer)?;
    Ok(ids
        .into_iter()
        .map(|id| match id {
            GroupId::Number(n) => n.to_string(),
            GroupId::Text(s) => s,
        })
        .collect())
}

/// Notification texts. Placeholders: `{plugin}`, `{command}`, `{removed_at}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageTemplates {
    #[serde(default = "default_plugin_loaded")]
    pub plugin_loaded: String,
    #[serde(default = "default_plugin_unloaded")]
    pub plugin_unloaded: String,
    #[serde(default = "default_command_removed")]
    pub command_removed: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            plugin_loaded: default_plugin_loaded(),
            plugin_unloaded: default_plugin_unloaded(),
            command_removed: default_command_removed(),
        }
    }
}

fn default_plugin_loaded() -> String {
    "新增插件：{plugin}".to_string()
}

fn default_plugin_unloaded() -> String {
    "移除插件：{plugin}".to_string()
}

fn default_command_removed() -> String {
    "指令【{command}】已经于【{removed_at}】被移除了！".to_string()
}

impl MessageTemplates {
    pub fn plugin_loaded(&self, plugin: &str) -> String {
        self.plugin_loaded.replace("{plugin}", plugin)
    }

    pub fn plugin_unloaded(&self, plugin: &str) -> String {
        self.plugin_unloaded.replace("{plugin}", plugin)
    }

    pub fn command_removed(&self, command: &str, removed_at: i64) -> String {
        self.command_removed
            .replace("{command}", command)
            .replace("{removed_at}", &format_timestamp(removed_at))
    }
}

/// Unix seconds as local `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(ts: i64) -> String {
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigStore;

    #[test]
    fn defaults_when_section_missing() {
        let config: NotifierConfig = ConfigStore::empty().get().unwrap();
        assert!(config.role_range.exclude_mode);
        assert!(config.role_range.group_list.is_empty());
        assert!(!config.monitor_self);
        assert_eq!(config.self_name, "astrbot_plugin_alteration_notifier");
        assert_eq!(config.platform_id, "default");
        config.validate().unwrap();
    }

    #[test]
    fn group_ids_accept_numbers_and_strings() {
        let toml = r#"
            [alteration_notifier]
            monitor_self = true

            [alteration_notifier.role_range]
            exclude_mode = false
            group_list = [123456, "654321"]
        "#;

        let config: NotifierConfig = ConfigStore::parse(toml).unwrap().get().unwrap();
        assert!(config.monitor_self);
        assert!(!config.role_range.exclude_mode);
        assert_eq!(config.role_range.group_list, vec!["123456", "654321"]);
    }

    #[test]
    fn templates_can_be_overridden() {
        let toml = r#"
            [alteration_notifier.messages]
            plugin_loaded = "+ {plugin}"
        "#;

        let config: NotifierConfig = ConfigStore::parse(toml).unwrap().get().unwrap();
        assert_eq!(config.messages.plugin_loaded("wx"), "+ wx");
        assert_eq!(config.messages.plugin_unloaded("wx"), "移除插件：wx");
    }

    #[test]
    fn removal_notice_has_local_time() {
        let templates = MessageTemplates::default();
        let ts = 1_700_000_000;
        let expected = format!("指令【wx】已经于【{}】被移除了！", format_timestamp(ts));

        assert_eq!(templates.command_removed("wx", ts), expected);
        assert_eq!(format_timestamp(ts).len(), "2023-11-14 22:13:20".len());
    }

    #[test]
    fn platform_id_with_separator_is_rejected() {
        let config = NotifierConfig {
            platform_id: "a:b".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
