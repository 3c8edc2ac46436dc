//! Command descriptions as the host's command registry reports them.
//!
//! The host describes every registered command as a JSON object tagged by
//! `type`:
//!
//! ```json
//! { "plugin": "weather", "type": "group", "sub_commands": [
//!     { "type": "sub_command", "parent_signature": "wx",
//!       "current_fragment": "today", "aliases": ["now"] }
//! ] }
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::core::error::Error;

/// One node of a command-description tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub enum CommandNode {
    /// A command group, invoked only through its children.
    Group { sub_commands: Vec<CommandNode> },
    /// A command nested under a group, invoked as `"{parent} {fragment}"`.
    SubCommand {
        parent_signature: String,
        current_fragment: String,
        aliases: Vec<String>,
    },
    /// A top-level command.
    Command {
        current_fragment: String,
        aliases: Vec<String>,
    },
    /// Any kind this crate does not understand. Kept so that indexing can
    /// report it instead of failing the whole registry listing.
    Unsupported { kind: String },
}

#[derive(Deserialize)]
struct GroupFields {
    #[serde(default)]
    sub_commands: Vec<CommandNode>,
}

#[derive(Deserialize)]
struct SubCommandFields {
    parent_signature: String,
    current_fragment: String,
    #[serde(default)]
    aliases: Vec<String>,
}

#[derive(Deserialize)]
struct CommandFields {
    current_fragment: String,
    #[serde(default)]
    aliases: Vec<String>,
}

impl TryFrom<Value> for CommandNode {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(Error::MissingCommandKind)?
            .to_string();

        let node = match kind.as_str() {
            "group" => {
                let f: GroupFields = serde_json::from_value(value)?;
                CommandNode::Group {
                    sub_commands: f.sub_commands,
                }
            }
            "sub_command" => {
                let f: SubCommandFields = serde_json::from_value(value)?;
                CommandNode::SubCommand {
                    parent_signature: f.parent_signature,
                    current_fragment: f.current_fragment,
                    aliases: f.aliases,
                }
            }
            "command" => {
                let f: CommandFields = serde_json::from_value(value)?;
                CommandNode::Command {
                    current_fragment: f.current_fragment,
                    aliases: f.aliases,
                }
            }
            _ => CommandNode::Unsupported { kind },
        };

        Ok(node)
    }
}

impl CommandNode {
    /// Top-level command `fragment` with `aliases`.
    pub fn command<I, S>(fragment: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandNode::Command {
            current_fragment: fragment.into(),
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }

    /// Sub-command `fragment` under `parent`.
    pub fn sub_command<I, S>(parent: impl Into<String>, fragment: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandNode::SubCommand {
            parent_signature: parent.into(),
            current_fragment: fragment.into(),
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }

    pub fn group(sub_commands: impl IntoIterator<Item = CommandNode>) -> Self {
        CommandNode::Group {
            sub_commands: sub_commands.into_iter().collect(),
        }
    }

    /// The `type` tag of this node.
    pub fn kind(&self) -> &str {
        match self {
            CommandNode::Group { .. } => "group",
            CommandNode::SubCommand { .. } => "sub_command",
            CommandNode::Command { .. } => "command",
            CommandNode::Unsupported { kind } => kind,
        }
    }
}

/// A registry entry: a command tree plus the plugin that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandDescriptor {
    /// Name of the owning plugin
    pub plugin: String,
    #[serde(default)]
    pub handler_full_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub node: CommandNode,
}

impl CommandDescriptor {
    pub fn new(plugin: impl Into<String>, node: CommandNode) -> Self {
        Self {
            plugin: plugin.into(),
            handler_full_name: String::new(),
            description: String::new(),
            node,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_nested_group() {
        let raw = json!({
            "plugin": "weather",
            "handler_full_name": "weather.main.wx",
            "type": "group",
            "sub_commands": [
                { "type": "sub_command", "parent_signature": "wx",
                  "current_fragment": "today", "aliases": ["now"] },
                { "type": "group", "sub_commands": [] }
            ]
        });

        let desc: CommandDescriptor = serde_json::from_value(raw).unwrap();
        assert_eq!(desc.plugin, "weather");
        assert_eq!(desc.handler_full_name, "weather.main.wx");
        assert_eq!(
            desc.node,
            CommandNode::group([
                CommandNode::sub_command("wx", "today", ["now"]),
                CommandNode::group([]),
            ])
        );
    }

    #[test]
    fn decode_keeps_unknown_kind() {
        let raw = json!({ "plugin": "p", "type": "regex", "pattern": ".*" });
        let desc: CommandDescriptor = serde_json::from_value(raw).unwrap();
        assert_eq!(desc.node.kind(), "regex");
    }

    #[test]
    fn decode_rejects_missing_kind() {
        let raw = json!({ "plugin": "p", "current_fragment": "x" });
        assert!(serde_json::from_value::<CommandDescriptor>(raw).is_err());
    }

    #[test]
    fn aliases_default_to_empty() {
        let node: CommandNode =
            serde_json::from_value(json!({ "type": "command", "current_fragment": "ping" }))
                .unwrap();
        assert_eq!(node, CommandNode::command("ping", Vec::<String>::new()));
    }
}
