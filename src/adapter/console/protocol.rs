//! Console line protocol.
//!
//! ```text
//! start                                  host finished loading
//! load <plugin> [cmd|alias..] [grp/sub|alias..] ...
//! unload <plugin>
//! group <group_id> <text>
//! private <user_id> <text>
//! help
//! ```

use std::collections::HashMap;

use thiserror::Error;

use crate::core::command::CommandNode;

pub const HELP: &str = "\
start                                    host finished loading
load <plugin> [cmd|alias..] [grp/sub|alias..]
unload <plugin>
group <group_id> <text>
private <user_id> <text>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start,
    Help,
    Load {
        plugin: String,
        commands: Vec<CommandNode>,
    },
    Unload {
        plugin: String,
    },
    Group {
        group_id: String,
        text: String,
    },
    Private {
        user_id: String,
        text: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty line")]
    Empty,
    #[error("unknown command '{0}', type `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Split off the first whitespace-delimited token.
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s
        .char_indices()
        .find(|(_, ch)| ch.is_whitespace())
        .map(|(idx, _)| idx)
        .unwrap_or(s.len());
    Some((&s[..end], s[end..].trim_start()))
}

pub fn parse_line(line: &str) -> Result<ConsoleCommand, ParseError> {
    let (keyword, rest) = next_token(line).ok_or(ParseError::Empty)?;

    match keyword {
        "start" => Ok(ConsoleCommand::Start),
        "help" => Ok(ConsoleCommand::Help),
        "load" => {
            let (plugin, rest) =
                next_token(rest).ok_or(ParseError::Usage("load <plugin> [commands..]"))?;
            Ok(ConsoleCommand::Load {
                plugin: plugin.to_string(),
                commands: parse_command_specs(rest.split_whitespace())?,
            })
        }
        "unload" => {
            let (plugin, _) = next_token(rest).ok_or(ParseError::Usage("unload <plugin>"))?;
            Ok(ConsoleCommand::Unload {
                plugin: plugin.to_string(),
            })
        }
        "group" => {
            let (group_id, text) =
                next_token(rest).ok_or(ParseError::Usage("group <group_id> <text>"))?;
            Ok(ConsoleCommand::Group {
                group_id: group_id.to_string(),
                text: text.to_string(),
            })
        }
        "private" => {
            let (user_id, text) =
                next_token(rest).ok_or(ParseError::Usage("private <user_id> <text>"))?;
            Ok(ConsoleCommand::Private {
                user_id: user_id.to_string(),
                text: text.to_string(),
            })
        }
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

/// `name|alias` becomes a command, `parent/name|alias` a sub-command of the
/// group `parent`. Sub-commands sharing a parent land in one group.
fn parse_command_specs<'a>(
    specs: impl Iterator<Item = &'a str>,
) -> Result<Vec<CommandNode>, ParseError> {
    let mut nodes: Vec<CommandNode> = Vec::new();
    let mut groups: HashMap<String, usize> = HashMap::new();

    for spec in specs {
        let mut parts = spec.split('|');
        let head = parts.next().unwrap_or_default();
        let aliases: Vec<String> = parts
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect();

        match head.split_once('/') {
            Some((parent, fragment)) if !parent.is_empty() && !fragment.is_empty() => {
                let sub = CommandNode::sub_command(parent, fragment, aliases);
                let idx = *groups.entry(parent.to_string()).or_insert_with(|| {
                    nodes.push(CommandNode::group([]));
                    nodes.len() - 1
                });
                if let CommandNode::Group { sub_commands } = &mut nodes[idx] {
                    sub_commands.push(sub);
                }
            }
            None if !head.is_empty() => nodes.push(CommandNode::command(head, aliases)),
            _ => return Err(ParseError::Usage("command spec is `name|alias` or `group/sub|alias`")),
        }
    }

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_load_with_commands_and_groups() {
        let cmd = parse_line("load weather wx|天气 cfg/set|s cfg/get").unwrap();
        assert_eq!(
            cmd,
            ConsoleCommand::Load {
                plugin: "weather".to_string(),
                commands: vec![
                    CommandNode::command("wx", ["天气"]),
                    CommandNode::group([
                        CommandNode::sub_command("cfg", "set", ["s"]),
                        CommandNode::sub_command("cfg", "get", Vec::<String>::new()),
                    ]),
                ],
            }
        );
    }

    #[test]
    fn parse_load_without_commands() {
        assert_eq!(
            parse_line("load bare").unwrap(),
            ConsoleCommand::Load {
                plugin: "bare".to_string(),
                commands: vec![],
            }
        );
    }

    #[test]
    fn parse_group_keeps_text_spacing() {
        assert_eq!(
            parse_line("group 123  wx  today").unwrap(),
            ConsoleCommand::Group {
                group_id: "123".to_string(),
                text: "wx  today".to_string(),
            }
        );
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse_line("   "), Err(ParseError::Empty));
        assert!(matches!(parse_line("unload"), Err(ParseError::Usage(_))));
        assert!(matches!(parse_line("load p /x"), Err(ParseError::Usage(_))));
        assert_eq!(
            parse_line("dance now"),
            Err(ParseError::Unknown("dance".to_string()))
        );
    }
}
