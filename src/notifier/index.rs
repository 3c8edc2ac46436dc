//! Flattens command trees into the strings users type to invoke them.

use std::collections::HashSet;

use crate::core::command::{CommandDescriptor, CommandNode};
use crate::core::error::{Error, Result};

/// Every invocation string of `node`, aliases included.
pub fn collect_command_names(node: &CommandNode) -> Result<HashSet<String>> {
    let mut names = HashSet::new();

    match node {
        CommandNode::Group { sub_commands } => {
            for sub in sub_commands {
                names.extend(collect_command_names(sub)?);
            }
        }
        CommandNode::SubCommand {
            parent_signature,
            current_fragment,
            aliases,
        } => {
            names.insert(format!("{parent_signature} {current_fragment}"));
            for alias in aliases {
                names.insert(format!("{parent_signature} {alias}"));
            }
        }
        CommandNode::Command {
            current_fragment,
            aliases,
        } => {
            names.insert(current_fragment.clone());
            names.extend(aliases.iter().cloned());
        }
        CommandNode::Unsupported { kind } => {
            return Err(Error::UnsupportedCommandKind(kind.clone()));
        }
    }

    Ok(names)
}

/// Invocation strings of every command owned by `plugin`.
pub fn index_plugin(commands: &[CommandDescriptor], plugin: &str) -> Result<HashSet<String>> {
    let mut names = HashSet::new();
    for desc in commands.iter().filter(|c| c.plugin == plugin) {
        names.extend(collect_command_names(&desc.node)?);
    }
    Ok(names)
}
