use std::fmt;
use std::str::FromStr;

use crate::core::error::Error;
use crate::core::plugin::PluginMetadata;

/// Message type segment of a unified origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    GroupMessage,
    FriendMessage,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::GroupMessage => "GroupMessage",
            MessageType::FriendMessage => "FriendMessage",
        }
    }
}

impl FromStr for MessageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GroupMessage" => Ok(MessageType::GroupMessage),
            "FriendMessage" => Ok(MessageType::FriendMessage),
            other => Err(Error::InvalidOrigin(format!("unknown message type '{other}'"))),
        }
    }
}

/// Address of a conversation on the host: `platform:MessageType:session`.
///
/// The session part may itself contain `:`, only the first two separators
/// are significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnifiedOrigin {
    pub platform: String,
    pub message_type: MessageType,
    pub session_id: String,
}

impl UnifiedOrigin {
    pub fn new(
        platform: impl Into<String>,
        message_type: MessageType,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            message_type,
            session_id: session_id.into(),
        }
    }

    /// Origin of a group conversation.
    pub fn group(platform: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self::new(platform, MessageType::GroupMessage, group_id)
    }
}

impl fmt::Display for UnifiedOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.platform,
            self.message_type.as_str(),
            self.session_id
        )
    }
}

impl FromStr for UnifiedOrigin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(platform), Some(kind), Some(session)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidOrigin(s.to_string()));
        };

        if platform.is_empty() || session.is_empty() {
            return Err(Error::InvalidOrigin(s.to_string()));
        }

        Ok(Self {
            platform: platform.to_string(),
            message_type: kind.parse()?,
            session_id: session.to_string(),
        })
    }
}

/// 消息事件：来源、发送者、文本内容
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub origin: UnifiedOrigin,
    pub sender_id: Option<String>,
    pub message: String,
    /// Set by the dispatcher once any handler has replied to this event.
    pub replied: bool,
}

impl MessageEvent {
    pub fn new(origin: UnifiedOrigin) -> Self {
        Self {
            origin,
            sender_id: None,
            message: String::new(),
            replied: false,
        }
    }

    /// Group message on `platform` from `group_id`.
    pub fn group(platform: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self::new(UnifiedOrigin::group(platform, group_id))
    }

    /// Private message on `platform` from `user_id`.
    pub fn private(platform: impl Into<String>, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self::new(UnifiedOrigin::new(
            platform,
            MessageType::FriendMessage,
            user_id.clone(),
        ))
        .sender_id(user_id)
    }

    pub fn sender_id(mut self, id: impl Into<String>) -> Self {
        self.sender_id = Some(id.into());
        self
    }

    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = msg.into();
        self
    }

    #[inline]
    pub fn is_group(&self) -> bool {
        self.origin.message_type == MessageType::GroupMessage
    }

    /// Group id (None for non-group messages)
    #[inline]
    pub fn group_id(&self) -> Option<&str> {
        self.is_group().then_some(self.origin.session_id.as_str())
    }
}

/// Everything the host can tell a plugin about.
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// The host finished loading all plugins.
    Started,
    PluginLoaded(PluginMetadata),
    PluginUnloaded(PluginMetadata),
    Message(MessageEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_round_trips_through_display() {
        let origin = UnifiedOrigin::group("default", "114514");
        assert_eq!(origin.to_string(), "default:GroupMessage:114514");
        assert_eq!(origin.to_string().parse::<UnifiedOrigin>().unwrap(), origin);
    }

    #[test]
    fn origin_session_keeps_extra_separators() {
        let origin: UnifiedOrigin = "qq:FriendMessage:a:b".parse().unwrap();
        assert_eq!(origin.message_type, MessageType::FriendMessage);
        assert_eq!(origin.session_id, "a:b");
    }

    #[test]
    fn origin_rejects_malformed_input() {
        assert!("default:GroupMessage".parse::<UnifiedOrigin>().is_err());
        assert!("default:Nope:1".parse::<UnifiedOrigin>().is_err());
        assert!(":GroupMessage:1".parse::<UnifiedOrigin>().is_err());
    }

    #[test]
    fn group_id_only_for_group_messages() {
        let group = MessageEvent::group("default", "42").message("hi");
        assert_eq!(group.group_id(), Some("42"));

        let private = MessageEvent::private("default", "7").message("hi");
        assert_eq!(private.group_id(), None);
        assert_eq!(private.sender_id.as_deref(), Some("7"));
    }
}
