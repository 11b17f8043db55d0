use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Author of a transcript entry. Only the two conversational roles exist;
/// the datastore rejects anything else on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Label shown above the message body.
    pub fn display_name(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_assistant(self) -> bool {
        self == Role::Assistant
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(format!("invalid message role: {value}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// A persisted conversation turn. `id` and `created_at` are assigned by the
/// datastore; nothing mutates a message after it has been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_assistant(&self) -> bool {
        self.role.is_assistant()
    }

    /// Wall-clock time of creation in the local timezone, e.g. `14:03:27`.
    pub fn local_time_label(&self) -> String {
        self.created_at
            .with_timezone(&Local)
            .format("%H:%M:%S")
            .to_string()
    }
}

/// Insert payload; the datastore fills in the rest of the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMessage {
    pub role: Role,
    pub content: String,
}

impl NewMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_role_strings_are_rejected() {
        assert!(Role::try_from("system").is_err());
        assert!(Role::try_from("app/info").is_err());
    }

    #[test]
    fn row_deserializes_from_datastore_json() {
        let row = r#"{
            "id": "0b7e6f3a-2c1d-4a55-9e0a-3f1f2d4c5b6a",
            "role": "assistant",
            "content": "Hi there!",
            "created_at": "2024-05-01T12:30:00.123456+00:00"
        }"#;
        let message: Message = serde_json::from_str(row).expect("row parses");
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "Hi there!");
        assert_eq!(message.created_at.timestamp(), 1_714_566_600);
    }

    #[test]
    fn unknown_role_in_row_fails_to_parse() {
        let row = r#"{"id":"1","role":"system","content":"x","created_at":"2024-05-01T12:30:00Z"}"#;
        assert!(serde_json::from_str::<Message>(row).is_err());
    }

    #[test]
    fn new_message_serializes_role_as_string() {
        let payload = serde_json::to_value(NewMessage::user("Hello")).unwrap();
        assert_eq!(payload, serde_json::json!({"role": "user", "content": "Hello"}));
    }

    #[test]
    fn display_names_match_transcript_labels() {
        assert_eq!(Role::User.display_name(), "You");
        assert_eq!(Role::Assistant.display_name(), "Assistant");
    }
}
