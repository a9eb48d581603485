/// Who authored a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Role tag used when serializing history into a generation request.
    /// The generation API calls the assistant side "model".
    pub fn wire_name(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "model",
        }
    }
}

/// One entry in the append-only conversation log.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: String) -> Self {
        Self { role: Role::User, content }
    }

    pub fn assistant(content: String) -> Self {
        Self { role: Role::Assistant, content }
    }
}

/// Current time in milliseconds since the UNIX epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_name_maps_assistant_to_model() {
        assert_eq!(Role::User.wire_name(), "user");
        assert_eq!(Role::Assistant.wire_name(), "model");
    }

    #[test]
    fn constructors_set_role() {
        assert_eq!(Message::user("hi".into()).role, Role::User);
        assert_eq!(Message::assistant("yo".into()).role, Role::Assistant);
    }
}
