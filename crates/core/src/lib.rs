#![forbid(unsafe_code)]

pub mod branch;
pub mod message;
pub mod model;

pub use branch::*;
pub use message::*;
pub use model::*;

pub mod ids {
    pub const MAX_KEY_PART_LEN: usize = 256;
    const MAX_AGENT_ID_LEN: usize = 128;

    #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct UserId(String);

    impl UserId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn into_string(self) -> String {
            self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, IdError> {
            let value = value.into();
            validate_opaque(&value, MAX_KEY_PART_LEN)?;
            Ok(Self(value))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct BlockLabel(String);

    impl BlockLabel {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn into_string(self) -> String {
            self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, IdError> {
            let value = value.into();
            validate_opaque(&value, MAX_KEY_PART_LEN)?;
            Ok(Self(value))
        }
    }

    /// Agent identity as it appears after the `agent:` author prefix.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct AgentId(String);

    impl AgentId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn into_string(self) -> String {
            self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, IdError> {
            let value = value.into();
            validate_opaque(&value, MAX_AGENT_ID_LEN)?;
            if value.chars().any(char::is_whitespace) {
                return Err(IdError::ContainsWhitespace);
            }
            Ok(Self(value))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum IdError {
        Empty,
        TooLong,
        ContainsControl,
        ContainsWhitespace,
    }

    impl IdError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::Empty => "identifier must not be empty",
                Self::TooLong => "identifier is too long",
                Self::ContainsControl => "identifier contains control characters",
                Self::ContainsWhitespace => "identifier must not contain whitespace",
            }
        }
    }

    fn validate_opaque(value: &str, max_len: usize) -> Result<(), IdError> {
        if value.trim().is_empty() {
            return Err(IdError::Empty);
        }
        if value.len() > max_len {
            return Err(IdError::TooLong);
        }
        if value.chars().any(|c| c.is_control()) {
            return Err(IdError::ContainsControl);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
