use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown key `{0}`")]
    UnknownKey(String),

    #[error("invalid value `{value}` for `{key}`; expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("value `{value}` for `{key}` is out of range; expected {range}")]
    OutOfRange {
        key: String,
        value: String,
        range: &'static str,
    },
}
