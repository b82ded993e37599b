use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingFormError {
    #[error("directory request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("directory returned status {status}: {body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode directory response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid time value '{value}' in directory response")]
    InvalidTime { value: String },

    #[error("booking form engine has stopped")]
    EngineStopped,
}
