//! The uniform result envelope returned to callers.
//!
//! Every action answers with the same four positional fields. Callers treat
//! `code == "1"` as success and read the payload from `dataA`/`dataB`;
//! any other code is a failure described by `message`.

use serde::{Deserialize, Serialize};

/// Outcome code carried in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCode {
    /// The requested action does not exist.
    #[serde(rename = "-5")]
    ActionNotFound,
    /// The shop is disabled (or unknown).
    #[serde(rename = "-4")]
    ShopDisabled,
    /// Validation, carrier or storage failure.
    #[serde(rename = "0")]
    Failure,
    #[serde(rename = "1")]
    Success,
}

impl ResultCode {
    /// The wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActionNotFound => "-5",
            Self::ShopDisabled => "-4",
            Self::Failure => "0",
            Self::Success => "1",
        }
    }
}

/// `{code, message, dataA, dataB}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub code: ResultCode,
    pub message: String,
    #[serde(rename = "dataA")]
    pub data_a: String,
    #[serde(rename = "dataB")]
    pub data_b: String,
}

impl ResultEnvelope {
    /// A successful result with its payload.
    #[must_use]
    pub fn success(data_a: impl Into<String>, data_b: impl Into<String>) -> Self {
        Self {
            code: ResultCode::Success,
            message: String::new(),
            data_a: data_a.into(),
            data_b: data_b.into(),
        }
    }

    /// A failed result carrying a human-readable message and no data.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::coded(ResultCode::Failure, message)
    }

    #[must_use]
    pub fn shop_disabled() -> Self {
        Self::coded(ResultCode::ShopDisabled, "Shop is disabled.")
    }

    #[must_use]
    pub fn action_not_found() -> Self {
        Self::coded(ResultCode::ActionNotFound, "Action not found.")
    }

    fn coded(code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data_a: String::new(),
            data_b: String::new(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == ResultCode::Success
    }

    /// Encode for the wire.
    ///
    /// The envelope holds only strings and a unit code, so serialization
    /// cannot fail.
    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
