//! Per-request caller context.

use core::fmt;

use secrecy::SecretString;

use super::id::{ShopId, UserId};

/// An action the gateway can perform against the carrier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// `so` - submit a stored order to the carrier.
    Submit,
    /// `po` - fetch the printable label of a submitted order.
    Print,
    /// `co` - cancel a submitted shipment.
    Cancel,
    /// `vs` - quote the shipping fee for an ad-hoc order.
    Quote,
    /// `vl` - reconstruct the status log of a shipment label.
    ViewLog,
    /// Any code the gateway does not recognise.
    Unknown(String),
}

impl Action {
    /// Parse a wire action code. Never fails; unknown codes are preserved.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "so" => Self::Submit,
            "po" => Self::Print,
            "co" => Self::Cancel,
            "vs" => Self::Quote,
            "vl" => Self::ViewLog,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The wire code for this action.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Submit => "so",
            Self::Print => "po",
            Self::Cancel => "co",
            Self::Quote => "vs",
            Self::ViewLog => "vl",
            Self::Unknown(code) => code,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Caller identity and request payload, built per request and never stored.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub session_token: SecretString,
    pub user_id: UserId,
    pub shop_id: ShopId,
    pub action: Action,
    /// Action-specific payload: an order id, a JSON order, or a label.
    pub params: String,
}
