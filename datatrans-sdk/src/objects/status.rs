use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::UnknownValue;

/// Lifecycle status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Initialized,
    ChallengeRequired,
    ChallengeOngoing,
    Authenticated,
    Authorized,
    Settled,
    Transmitted,
    Failed,
    Canceled,
}

impl Status {
    pub const ALL: [Status; 9] = [
        Status::Initialized,
        Status::ChallengeRequired,
        Status::ChallengeOngoing,
        Status::Authenticated,
        Status::Authorized,
        Status::Settled,
        Status::Transmitted,
        Status::Failed,
        Status::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Initialized => "initialized",
            Status::ChallengeRequired => "challenge_required",
            Status::ChallengeOngoing => "challenge_ongoing",
            Status::Authenticated => "authenticated",
            Status::Authorized => "authorized",
            Status::Settled => "settled",
            Status::Transmitted => "transmitted",
            Status::Failed => "failed",
            Status::Canceled => "canceled",
        }
    }

    /// Whether the money has been (or is being) moved.
    pub fn is_paid(&self) -> bool {
        matches!(self, Status::Settled | Status::Transmitted)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownValue {
                kind: "status",
                value: s.to_owned(),
            })
    }
}
