//! Offer status workflow with an audit trail.
//!
//! Offers move between statuses on the sales board. Any move is allowed
//! except a no-op and a move out of a terminal status; every accepted move
//! is appended to the offer's history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::error::LeasingError;
use crate::LeasingResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Draft,
    Sent,
    InfoRequested,
    /// Validated internally, ready for the leaser
    ValidItc,
    LeaserReview,
    Approved,
    Financed,
    Rejected,
}

impl OfferStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OfferStatus::Financed | OfferStatus::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OfferStatus::Draft => "draft",
            OfferStatus::Sent => "sent",
            OfferStatus::InfoRequested => "info_requested",
            OfferStatus::ValidItc => "valid_itc",
            OfferStatus::LeaserReview => "leaser_review",
            OfferStatus::Approved => "approved",
            OfferStatus::Financed => "financed",
            OfferStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accepted status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: OfferStatus,
    pub to: OfferStatus,
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRecord {
    pub id: String,
    pub client_name: String,
    pub status: OfferStatus,
    #[serde(default)]
    pub history: Vec<StatusChange>,
}

impl OfferRecord {
    pub fn new(id: impl Into<String>, client_name: impl Into<String>) -> Self {
        OfferRecord {
            id: id.into(),
            client_name: client_name.into(),
            status: OfferStatus::Draft,
            history: Vec::new(),
        }
    }
}

/// Request body for a status change, as sent by the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionInput {
    pub offer: OfferRecord,
    pub to: OfferStatus,
    pub actor: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Move `offer` to `to`, recording who did it and when.
pub fn transition_offer(
    offer: &mut OfferRecord,
    to: OfferStatus,
    actor: &str,
    reason: Option<String>,
    at: DateTime<Utc>,
) -> LeasingResult<StatusChange> {
    let from = offer.status;

    if from == to {
        return Err(invalid(from, to, "offer already has this status"));
    }
    if from.is_terminal() {
        return Err(invalid(from, to, "offer is in a terminal status"));
    }
    if actor.trim().is_empty() {
        return Err(LeasingError::InvalidInput {
            field: "actor".into(),
            reason: "Status changes must be attributed.".into(),
        });
    }

    let change = StatusChange {
        from,
        to,
        actor: actor.to_string(),
        reason,
        at,
    };
    offer.status = to;
    offer.history.push(change.clone());

    info!(offer = %offer.id, %from, %to, actor, "offer status changed");
    Ok(change)
}

fn invalid(from: OfferStatus, to: OfferStatus, reason: &str) -> LeasingError {
    LeasingError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_transition_appends_history() {
        let mut offer = OfferRecord::new("OFF-1", "Acme");
        let change =
            transition_offer(&mut offer, OfferStatus::Sent, "alice", None, at()).unwrap();
        assert_eq!(change.from, OfferStatus::Draft);
        assert_eq!(offer.status, OfferStatus::Sent);
        assert_eq!(offer.history, vec![change]);
    }

    #[test]
    fn test_backwards_move_allowed() {
        let mut offer = OfferRecord::new("OFF-2", "Acme");
        transition_offer(&mut offer, OfferStatus::LeaserReview, "bob", None, at()).unwrap();
        transition_offer(
            &mut offer,
            OfferStatus::InfoRequested,
            "bob",
            Some("missing balance sheet".into()),
            at(),
        )
        .unwrap();
        assert_eq!(offer.status, OfferStatus::InfoRequested);
        assert_eq!(offer.history.len(), 2);
    }

    #[test]
    fn test_same_status_rejected() {
        let mut offer = OfferRecord::new("OFF-3", "Acme");
        let err = transition_offer(&mut offer, OfferStatus::Draft, "bob", None, at()).unwrap_err();
        assert!(matches!(err, LeasingError::InvalidTransition { .. }));
        assert!(offer.history.is_empty());
    }

    #[test]
    fn test_terminal_status_is_final() {
        let mut offer = OfferRecord::new("OFF-4", "Acme");
        transition_offer(&mut offer, OfferStatus::Rejected, "carol", None, at()).unwrap();
        let err = transition_offer(&mut offer, OfferStatus::Sent, "carol", None, at()).unwrap_err();
        assert!(matches!(err, LeasingError::InvalidTransition { ref from, .. } if from == "rejected"));
        assert_eq!(offer.history.len(), 1);
    }

    #[test]
    fn test_blank_actor_rejected() {
        let mut offer = OfferRecord::new("OFF-5", "Acme");
        let err = transition_offer(&mut offer, OfferStatus::Sent, "  ", None, at()).unwrap_err();
        assert!(matches!(err, LeasingError::InvalidInput { .. }));
        assert_eq!(offer.status, OfferStatus::Draft);
    }
}
