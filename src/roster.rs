use serde::{Deserialize, Serialize};
use std::fmt;

/// Roster arrays shared by game sessions and campaigns. A player id lives in
/// at most one array at a time; every mutation strips the id everywhere before
/// inserting it anywhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub pending_players: Vec<String>,
    #[serde(default)]
    pub signed_up_players: Vec<String>,
    #[serde(default)]
    pub waitlist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Pending,
    SignedUp,
    Waitlisted,
    /// Player removed; carries the waitlisted id promoted into the freed slot,
    /// if any.
    Removed { promoted: Option<String> },
}

#[derive(Debug, PartialEq)]
pub enum RosterError {
    AlreadyJoined,
    NotPending,
    NotMember,
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::AlreadyJoined => write!(f, "Player already joined this session"),
            RosterError::NotPending => write!(f, "Player has no pending request"),
            RosterError::NotMember => write!(f, "Player is not on this roster"),
        }
    }
}

impl Roster {
    pub fn contains(&self, user_id: &str) -> bool {
        self.pending_players.iter().any(|id| id == user_id)
            || self.signed_up_players.iter().any(|id| id == user_id)
            || self.waitlist.iter().any(|id| id == user_id)
    }

    fn strip(&mut self, user_id: &str) {
        self.pending_players.retain(|id| id != user_id);
        self.signed_up_players.retain(|id| id != user_id);
        self.waitlist.retain(|id| id != user_id);
    }

    fn has_open_slot(&self, max_players: u32) -> bool {
        self.signed_up_players.len() < max_players as usize
    }

    /// Join request from a player. Pending when the host requires approval,
    /// otherwise straight to signed-up (or the waitlist when full).
    pub fn join(
        &mut self,
        user_id: &str,
        require_approval: bool,
        max_players: u32,
    ) -> Result<Placement, RosterError> {
        if self.contains(user_id) {
            return Err(RosterError::AlreadyJoined);
        }
        if require_approval {
            self.pending_players.push(user_id.to_string());
            Ok(Placement::Pending)
        } else if self.has_open_slot(max_players) {
            self.signed_up_players.push(user_id.to_string());
            Ok(Placement::SignedUp)
        } else {
            self.waitlist.push(user_id.to_string());
            Ok(Placement::Waitlisted)
        }
    }

    /// Host approval of a pending request.
    pub fn approve(&mut self, user_id: &str, max_players: u32) -> Result<Placement, RosterError> {
        if !self.pending_players.iter().any(|id| id == user_id) {
            return Err(RosterError::NotPending);
        }
        self.strip(user_id);
        if self.has_open_slot(max_players) {
            self.signed_up_players.push(user_id.to_string());
            Ok(Placement::SignedUp)
        } else {
            self.waitlist.push(user_id.to_string());
            Ok(Placement::Waitlisted)
        }
    }

    /// Host denial of a pending request.
    pub fn deny(&mut self, user_id: &str) -> Result<Placement, RosterError> {
        if !self.pending_players.iter().any(|id| id == user_id) {
            return Err(RosterError::NotPending);
        }
        self.strip(user_id);
        Ok(Placement::Removed { promoted: None })
    }

    /// Removes a player from whichever array holds them. When a signed-up slot
    /// opens and the waitlist is non-empty, the head of the waitlist takes it.
    pub fn remove(&mut self, user_id: &str) -> Result<Placement, RosterError> {
        if !self.contains(user_id) {
            return Err(RosterError::NotMember);
        }
        let was_signed_up = self.signed_up_players.iter().any(|id| id == user_id);
        self.strip(user_id);

        let promoted = if was_signed_up && !self.waitlist.is_empty() {
            let next = self.waitlist.remove(0);
            self.signed_up_players.push(next.clone());
            Some(next)
        } else {
            None
        };

        Ok(Placement::Removed { promoted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster_with(pending: &[&str], signed_up: &[&str], waitlist: &[&str]) -> Roster {
        Roster {
            pending_players: pending.iter().map(|s| s.to_string()).collect(),
            signed_up_players: signed_up.iter().map(|s| s.to_string()).collect(),
            waitlist: waitlist.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_join_without_approval_signs_up() {
        let mut roster = Roster::default();
        let placement = roster.join("alice", false, 4).unwrap();

        assert_eq!(placement, Placement::SignedUp);
        assert_eq!(roster.signed_up_players, vec!["alice"]);
        assert!(roster.pending_players.is_empty());
    }

    #[test]
    fn test_join_with_approval_goes_pending() {
        let mut roster = Roster::default();
        let placement = roster.join("alice", true, 4).unwrap();

        assert_eq!(placement, Placement::Pending);
        assert_eq!(roster.pending_players, vec!["alice"]);
        assert!(roster.signed_up_players.is_empty());
    }

    #[test]
    fn test_join_full_session_waitlists() {
        let mut roster = roster_with(&[], &["a", "b"], &[]);
        let placement = roster.join("carol", false, 2).unwrap();

        assert_eq!(placement, Placement::Waitlisted);
        assert_eq!(roster.waitlist, vec!["carol"]);
    }

    #[test]
    fn test_join_twice_rejected() {
        let mut roster = Roster::default();
        roster.join("alice", true, 4).unwrap();

        assert_eq!(roster.join("alice", true, 4), Err(RosterError::AlreadyJoined));
        assert_eq!(roster.join("alice", false, 4), Err(RosterError::AlreadyJoined));
    }

    #[test]
    fn test_approve_moves_pending_to_signed_up_exactly_once() {
        let mut roster = roster_with(&["alice"], &[], &[]);
        let placement = roster.approve("alice", 4).unwrap();

        assert_eq!(placement, Placement::SignedUp);
        assert!(roster.pending_players.is_empty(), "approve should clear pending");
        assert_eq!(roster.signed_up_players, vec!["alice"]);
        assert_eq!(
            roster.signed_up_players.iter().filter(|id| *id == "alice").count(),
            1,
            "player should appear exactly once"
        );
    }

    #[test]
    fn test_approve_into_full_session_waitlists() {
        let mut roster = roster_with(&["carol"], &["a", "b"], &[]);
        let placement = roster.approve("carol", 2).unwrap();

        assert_eq!(placement, Placement::Waitlisted);
        assert_eq!(roster.waitlist, vec!["carol"]);
        assert!(roster.pending_players.is_empty());
    }

    #[test]
    fn test_approve_requires_pending_state() {
        let mut roster = roster_with(&[], &["alice"], &[]);
        assert_eq!(roster.approve("alice", 4), Err(RosterError::NotPending));
        assert_eq!(roster.approve("nobody", 4), Err(RosterError::NotPending));
    }

    #[test]
    fn test_deny_drops_pending_player() {
        let mut roster = roster_with(&["alice"], &[], &[]);
        let placement = roster.deny("alice").unwrap();

        assert_eq!(placement, Placement::Removed { promoted: None });
        assert!(!roster.contains("alice"));
    }

    #[test]
    fn test_remove_signed_up_promotes_waitlist_head() {
        let mut roster = roster_with(&[], &["alice", "bob"], &["carol", "dave"]);
        let placement = roster.remove("alice").unwrap();

        assert_eq!(
            placement,
            Placement::Removed {
                promoted: Some("carol".to_string())
            }
        );
        assert_eq!(roster.signed_up_players, vec!["bob", "carol"]);
        assert_eq!(roster.waitlist, vec!["dave"]);
    }

    #[test]
    fn test_remove_waitlisted_player_promotes_nobody() {
        let mut roster = roster_with(&[], &["alice"], &["bob", "carol"]);
        let placement = roster.remove("bob").unwrap();

        assert_eq!(placement, Placement::Removed { promoted: None });
        assert_eq!(roster.waitlist, vec!["carol"]);
        assert_eq!(roster.signed_up_players, vec!["alice"]);
    }

    #[test]
    fn test_remove_unknown_player_rejected() {
        let mut roster = roster_with(&[], &["alice"], &[]);
        assert_eq!(roster.remove("nobody"), Err(RosterError::NotMember));
    }

    #[test]
    fn test_arrays_stay_mutually_exclusive() {
        let mut roster = Roster::default();
        roster.join("alice", true, 1).unwrap();
        roster.approve("alice", 1).unwrap();
        roster.join("bob", true, 1).unwrap();
        roster.approve("bob", 1).unwrap();
        roster.remove("alice").unwrap();

        for id in ["alice", "bob"] {
            let appearances = roster.pending_players.iter().filter(|p| *p == id).count()
                + roster.signed_up_players.iter().filter(|p| *p == id).count()
                + roster.waitlist.iter().filter(|p| *p == id).count();
            assert!(appearances <= 1, "{} appears {} times", id, appearances);
        }
        assert_eq!(roster.signed_up_players, vec!["bob"], "bob promoted off waitlist");
    }
}
