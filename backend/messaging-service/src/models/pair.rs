//! Canonical two-party conversation key.
//!
//! A conversation between `a` and `b` is stored under exactly one key no
//! matter which side initiates: the lexicographically smaller id (compared
//! as canonical lowercase-hyphenated strings) becomes `low`, the other
//! `high`. Every path that reads or writes a conversation goes through this
//! type; an asymmetry anywhere would mint ghost duplicate rows.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairError {
    #[error("a conversation requires two distinct participants")]
    SelfConversation,
}

/// Which watermark slot a participant occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationKey {
    low: Uuid,
    high: Uuid,
}

impl ConversationKey {
    pub fn new(a: Uuid, b: Uuid) -> Result<Self, PairError> {
        if a == b {
            return Err(PairError::SelfConversation);
        }
        // Canonical hyphenated form is lowercase hex, so string order and
        // byte order agree; the store's CHECK (user_low < user_high)
        // compares the same way.
        if a.to_string() < b.to_string() {
            Ok(Self { low: a, high: b })
        } else {
            Ok(Self { low: b, high: a })
        }
    }

    pub fn low(&self) -> Uuid {
        self.low
    }

    pub fn high(&self) -> Uuid {
        self.high
    }

    pub fn slot_of(&self, user: Uuid) -> Option<Slot> {
        if user == self.low {
            Some(Slot::Low)
        } else if user == self.high {
            Some(Slot::High)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(
            ConversationKey::new(a, b).unwrap(),
            ConversationKey::new(b, a).unwrap()
        );
    }

    #[test]
    fn test_low_is_strictly_smaller() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let key = ConversationKey::new(a, b).unwrap();
        assert!(key.low().to_string() < key.high().to_string());
    }

    #[test]
    fn test_self_pair_rejected() {
        let a = Uuid::new_v4();
        assert_eq!(
            ConversationKey::new(a, a),
            Err(PairError::SelfConversation)
        );
    }

    #[test]
    fn test_slot_resolution() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let key = ConversationKey::new(b, a).unwrap();
        assert_eq!(key.slot_of(a), Some(Slot::Low));
        assert_eq!(key.slot_of(b), Some(Slot::High));
        assert_eq!(key.slot_of(Uuid::from_u128(3)), None);
    }
}
