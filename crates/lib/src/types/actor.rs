//! Actor identities.
//!
//! An actor is one writing session. Every op and change is tagged with the
//! actor that produced it, and two actors must never share an id while
//! editing diverging histories.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::IdError;
use crate::constants::ACTOR_ID_LEN;

/// A fixed-length identifier for a writing session.
///
/// Rendered as lowercase hex for display and accepted back in that form.
///
/// ```
/// use accord::ActorId;
///
/// let actor = ActorId::random();
/// let parsed: ActorId = actor.to_hex().parse().unwrap();
/// assert_eq!(actor, parsed);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId([u8; ACTOR_ID_LEN]);

impl ActorId {
    /// Generate a fresh random actor id.
    pub fn random() -> Self {
        Self(Uuid::new_v4().into_bytes())
    }

    /// Build an actor id from exactly [`ACTOR_ID_LEN`] bytes.
    pub fn from_bytes(bytes: [u8; ACTOR_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// The raw bytes of this actor id.
    pub fn as_bytes(&self) -> &[u8; ACTOR_ID_LEN] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The first eight hex characters, for log lines and tables.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl TryFrom<&[u8]> for ActorId {
    type Error = IdError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; ACTOR_ID_LEN] =
            bytes.try_into().map_err(|_| IdError::InvalidActor {
                reason: format!("expected {ACTOR_ID_LEN} bytes, got {}", bytes.len()),
            })?;
        Ok(Self(array))
    }
}

impl TryFrom<Vec<u8>> for ActorId {
    type Error = IdError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(bytes.as_slice())
    }
}

impl FromStr for ActorId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| IdError::InvalidActor {
            reason: format!("not valid hex: {e}"),
        })?;
        Self::try_from(bytes.as_slice())
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.to_hex())
    }
}
