//! Identity and addressing primitives shared by every other layer.

pub mod actor;
pub mod errors;
pub mod hash;
pub mod ids;

pub use actor::ActorId;
pub use errors::IdError;
pub use hash::ChangeHash;
pub use ids::{Anchor, Cursor, ElemId, Key, ObjId, OpId, Prop};
