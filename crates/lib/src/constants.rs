//! Constants used throughout the Accord library.
//!
//! Central definitions for reserved identifiers, binary format framing and
//! sync protocol parameters.

/// Textual id of the root map.
pub const ROOT_OBJ: &str = "_root";

/// Textual form of a cursor bound to the start of a sequence.
pub const START_CURSOR: &str = "_start";

/// Length in bytes of an actor id.
pub const ACTOR_ID_LEN: usize = 16;

/// Length in bytes of a change hash.
pub const HASH_LEN: usize = 32;

/// Leading bytes of every binary blob this crate produces.
pub const MAGIC: [u8; 4] = [0x85, 0x6f, 0x4a, 0x83];

/// Chunk type of a full document snapshot.
pub const CHUNK_DOCUMENT: u8 = 0x00;

/// Chunk type of a single encoded change.
pub const CHUNK_CHANGE: u8 = 0x01;

/// Chunk type of an incremental save.
pub const CHUNK_INCREMENTAL: u8 = 0x02;

/// Chunk type of a sync message.
pub const CHUNK_SYNC_MESSAGE: u8 = 0x42;

/// Chunk type of a persisted sync state.
pub const CHUNK_SYNC_STATE: u8 = 0x43;

/// Snapshot body format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Bloom filter bits allocated per summarized change.
pub const BLOOM_BITS_PER_ENTRY: usize = 10;

/// Number of probes per bloom filter entry.
pub const BLOOM_PROBES: usize = 7;

/// Largest number of bit positions per hash accepted from a peer's filter.
pub const MAX_BLOOM_PROBES: u32 = 32;

/// Largest bits-per-entry accepted from a peer's filter.
pub const MAX_BLOOM_BITS_PER_ENTRY: u32 = 64;

/// Default cap on sync rounds in [`crate::sync::sync_documents`].
pub const MAX_SYNC_ROUNDS: usize = 100;

/// Largest integer magnitude an `f64` represents exactly.
pub const MAX_SAFE_INTEGER: u64 = 1 << 53;
