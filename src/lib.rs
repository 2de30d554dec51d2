/// Feed Client - Market Data Retrieval over TCP
///
/// Client for a custom binary feed protocol. Features include:
/// - Fixed-frame request encoding and packet decoding
/// - Bulk stream retrieval with carryover framing across reads
/// - Sequence-gap detection and per-sequence recovery requests
/// - Bounded retry with configurable delays per phase
/// - JSON export of the final ordered packet collection

pub mod codec;
pub mod config;
pub mod export;
pub mod protocol;
pub mod session;
pub mod stats;
pub mod tracker;

pub use codec::{CodecError, WireCodec};
pub use config::FeedConfig;
pub use export::{write_packets_json, ExportError};
pub use protocol::{CallType, Packet, PACKET_SIZE, SYMBOL_SIZE};
pub use session::{FeedSession, SessionError};
pub use stats::FeedStats;
pub use tracker::{SequenceTracker, SEQUENCE_FLOOR};
