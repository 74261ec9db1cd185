//! RFC 5444 packet/message/TLV reader and writer, specialized for AODVv2's
//! RREQ and RREP schema.
//!
//! This is a from-scratch codec over [`bytes`] rather than a binding to a
//! third-party RFC 5444 library - no conformant crate for the format
//! turned up in this workspace's dependency corpus, so the packet, message,
//! address-block and TLV-block layout is implemented by hand, in the
//! `octs`-style encode/decode shape: one inherent `write`/`read` method
//! pair per codec type, no trait object indirection.
//!
//! Every message this codec reads or writes carries exactly one RREQ or
//! RREP, with exactly two addresses (`OrigNode` then `TargNode`) in its
//! address block - this engine never needs more than one message per
//! packet or more than two addresses per message.

pub mod reader;
pub mod tlv;
pub mod writer;

pub use reader::Reader;
pub use writer::{OutboundMessage, Writer};
