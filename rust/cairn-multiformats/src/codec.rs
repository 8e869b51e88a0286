//! Multicodec content-type codes used by content identifiers.

/// Raw bytes.
pub const RAW: u64 = 0x55;

/// Legacy protobuf DAG nodes, the only content type CIDv0 can express.
pub const DAG_PB: u64 = 0x70;

/// Canonical binary objects (DAG-CBOR).
pub const DAG_CBOR: u64 = 0x71;

/// Content archives (CARv1).
pub const CAR: u64 = 0x0202;
