//! `ikecore`: the IKE Peer Identity Core and Address Pool Core.
//!
//! - [`identity`] — RFC 2407 DOI §4.6.2.1 peer identities: textual parsing,
//!   canonical formatting, exact and wildcard-aware comparison, X.509
//!   Distinguished Name matching.
//! - [`pool`] — the lease allocator IKEv1 XAUTH/Mode-Config and IKEv2 CFG
//!   payload exchanges use to assign addresses to remote peers.
//! - [`error`] — the shared `CoreError`/`CoreResult` used throughout.
//! - [`net`] — network-byte-order arithmetic shared by the pool's
//!   lease-to-address mapping.
//! - [`util`] — small helpers (byte-chunk debug printing, name folding)
//!   shared across both cores.
pub mod error;
pub mod identity;
pub mod macros;
pub mod net;
pub mod pool;
pub mod util;
