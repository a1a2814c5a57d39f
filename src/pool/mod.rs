//! Address Pool Core: a lease allocator that hands out single IP addresses
//! from configured ranges to remote peers during IKE configuration
//! exchanges, with lease reuse by identity, pool growth, reference
//! counting, and overlap detection across concurrently-declared pools.
//!
//! - [`arena`] — the lease slot array and its two intrusive doubly-linked
//!   structures (free list, per-bucket reusable chains).
//! - [`lease`] — acquisition and release, layered over the arena.
//! - [`registry`] — process-wide install/find/reference bookkeeping across
//!   every currently-installed pool.
pub mod arena;
pub mod lease;
pub mod registry;

pub use arena::{BucketHead, LeaseSlot, ListLink, Pool};
pub use lease::{lease_an_address, rel_lease_addr, AuthMethod, LeaseRequest};
pub use registry::{find_addresspool, install_addresspool, reference_addresspool, unreference_addresspool, with_pool, PoolId};
