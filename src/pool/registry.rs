//! Pool registry: process-wide state tracking every installed address pool,
//! with overlap detection at install time and reference counting across
//! connections that share a pool's configured range. Pools live in a
//! `HashMap<PoolId, Pool>` behind a `Mutex`/`OnceLock` singleton; `PoolId`
//! is the explicit handle a connection carries instead of a raw pointer.
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};

use log::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::net::pool_size;
use crate::pool::arena::Pool;

/// Opaque handle a connection carries in place of a raw pool pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolId(u64);

fn registry() -> &'static Mutex<HashMap<PoolId, Pool>> {
    static REGISTRY: OnceLock<Mutex<HashMap<PoolId, Pool>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

fn lock() -> MutexGuard<'static, HashMap<PoolId, Pool>> {
    registry().lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn next_pool_id() -> PoolId {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    PoolId(NEXT.fetch_add(1, Ordering::Relaxed))
}

/// An exact match on both endpoints returns the existing pool to be reused;
/// a range strictly before or strictly after an existing pool is skipped;
/// anything else is a partial overlap, logged and returned as
/// `CoreError::PoolOverlap`.
pub fn find_addresspool(range: (IpAddr, IpAddr)) -> CoreResult<Option<PoolId>> {
    let reg = lock();
    for (&id, pool) in reg.iter() {
        let (existing_start, existing_end) = pool.range;
        if range.0 == existing_start && range.1 == existing_end {
            return Ok(Some(id));
        }
        if range.1 < existing_start || range.0 > existing_end {
            continue;
        }
        warn!("ERROR: partial overlap of addresspool");
        return Err(CoreError::PoolOverlap);
    }
    Ok(None)
}

/// Preconditions (range excludes the all-zeros address, range is
/// non-empty) are enforced by the caller. Reuses an exact-match pool
/// (bumping its reference count) rather than installing a duplicate.
pub fn install_addresspool(range: (IpAddr, IpAddr)) -> CoreResult<PoolId> {
    if let Some(id) = find_addresspool(range)? {
        reference_addresspool(id);
        debug!("reusing installed addresspool {:?} for {:?}", id, range);
        return Ok(id);
    }

    let (size, truncated) = pool_size(range);
    if truncated {
        warn!("addresspool {}-{} truncated to {} addresses (32-bit index space exceeded)", range.0, range.1, size);
    }
    let mut pool = Pool::empty(range, size, truncated);
    pool.pool_refcount = 1;

    let id = next_pool_id();
    lock().insert(id, pool);
    debug!("installed addresspool {:?}: {}-{} ({} addresses)", id, range.0, range.1, size);
    Ok(id)
}

/// Increment `pool_refcount` for an already-installed pool. An unknown
/// `PoolId` is a caller bug, an internal invariant violation, and panics
/// rather than returning `Err`.
pub fn reference_addresspool(id: PoolId) {
    let mut reg = lock();
    let pool = reg.get_mut(&id).expect("reference_addresspool: unknown pool id");
    pool.pool_refcount += 1;
}

/// Decrement `pool_refcount`; on drop to zero, unlink the pool from the
/// registry, dropping its lease array (and every lingering `reusable_name`
/// with it).
pub fn unreference_addresspool(id: PoolId) {
    let mut reg = lock();
    let drop_it = {
        let pool = reg.get_mut(&id).expect("unreference_addresspool: unknown pool id");
        pool.pool_refcount = pool.pool_refcount.checked_sub(1).expect("unreference_addresspool: refcount underflow");
        pool.pool_refcount == 0
    };
    if drop_it {
        reg.remove(&id);
        debug!("freed addresspool {:?}", id);
    }
}

/// Run `f` against the installed pool `id`. Lease acquisition/release and
/// any other per-pool mutation go through here rather than exposing the
/// registry's internal lock directly.
pub fn with_pool<R>(id: PoolId, f: impl FnOnce(&mut Pool) -> R) -> R {
    let mut reg = lock();
    let pool = reg.get_mut(&id).expect("with_pool: unknown pool id");
    f(pool)
}
