//! Lease acquisition and release: the core allocate/reuse/recycle logic
//! layered over the arena in `crate::pool::arena`.
use std::net::IpAddr;

use log::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::identity::{IdTag, Identity};
use crate::net::{addr_diff, addr_plus};
use crate::pool::arena::{self, Pool};

/// How the peer authenticated. Only `Psk` and `Null` are distinguished from
/// everything else, since that is all lease reusability depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Psk,
    Null,
    Certificate,
}

/// A request to lease an address for a connection. Carries just the pieces
/// `lease_an_address` needs to decide reusability and, if reusable, to key
/// the lookup/bind: the peer identity's tag and textual fingerprint, the
/// auth method, and the daemon's `uniqueIDs` setting.
#[derive(Debug, Clone)]
pub struct LeaseRequest {
    peer_name: String,
    tag: IdTag,
    auth: AuthMethod,
    unique_ids: bool,
}

impl LeaseRequest {
    pub fn new(identity: &Identity<'_>, auth: AuthMethod, unique_ids: bool) -> Self {
        LeaseRequest { peer_name: identity.fingerprint(), tag: identity.tag(), auth, unique_ids }
    }

    /// Convenience constructor for the common case: certificate auth with
    /// `uniqueIDs` enabled, the combination under which `identity` is
    /// actually eligible for a reusable lease (subject to its tag, per
    /// `is_reusable`).
    pub fn reusable(identity: &Identity<'_>) -> Self {
        Self::new(identity, AuthMethod::Certificate, true)
    }

    fn is_reusable(&self) -> bool {
        self.auth != AuthMethod::Psk
            && self.auth != AuthMethod::Null
            && !matches!(self.tag, IdTag::AnyPeer | IdTag::Null | IdTag::Ipv4Addr | IdTag::Ipv6Addr)
            && self.unique_ids
    }
}

/// Lease an address for `req` out of `pool`: decide reusability, recover
/// from a lingering lease if possible, grow the arena on exhaustion,
/// allocate a free slot, and compute its address.
pub fn lease_an_address(pool: &mut Pool, req: &LeaseRequest) -> CoreResult<IpAddr> {
    let reusable = req.is_reusable();

    if reusable {
        if let Some(idx) = arena::find_in_bucket(pool, &req.peer_name) {
            let slot = &mut pool.leases[idx as usize];
            if slot.refcount == 0 {
                arena::free_list_remove(pool, idx);
                pool.nr_in_use += 1;
            }
            pool.leases[idx as usize].refcount += 1;
            debug!("recovered lingering lease for '{}'", req.peer_name);
            return Ok(slot_address(pool, idx));
        }
    }

    if arena::free_list_head(pool).is_none() {
        grow_for_allocation(pool)?;
    }

    let idx = arena::free_list_pop_head(pool).expect("free list non-empty after grow_for_allocation");

    if let Some(stolen_from) = pool.leases[idx as usize].reusable_name.clone() {
        arena::evict_from_bucket(pool, idx);
        pool.nr_reusable = pool.nr_reusable.saturating_sub(1);
        debug!("stealing lingering lease from '{}' for '{}'", stolen_from, req.peer_name);
    }
    if reusable {
        arena::bind_reusable(pool, idx, req.peer_name.clone());
        pool.nr_reusable += 1;
    }

    pool.leases[idx as usize].refcount = 1;
    pool.nr_in_use += 1;

    Ok(slot_address(pool, idx))
}

fn grow_for_allocation(pool: &mut Pool) -> CoreResult<()> {
    let nr_leases = pool.nr_leases();
    if nr_leases == pool.size {
        warn!("no free address in addresspool");
        return Err(CoreError::PoolExhausted);
    }
    let new_size = (nr_leases.saturating_mul(2)).clamp(1, pool.size);
    debug!("growing addresspool from {} to {} leases", nr_leases, new_size);
    arena::grow(pool, new_size)
}

fn slot_address(pool: &Pool, idx: u32) -> IpAddr {
    addr_plus(pool.range.0, idx)
}

/// Release the lease for `addr`. Asymmetric by design: a one-time lease is
/// prepended to the free list (taken again first), a lingering reusable
/// lease is appended (taken again last), and only once its refcount reaches
/// 0. An out-of-range address or a refcount underflow is a caller bug, not
/// a recoverable error, and panics rather than returning `Err`.
pub fn rel_lease_addr(pool: &mut Pool, addr: IpAddr) {
    let offset = addr_diff(addr, pool.range.0);
    assert!(offset < pool.nr_leases(), "rel_lease_addr: address outside pool range");
    let idx = offset;

    let slot = &mut pool.leases[idx as usize];
    slot.refcount = slot.refcount.checked_sub(1).expect("rel_lease_addr: refcount underflow");

    if slot.reusable_name.is_some() {
        if slot.refcount == 0 {
            pool.nr_in_use -= 1;
            arena::free_list_append(pool, idx);
        }
    } else {
        assert_eq!(pool.leases[idx as usize].refcount, 0, "rel_lease_addr: one-time lease still referenced");
        pool.nr_in_use -= 1;
        arena::free_list_prepend(pool, idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::parse;

    fn new_pool(start: &str, size: u32) -> Pool {
        let start: IpAddr = start.parse().unwrap();
        let end = addr_plus(start, size - 1);
        Pool {
            range: (start, end),
            size,
            size_truncated: false,
            leases: Vec::new(),
            free_head: None,
            free_tail: None,
            free_count: 0,
            nr_in_use: 0,
            nr_reusable: 0,
            pool_refcount: 0,
        }
    }

    fn lease_for(pool: &mut Pool, name: &str) -> CoreResult<IpAddr> {
        let id = parse(name, false).unwrap();
        let req = LeaseRequest::reusable(&id);
        lease_an_address(pool, &req)
    }

    #[test]
    fn first_lease_on_a_freshly_installed_pool_does_not_panic() {
        // A freshly installed pool has nr_leases() == 0 until its first
        // allocation-triggered growth; a reusable request must not try to
        // hash into a zero-length bucket table before that growth happens.
        let mut pool = new_pool("192.0.2.10", 3);
        assert_eq!(pool.nr_leases(), 0);
        let addr = lease_for(&mut pool, "user-a@example").unwrap();
        assert_eq!(addr, "192.0.2.10".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn sequential_allocation_then_exhaustion() {
        let mut pool = new_pool("192.0.2.10", 3);
        crate::assert_lease!(&mut pool, "user-a@example", "192.0.2.10");
        crate::assert_lease!(&mut pool, "user-b@example", "192.0.2.11");
        crate::assert_lease!(&mut pool, "user-c@example", "192.0.2.12");
        assert!(matches!(lease_for(&mut pool, "user-d@example"), Err(CoreError::PoolExhausted)));
    }

    #[test]
    fn release_then_reacquire_same_name_reuses_address() {
        let mut pool = new_pool("192.0.2.10", 3);
        lease_for(&mut pool, "user-a@example").unwrap();
        lease_for(&mut pool, "user-b@example").unwrap();
        lease_for(&mut pool, "user-c@example").unwrap();

        rel_lease_addr(&mut pool, "192.0.2.10".parse().unwrap());
        assert_eq!(pool.nr_in_use, 2);

        let addr = lease_for(&mut pool, "user-a@example").unwrap();
        assert_eq!(addr, "192.0.2.10".parse::<IpAddr>().unwrap());
        assert_eq!(pool.nr_in_use, 3);
    }

    #[test]
    fn steal_from_lingering_head_rehashes_under_new_name() {
        let mut pool = new_pool("192.0.2.10", 3);
        lease_for(&mut pool, "user-a@example").unwrap();
        lease_for(&mut pool, "user-b@example").unwrap();
        lease_for(&mut pool, "user-c@example").unwrap();

        rel_lease_addr(&mut pool, "192.0.2.10".parse().unwrap());
        rel_lease_addr(&mut pool, "192.0.2.11".parse().unwrap());
        rel_lease_addr(&mut pool, "192.0.2.12".parse().unwrap());
        assert_eq!(pool.free_count, 3);

        let addr = lease_for(&mut pool, "user-x@example").unwrap();
        assert_eq!(addr, "192.0.2.10".parse::<IpAddr>().unwrap());

        assert!(arena::find_in_bucket(&pool, "user-a@example").is_none());
        assert!(arena::find_in_bucket(&pool, "user-x@example").is_some());
    }

    #[test]
    fn non_reusable_lease_does_not_linger() {
        let mut pool = new_pool("192.0.2.10", 2);
        let id = parse("192.0.2.99", false).unwrap(); // IPv4Addr tag: never reusable
        let req = LeaseRequest::new(&id, AuthMethod::Certificate, true);
        let addr = lease_an_address(&mut pool, &req).unwrap();
        assert_eq!(addr, "192.0.2.10".parse::<IpAddr>().unwrap());
        rel_lease_addr(&mut pool, addr);
        // one-time release prepends to free list head, immediately reusable
        assert_eq!(pool.free_head, Some(0));
        assert!(pool.leases[0].reusable_name.is_none());
    }

    #[test]
    fn lease_conservation_holds_after_alloc_release_cycles() {
        let mut pool = new_pool("192.0.2.10", 4);
        let a = lease_for(&mut pool, "user-a@example").unwrap();
        let _b = lease_for(&mut pool, "user-b@example").unwrap();
        rel_lease_addr(&mut pool, a);
        let _c = lease_for(&mut pool, "user-c@example").unwrap();
        let _d = lease_for(&mut pool, "user-d@example").unwrap();

        assert_eq!(pool.free_count + pool.nr_in_use, pool.nr_leases());
        assert!(pool.nr_leases() <= pool.size);
    }
}
