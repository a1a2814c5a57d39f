//! Lease arena: fixed-layout slots in a resizable array, two intrusive
//! doubly-linked structures layered over it:
//! - the pool's free list, threaded through each slot's `free_entry`.
//! - per-bucket reusable-lease chains, threaded through each slot's
//!   `reusable_entry`, with the bucket head stored in the slot at index
//!   `hash(name) mod nr_leases` (the array doubles as its own bucket table).
//!
//! List links use `Option<u32>` rather than a raw integer with a magic
//! sentinel value, so indices stay valid across the arena's `Vec` growing
//! and reallocating underneath them.
use std::net::IpAddr;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListLink {
    pub prev: Option<u32>,
    pub next: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BucketHead {
    pub first: Option<u32>,
    pub last: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct LeaseSlot {
    pub refcount: u32,
    pub free_entry: ListLink,
    pub reusable_entry: ListLink,
    pub reusable_name: Option<String>,
    pub bucket_head: BucketHead,
}

#[derive(Debug)]
pub struct Pool {
    pub range: (IpAddr, IpAddr),
    pub size: u32,
    pub size_truncated: bool,
    pub leases: Vec<LeaseSlot>,
    pub free_head: Option<u32>,
    pub free_tail: Option<u32>,
    pub free_count: u32,
    pub nr_in_use: u32,
    pub nr_reusable: u32,
    pub pool_refcount: u32,
}

impl Pool {
    /// A freshly installed pool with no leases yet materialized: empty
    /// arena, empty free list, zero-valued counters. `size`/`size_truncated`
    /// are computed by the caller from `range` (see `crate::net::pool_size`).
    pub fn empty(range: (IpAddr, IpAddr), size: u32, size_truncated: bool) -> Self {
        Pool {
            range,
            size,
            size_truncated,
            leases: Vec::new(),
            free_head: None,
            free_tail: None,
            free_count: 0,
            nr_in_use: 0,
            nr_reusable: 0,
            pool_refcount: 0,
        }
    }

    pub fn nr_leases(&self) -> u32 {
        self.leases.len() as u32
    }
}

/// `h <- 0; for each byte b of name: h <- h * 251 + b`, reduced mod the
/// current number of leases. 251 is prime and close to 256; no stronger
/// property is required.
pub fn hash_name(name: &str, nr_leases: u32) -> u32 {
    let mut h: u32 = 0;
    for b in name.bytes() {
        h = h.wrapping_mul(251).wrapping_add(b as u32);
    }
    h % nr_leases
}

pub fn free_list_prepend(pool: &mut Pool, idx: u32) {
    let old_head = pool.free_head;
    pool.leases[idx as usize].free_entry = ListLink { prev: None, next: old_head };
    match old_head {
        Some(h) => pool.leases[h as usize].free_entry.prev = Some(idx),
        None => pool.free_tail = Some(idx),
    }
    pool.free_head = Some(idx);
    pool.free_count += 1;
}

pub fn free_list_append(pool: &mut Pool, idx: u32) {
    let old_tail = pool.free_tail;
    pool.leases[idx as usize].free_entry = ListLink { prev: old_tail, next: None };
    match old_tail {
        Some(t) => pool.leases[t as usize].free_entry.next = Some(idx),
        None => pool.free_head = Some(idx),
    }
    pool.free_tail = Some(idx);
    pool.free_count += 1;
}

pub fn free_list_remove(pool: &mut Pool, idx: u32) {
    let link = pool.leases[idx as usize].free_entry;
    match link.prev {
        Some(p) => pool.leases[p as usize].free_entry.next = link.next,
        None => pool.free_head = link.next,
    }
    match link.next {
        Some(n) => pool.leases[n as usize].free_entry.prev = link.prev,
        None => pool.free_tail = link.prev,
    }
    pool.leases[idx as usize].free_entry = ListLink::default();
    pool.free_count -= 1;
}

pub fn free_list_head(pool: &Pool) -> Option<u32> {
    pool.free_head
}

pub fn free_list_pop_head(pool: &mut Pool) -> Option<u32> {
    let head = free_list_head(pool)?;
    free_list_remove(pool, head);
    Some(head)
}

fn bucket_link(pool: &mut Pool, bucket: u32, idx: u32) {
    let old_tail = pool.leases[bucket as usize].bucket_head.last;
    pool.leases[idx as usize].reusable_entry = ListLink { prev: old_tail, next: None };
    match old_tail {
        Some(t) => pool.leases[t as usize].reusable_entry.next = Some(idx),
        None => pool.leases[bucket as usize].bucket_head.first = Some(idx),
    }
    pool.leases[bucket as usize].bucket_head.last = Some(idx);
}

fn bucket_unlink(pool: &mut Pool, bucket: u32, idx: u32) {
    let link = pool.leases[idx as usize].reusable_entry;
    match link.prev {
        Some(p) => pool.leases[p as usize].reusable_entry.next = link.next,
        None => pool.leases[bucket as usize].bucket_head.first = link.next,
    }
    match link.next {
        Some(n) => pool.leases[n as usize].reusable_entry.prev = link.prev,
        None => pool.leases[bucket as usize].bucket_head.last = link.prev,
    }
    pool.leases[idx as usize].reusable_entry = ListLink::default();
}

/// Find `idx` in the bucket chain rooted at `hash(name) mod nr_leases`,
/// returning it only if the slot's `reusable_name` equals `name` exactly.
/// A freshly installed pool has `nr_leases == 0` before its first
/// allocation-triggered growth; there is nothing to recover in that case,
/// and `hash_name` cannot compute a bucket mod zero.
pub fn find_in_bucket(pool: &Pool, name: &str) -> Option<u32> {
    let nr_leases = pool.nr_leases();
    if nr_leases == 0 {
        return None;
    }
    let bucket = hash_name(name, nr_leases);
    let mut cursor = pool.leases[bucket as usize].bucket_head.first;
    while let Some(idx) = cursor {
        let slot = &pool.leases[idx as usize];
        if slot.reusable_name.as_deref() == Some(name) {
            return Some(idx);
        }
        cursor = slot.reusable_entry.next;
    }
    None
}

/// Unlink `idx` from its current bucket chain (computed from its own
/// `reusable_name`) and clear the name.
pub fn evict_from_bucket(pool: &mut Pool, idx: u32) {
    let nr_leases = pool.nr_leases();
    if let Some(name) = pool.leases[idx as usize].reusable_name.take() {
        let bucket = hash_name(&name, nr_leases);
        bucket_unlink(pool, bucket, idx);
    }
}

/// Bind `idx` to `name` as a reusable lease and link it into the bucket for
/// `name` under the pool's current size.
pub fn bind_reusable(pool: &mut Pool, idx: u32, name: String) {
    let nr_leases = pool.nr_leases();
    let bucket = hash_name(&name, nr_leases);
    pool.leases[idx as usize].reusable_name = Some(name);
    bucket_link(pool, bucket, idx);
}

/// Grow the arena to `new_size` slots, prepending each new slot to the free
/// list, then rebuild every reusable slot's bucket chain under the new size.
pub fn grow(pool: &mut Pool, new_size: u32) -> CoreResult<()> {
    let old_len = pool.leases.len() as u32;
    if new_size <= old_len {
        return Err(CoreError::malformed("pool grow: new size must exceed current size"));
    }

    for _ in old_len..new_size {
        pool.leases.push(LeaseSlot::default());
    }
    for idx in old_len..new_size {
        free_list_prepend(pool, idx);
    }

    for slot in pool.leases.iter_mut() {
        slot.bucket_head = BucketHead::default();
        slot.reusable_entry = ListLink::default();
    }
    let reusable: Vec<(u32, String)> = pool
        .leases
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.reusable_name.clone().map(|n| (i as u32, n)))
        .collect();
    for (idx, name) in reusable {
        let bucket = hash_name(&name, new_size);
        bucket_link(pool, bucket, idx);
    }

    Ok(())
}
