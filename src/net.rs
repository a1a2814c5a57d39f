//! Network-byte-order arithmetic on IP addresses, shared by the address
//! pool's lease-to-address mapping and its reverse, address-to-lease lookup.
//! A pool's addresses are assumed contiguous in their low 32 bits (the last
//! 4 octets), which covers an IPv4 address outright and an IPv6 address's
//! trailing group.
use byteorder::{BigEndian, ByteOrder};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// `base + offset`, wrapping, applied to the last 4 octets of `base` only.
pub fn addr_plus(base: IpAddr, offset: u32) -> IpAddr {
    match base {
        IpAddr::V4(v4) => {
            let n = u32::from(v4).wrapping_add(offset);
            IpAddr::V4(Ipv4Addr::from(n))
        }
        IpAddr::V6(v6) => {
            let mut octets = v6.octets();
            let low = BigEndian::read_u32(&octets[12..16]).wrapping_add(offset);
            BigEndian::write_u32(&mut octets[12..16], low);
            IpAddr::V6(Ipv6Addr::from(octets))
        }
    }
}

/// `addr - base`, wrapping, restricted to the last 4 octets, mirroring
/// `addr_plus`. Used by `rel_lease_addr` to recover a slot index from a
/// released address.
pub fn addr_diff(addr: IpAddr, base: IpAddr) -> u32 {
    match (addr, base) {
        (IpAddr::V4(a), IpAddr::V4(b)) => u32::from(a).wrapping_sub(u32::from(b)),
        (IpAddr::V6(a), IpAddr::V6(b)) => {
            let a_low = BigEndian::read_u32(&a.octets()[12..16]);
            let b_low = BigEndian::read_u32(&b.octets()[12..16]);
            a_low.wrapping_sub(b_low)
        }
        _ => panic!("addr_diff: address family mismatch between pool and address"),
    }
}

/// The last 4 octets of `ip`, as a plain `u32` (network-order value, host
/// byte order once read). Shared by `addr_plus`/`addr_diff`'s family split
/// and `pool_size`'s overflow check below.
fn low_u32(ip: IpAddr) -> u32 {
    match ip {
        IpAddr::V4(v4) => u32::from(v4),
        IpAddr::V6(v6) => BigEndian::read_u32(&v6.octets()[12..16]),
    }
}

/// `end - start + 1`, inclusive, restricted to the last 4 octets (the same
/// 32-bit index space `addr_plus`/`addr_diff` operate in). Saturates to
/// `u32::MAX` and reports truncation when the range would otherwise overflow
/// a 32-bit lease index (an IPv6 pool larger than 2^32 addresses).
pub fn pool_size(range: (IpAddr, IpAddr)) -> (u32, bool) {
    let diff = (low_u32(range.1) as u64).wrapping_sub(low_u32(range.0) as u64) & 0xFFFF_FFFF;
    let size = diff + 1;
    if size > u32::MAX as u64 {
        (u32::MAX, true)
    } else {
        (size as u32, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v4_addition() {
        let base: IpAddr = "192.0.2.10".parse().unwrap();
        assert_eq!(addr_plus(base, 0), base);
        assert_eq!(addr_plus(base, 2), "192.0.2.12".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn v4_roundtrip_diff() {
        let base: IpAddr = "192.0.2.10".parse().unwrap();
        let third = addr_plus(base, 3);
        assert_eq!(addr_diff(third, base), 3);
    }

    #[test]
    fn v6_addition_touches_last_four_octets_only() {
        let base: IpAddr = "2001:db8::".parse().unwrap();
        let next = addr_plus(base, 1);
        assert_eq!(next, "2001:db8::1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn pool_size_small_range() {
        let start: IpAddr = "192.0.2.10".parse().unwrap();
        let end: IpAddr = "192.0.2.12".parse().unwrap();
        assert_eq!(pool_size((start, end)), (3, false));
    }

    #[test]
    fn pool_size_saturates_on_full_range_overflow() {
        let start: IpAddr = "0.0.0.0".parse().unwrap();
        let end: IpAddr = "255.255.255.255".parse().unwrap();
        assert_eq!(pool_size((start, end)), (u32::MAX, true));
    }
}
