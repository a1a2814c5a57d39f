//! Small helpers shared by the identity and address-pool modules: byte-chunk
//! debug printing and the case/trailing-dot folding used by FQDN comparison.

/// Debug utility: dump a byte chunk as index/hex/ascii rows, in the same
/// register as a protocol analyzer's hex view.
pub fn pretty_chunk(bytes: &[u8]) {
    let mut i = 0usize;
    eprint!("index:");
    for _ in bytes {
        eprint!("{:02} ", i);
        i += 1;
    }
    eprintln!();

    eprint!("byte :");
    for b in bytes {
        eprint!("{:02X} ", b);
    }
    eprintln!();

    eprint!("ascii:");
    for b in bytes {
        if b.is_ascii_alphanumeric() {
            eprint!("{:>2} ", *b as char);
        } else {
            eprint!("   ");
        }
    }
    eprintln!();
}

/// Strip trailing `.` characters and fold to lowercase: the FQDN/UserFQDN
/// comparison rule (case-insensitive, trailing dots ignored).
pub fn fold_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}
