//! `Display` wrappers for CLI output: a thin wrapper type so `Display` can
//! be implemented here, in the binary, for a library type it does not own.
use std::fmt;

use ikecore::identity::Identity;
use ikecore::pool::Pool;

pub struct DisplayWrapper<'a, T>(pub &'a T);

impl fmt::Display for DisplayWrapper<'_, Identity<'_>> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag:{:?} canonical:{} wildcards:{}", self.0.tag(), self.0.format(), self.0.wildcard_count())
    }
}

impl fmt::Display for DisplayWrapper<'_, Pool> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pool = self.0;
        write!(
            f,
            "pool {}..={} size:{}{} leases:{} in_use:{} reusable:{} free:{}",
            pool.range.0,
            pool.range.1,
            pool.size,
            if pool.size_truncated { "(truncated)" } else { "" },
            pool.nr_leases(),
            pool.nr_in_use,
            pool.nr_reusable,
            pool.free_count,
        )
    }
}
