//! Identity comparison: exact equality and wildcard-aware matching.
//! `Identity::Null == Identity::Null` is unconditionally `true` once the
//! tags compare equal — see `DESIGN.md`'s Open Question decisions.
use crate::identity::dn::{decode_rdns, same_dn_any_order, same_dn_ordered};
use crate::identity::Identity;
use crate::util::fold_name;

/// Sentinel wildcard count for `AnyPeer`: large enough to dominate any
/// ordinary DN wildcard count (at most one per RDN), so a `None`/`AnyPeer`
/// pattern always ranks as the least specific match.
const MAX_WILDCARDS: u32 = u32::MAX;

/// The result of `Identity::matches`: whether the subject satisfies the
/// pattern, and how many wildcard components (`AnyPeer`, or `*` DN AVAs)
/// were consumed to get there. Used to rank candidate connections by
/// specificity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub matched: bool,
    pub wildcards: u32,
}

impl MatchOutcome {
    fn no_match() -> Self {
        MatchOutcome { matched: false, wildcards: 0 }
    }

    fn matched(wildcards: u32) -> Self {
        MatchOutcome { matched: true, wildcards }
    }
}

impl<'a> Identity<'a> {
    /// Exact equality. `AnyPeer` on *either* side matches unconditionally
    /// (spec.md §4.2: "if either side is None -> match"), which is why this
    /// is not simply `self.matches(other).matched` — `matches` only grants
    /// the wildcard to the pattern side. `same(i, i)` is always `true` for
    /// any non-error identity `i`.
    pub fn same(&self, other: &Identity<'_>) -> bool {
        if matches!(self, Identity::AnyPeer) || matches!(other, Identity::AnyPeer) {
            return true;
        }
        self.tag_match(other).matched
    }

    /// `self` is the subject being authenticated, `pattern` is the
    /// configured identity it is checked against. Only `pattern == AnyPeer`
    /// is a universal wildcard (spec.md §4.2: "If the pattern side is None,
    /// count is MAX_WILDCARDS and match is true"); a subject that happens to
    /// be `AnyPeer` itself (e.g. parsed from `%any`) must still fail against
    /// a concrete pattern; the tags simply differ. DNs (and `FromCert`,
    /// which compares as a DN match against a certificate subject) compare
    /// in RDN order first, falling back to any-order matching; a `*` AVA
    /// value is a wildcard.
    pub fn matches(&self, pattern: &Identity<'_>) -> MatchOutcome {
        if matches!(pattern, Identity::AnyPeer) {
            return MatchOutcome::matched(MAX_WILDCARDS);
        }
        self.tag_match(pattern)
    }

    /// Tag-by-tag comparison shared by `same` and `matches`. Carries no
    /// `AnyPeer` special-casing of its own: callers decide which side(s), if
    /// any, get wildcard treatment before reaching here, so `AnyPeer` falls
    /// through to the catch-all (no match against a concrete tag).
    fn tag_match(&self, other: &Identity<'_>) -> MatchOutcome {
        match (self, other) {
            (Identity::FromCert, Identity::FromCert) => MatchOutcome::matched(0),
            (Identity::Null, Identity::Null) => MatchOutcome::matched(0),
            (Identity::Ipv4Addr(a), Identity::Ipv4Addr(b)) => {
                if a == b {
                    MatchOutcome::matched(0)
                } else {
                    MatchOutcome::no_match()
                }
            }
            (Identity::Ipv6Addr(a), Identity::Ipv6Addr(b)) => {
                if a == b {
                    MatchOutcome::matched(0)
                } else {
                    MatchOutcome::no_match()
                }
            }
            (Identity::Fqdn(a), Identity::Fqdn(b)) => fold_match(a, b),
            (Identity::UserFqdn(a), Identity::UserFqdn(b)) => fold_match(a, b),
            (Identity::KeyId(a), Identity::KeyId(b)) => {
                if a == b {
                    MatchOutcome::matched(0)
                } else {
                    MatchOutcome::no_match()
                }
            }
            (Identity::DerAsn1Dn(a), Identity::DerAsn1Dn(b)) => dn_match(a, b),
            _ => MatchOutcome::no_match(),
        }
    }

    /// Number of wildcard components this identity itself contributes when
    /// used as a pattern: `MAX_WILDCARDS` for `AnyPeer`, 0 otherwise, plus
    /// one per RDN in a DN pattern whose value is exactly `*` (RDN
    /// granularity, not per-AVA).
    pub fn wildcard_count(&self) -> u32 {
        match self {
            Identity::AnyPeer => MAX_WILDCARDS,
            Identity::DerAsn1Dn(der) => decode_rdns(der)
                .map(|rdns| {
                    rdns.iter()
                        .filter(|rdn| rdn.avas.iter().any(|ava| ava.value == "*"))
                        .count() as u32
                })
                .unwrap_or(0),
            _ => 0,
        }
    }
}

fn fold_match(subject: &str, pattern: &str) -> MatchOutcome {
    if fold_name(subject) == fold_name(pattern) {
        MatchOutcome::matched(0)
    } else {
        MatchOutcome::no_match()
    }
}

fn dn_match(subject_der: &[u8], pattern_der: &[u8]) -> MatchOutcome {
    let (Ok(subject), Ok(pattern)) = (decode_rdns(subject_der), decode_rdns(pattern_der)) else {
        return MatchOutcome::no_match();
    };
    if let Some(w) = same_dn_ordered(&subject, &pattern) {
        return MatchOutcome::matched(w);
    }
    match same_dn_any_order(&subject, &pattern) {
        Some(w) => MatchOutcome::matched(w),
        None => MatchOutcome::no_match(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::parse::parse;

    #[test]
    fn any_peer_matches_everything_both_directions() {
        let any = Identity::AnyPeer;
        let ip = parse("192.0.2.10", false).unwrap();
        assert!(any.same(&ip));
        assert!(ip.same(&any));
    }

    #[test]
    fn same_id_treats_any_peer_as_dominant_on_either_side() {
        let any = Identity::AnyPeer;
        let dn = parse("CN=Example,O=Acme", false).unwrap();
        assert!(any.same(&dn));
        assert!(dn.same(&any));
    }

    #[test]
    fn matches_only_grants_the_wildcard_to_the_pattern_side() {
        // A subject parsed from `%any` must not match a concrete configured
        // pattern: only the pattern side gets AnyPeer wildcard treatment.
        let subject = parse("%any", false).unwrap();
        let pattern = parse("CN=Attacker,O=Evil", false).unwrap();
        assert!(!subject.matches(&pattern).matched);

        // The reverse direction is still the universal wildcard.
        let subject = parse("CN=Attacker,O=Evil", false).unwrap();
        let pattern = parse("%any", false).unwrap();
        assert!(subject.matches(&pattern).matched);
    }

    #[test]
    fn fqdn_match_is_case_and_trailing_dot_insensitive() {
        let a = parse("@Foo.Example.", false).unwrap();
        let b = parse("@foo.example", false).unwrap();
        assert!(a.same(&b));
    }

    #[test]
    fn ip_mismatch_does_not_match() {
        let a = parse("192.0.2.10", false).unwrap();
        let b = parse("192.0.2.11", false).unwrap();
        assert!(!a.same(&b));
    }

    #[test]
    fn dn_any_order_match_reports_no_wildcards() {
        let a = parse("CN=Example,O=Acme", false).unwrap();
        let b = parse("O=Acme,CN=Example", false).unwrap();
        let outcome = a.matches(&b);
        assert!(outcome.matched);
        assert_eq!(outcome.wildcards, 0);
    }

    #[test]
    fn dn_wildcard_ava_is_counted() {
        let subject = parse("CN=Example,O=Acme", false).unwrap();
        let pattern = parse("CN=*,O=Acme", false).unwrap();
        let outcome = subject.matches(&pattern);
        assert!(outcome.matched);
        assert_eq!(outcome.wildcards, 1);
    }
}
