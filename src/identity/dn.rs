//! ASN.1 Distinguished Name codec and comparison collaborators. Decoding
//! reuses `x509-parser`'s RDN/AVA traversal directly rather than going
//! DER→text→re-parse, since the decoder already exposes that traversal.
//! Encoding (`text_to_der`) is hand-rolled: `x509-parser` is decode-only, and
//! no encode-capable ASN.1 crate is part of this workspace's dependency
//! stack, so building minimal DER by hand is the closest fit to how the
//! teacher's own wire codec (`ToFromNetworkOrder`) is built by hand too.
use x509_parser::prelude::FromDer;
use x509_parser::x509::X509Name;

use crate::error::{CoreError, CoreResult};

/// One attribute-type-and-value pair within an RDN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ava {
    pub oid: String,
    pub value: String,
}

/// A Relative Distinguished Name: one or more `Ava`s (multi-valued RDNs use
/// more than one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rdn {
    pub avas: Vec<Ava>,
}

/// Short attribute names this codec understands, with their OIDs in dotted
/// form. Anything else is rejected rather than guessed at.
const SHORT_NAMES: &[(&str, &str)] = &[
    ("CN", "2.5.4.3"),
    ("O", "2.5.4.10"),
    ("OU", "2.5.4.11"),
    ("C", "2.5.4.6"),
    ("L", "2.5.4.7"),
    ("ST", "2.5.4.8"),
    ("STREET", "2.5.4.9"),
    ("DC", "0.9.2342.19200300.100.1.25"),
    ("UID", "0.9.2342.19200300.100.1.1"),
    ("EMAILADDRESS", "1.2.840.113549.1.9.1"),
];

fn oid_for_short_name(name: &str) -> Option<&'static str> {
    SHORT_NAMES
        .iter()
        .find(|(short, _)| short.eq_ignore_ascii_case(name))
        .map(|(_, oid)| *oid)
}

/// Decode a DER-encoded `Name` into its RDN sequence, preserving RDN and AVA
/// order as stored on the wire.
pub fn decode_rdns(der: &[u8]) -> CoreResult<Vec<Rdn>> {
    let (_, name) = X509Name::from_der(der)
        .map_err(|e| CoreError::malformed(format!("DN decode failed: {e}")))?;

    let mut rdns = Vec::new();
    for rdn in name.iter_rdn() {
        let mut avas = Vec::new();
        for ava in rdn.iter() {
            let oid = ava.attr_type().to_id_string();
            let value = ava
                .as_str()
                .map_err(|e| CoreError::malformed(format!("DN attribute value decode failed: {e}")))?
                .to_string();
            avas.push(Ava { oid, value });
        }
        rdns.push(Rdn { avas });
    }
    Ok(rdns)
}

/// Render a DER-encoded `Name` as an RFC-4514-flavored text DN, via
/// `x509-parser`'s own `Display` impl for `X509Name`.
pub fn der_to_text(der: &[u8]) -> CoreResult<String> {
    let (_, name) =
        X509Name::from_der(der).map_err(|e| CoreError::malformed(format!("DN decode failed: {e}")))?;
    Ok(name.to_string())
}

/// Parse a comma-separated `ATTR=value` text DN into DER. Each RDN is
/// single-valued (no `+`-joined multi-value RDNs) and values are taken
/// literally with no RFC-4514 backslash-escaping — both are known gaps,
/// recorded in `DESIGN.md`. RDN order in the DER `SEQUENCE` mirrors the
/// text's left-to-right order; this is a simplification of X.500's
/// root-to-leaf convention, but is internally consistent since this same
/// function is the only DN encoder this crate uses.
pub fn text_to_der(text: &str) -> CoreResult<Vec<u8>> {
    let mut rdn_der = Vec::new();
    for piece in text.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let (attr, value) = piece
            .split_once('=')
            .ok_or_else(|| CoreError::malformed(format!("malformed DN component: {piece}")))?;
        let attr = attr.trim();
        let value = value.trim();
        let oid = oid_for_short_name(attr)
            .ok_or_else(|| CoreError::malformed(format!("unknown DN attribute: {attr}")))?;

        let oid_der = der_tlv(0x06, &encode_oid(oid)?);
        let value_der = der_tlv(0x0C, value.as_bytes()); // UTF8String
        let ava_der = der_tlv(0x30, &[oid_der, value_der].concat());
        let rdn = der_tlv(0x31, &ava_der); // SET of one AttributeTypeAndValue
        rdn_der.push(rdn);
    }
    Ok(der_tlv(0x30, &rdn_der.concat()))
}

fn encode_oid(dotted: &str) -> CoreResult<Vec<u8>> {
    let parts: Vec<u64> = dotted
        .split('.')
        .map(|p| p.parse::<u64>().map_err(|_| CoreError::malformed(format!("bad OID: {dotted}"))))
        .collect::<CoreResult<_>>()?;
    if parts.len() < 2 {
        return Err(CoreError::malformed(format!("bad OID: {dotted}")));
    }
    let mut body = Vec::new();
    encode_base128(parts[0] * 40 + parts[1], &mut body);
    for &p in &parts[2..] {
        encode_base128(p, &mut body);
    }
    Ok(body)
}

fn encode_base128(value: u64, out: &mut Vec<u8>) {
    let mut digits = vec![(value & 0x7f) as u8];
    let mut v = value >> 7;
    while v > 0 {
        digits.push(((v & 0x7f) as u8) | 0x80);
        v >>= 7;
    }
    digits.reverse();
    out.extend(digits);
}

fn der_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    let len = content.len();
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let mut len_bytes = Vec::new();
        let mut l = len;
        while l > 0 {
            len_bytes.push((l & 0xff) as u8);
            l >>= 8;
        }
        len_bytes.reverse();
        out.push(0x80 | len_bytes.len() as u8);
        out.extend(len_bytes);
    }
    out.extend_from_slice(content);
    out
}

/// Two DNs match in strict RDN order, with a bare `*` AVA value matching
/// any value of the same attribute type. Returns the number of RDNs whose
/// match used a wildcard on success. Two empty DNs do not match, mirroring
/// `same_dn_any_order`'s guard — `dn_match` tries this path first, so
/// without the same guard here an empty-vs-empty DN would match via the
/// ordered path before the any-order path's "empty DNs do not match" rule
/// ever gets a chance to apply.
pub fn same_dn_ordered(subject: &[Rdn], pattern: &[Rdn]) -> Option<u32> {
    if subject.is_empty() || subject.len() != pattern.len() {
        return None;
    }
    let mut wildcards = 0;
    for (s, p) in subject.iter().zip(pattern.iter()) {
        wildcards += rdn_matches(s, p)?;
    }
    Some(wildcards)
}

/// Two DNs match under any permutation of RDNs, again with `*` wildcard
/// accounting. Requires a nonzero, equal count of RDNs on both sides: two
/// empty DNs do not match.
///
/// This is a real bipartite assignment, not a single greedy pass: a
/// wildcard pattern RDN can match any subject RDN, so a naive left-to-right
/// walk can hand a wildcard partner to a subject RDN that also has an exact
/// match available, starving a later subject RDN of its only possible
/// (exact) partner. At each step, candidates are tried exact-before-
/// wildcard and backtracked on a dead end.
pub fn same_dn_any_order(subject: &[Rdn], pattern: &[Rdn]) -> Option<u32> {
    if subject.is_empty() || subject.len() != pattern.len() {
        return None;
    }
    let mut used = vec![false; pattern.len()];
    assign_rdns(subject, pattern, 0, &mut used, 0)
}

fn assign_rdns(subject: &[Rdn], pattern: &[Rdn], i: usize, used: &mut [bool], wildcards: u32) -> Option<u32> {
    if i == subject.len() {
        return Some(wildcards);
    }

    let mut candidates: Vec<(usize, u32)> = pattern
        .iter()
        .enumerate()
        .filter(|(j, _)| !used[*j])
        .filter_map(|(j, p)| rdn_matches(&subject[i], p).map(|w| (j, w)))
        .collect();
    candidates.sort_by_key(|&(_, w)| w); // exact matches (0) before wildcard (1)

    for (j, w) in candidates {
        used[j] = true;
        if let Some(total) = assign_rdns(subject, pattern, i + 1, used, wildcards + w) {
            return Some(total);
        }
        used[j] = false;
    }
    None
}

/// Strict, wildcard-free unordered DN equality: true iff `a` and `b` hold
/// the same multiset of RDNs, each itself an unordered multiset of AVAs.
/// Used for `Identity`'s own `PartialEq` on `DerAsn1Dn` (see
/// `identity::mod`), which is a different question from pattern matching:
/// a literal `*` value must only equal another literal `*`, never stand in
/// for "any value", so this does not reuse `same_dn_any_order`.
pub fn same_dn_multiset(a: &[Rdn], b: &[Rdn]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    'outer: for ra in a {
        for (i, rb) in b.iter().enumerate() {
            if !used[i] && rdn_equal(ra, rb) {
                used[i] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

fn rdn_equal(a: &Rdn, b: &Rdn) -> bool {
    if a.avas.len() != b.avas.len() {
        return false;
    }
    let mut used = vec![false; b.avas.len()];
    'outer: for av in &a.avas {
        for (i, bv) in b.avas.iter().enumerate() {
            if !used[i] && av.oid == bv.oid && av.value == bv.value {
                used[i] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

/// One RDN matches another when every AVA on the pattern (right) side finds
/// an unused partner on the subject (left) side with the same OID and either
/// an equal value or a `*` pattern value. Extra AVAs on the subject side
/// beyond what the pattern asks for are permitted. Returns 1 if any AVA in
/// this RDN matched via wildcard, 0 otherwise — wildcard accounting is per
/// RDN, not per AVA, so a multi-valued RDN with several wildcard AVAs still
/// only counts once.
fn rdn_matches(subject: &Rdn, pattern: &Rdn) -> Option<u32> {
    let mut used = vec![false; subject.avas.len()];
    let mut any_wildcard = false;
    'ava: for p in &pattern.avas {
        for (i, s) in subject.avas.iter().enumerate() {
            if used[i] || p.oid != s.oid {
                continue;
            }
            if p.value == "*" {
                used[i] = true;
                any_wildcard = true;
                continue 'ava;
            }
            if p.value == s.value {
                used[i] = true;
                continue 'ava;
            }
        }
        return None;
    }
    Some(if any_wildcard { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_to_der_round_trips_through_decode() {
        let der = text_to_der("CN=Example,O=Acme").unwrap();
        let rdns = decode_rdns(&der).unwrap();
        assert_eq!(rdns.len(), 2);
        assert_eq!(rdns[0].avas[0].oid, "2.5.4.3");
        assert_eq!(rdns[0].avas[0].value, "Example");
        assert_eq!(rdns[1].avas[0].oid, "2.5.4.10");
        assert_eq!(rdns[1].avas[0].value, "Acme");
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        assert!(text_to_der("XX=foo").is_err());
    }

    #[test]
    fn ordered_match_requires_same_rdn_order() {
        let der = text_to_der("CN=Example,O=Acme").unwrap();
        let reordered = text_to_der("O=Acme,CN=Example").unwrap();
        let a = decode_rdns(&der).unwrap();
        let b = decode_rdns(&reordered).unwrap();
        assert!(same_dn_ordered(&a, &b).is_none());
        assert!(same_dn_any_order(&a, &b).is_some());
    }

    #[test]
    fn wildcard_ava_matches_any_value() {
        let subject = decode_rdns(&text_to_der("CN=Example,O=Acme").unwrap()).unwrap();
        let pattern = decode_rdns(&text_to_der("CN=*,O=Acme").unwrap()).unwrap();
        assert_eq!(same_dn_ordered(&subject, &pattern), Some(1));
    }

    #[test]
    fn subject_rdn_with_extra_ava_still_matches_pattern() {
        let subject = Rdn {
            avas: vec![
                Ava { oid: "2.5.4.3".into(), value: "Example".into() },
                Ava { oid: "2.5.4.10".into(), value: "Acme".into() },
            ],
        };
        let pattern = Rdn { avas: vec![Ava { oid: "2.5.4.3".into(), value: "Example".into() }] };
        assert_eq!(rdn_matches(&subject, &pattern), Some(0));
    }

    #[test]
    fn multi_valued_rdn_wildcard_count_caps_at_one() {
        let subject = Rdn {
            avas: vec![
                Ava { oid: "2.5.4.3".into(), value: "Example".into() },
                Ava { oid: "2.5.4.10".into(), value: "Acme".into() },
            ],
        };
        let pattern = Rdn {
            avas: vec![
                Ava { oid: "2.5.4.3".into(), value: "*".into() },
                Ava { oid: "2.5.4.10".into(), value: "*".into() },
            ],
        };
        assert_eq!(rdn_matches(&subject, &pattern), Some(1));
    }

    #[test]
    fn empty_dns_do_not_match_under_any_order() {
        let empty: Vec<Rdn> = Vec::new();
        assert!(same_dn_any_order(&empty, &empty).is_none());
    }

    #[test]
    fn empty_dns_do_not_match_in_order_either() {
        let empty: Vec<Rdn> = Vec::new();
        assert!(same_dn_ordered(&empty, &empty).is_none());
    }

    #[test]
    fn any_order_match_backtracks_past_a_greedy_wildcard_steal() {
        // subject [CN=Bob, CN=Alice] vs pattern [CN=*, CN=Bob]: a valid
        // assignment exists (Bob<->exact, Alice<->wildcard), but a naive
        // left-to-right greedy walk hands Bob the wildcard RDN first (it
        // matches anything), leaving Alice with no partner at all.
        let subject = vec![
            Rdn { avas: vec![Ava { oid: "2.5.4.3".into(), value: "Bob".into() }] },
            Rdn { avas: vec![Ava { oid: "2.5.4.3".into(), value: "Alice".into() }] },
        ];
        let pattern = vec![
            Rdn { avas: vec![Ava { oid: "2.5.4.3".into(), value: "*".into() }] },
            Rdn { avas: vec![Ava { oid: "2.5.4.3".into(), value: "Bob".into() }] },
        ];
        assert_eq!(same_dn_any_order(&subject, &pattern), Some(1));
    }

    #[test]
    fn multiset_equality_ignores_rdn_order_but_not_wildcard_literals() {
        let a = decode_rdns(&text_to_der("CN=Example,O=Acme").unwrap()).unwrap();
        let b = decode_rdns(&text_to_der("O=Acme,CN=Example").unwrap()).unwrap();
        assert!(same_dn_multiset(&a, &b));

        let c = decode_rdns(&text_to_der("CN=*,O=Acme").unwrap()).unwrap();
        assert!(!same_dn_multiset(&a, &c)); // literal "*" is not "Example"
    }
}
