//! `parse_id`: text → `Identity`, following a fixed disambiguation order
//! (sentinel tokens, then DN, then IP literal, then the `@`-prefixed forms).
//! Note one documented limitation: there is no way to say "resolve this
//! FQDN as IPv6" — address family is decided purely from the literal's own
//! syntax (a bare `:` means IPv6), never from a name.
use std::borrow::Cow;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::CoreResult;
use crate::identity::dn::text_to_der;
use crate::identity::Identity;

/// Parse `text` into an `Identity` that may borrow from `text`. `oe_only`
/// is opportunistic-encryption mode, which restricts the accepted forms to
/// plain IP literals, FQDNs, and UserFQDNs.
pub fn parse(text: &str, oe_only: bool) -> CoreResult<Identity<'_>> {
    if !oe_only {
        match text {
            "%fromcert" => return Ok(Identity::FromCert),
            "%none" => return Ok(Identity::AnyPeer),
            "%null" => return Ok(Identity::Null),
            _ => {}
        }
    }

    if !oe_only && text.contains('=') {
        let dn_text = text.strip_prefix('@').unwrap_or(text);
        let der = text_to_der(dn_text)?;
        return Ok(Identity::DerAsn1Dn(Cow::Owned(der)));
    }

    if !text.contains('@') {
        return parse_ip_or_any(text);
    }

    if let Some(rest) = text.strip_prefix('@') {
        if !oe_only {
            if let Some(hex) = rest.strip_prefix('#') {
                let bytes = hex::decode(strip_0x(hex))?;
                return Ok(Identity::KeyId(Cow::Owned(bytes)));
            }
            if let Some(hex) = rest.strip_prefix('~') {
                let bytes = hex::decode(strip_0x(hex))?;
                return Ok(Identity::DerAsn1Dn(Cow::Owned(bytes)));
            }
            if let Some(literal) = rest.strip_prefix('[') {
                let literal = literal.trim_end_matches(']');
                return Ok(Identity::KeyId(Cow::Owned(literal.as_bytes().to_vec())));
            }
        }
        return Ok(Identity::Fqdn(Cow::Borrowed(rest)));
    }

    Ok(Identity::UserFqdn(Cow::Borrowed(text)))
}

fn parse_ip_or_any(text: &str) -> CoreResult<Identity<'_>> {
    if text == "%any" || text == "0.0.0.0" {
        return Ok(Identity::AnyPeer);
    }

    if text.contains(':') {
        let stripped = text.strip_prefix('[').and_then(|s| s.strip_suffix(']')).unwrap_or(text);
        let addr: Ipv6Addr = stripped.parse()?;
        Ok(Identity::Ipv6Addr(addr))
    } else {
        let addr: Ipv4Addr = text.parse()?;
        Ok(Identity::Ipv4Addr(addr))
    }
}

fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels() {
        assert_eq!(parse("%fromcert", false).unwrap(), Identity::FromCert);
        assert_eq!(parse("%none", false).unwrap(), Identity::AnyPeer);
        assert_eq!(parse("%null", false).unwrap(), Identity::Null);
        assert_eq!(parse("%any", false).unwrap(), Identity::AnyPeer);
        assert_eq!(parse("0.0.0.0", false).unwrap(), Identity::AnyPeer);
    }

    #[test]
    fn ip_literals() {
        assert_eq!(
            parse("192.0.2.10", false).unwrap(),
            Identity::Ipv4Addr("192.0.2.10".parse().unwrap())
        );
        assert_eq!(
            parse("2001:db8::1", false).unwrap(),
            Identity::Ipv6Addr("2001:db8::1".parse().unwrap())
        );
        assert_eq!(
            parse("[2001:db8::1]", false).unwrap(),
            Identity::Ipv6Addr("2001:db8::1".parse().unwrap())
        );
    }

    #[test]
    fn fqdn_and_user_fqdn() {
        assert_eq!(
            parse("@foo.example", false).unwrap(),
            Identity::Fqdn(Cow::Borrowed("foo.example"))
        );
        assert_eq!(
            parse("user@example", false).unwrap(),
            Identity::UserFqdn(Cow::Borrowed("user@example"))
        );
    }

    #[test]
    fn key_id_hex_form() {
        let id = parse("@#0xdeadbeef", false).unwrap();
        assert_eq!(id, Identity::KeyId(Cow::Owned(vec![0xDE, 0xAD, 0xBE, 0xEF])));
    }

    #[test]
    fn key_id_literal_form_strips_trailing_brackets() {
        let id = parse("@[raw key]", false).unwrap();
        assert_eq!(id, Identity::KeyId(Cow::Owned(b"raw key".to_vec())));

        let id = parse("@[raw key]]", false).unwrap();
        assert_eq!(id, Identity::KeyId(Cow::Owned(b"raw key".to_vec())));
    }

    #[test]
    fn dn_form() {
        let id = parse("CN=Example,O=Acme", false).unwrap();
        assert!(matches!(id, Identity::DerAsn1Dn(_)));
    }

    #[test]
    fn oe_only_disables_sentinels_and_dn_and_key_id_prefixes() {
        // %fromcert/%none/%null/DN/@# etc. are unavailable under oe_only;
        // the special-case prefixes are skipped and the text falls through
        // to the unconditional FQDN/UserFQDN branches.
        assert_eq!(
            parse("@#0xdeadbeef", true).unwrap(),
            Identity::Fqdn(Cow::Borrowed("#0xdeadbeef"))
        );
    }
}
