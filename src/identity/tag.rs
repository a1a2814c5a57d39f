//! RFC 2407 DOI §4.6.2.1 ID-type wire codes, one per `Identity` variant.
//! `ID_NULL` is not part of the DOI but is assigned a source-compatible
//! value above the DOI's own range (RFC 7619 NULL authentication).
use id_derive::IdTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IdTag)]
pub enum IdTag {
    Ipv4Addr = 1,
    Fqdn = 2,
    UserFqdn = 3,
    Ipv4Subnet = 4,
    Ipv6Addr = 5,
    Ipv6Subnet = 6,
    Ipv4Range = 7,
    Ipv6Range = 8,
    DerAsn1Dn = 9,
    DerAsn1Gn = 10,
    KeyId = 11,
    Null = 12,
    FromCert = 13,
    AnyPeer = 14,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;
    use std::str::FromStr;

    #[test]
    fn doi_codes_round_trip() {
        assert_eq!(IdTag::try_from(1u8).unwrap(), IdTag::Ipv4Addr);
        assert_eq!(IdTag::try_from(9u8).unwrap(), IdTag::DerAsn1Dn);
        assert!(IdTag::try_from(200u8).is_err());
    }

    #[test]
    fn default_is_first_variant() {
        assert_eq!(IdTag::default(), IdTag::Ipv4Addr);
    }

    #[test]
    fn from_str_matches_variant_name() {
        assert_eq!(IdTag::from_str("KeyId").unwrap(), IdTag::KeyId);
        assert!(IdTag::from_str("Bogus").is_err());
    }
}
