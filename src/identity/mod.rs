//! Peer identity core (RFC 2407 DOI §4.6.2.1): a tagged representation of an
//! IKE identity, textual parsing, canonical comparison, wildcard matching,
//! and structured formatting.
pub mod compare;
pub mod dn;
pub mod format;
pub mod parse;
pub mod tag;

use std::borrow::Cow;
use std::net::{Ipv4Addr, Ipv6Addr};

pub use compare::MatchOutcome;
pub use parse::parse;
pub use tag::IdTag;

/// A peer identity. Byte-carrying variants hold `Cow` so an identity can
/// either alias the caller's text buffer (before `unshare_id_content` would
/// be called in an unshare/free discipline) or own its bytes (after), with
/// the distinction enforced by the type system rather than by caller
/// convention.
///
/// The anonymous wildcard tag is named `AnyPeer` here rather than `None`,
/// because `Identity::None` would collide, visually and in pattern matches,
/// with `Option::None`.
#[derive(Debug, Clone)]
pub enum Identity<'a> {
    /// "Use the Subject from the peer's certificate at authentication time."
    FromCert,
    /// Wildcard / unspecified peer.
    AnyPeer,
    /// RFC 7619 NULL authentication identity.
    Null,
    Ipv4Addr(Ipv4Addr),
    Ipv6Addr(Ipv6Addr),
    /// DNS-style name, no leading `@` in stored form.
    Fqdn(Cow<'a, str>),
    /// `user@domain`; the `@` is retained per DOI §4.6.2.4.
    UserFqdn(Cow<'a, str>),
    /// Raw ASN.1 DER encoding of an X.509 Distinguished Name.
    DerAsn1Dn(Cow<'a, [u8]>),
    /// Opaque binary key identifier.
    KeyId(Cow<'a, [u8]>),
}

/// Not derived: `DerAsn1Dn` compares as an unordered multiset of RDNs
/// rather than by raw DER bytes, every other variant compares its payload
/// directly. This is required for the parse/format round trip (spec.md §8
/// property 1) to hold for multi-RDN DNs — `format` renders a DN via
/// `x509_parser`'s own `Display`, which is not guaranteed to preserve this
/// crate's `text_to_der` RDN ordering, so `parse(format(i))` can
/// legitimately produce DER bytes ordered differently from `i` while still
/// denoting the same DN. See `DESIGN.md` for the full rationale.
impl<'a> PartialEq for Identity<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Identity::FromCert, Identity::FromCert) => true,
            (Identity::AnyPeer, Identity::AnyPeer) => true,
            (Identity::Null, Identity::Null) => true,
            (Identity::Ipv4Addr(a), Identity::Ipv4Addr(b)) => a == b,
            (Identity::Ipv6Addr(a), Identity::Ipv6Addr(b)) => a == b,
            (Identity::Fqdn(a), Identity::Fqdn(b)) => a == b,
            (Identity::UserFqdn(a), Identity::UserFqdn(b)) => a == b,
            (Identity::KeyId(a), Identity::KeyId(b)) => a == b,
            (Identity::DerAsn1Dn(a), Identity::DerAsn1Dn(b)) => match (dn::decode_rdns(a), dn::decode_rdns(b)) {
                (Ok(ra), Ok(rb)) => dn::same_dn_multiset(&ra, &rb),
                _ => a == b,
            },
            _ => false,
        }
    }
}

impl<'a> Identity<'a> {
    /// The RFC 2407 DOI wire code for this identity's tag.
    pub fn tag(&self) -> IdTag {
        match self {
            Identity::FromCert => IdTag::FromCert,
            Identity::AnyPeer => IdTag::AnyPeer,
            Identity::Null => IdTag::Null,
            Identity::Ipv4Addr(_) => IdTag::Ipv4Addr,
            Identity::Ipv6Addr(_) => IdTag::Ipv6Addr,
            Identity::Fqdn(_) => IdTag::Fqdn,
            Identity::UserFqdn(_) => IdTag::UserFqdn,
            Identity::DerAsn1Dn(_) => IdTag::DerAsn1Dn,
            Identity::KeyId(_) => IdTag::KeyId,
        }
    }

    /// Deep-copy any borrowed bytes so the result no longer aliases the
    /// caller's buffer. This is the `unshare_id_content` equivalent; there
    /// is no corresponding `free_id_content` because `Drop` reclaims owned
    /// `Cow` content automatically.
    pub fn into_owned(self) -> Identity<'static> {
        match self {
            Identity::FromCert => Identity::FromCert,
            Identity::AnyPeer => Identity::AnyPeer,
            Identity::Null => Identity::Null,
            Identity::Ipv4Addr(a) => Identity::Ipv4Addr(a),
            Identity::Ipv6Addr(a) => Identity::Ipv6Addr(a),
            Identity::Fqdn(s) => Identity::Fqdn(Cow::Owned(s.into_owned())),
            Identity::UserFqdn(s) => Identity::UserFqdn(Cow::Owned(s.into_owned())),
            Identity::DerAsn1Dn(b) => Identity::DerAsn1Dn(Cow::Owned(b.into_owned())),
            Identity::KeyId(b) => Identity::KeyId(Cow::Owned(b.into_owned())),
        }
    }

    /// The wildcard/unspecified identity.
    pub fn any() -> Identity<'static> {
        Identity::AnyPeer
    }

    /// A fingerprint of this identity's textual form, suitable as the
    /// reusable-lease bucket key. Uses the same text form `format` produces.
    pub fn fingerprint(&self) -> String {
        self.format()
    }
}
