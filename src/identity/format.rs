//! `format_id`: `Identity` → printable ASCII text. Note the asymmetry with
//! `parse`: `FromCert` is recognized on input as `%fromcert` but rendered on
//! output as `%%fromcert` (the literal form used by callers that treat the
//! result as a printf-style format string); `AnyPeer` is recognized from
//! three distinct inputs (`%any`, `%none`, `0.0.0.0`) but always renders as
//! `(none)`. Round-tripping is only guaranteed for canonical forms.
use crate::identity::dn::der_to_text;
use crate::identity::Identity;

impl<'a> Identity<'a> {
    pub fn format(&self) -> String {
        match self {
            Identity::FromCert => "%%fromcert".to_string(),
            Identity::AnyPeer => "(none)".to_string(),
            Identity::Null => "ID_NULL".to_string(),
            Identity::Ipv4Addr(a) => {
                if a.is_unspecified() {
                    "%any".to_string()
                } else {
                    a.to_string()
                }
            }
            Identity::Ipv6Addr(a) => {
                if a.is_unspecified() {
                    "%any".to_string()
                } else {
                    a.to_string()
                }
            }
            Identity::Fqdn(name) => format!("@{name}"),
            Identity::UserFqdn(name) => name.to_string(),
            Identity::DerAsn1Dn(der) => der_to_text(der).unwrap_or_else(|_| "(invalid dn)".to_string()),
            Identity::KeyId(bytes) => format!("@#0x{}", hex::encode(bytes.as_ref())),
        }
    }
}
