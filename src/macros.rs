// Test helpers shared across the identity and pool test modules.

/// Assert that parsing `$text` then formatting the result reproduces
/// `$text` exactly — the canonical-form round trip.
#[macro_export]
macro_rules! assert_round_trips {
    ($text:expr) => {{
        let id = $crate::identity::parse($text, false).expect("parse failed");
        assert_eq!(id.format(), $text);
    }};
}

/// Assert that `lease_an_address` for the given pool/identity yields the
/// expected address, used throughout the `pool::lease` scenario tests.
#[macro_export]
macro_rules! assert_lease {
    ($pool:expr, $name:expr, $expect:expr) => {{
        let id = $crate::identity::parse($name, false).unwrap();
        let req = $crate::pool::lease::LeaseRequest::reusable(&id);
        let got = $crate::pool::lease::lease_an_address($pool, &req).unwrap();
        assert_eq!(got, $expect.parse::<std::net::IpAddr>().unwrap());
        got
    }};
}
