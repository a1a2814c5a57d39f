// Derive macro for wire-tag enums shared across the identity core.
use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod id_tag;
use id_tag::id_tag;

/// Derives `Default` (first variant), `TryFrom<u8>`, and `FromStr` for a
/// unit-only enum whose variants each carry an explicit integer
/// discriminant, e.g. the RFC 2407 DOI ID-type codes.
#[proc_macro_derive(IdTag)]
pub fn derive_id_tag(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    id_tag(&ast)
}

#[cfg(test)]
fn get_derive_input(s: &str) -> DeriveInput {
    syn::parse_str(s).expect("invalid test fixture")
}
