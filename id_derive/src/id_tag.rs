// Create enum implementations for Default, TryFrom<u8>, FromStr for
// wire-tag enums: unit-only enums where every variant carries an explicit
// integer discriminant (RFC 2407 DOI ID-type codes, in our case).
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput};

// Verify the derive macro is applied to an enum with only unit variants,
// each carrying an explicit integer-literal discriminant.
//
// Panics on:
//  enum Foo { A(u8), B, C }     : not all unit variants
//  enum Foo { A = 1, B, C, D }  : at least one variant has no discriminant
//  enum Foo { A = 1, B = 3*4 }  : at least one discriminant is not a literal
fn get_enum_data(ast: &DeriveInput) -> Vec<(String, String)> {
    if let Data::Enum(enum_token) = &ast.data {
        let variants: Vec<_> = enum_token.variants.iter().collect();
        let mut variant_data = Vec::new();

        for v in variants {
            if !matches!(v.fields, syn::Fields::Unit) {
                panic!(
                    "variant {} for enum {} is not a unit variant!",
                    v.ident, ast.ident
                );
            }

            if v.discriminant.is_none() {
                panic!("at least one variant for enum {} has no value!", ast.ident);
            }

            let discriminant = v.discriminant.as_ref().unwrap();
            let literal = &discriminant.1;

            if let syn::Expr::Lit(expr_lit) = literal {
                if let syn::Lit::Int(e) = &expr_lit.lit {
                    variant_data.push((v.ident.to_string(), e.base10_digits().to_string()));
                } else {
                    panic!(
                        "variant {} is not an integer literal for enum {}",
                        ast.ident,
                        v.ident.to_string()
                    );
                }
            } else {
                panic!(
                    "not ExprLit for enum {} and variant {}!",
                    ast.ident,
                    v.ident.to_string()
                );
            }
        }

        variant_data
    } else {
        panic!("<{}> is not an enum!", ast.ident.to_string());
    }
}

// create code for implementation of Default, TryFrom<u8>, FromStr
pub fn id_tag(ast: &DeriveInput) -> TokenStream {
    let variant_data = get_enum_data(ast);

    let enum_name = &ast.ident;
    let enum_name_s = enum_name.to_string();

    let default_variant = format_ident!("{}", variant_data[0].0);

    let try_from_u8 = variant_data.iter().map(|v| {
        let value = v.1.parse::<u8>().unwrap();
        let variant = format_ident!("{}", v.0);

        quote! {
            #value => Ok(#enum_name::#variant),
        }
    });

    let from_str = variant_data.iter().map(|v| {
        let value = &v.0;
        let variant = format_ident!("{}", &v.0);

        quote! {
            #value => Ok(#enum_name::#variant),
        }
    });

    let impls = quote! {
        impl Default for #enum_name {
            fn default() -> Self {
                #enum_name::#default_variant
            }
        }

        impl std::convert::TryFrom<u8> for #enum_name {
            type Error = String;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    #(#try_from_u8)*
                    _ => Err(format!("error converting u8 value <{}> to enum type {}", value, #enum_name_s)),
                }
            }
        }

        impl std::str::FromStr for #enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    #(#from_str)*
                    _ => Err(format!("error converting string '{}' to enum type {}", s, #enum_name_s)),
                }
            }
        }
    };

    TokenStream::from(impls)
}
