use proc_macro2::Literal;
use quote::quote;
use syn::*;

/// Declares a parameter-file section: `#[run_parameters("grid")]`.
#[proc_macro_attribute]
pub fn run_parameters(
    args: proc_macro::TokenStream,
    input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    parameter_attr_derive(args, input)
}

pub(crate) fn parameter_attr_derive(
    args: proc_macro::TokenStream,
    input: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let args: proc_macro2::TokenStream = args.into();
    let section_name = match args.into_iter().next() {
        Some(proc_macro2::TokenTree::Literal(s)) => s,
        Some(_) => panic!("Unexpected token in run_parameters macro"),
        None => panic!("run_parameters needs a section name, e.g. #[run_parameters(\"grid\")]"),
    };

    let trait_impl: proc_macro2::TokenStream =
        parameters_trait_impl(input.clone(), section_name).into();
    let input: proc_macro2::TokenStream = input.into();
    let output = quote! {
        #[derive(Clone, serde::Serialize, serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        #[serde(rename_all = "snake_case")]
        #input

        #trait_impl
    };
    output.into()
}

pub(crate) fn parameters_trait_impl(
    input: proc_macro::TokenStream,
    section_name: Literal,
) -> proc_macro::TokenStream {
    let ast: DeriveInput = syn::parse(input).unwrap();
    let type_name = &ast.ident;
    let (impl_generics, type_generics, where_clause) = &ast.generics.split_for_impl();

    let gen = quote! {
        impl #impl_generics ::derive_traits::RunParameters for #type_name #type_generics #where_clause {
            fn section_name() -> &'static str {
                #section_name
            }
        }
    };
    gen.into()
}
