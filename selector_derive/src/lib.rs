mod field_attr;
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use selector_core::EXCLUDED_PARAMETERS;
use syn::{Data, DeriveInput, Fields, ext::IdentExt, parse_macro_input};

use crate::field_attr::{FieldAttr, FieldDefault};

#[proc_macro_derive(Bindable, attributes(bindable))]
pub fn derive_bindable(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    generate_bindable(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn generate_bindable(input: &DeriveInput) -> syn::Result<TokenStream> {
    let struct_ident = &input.ident;
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            struct_ident,
            "Bindable can only be derived for structs",
        ));
    };
    let display_name = field_attr::struct_name(&input.attrs)?
        .unwrap_or_else(|| struct_ident.unraw().to_string());

    let fields: Vec<&syn::Field> = match &data.fields {
        Fields::Named(named) => named.named.iter().collect(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(unnamed) => {
            return Err(syn::Error::new_spanned(
                unnamed,
                "Bindable can't be derived for tuple structs",
            ));
        }
    };

    let mut base_layers = Vec::new();
    let mut parameters = Vec::new();
    let mut initializers = Vec::new();
    for field in fields {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let field_type = &field.ty;
        let attr = FieldAttr::from_attrs(&field.attrs)?;

        if attr.flatten {
            base_layers.push(quote! { <#field_type as ::selector::Bindable>::signature() });
            initializers.push(quote! {
                #field_ident: <#field_type as ::selector::Bindable>::from_arguments(arguments)?
            });
            continue;
        }

        let name = attr
            .long
            .clone()
            .unwrap_or_else(|| field_ident.unraw().to_string());
        if attr.skip || EXCLUDED_PARAMETERS.contains(&name.as_str()) {
            initializers.push(quote! { #field_ident: ::core::default::Default::default() });
            continue;
        }

        let hint = field_type.to_token_stream().to_string();
        let mut parameter = quote! { ::selector::Parameter::new(#name, #hint) };
        if let FieldDefault::Text(default) = &attr.default {
            parameter.extend(quote! { .with_default(#default) });
        }
        if let Some(doc) = field_attr::docs(&field.attrs)? {
            parameter.extend(quote! { .with_doc(#doc) });
        }
        if let Some(env) = &attr.env {
            parameter.extend(quote! { .with_env(#env) });
        }
        parameters.push(parameter);

        initializers.push(match attr.default {
            FieldDefault::Trait => quote! {
                #field_ident: arguments
                    .get::<::core::option::Option<#field_type>>(#name)?
                    .unwrap_or_default()
            },
            _ => quote! { #field_ident: arguments.get::<#field_type>(#name)? },
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::selector::Bindable for #struct_ident #ty_generics #where_clause {
            const NAME: &'static str = #display_name;

            fn signature() -> ::selector::Signature {
                ::selector::Signature::layered([
                    #(#base_layers,)*
                    ::selector::Signature::new() #(.with(#parameters))*,
                ])
            }

            #[allow(unused_variables)]
            fn from_arguments(
                arguments: &::selector::Arguments,
            ) -> ::selector::Result<Self> {
                ::core::result::Result::Ok(Self {
                    #(#initializers,)*
                })
            }
        }
    })
}
