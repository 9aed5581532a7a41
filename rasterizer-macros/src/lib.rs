use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Error, Field, Ident, Result};

/// Derives `shaded_raster::Interpolate` for a struct with named fields by
/// interpolating every field with the same three ratios.
#[proc_macro_derive(Interpolate)]
pub fn derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let derive = parse_macro_input!(input as DeriveInput);

    match generate_impl(derive) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error(),
    }
    .into()
}

struct AttributeStruct {
    derive: DeriveInput,
    fields: Vec<Field>,
}

impl AttributeStruct {
    fn from_derive_input(derive: DeriveInput) -> Result<Self> {
        let fields: Vec<Field> = match &derive.data {
            syn::Data::Struct(syn::DataStruct {
                fields: syn::Fields::Named(syn::FieldsNamed { named, .. }),
                ..
            }) => named.iter().cloned().collect(),
            syn::Data::Struct(syn::DataStruct {
                fields: syn::Fields::Unit,
                ..
            }) => Vec::new(),
            _ => {
                return Err(Error::new(
                    Span::call_site(),
                    "Interpolate can only be derived for structs with named fields",
                ))
            }
        };

        Ok(Self { derive, fields })
    }

    fn name(&self) -> &Ident {
        &self.derive.ident
    }
}

fn generate_field_interpolation(field: &Field) -> Result<TokenStream> {
    let name = field
        .ident
        .as_ref()
        .ok_or_else(|| Error::new(Span::call_site(), "field must have a name"))?;
    let ty = &field.ty;
    Ok(quote! {
        #name: <#ty as ::shaded_raster::Interpolate>::interpolate(
            &v0.#name, &v1.#name, &v2.#name, r0, r1, r2
        )
    })
}

fn generate_impl(derive: DeriveInput) -> Result<TokenStream> {
    let attributes = AttributeStruct::from_derive_input(derive)?;
    let name = attributes.name();
    let (impl_generics, ty_generics, where_clause) = attributes.derive.generics.split_for_impl();

    let field_assignments = attributes
        .fields
        .iter()
        .map(generate_field_interpolation)
        .collect::<Result<Vec<_>>>()?;

    // unit structs never read their arguments
    let unused = if field_assignments.is_empty() {
        quote! { let _ = (v0, v1, v2, r0, r1, r2); }
    } else {
        TokenStream::new()
    };

    Ok(quote! {
        impl #impl_generics ::shaded_raster::Interpolate for #name #ty_generics #where_clause {
            fn interpolate(v0: &Self, v1: &Self, v2: &Self, r0: f32, r1: f32, r2: f32) -> Self {
                #unused
                Self {
                    #(#field_assignments),*
                }
            }
        }
    })
}
