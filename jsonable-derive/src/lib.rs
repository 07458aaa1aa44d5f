use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Type, parse_macro_input};

mod attrs;

use attrs::{FieldDefault, VariantValue};

/// Derive `Record`, `Jsonable` and `Portable` for a struct with named fields.
///
/// The struct must also derive (or implement) `Clone` and `Debug`.
///
/// ```ignore
/// #[derive(Debug, Clone, Record)]
/// #[jsonable(omitempty, default_factory = jsonable::zero_value)]
/// struct Pencil {
///     name: String,
///     #[jsonable(name = "create_time", encoder = iso8601, decoder = parse_iso8601)]
///     created_at: DateTime<Utc>,
///     #[jsonable(name_choice("Value", "Data"))]
///     value: Option<String>,
///     #[jsonable(skip, default)]
///     cached: u64,
///     origin: Origin,
/// }
/// ```
///
/// A field whose type is named `Origin` receives the decoded source map and
/// is left out of encoding. Records using `name_choice` must declare one: it
/// holds the key each field was decoded from, which re-encoding reuses.
#[proc_macro_derive(Record, attributes(jsonable))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_record(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive `Enumeration` and `Portable` for an enum with unit variants.
///
/// Variants are represented by their discriminant (explicit or implied) or by
/// `#[jsonable(value = "...")]`.
#[proc_macro_derive(Enumeration, attributes(jsonable))]
pub fn derive_enumeration(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_enumeration(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Extract the last path segment name from a type.
fn extract_last_segment(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|seg| seg.ident.to_string()),
        _ => None,
    }
}

fn expand_record(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let name_str = name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Record can only be derived for structs",
            ));
        }
    };

    let container = attrs::container_attrs(&input.attrs)?;
    let mut name_choice_at = container
        .options
        .iter()
        .any(attrs::OptionAttr::is_name_choice)
        .then(|| name.span());
    let class_options = container.options.iter().map(|o| o.builder_call(None));
    let factory = container
        .default_factory
        .as_ref()
        .map(|path| quote! { .default_factory(#path) });

    let mut field_defs = Vec::new();
    let mut to_data = Vec::new();
    let mut inits = Vec::new();
    let mut origin_field = None;

    for field in fields {
        let Some(fname) = field.ident.as_ref() else {
            continue;
        };
        let ftype = &field.ty;

        if extract_last_segment(ftype).as_deref() == Some("Origin") {
            if origin_field.is_some() {
                return Err(syn::Error::new_spanned(
                    fname,
                    "a record can only have one Origin field",
                ));
            }
            origin_field = Some(fname);
            inits.push(quote! { #fname: values.take_origin() });
            continue;
        }

        let attrs = attrs::field_attrs(&field.attrs)?;
        if name_choice_at.is_none()
            && attrs.options.iter().any(attrs::OptionAttr::is_name_choice)
        {
            name_choice_at = Some(fname.span());
        }
        let index = field_defs.len();
        let fname_str = fname.to_string();
        let options = attrs.options.iter().map(|o| o.builder_call(Some(ftype)));
        let with_default = attrs.default.is_some().then(|| quote! { .with_default() });

        field_defs.push(quote! {
            ::jsonable::FieldDef::new(#fname_str, <#ftype as ::jsonable::Portable>::descriptor)
                .options(::jsonable::FieldOptions::new() #(#options)*)
                #with_default
        });
        to_data.push(quote! { ::jsonable::Portable::to_data(&self.#fname) });
        inits.push(match &attrs.default {
            None => quote! { #fname: values.take::<#ftype>(#index)? },
            Some(FieldDefault::Trait) => quote! {
                #fname: values.take_or_else::<#ftype, _>(#index, ::core::default::Default::default)?
            },
            Some(FieldDefault::Path(path)) => quote! {
                #fname: values.take_or_else::<#ftype, _>(#index, #path)?
            },
        });
    }

    if let (None, Some(span)) = (origin_field, name_choice_at) {
        return Err(syn::Error::new(
            span,
            "`name_choice` needs an `Origin` field to re-encode under the key it was decoded from",
        ));
    }

    let origin = origin_field.map(|fname| {
        quote! {
            const KEEPS_ORIGIN: bool = true;

            fn origin(&self) -> ::core::option::Option<&::jsonable::Origin> {
                ::core::option::Option::Some(&self.#fname)
            }
        }
    });

    Ok(quote! {
        impl ::jsonable::Record for #name {
            fn record_type() -> &'static ::jsonable::RecordType {
                static RECORD_TYPE: ::jsonable::__private::LazyLock<::jsonable::RecordType> =
                    ::jsonable::__private::LazyLock::new(|| {
                        ::jsonable::RecordType::builder(#name_str)
                            .options(::jsonable::FieldOptions::new() #(#class_options)*)
                            #factory
                            #(.field(#field_defs))*
                            .build()
                    });
                &RECORD_TYPE
            }

            fn to_fields(&self) -> ::std::vec::Vec<::jsonable::Data> {
                ::std::vec![#(#to_data),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn from_fields(mut values: ::jsonable::FieldValues) -> ::jsonable::Result<Self> {
                ::core::result::Result::Ok(Self {
                    #(#inits,)*
                })
            }

            #origin
        }

        impl ::jsonable::Jsonable for #name {
            fn to_map(&self) -> ::jsonable::Result<::jsonable::JsonMap> {
                ::jsonable::codec::encode(self)
            }

            fn from_map(map: &::jsonable::JsonMap) -> ::jsonable::Result<Self> {
                ::jsonable::codec::decode(map)
            }

            fn to_map_within(
                &self,
                depth: ::jsonable::Depth,
            ) -> ::jsonable::Result<::jsonable::JsonMap> {
                ::jsonable::codec::encode_within(self, depth)
            }

            fn from_map_within(
                map: &::jsonable::JsonMap,
                depth: ::jsonable::Depth,
            ) -> ::jsonable::Result<Self> {
                ::jsonable::codec::decode_within(map, depth)
            }

            fn zero_within(depth: ::jsonable::Depth) -> ::jsonable::Result<Self> {
                ::jsonable::codec::decode_zeroed(&::jsonable::JsonMap::new(), depth)
            }

            fn field_data(&self) -> ::core::option::Option<::std::vec::Vec<::jsonable::Data>> {
                ::core::option::Option::Some(::jsonable::Record::to_fields(self))
            }
        }

        ::jsonable::impl_nested!(#name);
    })
}

fn expand_enumeration(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let name_str = name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Enumeration cannot be derived for generic types",
        ));
    }

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "Enumeration can only be derived for enums",
        ));
    };

    let mut members = Vec::new();
    let mut idents = Vec::new();
    let mut next: i64 = 0;

    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Enumeration variants cannot carry data",
            ));
        }
        let ident = &variant.ident;
        let member_name = ident.to_string();

        let discriminant = match &variant.discriminant {
            Some((_, expr)) => attrs::int_literal(expr)?,
            None => next,
        };
        next = discriminant.wrapping_add(1);

        members.push(match attrs::variant_value(&variant.attrs)? {
            Some(VariantValue::Str(value)) => {
                quote! { ::jsonable::EnumMember::string(#member_name, #value) }
            }
            Some(VariantValue::Int(value)) => {
                quote! { ::jsonable::EnumMember::int(#member_name, #value) }
            }
            None => quote! { ::jsonable::EnumMember::int(#member_name, #discriminant) },
        });
        idents.push(ident);
    }

    let indices: Vec<usize> = (0..idents.len()).collect();

    Ok(quote! {
        impl ::jsonable::Enumeration for #name {
            fn enum_type() -> ::jsonable::__private::Arc<::jsonable::EnumType> {
                static ENUM_TYPE: ::jsonable::__private::LazyLock<
                    ::jsonable::__private::Arc<::jsonable::EnumType>,
                > = ::jsonable::__private::LazyLock::new(|| {
                    ::jsonable::__private::Arc::new(::jsonable::EnumType::new(
                        #name_str,
                        ::std::vec![#(#members),*],
                    ))
                });
                ::jsonable::__private::Arc::clone(&ENUM_TYPE)
            }

            fn index(&self) -> usize {
                match *self {
                    #(Self::#idents => #indices,)*
                }
            }

            fn from_index(index: usize) -> ::core::option::Option<Self> {
                match index {
                    #(#indices => ::core::option::Option::Some(Self::#idents),)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        ::jsonable::impl_enumeration!(#name);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn name_choice_without_origin_is_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Plain {
                #[jsonable(name_choice("Value", "Data"))]
                value: String,
            }
        };
        let err = expand_record(&input).unwrap_err();
        assert!(err.to_string().contains("`Origin` field"));
    }

    #[test]
    fn class_level_name_choice_without_origin_is_rejected() {
        let input: DeriveInput = parse_quote! {
            #[jsonable(name_choice("Value"))]
            struct Plain {
                value: String,
            }
        };
        assert!(expand_record(&input).is_err());
    }

    #[test]
    fn name_choice_with_origin_expands() {
        let input: DeriveInput = parse_quote! {
            struct Payload {
                #[jsonable(name_choice("Value", "Data"))]
                value: String,
                origin: Origin,
            }
        };
        let tokens = expand_record(&input).unwrap().to_string();
        assert!(tokens.contains("KEEPS_ORIGIN"));
    }

    #[test]
    fn records_without_origin_do_not_keep_one() {
        let input: DeriveInput = parse_quote! {
            struct Point {
                x: i64,
            }
        };
        let tokens = expand_record(&input).unwrap().to_string();
        assert!(!tokens.contains("KEEPS_ORIGIN"));
    }
}
