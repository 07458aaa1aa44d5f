//! Parsing of `#[jsonable(...)]` attributes.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, Lit, LitBool, LitStr, Path, Token, Type};

/// One field option, as written in an attribute.
pub enum OptionAttr {
    Name(LitStr),
    NameChoice(Vec<LitStr>),
    NameConverter(Path),
    NameInverter(Path),
    Omitempty(LitBool),
    OmitemptyTester(Path),
    Skip(LitBool),
    DefaultBeforeDecoding(Expr),
    Encoder(Path),
    Decoder(Path),
    BeforeDecoder(Path),
}

impl OptionAttr {
    pub fn is_name_choice(&self) -> bool {
        matches!(self, Self::NameChoice(_))
    }

    /// The `FieldOptions` builder call for this option. `ty` is the field's
    /// type; class-level encoders and decoders have none and work on `Data`.
    pub fn builder_call(&self, ty: Option<&Type>) -> TokenStream {
        match self {
            Self::Name(name) => quote! { .name(#name) },
            Self::NameChoice(choices) => quote! { .name_choice([#(#choices),*]) },
            Self::NameConverter(path) => quote! { .name_converter(#path) },
            Self::NameInverter(path) => quote! { .name_inverter(#path) },
            Self::Omitempty(flag) => quote! { .omitempty(#flag) },
            Self::OmitemptyTester(path) => quote! { .omitempty_tester(#path) },
            Self::Skip(flag) => quote! { .skip(#flag) },
            Self::DefaultBeforeDecoding(value) => {
                quote! { .default_before_decoding(::jsonable::Json::from(#value)) }
            }
            Self::Encoder(path) => match ty {
                Some(ty) => quote! { .typed_encoder::<#ty, _>(#path) },
                None => quote! { .encoder(#path) },
            },
            Self::Decoder(path) => match ty {
                Some(ty) => quote! { .typed_decoder::<#ty, _>(#path) },
                None => quote! { .decoder(#path) },
            },
            Self::BeforeDecoder(path) => quote! { .before_decoder(#path) },
        }
    }
}

/// How a field's declared default is produced.
pub enum FieldDefault {
    Trait,
    Path(Path),
}

#[derive(Default)]
pub struct ContainerAttrs {
    pub options: Vec<OptionAttr>,
    pub default_factory: Option<Path>,
}

#[derive(Default)]
pub struct FieldAttrs {
    pub options: Vec<OptionAttr>,
    pub default: Option<FieldDefault>,
}

/// `#[jsonable(value = ...)]` on an enumeration variant.
pub enum VariantValue {
    Int(i64),
    Str(LitStr),
}

fn jsonable_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|a| a.path().is_ident("jsonable"))
}

fn flag(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<LitBool> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse()
    } else {
        Ok(LitBool::new(true, Span::call_site()))
    }
}

fn parse_option(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<Option<OptionAttr>> {
    let path = &meta.path;
    let option = if path.is_ident("name") {
        OptionAttr::Name(meta.value()?.parse()?)
    } else if path.is_ident("name_choice") {
        let content;
        syn::parenthesized!(content in meta.input);
        let choices = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
        OptionAttr::NameChoice(choices.into_iter().collect())
    } else if path.is_ident("name_converter") {
        OptionAttr::NameConverter(meta.value()?.parse()?)
    } else if path.is_ident("name_inverter") {
        OptionAttr::NameInverter(meta.value()?.parse()?)
    } else if path.is_ident("omitempty") {
        OptionAttr::Omitempty(flag(meta)?)
    } else if path.is_ident("omitempty_tester") {
        OptionAttr::OmitemptyTester(meta.value()?.parse()?)
    } else if path.is_ident("skip") {
        OptionAttr::Skip(flag(meta)?)
    } else if path.is_ident("default_before_decoding") {
        OptionAttr::DefaultBeforeDecoding(meta.value()?.parse()?)
    } else if path.is_ident("encoder") {
        OptionAttr::Encoder(meta.value()?.parse()?)
    } else if path.is_ident("decoder") {
        OptionAttr::Decoder(meta.value()?.parse()?)
    } else if path.is_ident("before_decoder") {
        OptionAttr::BeforeDecoder(meta.value()?.parse()?)
    } else {
        return Ok(None);
    };
    Ok(Some(option))
}

pub fn container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut out = ContainerAttrs::default();
    for attr in jsonable_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default_factory") {
                out.default_factory = Some(meta.value()?.parse()?);
                return Ok(());
            }
            match parse_option(&meta)? {
                Some(option) => {
                    out.options.push(option);
                    Ok(())
                }
                None => Err(meta.error("unknown jsonable container attribute")),
            }
        })?;
    }
    Ok(out)
}

pub fn field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in jsonable_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                out.default = Some(if meta.input.peek(Token![=]) {
                    FieldDefault::Path(meta.value()?.parse()?)
                } else {
                    FieldDefault::Trait
                });
                return Ok(());
            }
            match parse_option(&meta)? {
                Some(option) => {
                    out.options.push(option);
                    Ok(())
                }
                None => Err(meta.error("unknown jsonable field attribute")),
            }
        })?;
    }
    Ok(out)
}

pub fn variant_value(attrs: &[Attribute]) -> syn::Result<Option<VariantValue>> {
    let mut out = None;
    for attr in jsonable_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("value") {
                return Err(meta.error("unknown jsonable variant attribute"));
            }
            out = Some(match meta.value()?.parse::<Expr>()? {
                Expr::Lit(syn::ExprLit {
                    lit: Lit::Str(s), ..
                }) => VariantValue::Str(s),
                expr => VariantValue::Int(int_literal(&expr)?),
            });
            Ok(())
        })?;
    }
    Ok(out)
}

/// Reads an integer literal, optionally negated.
pub fn int_literal(expr: &Expr) -> syn::Result<i64> {
    match expr {
        Expr::Lit(syn::ExprLit {
            lit: Lit::Int(int), ..
        }) => int.base10_parse(),
        Expr::Unary(syn::ExprUnary {
            op: syn::UnOp::Neg(_),
            expr,
            ..
        }) => int_literal(expr).map(|v| -v),
        Expr::Group(group) => int_literal(&group.expr),
        Expr::Paren(paren) => int_literal(&paren.expr),
        other => Err(syn::Error::new_spanned(
            other,
            "expected an integer literal or a string literal",
        )),
    }
}
