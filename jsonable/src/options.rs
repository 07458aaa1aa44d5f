//! Per-field options and their class/field merge.

use crate::{Data, Json, Portable, Result};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Maps a field name to a key.
pub type NameFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Decides whether a value counts as empty for `omitempty`.
pub type EmptyFn = Arc<dyn Fn(&Data) -> bool + Send + Sync>;

/// Replaces the dispatched encoder of a field.
pub type FieldEncodeFn = Arc<dyn Fn(&Data) -> Result<Json> + Send + Sync>;

/// Replaces the dispatched decoder of a field.
pub type FieldDecodeFn = Arc<dyn Fn(Json) -> Result<Data> + Send + Sync>;

/// Rewrites a raw value before it is decoded.
pub type HookFn = Arc<dyn Fn(Json) -> Result<Json> + Send + Sync>;

/// Options attached to a field or, as class-level defaults, to a record type.
///
/// Every option is unset by default. Unset options never override a set
/// class-level option when the two are merged.
#[derive(Clone, Default)]
pub struct FieldOptions {
    /// Fixed key, used for both encoding and decoding.
    pub name: Option<String>,
    /// Keys tried in order when decoding.
    pub name_choice: Option<Vec<String>>,
    /// Derives the key from the field name.
    pub name_converter: Option<NameFn>,
    /// Derives the decoding key from the field name, in place of
    /// `name_converter`.
    pub name_inverter: Option<NameFn>,
    pub omitempty: Option<bool>,
    pub omitempty_tester: Option<EmptyFn>,
    pub skip: Option<bool>,
    /// Substituted when no candidate key is present.
    pub default_before_decoding: Option<Json>,
    pub encoder: Option<FieldEncodeFn>,
    pub decoder: Option<FieldDecodeFn>,
    pub before_decoder: Option<HookFn>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn name_choice<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.name_choice = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn name_converter(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.name_converter = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn name_inverter(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.name_inverter = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn omitempty(mut self, omitempty: bool) -> Self {
        self.omitempty = Some(omitempty);
        self
    }

    #[must_use]
    pub fn omitempty_tester(mut self, f: impl Fn(&Data) -> bool + Send + Sync + 'static) -> Self {
        self.omitempty_tester = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = Some(skip);
        self
    }

    #[must_use]
    pub fn default_before_decoding(mut self, value: impl Into<Json>) -> Self {
        self.default_before_decoding = Some(value.into());
        self
    }

    #[must_use]
    pub fn encoder(mut self, f: impl Fn(&Data) -> Result<Json> + Send + Sync + 'static) -> Self {
        self.encoder = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn decoder(mut self, f: impl Fn(Json) -> Result<Data> + Send + Sync + 'static) -> Self {
        self.decoder = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn before_decoder(mut self, f: impl Fn(Json) -> Result<Json> + Send + Sync + 'static) -> Self {
        self.before_decoder = Some(Arc::new(f));
        self
    }

    /// Sets an encoder written against the field's Rust type.
    #[must_use]
    pub fn typed_encoder<T, F>(self, f: F) -> Self
    where
        T: Portable + 'static,
        F: Fn(&T) -> Result<Json> + Send + Sync + 'static,
    {
        self.encoder(move |data| f(&T::from_data(data.clone())?))
    }

    /// Sets a decoder written against the field's Rust type.
    #[must_use]
    pub fn typed_decoder<T, F>(self, f: F) -> Self
    where
        T: Portable + 'static,
        F: Fn(Json) -> Result<T> + Send + Sync + 'static,
    {
        self.decoder(move |json| f(json).map(|value| value.to_data()))
    }

    /// Overlays every option set in `field` onto `class`.
    pub fn merged(class: &FieldOptions, field: &FieldOptions) -> FieldOptions {
        fn pick<T: Clone>(field: &Option<T>, class: &Option<T>) -> Option<T> {
            field.as_ref().or(class.as_ref()).cloned()
        }

        FieldOptions {
            name: pick(&field.name, &class.name),
            name_choice: pick(&field.name_choice, &class.name_choice),
            name_converter: pick(&field.name_converter, &class.name_converter),
            name_inverter: pick(&field.name_inverter, &class.name_inverter),
            omitempty: pick(&field.omitempty, &class.omitempty),
            omitempty_tester: pick(&field.omitempty_tester, &class.omitempty_tester),
            skip: pick(&field.skip, &class.skip),
            default_before_decoding: pick(
                &field.default_before_decoding,
                &class.default_before_decoding,
            ),
            encoder: pick(&field.encoder, &class.encoder),
            decoder: pick(&field.decoder, &class.decoder),
            before_decoder: pick(&field.before_decoder, &class.before_decoder),
        }
    }
}

fn same_fn<F: ?Sized>(a: &Option<Arc<F>>, b: &Option<Arc<F>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

/// Plain options compare by value, closures by identity.
impl PartialEq for FieldOptions {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.name_choice == other.name_choice
            && same_fn(&self.name_converter, &other.name_converter)
            && same_fn(&self.name_inverter, &other.name_inverter)
            && self.omitempty == other.omitempty
            && same_fn(&self.omitempty_tester, &other.omitempty_tester)
            && self.skip == other.skip
            && self.default_before_decoding == other.default_before_decoding
            && same_fn(&self.encoder, &other.encoder)
            && same_fn(&self.decoder, &other.decoder)
            && same_fn(&self.before_decoder, &other.before_decoder)
    }
}

impl fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = |o: bool| if o { Some("<fn>") } else { None };
        f.debug_struct("FieldOptions")
            .field("name", &self.name)
            .field("name_choice", &self.name_choice)
            .field("name_converter", &set(self.name_converter.is_some()))
            .field("name_inverter", &set(self.name_inverter.is_some()))
            .field("omitempty", &self.omitempty)
            .field("omitempty_tester", &set(self.omitempty_tester.is_some()))
            .field("skip", &self.skip)
            .field("default_before_decoding", &self.default_before_decoding)
            .field("encoder", &set(self.encoder.is_some()))
            .field("decoder", &set(self.decoder.is_some()))
            .field("before_decoder", &set(self.before_decoder.is_some()))
            .finish()
    }
}

/// The merged options of one field, built once and shared.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveOptions {
    options: FieldOptions,
}

impl EffectiveOptions {
    pub fn resolve(class: &FieldOptions, field: &FieldOptions) -> Self {
        Self {
            options: FieldOptions::merged(class, field),
        }
    }

    pub fn skip(&self) -> bool {
        self.options.skip.unwrap_or(false)
    }

    pub fn omitempty(&self) -> bool {
        self.options.omitempty.unwrap_or(false)
    }

    /// Applies the configured emptiness predicate, or the generic one.
    pub fn is_empty(&self, value: &Data) -> bool {
        match &self.options.omitempty_tester {
            Some(tester) => tester(value),
            None => value.is_empty_value(),
        }
    }

    /// True if `value` should be left out under `omitempty`.
    pub fn omits(&self, value: &Data) -> bool {
        self.omitempty() && self.is_empty(value)
    }
}

impl Deref for EffectiveOptions {
    type Target = FieldOptions;

    fn deref(&self) -> &FieldOptions {
        &self.options
    }
}
