//! Record schemas and the trait records implement.
//!
//! A [`RecordType`] is built once per Rust type (the derive keeps it in a
//! `static`) and never changes afterwards. Each field carries write-once
//! caches for its effective options, its resolved descriptor and its codec
//! pair. Concurrent first use may compute an entry more than once; only one
//! result is ever published and every caller gets that one.

use crate::options::{EffectiveOptions, FieldOptions};
use crate::registry::{self, DecodeFn, EncodeFn};
use crate::{Data, Depth, Error, Jsonable, JsonMap, Portable, Result, TypeDescriptor};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Produces the declared type of a field. Called lazily, so a field may name
/// a type defined later, or the record's own type behind a `Box` or `Vec`.
pub type DescriptorFn = fn() -> TypeDescriptor;

/// Class-level default for fields that have neither a decoded value nor a
/// declared default. [`zero_value`](crate::zero_value) is the usual choice.
pub type DefaultFactory = fn(&TypeDescriptor, Depth) -> Result<Data>;

/// One declared field.
pub struct FieldDef {
    name: &'static str,
    descriptor_fn: DescriptorFn,
    has_default: bool,
    options: FieldOptions,
    effective: OnceLock<Arc<EffectiveOptions>>,
    descriptor: OnceLock<TypeDescriptor>,
    encoder: OnceLock<EncodeFn>,
    decoder: OnceLock<DecodeFn>,
}

impl FieldDef {
    pub fn new(name: &'static str, descriptor: DescriptorFn) -> Self {
        Self {
            name,
            descriptor_fn: descriptor,
            has_default: false,
            options: FieldOptions::default(),
            effective: OnceLock::new(),
            descriptor: OnceLock::new(),
            encoder: OnceLock::new(),
            decoder: OnceLock::new(),
        }
    }

    /// Declares the field type through its Rust type.
    pub fn of<T: Portable>(name: &'static str) -> Self {
        Self::new(name, T::descriptor)
    }

    #[must_use]
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    /// Marks the field as having a declared default, which the class-level
    /// default factory then leaves alone.
    #[must_use]
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }

    /// The options as declared on the field, before the class-level merge.
    pub fn declared_options(&self) -> &FieldOptions {
        &self.options
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("has_default", &self.has_default)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// The schema of a record: ordered fields plus class-level configuration.
pub struct RecordType {
    name: &'static str,
    fields: Vec<FieldDef>,
    options: FieldOptions,
    default_factory: Option<DefaultFactory>,
}

impl RecordType {
    pub fn builder(name: &'static str) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name,
            fields: Vec::new(),
            options: FieldOptions::default(),
            default_factory: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Class-level options inherited by every field.
    pub fn class_options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn default_factory(&self) -> Option<DefaultFactory> {
        self.default_factory
    }

    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == field)
    }

    fn index_of(&self, field: &str) -> Result<usize> {
        self.field_index(field).ok_or_else(|| Error::UnknownField {
            record: self.name.to_owned(),
            field: field.to_owned(),
        })
    }

    /// The merged options of `field`. Repeated calls return the same `Arc`.
    pub fn effective_options(&self, field: &str) -> Result<Arc<EffectiveOptions>> {
        Ok(self.options_at(self.index_of(field)?))
    }

    /// The declared type of `field`.
    pub fn descriptor(&self, field: &str) -> Result<&TypeDescriptor> {
        Ok(self.descriptor_at(self.index_of(field)?))
    }

    pub(crate) fn options_at(&self, index: usize) -> Arc<EffectiveOptions> {
        let field = &self.fields[index];
        let options = field.effective.get_or_init(|| {
            debug!(record = self.name, field = field.name, "resolved field options");
            Arc::new(EffectiveOptions::resolve(&self.options, &field.options))
        });
        Arc::clone(options)
    }

    pub(crate) fn descriptor_at(&self, index: usize) -> &TypeDescriptor {
        let field = &self.fields[index];
        field.descriptor.get_or_init(field.descriptor_fn)
    }

    pub(crate) fn encoder_at(&self, index: usize) -> Result<EncodeFn> {
        let field = &self.fields[index];
        if let Some(encoder) = field.encoder.get() {
            return Ok(Arc::clone(encoder));
        }
        let resolved = registry::resolve_encoder(self.descriptor_at(index))?;
        debug!(
            record = self.name,
            field = field.name,
            descriptor = %self.descriptor_at(index),
            "resolved field encoder"
        );
        Ok(Arc::clone(field.encoder.get_or_init(|| resolved)))
    }

    pub(crate) fn decoder_at(&self, index: usize) -> Result<DecodeFn> {
        let field = &self.fields[index];
        if let Some(decoder) = field.decoder.get() {
            return Ok(Arc::clone(decoder));
        }
        let resolved = registry::resolve_decoder(self.descriptor_at(index))?;
        debug!(
            record = self.name,
            field = field.name,
            descriptor = %self.descriptor_at(index),
            "resolved field decoder"
        );
        Ok(Arc::clone(field.decoder.get_or_init(|| resolved)))
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("options", &self.options)
            .field("default_factory", &self.default_factory.is_some())
            .finish()
    }
}

pub struct RecordTypeBuilder {
    name: &'static str,
    fields: Vec<FieldDef>,
    options: FieldOptions,
    default_factory: Option<DefaultFactory>,
}

impl RecordTypeBuilder {
    /// Sets the class-level options.
    #[must_use]
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn default_factory(mut self, factory: DefaultFactory) -> Self {
        self.default_factory = Some(factory);
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> RecordType {
        RecordType {
            name: self.name,
            fields: self.fields,
            options: self.options,
            default_factory: self.default_factory,
        }
    }
}

/// A struct whose fields are described by a [`RecordType`].
///
/// Usually derived with `#[derive(Record)]`, which also implements
/// [`Jsonable`] through [`codec`](crate::codec).
pub trait Record: Jsonable {
    fn record_type() -> &'static RecordType;

    /// Field values in declaration order.
    fn to_fields(&self) -> Vec<Data>;

    fn from_fields(values: FieldValues) -> Result<Self>;

    /// Whether [`from_fields`](Record::from_fields) keeps the decoded
    /// [`Origin`]. Decoding only builds one when this is set.
    const KEEPS_ORIGIN: bool = false;

    /// Where this instance was decoded from, if it keeps track.
    ///
    /// `name_choice` fields re-encode under the key found here, so records
    /// using them set [`KEEPS_ORIGIN`](Record::KEEPS_ORIGIN) and return it.
    fn origin(&self) -> Option<&Origin> {
        None
    }
}

/// Decoded field values on their way into a record constructor.
///
/// A slot is `None` when decoding found nothing for it and no default factory
/// filled it in.
pub struct FieldValues {
    record: &'static RecordType,
    values: Vec<Option<Data>>,
    origin: Origin,
}

impl FieldValues {
    pub fn new(record: &'static RecordType, values: Vec<Option<Data>>, origin: Origin) -> Self {
        Self {
            record,
            values,
            origin,
        }
    }

    fn field_name(&self, index: usize) -> &'static str {
        self.record.fields.get(index).map_or("?", FieldDef::name)
    }

    pub fn is_present(&self, index: usize) -> bool {
        self.values.get(index).is_some_and(Option::is_some)
    }

    /// Takes the value of field `index`, failing if it has none.
    pub fn take<T: Portable>(&mut self, index: usize) -> Result<T> {
        match self.values.get_mut(index).and_then(Option::take) {
            Some(data) => self.convert(index, data),
            None => Err(Error::MissingRequiredField {
                record: self.record.name.to_owned(),
                field: self.field_name(index).to_owned(),
            }),
        }
    }

    /// Takes the value of field `index`, or its declared default.
    pub fn take_or_else<T, F>(&mut self, index: usize, default: F) -> Result<T>
    where
        T: Portable,
        F: FnOnce() -> T,
    {
        match self.values.get_mut(index).and_then(Option::take) {
            Some(data) => self.convert(index, data),
            None => Ok(default()),
        }
    }

    fn convert<T: Portable>(&self, index: usize, data: Data) -> Result<T> {
        T::from_data(data).map_err(|e| e.in_field(self.record.name, self.field_name(index)))
    }

    pub fn take_origin(&mut self) -> Origin {
        std::mem::take(&mut self.origin)
    }
}

struct DecodeTrace {
    source: JsonMap,
    chosen: HashMap<&'static str, String>,
}

/// The map a record was decoded from, and the key each field was found under.
///
/// Not part of the record's value: every `Origin` equals every other, and it
/// is never encoded. Instances built directly carry an empty `Origin`.
///
/// Derived records using `name_choice` must declare one:
///
/// ```compile_fail
/// use jsonable::Record;
///
/// #[derive(Debug, Clone, Record)]
/// struct Plain {
///     #[jsonable(name_choice("Value", "Data"))]
///     value: String,
/// }
/// ```
#[derive(Clone, Default)]
pub struct Origin(Option<Arc<DecodeTrace>>);

impl Origin {
    pub fn new(source: JsonMap, chosen: HashMap<&'static str, String>) -> Self {
        Self(Some(Arc::new(DecodeTrace { source, chosen })))
    }

    pub fn source(&self) -> Option<&JsonMap> {
        self.0.as_ref().map(|trace| &trace.source)
    }

    /// The key `field` was decoded from.
    pub fn chosen_key(&self, field: &str) -> Option<&str> {
        self.0
            .as_ref()
            .and_then(|trace| trace.chosen.get(field))
            .map(String::as_str)
    }
}

impl PartialEq for Origin {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for Origin {}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source() {
            Some(source) => f.debug_tuple("Origin").field(source).finish(),
            None => f.write_str("Origin(None)"),
        }
    }
}
