//! Field registry: type tag to value shape and rendering strategy
//!
//! Pure lookup over the closed `FieldType` enum. Unknown type tags never get
//! this far: they fail serde deserialization of the configuration, which is
//! the load-time configuration error the engine wants.

use crate::forms::{FieldType, FieldValue};

/// Shape of the value a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Text,
    Numeric,
    Boolean,
    List,
    FilePath,
}

/// How a field is presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    /// Single-line text input
    Input,
    /// Single-line input with masked echo
    MaskedInput,
    /// Multi-line text input
    MultilineInput,
    /// Pick exactly one option
    ChoiceList,
    /// Pick any number of options
    MultiChoiceList,
    /// On/off toggle
    Toggle,
    /// Path to a local file
    FileInput,
}

/// Resolve the value shape for a field type
pub fn value_shape(ty: FieldType) -> ValueShape {
    match ty {
        FieldType::Text
        | FieldType::Email
        | FieldType::Password
        | FieldType::Date
        | FieldType::Datetime
        | FieldType::Tel
        | FieldType::Url
        | FieldType::Textarea
        | FieldType::Select
        | FieldType::RadioGroup => ValueShape::Text,
        FieldType::Number | FieldType::Currency | FieldType::Percentage => ValueShape::Numeric,
        FieldType::Switch => ValueShape::Boolean,
        FieldType::Multiselect | FieldType::CheckboxGroup => ValueShape::List,
        FieldType::File => ValueShape::FilePath,
    }
}

/// Resolve the rendering strategy for a field type
pub fn render_strategy(ty: FieldType) -> RenderStrategy {
    match ty {
        FieldType::Text
        | FieldType::Email
        | FieldType::Number
        | FieldType::Currency
        | FieldType::Percentage
        | FieldType::Date
        | FieldType::Datetime
        | FieldType::Tel
        | FieldType::Url => RenderStrategy::Input,
        FieldType::Password => RenderStrategy::MaskedInput,
        FieldType::Textarea => RenderStrategy::MultilineInput,
        FieldType::Select | FieldType::RadioGroup => RenderStrategy::ChoiceList,
        FieldType::Multiselect | FieldType::CheckboxGroup => RenderStrategy::MultiChoiceList,
        FieldType::Switch => RenderStrategy::Toggle,
        FieldType::File => RenderStrategy::FileInput,
    }
}

/// Initial value for a field type when no default is declared
pub fn empty_value(ty: FieldType) -> FieldValue {
    match value_shape(ty) {
        ValueShape::Text | ValueShape::FilePath => FieldValue::Text(String::new()),
        // Numeric fields start as empty text; the user types digits
        ValueShape::Numeric => FieldValue::Text(String::new()),
        ValueShape::Boolean => FieldValue::Bool(false),
        ValueShape::List => FieldValue::List(Vec::new()),
    }
}
