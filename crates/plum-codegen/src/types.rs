//! Canonical model types shared by every vendor parser and every emitter.
//!
//! A vendor payload is normalized into a [`RequestData`]: a flat list of
//! [`RequestModel`]s whose [`Param`]s reference either a primitive
//! [`VariableType`] tag or another model by class name.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Primitive type tags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    String,
    Int,
    Float,
    Bool,
    Object,
    Dict,
    List,
    Datetime,
}

impl VariableType {
    pub const ALL: [Self; 8] = [
        Self::String,
        Self::Int,
        Self::Float,
        Self::Bool,
        Self::Object,
        Self::Dict,
        Self::List,
        Self::Datetime,
    ];

    /// The tag stored in [`Param::type_name`].
    pub fn tag(self) -> &'static str {
        match self {
            Self::String => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Object => "object",
            Self::Dict => "dict",
            Self::List => "list",
            Self::Datetime => "datetime",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    /// True for any primitive tag, false for model names.
    pub fn is_primitive(tag: &str) -> bool {
        Self::from_tag(tag).is_some()
    }
}

// ---------------------------------------------------------------------------
// Model kind (selects the configured base type)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Param,
    Response,
    Request,
    Child,
}

// ---------------------------------------------------------------------------
// Param / RequestModel / RequestData
// ---------------------------------------------------------------------------

/// One field of a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    pub name: String,
    /// Primitive tag or the class name of another model.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Element type, only present when `type_name` is the list tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_type: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    pub required: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub removed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
}

impl Param {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    pub fn list_of(name: impl Into<String>, child_type: Option<String>) -> Self {
        Self {
            name: name.into(),
            type_name: VariableType::List.tag().to_string(),
            child_type,
            ..Default::default()
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_list(&self) -> bool {
        self.type_name == VariableType::List.tag()
    }

    /// Model names this field points at (non-primitive `type` / `child_type`).
    pub fn model_refs(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.type_name.as_str())
            .chain(self.child_type.as_deref())
            .filter(|t| !t.is_empty() && !VariableType::is_primitive(t))
    }

    /// Should this field be emitted given the removed/deprecated toggles?
    pub fn is_visible(&self, need_removed: bool, need_deprecated: bool) -> bool {
        !(self.removed && !need_removed) && !(self.deprecated && !need_deprecated)
    }
}

/// One synthesized class/interface definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestModel {
    pub class_name: String,
    pub parent_model_type: ModelKind,
    pub child_params: Vec<Param>,
}

impl RequestModel {
    pub fn new(class_name: impl Into<String>, kind: ModelKind, child_params: Vec<Param>) -> Self {
        Self {
            class_name: class_name.into(),
            parent_model_type: kind,
            child_params,
        }
    }
}

/// One fully parsed API method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_name: Option<String>,
    pub params: Vec<RequestModel>,
    pub responses: Vec<RequestModel>,
    pub comments: Vec<String>,
}

impl RequestData {
    /// A result carrying nothing but an explanation.
    pub fn failure(comment: impl Into<String>) -> Self {
        Self {
            comments: vec![comment.into()],
            ..Default::default()
        }
    }

    pub fn has_models(&self) -> bool {
        !self.params.is_empty() || !self.responses.is_empty()
    }

    /// The top-level param model (last element of `params`).
    pub fn root_param(&self) -> Option<&RequestModel> {
        self.params.last()
    }

    pub fn models(&self) -> impl Iterator<Item = &RequestModel> {
        self.params.iter().chain(self.responses.iter())
    }
}
