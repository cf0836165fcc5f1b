//! Shared tree flattening used by every vendor parser.
//!
//! A vendor describes its raw field shape through a [`Dialect`]; the builder
//! walks the field tree depth-first, post-order, and turns every complex
//! field into a standalone [`RequestModel`] named by a synthetic path name
//! (see [`build_parent_path_name`]). The path name of the enclosing model is
//! threaded through the recursion, so raw fields are never mutated.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::naming::{build_parent_path_name, remove_special_characters};
use crate::types::{ModelKind, Param, RequestModel, VariableType};

/// Vendor-specific view of a raw documentation field.
pub trait Dialect {
    type Field;

    fn name<'a>(&self, field: &'a Self::Field) -> &'a str;

    fn children<'a>(&self, field: &'a Self::Field) -> &'a [Self::Field];

    /// The field is an object whose members become their own model.
    fn is_complex_object(&self, field: &Self::Field) -> bool;

    /// The field is a list whose element is itself a complex object.
    fn is_complex_list(&self, field: &Self::Field) -> bool;

    /// `(type tag or model name, element type)` before path rewriting.
    fn resolve_type(&self, field: &Self::Field) -> (String, Option<String>);

    /// Local class name of the nested model a complex field introduces.
    fn local_type_name(&self, field: &Self::Field) -> String;

    fn is_required(&self, field: &Self::Field) -> bool;

    fn is_deprecated(&self, _field: &Self::Field) -> bool {
        false
    }

    fn is_removed(&self, _field: &Self::Field) -> bool {
        false
    }

    fn description<'a>(&self, field: &'a Self::Field) -> &'a str;

    fn example<'a>(&self, _field: &'a Self::Field) -> Option<&'a str> {
        None
    }

    fn min_length(&self, _field: &Self::Field) -> Option<u64> {
        None
    }

    fn max_length(&self, _field: &Self::Field) -> Option<u64> {
        None
    }
}

/// Flatten `fields` into nested models (leaf-first) followed by the root
/// model `root_name`.
pub fn build_models<D: Dialect>(
    dialect: &D,
    root_name: &str,
    root_kind: ModelKind,
    fields: &[D::Field],
) -> Vec<RequestModel> {
    let mut models = Vec::new();
    let root_params = distinct_siblings(dialect, fields)
        .map(|field| flatten(dialect, field, "", &mut models))
        .collect();
    models.push(RequestModel::new(root_name, root_kind, root_params));
    models
}

fn flatten<D: Dialect>(
    dialect: &D,
    field: &D::Field,
    parent_path: &str,
    models: &mut Vec<RequestModel>,
) -> Param {
    let mut param = to_param(dialect, field);

    let is_list = dialect.is_complex_list(field);
    if !is_list && !dialect.is_complex_object(field) {
        return param;
    }

    let local = dialect.local_type_name(field);
    let path = build_parent_path_name(&local, &[parent_path, dialect.name(field)]);

    let child_params: Vec<Param> = distinct_siblings(dialect, dialect.children(field))
        .map(|child| flatten(dialect, child, &path, models))
        .collect();

    debug!(model = %path, fields = child_params.len(), "flattened nested model");
    models.push(RequestModel::new(path.clone(), ModelKind::Child, child_params));

    if is_list {
        param.type_name = VariableType::List.tag().to_string();
        param.child_type = Some(path);
    } else {
        param.type_name = path;
        param.child_type = None;
    }
    param
}

/// Sibling rows in document order, keeping the first row of each name.
/// Path names are unique per model only when sibling names are.
fn distinct_siblings<'a, D: Dialect>(
    dialect: &'a D,
    fields: &'a [D::Field],
) -> impl Iterator<Item = &'a D::Field> {
    let mut seen = HashSet::new();
    fields.iter().filter(move |field| {
        let name = dialect.name(field);
        let first = seen.insert(name);
        if !first {
            warn!(field = name, "duplicate sibling row skipped");
        }
        first
    })
}

fn to_param<D: Dialect>(dialect: &D, field: &D::Field) -> Param {
    let name = dialect.name(field);
    let (mut type_name, child_type) = dialect.resolve_type(field);
    if type_name.is_empty() {
        warn!(field = name, "unresolved field type, falling back to object");
        type_name = VariableType::Object.tag().to_string();
    }
    // child_type only accompanies the list tag
    let child_type = if type_name == VariableType::List.tag() {
        child_type.filter(|c| !c.is_empty())
    } else {
        None
    };

    Param {
        name: name.to_string(),
        type_name,
        child_type,
        description: remove_special_characters(dialect.description(field)),
        example: dialect
            .example(field)
            .map(remove_special_characters)
            .filter(|e| !e.is_empty()),
        required: dialect.is_required(field),
        deprecated: dialect.is_deprecated(field),
        removed: dialect.is_removed(field),
        min_length: dialect.min_length(field),
        max_length: dialect.max_length(field),
    }
}
