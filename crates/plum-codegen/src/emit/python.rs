//! pydantic model classes.

use super::{EmitOptions, Emitter, wrapper_parts};
use crate::naming::{is_python_keyword, pascal_to_snake};
use crate::types::{ModelKind, Param, RequestData, RequestModel, VariableType};

pub struct Python;

pub static PYTHON: Python = Python;

impl Emitter for Python {
    fn language(&self) -> &'static str {
        "Python"
    }

    fn extension(&self) -> &'static str {
        "py"
    }

    fn comment(&self, text: &str) -> String {
        format!("# {text}")
    }

    fn generate(&self, data: &RequestData, options: &EmitOptions) -> Vec<String> {
        let mut lines: Vec<String> = data.comments.iter().map(|c| self.comment(c)).collect();
        if !data.has_models() {
            return lines;
        }

        if uses_datetime(data, options) {
            lines.push("from datetime import datetime".to_string());
        }
        lines.push("from typing import Optional".to_string());
        lines.push("from pydantic import Field".to_string());
        lines.push(String::new());
        lines.push(String::new());

        for model in data.models() {
            emit_model(model, options, &mut lines);
        }

        if let Some((method, request, param)) = wrapper_parts(data) {
            lines.push(format!(
                "class {method}Request({}):",
                options.base_for(ModelKind::Request)
            ));
            lines.push(format!("    method: str = \"{}\"", quote(request)));
            lines.push(format!("    param: {param}"));
        }
        lines
    }
}

fn emit_model(model: &RequestModel, options: &EmitOptions, lines: &mut Vec<String>) {
    lines.push(format!(
        "class {}({}):",
        model.class_name,
        options.base_for(model.parent_model_type)
    ));
    let before = lines.len();
    for param in options.visible_fields(model) {
        lines.push(field_line(param, options));
    }
    if lines.len() == before {
        lines.push("    pass".to_string());
    }
    lines.push(String::new());
    lines.push(String::new());
}

fn field_line(param: &Param, options: &EmitOptions) -> String {
    let mut args = Vec::new();
    if options.need_description {
        args.push(format!("description=\"{}\"", quote(&param.description)));
    }
    if options.need_example
        && let Some(example) = &param.example
    {
        args.push(format!(
            "json_schema_extra={{\"example\": \"{}\"}}",
            quote(example)
        ));
    }
    args.extend(bounds(param));

    let name = attribute_name(&param.name);
    if name != param.name {
        args.push(format!("alias=\"{}\"", quote(&param.name)));
    }

    let mut annotation = python_type(param);
    if !param.required {
        annotation = format!("Optional[{annotation}]");
    }

    let default = if param.required { "..." } else { "default=None" };
    let assignment = match (args.is_empty(), param.required) {
        (true, true) => String::new(),
        (true, false) => " = None".to_string(),
        (false, _) => format!(" = Field({default}, {})", args.join(", ")),
    };
    format!("    {name}: {annotation}{assignment}")
}

/// snake_case attribute that is a valid, non-keyword Python identifier.
fn attribute_name(raw: &str) -> String {
    let mut name: String = pascal_to_snake(raw)
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "field_");
    }
    if is_python_keyword(&name) {
        name.push('_');
    }
    name
}

/// Length bounds for strings and lists, value bounds for numbers.
fn bounds(param: &Param) -> Vec<String> {
    let (max_key, min_key) = match VariableType::from_tag(&param.type_name) {
        Some(VariableType::String | VariableType::List) => ("max_length", "min_length"),
        Some(VariableType::Int | VariableType::Float) => ("le", "ge"),
        _ => return Vec::new(),
    };
    let mut out = Vec::new();
    if let Some(max) = param.max_length {
        out.push(format!("{max_key}={max}"));
    }
    if let Some(min) = param.min_length {
        out.push(format!("{min_key}={min}"));
    }
    out
}

fn python_type(param: &Param) -> String {
    if param.is_list() {
        return match &param.child_type {
            Some(child) => format!("list[{}]", type_name(child)),
            None => "list".to_string(),
        };
    }
    type_name(&param.type_name).to_string()
}

fn type_name(tag: &str) -> &str {
    match VariableType::from_tag(tag) {
        Some(VariableType::Object) => "dict",
        Some(t) => t.tag(),
        None => tag,
    }
}

fn uses_datetime(data: &RequestData, options: &EmitOptions) -> bool {
    let tag = VariableType::Datetime.tag();
    data.models()
        .flat_map(|m| options.visible_fields(m))
        .any(|p| p.type_name == tag || p.child_type.as_deref() == Some(tag))
}

fn quote(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
