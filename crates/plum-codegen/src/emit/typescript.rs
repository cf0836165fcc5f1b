//! TypeScript interfaces.

use super::{EmitOptions, Emitter, wrapper_parts};
use crate::types::{ModelKind, Param, RequestData, RequestModel, VariableType};

pub struct TypeScript;

pub static TYPESCRIPT: TypeScript = TypeScript;

impl Emitter for TypeScript {
    fn language(&self) -> &'static str {
        "TypeScript"
    }

    fn extension(&self) -> &'static str {
        "ts"
    }

    fn comment(&self, text: &str) -> String {
        format!("/** {} */", text.replace("*/", "* /"))
    }

    fn generate(&self, data: &RequestData, options: &EmitOptions) -> Vec<String> {
        let mut lines: Vec<String> = data.comments.iter().map(|c| self.comment(c)).collect();
        for model in data.models() {
            emit_model(model, options, &mut lines);
        }
        if let Some((method, request, param)) = wrapper_parts(data) {
            lines.push(format!(
                "type {method}Request = {} & {{",
                options.base_for(ModelKind::Request)
            ));
            lines.push(format!("    method: \"{}\";", request.replace('"', "\\\"")));
            lines.push(format!("    param: {param};"));
            lines.push("};".to_string());
        }
        lines
    }
}

fn emit_model(model: &RequestModel, options: &EmitOptions, lines: &mut Vec<String>) {
    lines.push(format!(
        "interface {} extends {} {{",
        model.class_name,
        options.base_for(model.parent_model_type)
    ));
    for param in options.visible_fields(model) {
        if let Some(doc) = doc_comment(param, options) {
            lines.push(format!("    {doc}"));
        }
        let name = property_name(&param.name);
        let ty = ts_type(param);
        if param.required {
            lines.push(format!("    {name}: {ty};"));
        } else {
            lines.push(format!("    {name}?: {ty} | null;"));
        }
    }
    lines.push("}".to_string());
    lines.push(String::new());
}

fn doc_comment(param: &Param, options: &EmitOptions) -> Option<String> {
    let mut parts = Vec::new();
    if options.need_description {
        parts.push(format!("description: {}", param.description));
    }
    if options.need_example
        && let Some(example) = &param.example
    {
        parts.push(format!("example: {example}"));
    }
    if parts.is_empty() {
        return None;
    }
    Some(format!("/** {} */", parts.join(", ").replace("*/", "* /")))
}

fn ts_type(param: &Param) -> String {
    if param.is_list() {
        let element = param.child_type.as_deref().map_or("unknown", type_name);
        return format!("Array<{element}>");
    }
    type_name(&param.type_name).to_string()
}

fn type_name(tag: &str) -> &str {
    match VariableType::from_tag(tag) {
        Some(VariableType::String | VariableType::Datetime) => "string",
        Some(VariableType::Int | VariableType::Float) => "number",
        Some(VariableType::Bool) => "boolean",
        Some(VariableType::Object) => "object",
        Some(VariableType::Dict) => "Record<string, unknown>",
        Some(VariableType::List) => "Array<unknown>",
        None => tag,
    }
}

/// Quote names that are not plain identifiers.
fn property_name(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\\\""))
    }
}
