//! 淘宝 open platform API detail payloads.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{
    EMPTY_DATA, MISSING_NAME, ParseContext, REQUEST_FAILED, UNEXPANDED_STRUCTURES, Vendor,
    assemble, names_from,
};
use crate::builder::Dialect;
use crate::config::BaseTypes;
use crate::error::Result;
use crate::fetch::{Expandable, Expansion, expand_structures, structure_id_of};
use crate::naming::{parse_array_name, parse_object_name};
use crate::types::{RequestData, VariableType};

const HOST: &str = "open.taobao.com";

fn scalar_type(name: &str) -> Option<VariableType> {
    Some(match name {
        "Long" | "Integer" | "Number" => VariableType::Int,
        "String" | "byte" | "JSON" => VariableType::String,
        "Boolean" => VariableType::Bool,
        "Double" => VariableType::Float,
        "Date" => VariableType::Datetime,
        _ => return None,
    })
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Data {
    #[serde(deserialize_with = "super::null_as_default")]
    name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    request_params: Vec<Field>,
    #[serde(deserialize_with = "super::null_as_default")]
    response_params: Vec<Field>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Field {
    #[serde(deserialize_with = "super::null_as_default")]
    name: String,
    #[serde(rename = "type", deserialize_with = "super::null_as_default")]
    type_name: String,
    #[serde(deserialize_with = "super::lenient_text")]
    description: String,
    #[serde(deserialize_with = "super::lenient_text")]
    demo_value: String,
    #[serde(deserialize_with = "super::null_as_default")]
    required: bool,
    structure_id: Option<Value>,
    #[serde(deserialize_with = "super::null_as_default")]
    sub_params: Vec<Field>,
}

impl Expandable for Field {
    fn structure_id(&self) -> Option<String> {
        structure_id_of(self.structure_id.as_ref())
    }

    fn children(&self) -> &[Self] {
        &self.sub_params
    }

    fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.sub_params
    }
}

/// Members of a fetched structure: `data` itself or `data.subParams`.
fn structure_members(payload: &Value) -> Option<&Value> {
    let data = payload.get("data")?;
    if data.is_array() {
        return Some(data);
    }
    data.get("subParams").filter(|v| v.is_array())
}

struct TaobaoDialect;

impl TaobaoDialect {
    fn is_list(&self, field: &Field) -> bool {
        field.type_name.contains("[]") || field.type_name.contains("List")
    }
}

impl Dialect for TaobaoDialect {
    type Field = Field;

    fn name<'a>(&self, field: &'a Field) -> &'a str {
        &field.name
    }

    fn children<'a>(&self, field: &'a Field) -> &'a [Field] {
        &field.sub_params
    }

    fn is_complex_object(&self, field: &Field) -> bool {
        !field.sub_params.is_empty() || field.structure_id().is_some()
    }

    fn is_complex_list(&self, field: &Field) -> bool {
        let element = parse_array_name(&field.type_name);
        self.is_list(field)
            && scalar_type(&element).is_none()
            && !element.eq_ignore_ascii_case("list")
    }

    fn resolve_type(&self, field: &Field) -> (String, Option<String>) {
        if self.is_list(field) {
            let element = parse_array_name(&field.type_name);
            let child = match scalar_type(&element) {
                Some(t) => Some(t.tag().to_string()),
                None if element.eq_ignore_ascii_case("list") => None,
                None => Some(element),
            };
            return (VariableType::List.tag().to_string(), child);
        }
        match scalar_type(field.type_name.trim()) {
            Some(t) => (t.tag().to_string(), None),
            None => (String::new(), None),
        }
    }

    fn local_type_name(&self, field: &Field) -> String {
        parse_object_name(&parse_array_name(&field.type_name))
    }

    fn is_required(&self, field: &Field) -> bool {
        field.required
    }

    fn description<'a>(&self, field: &'a Field) -> &'a str {
        &field.description
    }

    fn example<'a>(&self, field: &'a Field) -> Option<&'a str> {
        Some(&field.demo_value)
    }
}

pub struct Taobao;

pub static TAOBAO: Taobao = Taobao;

#[async_trait]
impl Vendor for Taobao {
    fn id(&self) -> &'static str {
        "taobao"
    }

    fn display_name(&self) -> &'static str {
        "淘宝"
    }

    fn default_base_types(&self) -> BaseTypes {
        BaseTypes::with_prefix("Top")
    }

    fn matches_request(&self, host: &str, _method: &str, _url: &str) -> bool {
        host == HOST
    }

    async fn parse(&self, payload: &str, ctx: &ParseContext<'_>) -> Result<RequestData> {
        let envelope: Envelope = serde_json::from_str(payload)?;
        if !envelope.success {
            return Ok(RequestData::failure(REQUEST_FAILED));
        }
        if super::is_blank(Some(&envelope.data)) {
            return Ok(RequestData::failure(EMPTY_DATA));
        }
        let mut data: Data = serde_json::from_value(envelope.data)?;
        let Some(names) = names_from(&data.name) else {
            return Ok(RequestData::failure(MISSING_NAME));
        };

        let mut unexpanded = false;
        for fields in [&mut data.request_params, &mut data.response_params] {
            let outcome = expand_structures(
                ctx.structures,
                self.id(),
                fields.as_mut_slice(),
                structure_members,
            )
            .await?;
            unexpanded |= outcome == Expansion::Unavailable;
        }

        let mut out = assemble(
            &TaobaoDialect,
            ctx,
            names,
            &data.request_params,
            &data.response_params,
        );
        if unexpanded {
            out.comments.push(UNEXPANDED_STRUCTURES.to_string());
        }
        Ok(out)
    }
}
