//! 快手 merchant open platform API payloads.
//!
//! Nested objects are marked by a `structureId`; their members are either
//! inlined under `children` or looked up remotely.

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

const HOST: &str = "open.kwaixiaodian.com";
const OK_STATUS: i64 = 200;

fn scalar_type(name: &str) -> Option<VariableType> {
    Some(match name {
        "Long" | "Integer" | "Number" => VariableType::Int,
        "String" | "JSON" => VariableType::String,
        "Boolean" => VariableType::Bool,
        "Double" => VariableType::Float,
        "Date" => VariableType::Datetime,
        _ => return None,
    })
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: Option<i64>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Data {
    #[serde(deserialize_with = "super::null_as_default")]
    name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    input_params: Vec<Field>,
    #[serde(deserialize_with = "super::null_as_default")]
    output_params: Vec<Field>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Field {
    #[serde(deserialize_with = "super::null_as_default")]
    param_name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    param_type: String,
    #[serde(deserialize_with = "super::lenient_text")]
    description: String,
    #[serde(deserialize_with = "super::lenient_text")]
    example: String,
    #[serde(deserialize_with = "super::null_as_default")]
    required: bool,
    structure_id: Option<Value>,
    #[serde(deserialize_with = "super::null_as_default")]
    children: Vec<Field>,
}

impl Expandable for Field {
    fn structure_id(&self) -> Option<String> {
        structure_id_of(self.structure_id.as_ref())
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }
}

fn structure_members(payload: &Value) -> Option<&Value> {
    let data = payload.get("data")?;
    if data.is_array() {
        return Some(data);
    }
    data.get("children").filter(|v| v.is_array())
}

struct KuaishouDialect;

impl KuaishouDialect {
    fn is_list(&self, field: &Field) -> bool {
        field.param_type.contains("[]") || field.param_type.contains("List")
    }

    fn element(&self, field: &Field) -> String {
        parse_array_name(&field.param_type)
    }
}

impl Dialect for KuaishouDialect {
    type Field = Field;

    fn name<'a>(&self, field: &'a Field) -> &'a str {
        &field.param_name
    }

    fn children<'a>(&self, field: &'a Field) -> &'a [Field] {
        &field.children
    }

    fn is_complex_object(&self, field: &Field) -> bool {
        field.structure_id().is_some()
    }

    fn is_complex_list(&self, field: &Field) -> bool {
        let element = self.element(field);
        self.is_list(field)
            && scalar_type(&element).is_none()
            && !element.eq_ignore_ascii_case("list")
    }

    fn resolve_type(&self, field: &Field) -> (String, Option<String>) {
        if self.is_list(field) {
            let element = self.element(field);
            let child = match scalar_type(&element) {
                Some(t) => Some(t.tag().to_string()),
                None if element.eq_ignore_ascii_case("list") => None,
                None => Some(element),
            };
            return (VariableType::List.tag().to_string(), child);
        }
        match scalar_type(field.param_type.trim()) {
            Some(t) => (t.tag().to_string(), None),
            None => (String::new(), None),
        }
    }

    fn local_type_name(&self, field: &Field) -> String {
        parse_object_name(&self.element(field))
    }

    fn is_required(&self, field: &Field) -> bool {
        field.required
    }

    fn description<'a>(&self, field: &'a Field) -> &'a str {
        &field.description
    }

    fn example<'a>(&self, field: &'a Field) -> Option<&'a str> {
        Some(&field.example)
    }
}

pub struct Kuaishou;

pub static KUAISHOU: Kuaishou = Kuaishou;

#[async_trait]
impl Vendor for Kuaishou {
    fn id(&self) -> &'static str {
        "kuaishou"
    }

    fn display_name(&self) -> &'static str {
        "快手"
    }

    fn default_base_types(&self) -> BaseTypes {
        BaseTypes::with_prefix("Kop")
    }

    fn matches_request(&self, host: &str, _method: &str, _url: &str) -> bool {
        host == HOST
    }

    async fn parse(&self, payload: &str, ctx: &ParseContext<'_>) -> Result<RequestData> {
        let envelope: Envelope = serde_json::from_str(payload)?;
        if envelope.status != Some(OK_STATUS) {
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
        for fields in [&mut data.input_params, &mut data.output_params] {
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
            &KuaishouDialect,
            ctx,
            names,
            &data.input_params,
            &data.output_params,
        );
        if unexpanded {
            out.comments.push(UNEXPANDED_STRUCTURES.to_string());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::fetch::{HttpStructureSource, MemoryStructureSource};
    use serde_json::json;

    fn payload(input: Value, output: Value) -> String {
        json!({
            "status": 200,
            "data": {"name": "open.item.get", "inputParams": input, "outputParams": output}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_inline_structures() {
        let source = MemoryStructureSource::new();
        let ctx = ParseContext::new(&source);
        let data = KUAISHOU
            .parse(
                &payload(
                    json!([{"paramName": "itemId", "paramType": "Long", "required": true}]),
                    json!([
                        {"paramName": "skuInfos", "paramType": "SkuInfo[]", "structureId": 3, "children": [
                            {"paramName": "skuId", "paramType": "Long"},
                            {"paramName": "specs", "paramType": "List<String>"}
                        ]}
                    ]),
                ),
                &ctx,
            )
            .await
            .unwrap();

        assert_eq!(data.method_name.as_deref(), Some("OpenItemGet"));
        assert_eq!(data.params[0].child_params[0].type_name, "int");
        assert_eq!(data.responses[0].class_name, "skuInfos@SkuInfo");
        let specs = &data.responses[0].child_params[1];
        assert_eq!(specs.type_name, "list");
        assert_eq!(specs.child_type.as_deref(), Some("str"));
        let root = &data.responses[1];
        assert_eq!(root.child_params[0].child_type.as_deref(), Some("skuInfos@SkuInfo"));
    }

    #[tokio::test]
    async fn test_unconfigured_lookup_adds_comment() {
        let source = HttpStructureSource::new(&GeneratorConfig::default()).unwrap();
        let ctx = ParseContext::new(&source);
        let data = KUAISHOU
            .parse(
                &payload(
                    json!([]),
                    json!([{"paramName": "shop", "paramType": "Shop", "structureId": 9}]),
                ),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(data.comments, vec![UNEXPANDED_STRUCTURES]);
        assert_eq!(data.responses[0].class_name, "shop@Shop");
        assert!(data.responses[0].child_params.is_empty());
    }

    #[tokio::test]
    async fn test_status_other_than_ok() {
        let source = MemoryStructureSource::new();
        let ctx = ParseContext::new(&source);
        let data = KUAISHOU
            .parse(r#"{"status": 500, "data": {}}"#, &ctx)
            .await
            .unwrap();
        assert_eq!(data.comments, vec![REQUEST_FAILED]);
    }

    #[tokio::test]
    async fn test_null_members_read_as_empty() {
        let source = MemoryStructureSource::new();
        let ctx = ParseContext::new(&source);
        let data = KUAISHOU
            .parse(
                &payload(
                    json!([{"paramName": "itemId", "paramType": "Long", "required": true, "children": null}]),
                    json!(null),
                ),
                &ctx,
            )
            .await
            .unwrap();
        let item = &data.params[0].child_params[0];
        assert_eq!(item.type_name, "int");
        assert!(item.required);
        assert!(data.responses[0].child_params.is_empty());
    }
}
