//! 阿里巴巴 (1688) open platform API payloads.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{EMPTY_DATA, MISSING_NAME, ParseContext, REQUEST_FAILED, Vendor, assemble, names_from};
use crate::builder::Dialect;
use crate::config::BaseTypes;
use crate::error::Result;
use crate::naming::{parse_array_name, parse_object_name};
use crate::types::{RequestData, VariableType};

const HOST: &str = "open.1688.com";

fn scalar_type(name: &str) -> Option<VariableType> {
    Some(match name {
        "Long" | "Integer" => VariableType::Int,
        "String" => VariableType::String,
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
    result: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiResult {
    #[serde(deserialize_with = "super::null_as_default")]
    name: String,
    #[serde(rename = "apiAppParamVOList", deserialize_with = "super::null_as_default")]
    app_params: Vec<Field>,
    #[serde(rename = "apiReturnParamVOList", deserialize_with = "super::null_as_default")]
    return_params: Vec<Field>,
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
    example_value: String,
    required: Option<bool>,
    #[serde(deserialize_with = "super::null_as_default")]
    complex_type_flag: bool,
    #[serde(deserialize_with = "super::null_as_default")]
    children: Vec<Field>,
}

struct AlibabaDialect;

impl AlibabaDialect {
    fn is_list(&self, field: &Field) -> bool {
        field.type_name.contains("[]")
    }

    /// `java.util.List<com.alibaba.Foo>[]` → `Foo`.
    fn element(&self, field: &Field) -> String {
        parse_object_name(&parse_array_name(&field.type_name))
    }
}

impl Dialect for AlibabaDialect {
    type Field = Field;

    fn name<'a>(&self, field: &'a Field) -> &'a str {
        &field.name
    }

    fn children<'a>(&self, field: &'a Field) -> &'a [Field] {
        &field.children
    }

    fn is_complex_object(&self, field: &Field) -> bool {
        field.complex_type_flag
    }

    fn is_complex_list(&self, field: &Field) -> bool {
        field.complex_type_flag && self.is_list(field)
    }

    fn resolve_type(&self, field: &Field) -> (String, Option<String>) {
        let element = self.element(field);
        if self.is_list(field) {
            let child = match scalar_type(&element) {
                Some(t) => t.tag().to_string(),
                None => element,
            };
            return (VariableType::List.tag().to_string(), Some(child));
        }
        match scalar_type(&element) {
            Some(t) => (t.tag().to_string(), None),
            None => (String::new(), None),
        }
    }

    fn local_type_name(&self, field: &Field) -> String {
        self.element(field)
    }

    fn is_required(&self, field: &Field) -> bool {
        field.required.unwrap_or(false)
    }

    fn description<'a>(&self, field: &'a Field) -> &'a str {
        &field.description
    }

    fn example<'a>(&self, field: &'a Field) -> Option<&'a str> {
        Some(&field.example_value)
    }
}

pub struct Alibaba;

pub static ALIBABA: Alibaba = Alibaba;

#[async_trait]
impl Vendor for Alibaba {
    fn id(&self) -> &'static str {
        "alibaba"
    }

    fn display_name(&self) -> &'static str {
        "阿里巴巴"
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
        if super::is_blank(Some(&envelope.result)) {
            return Ok(RequestData::failure(EMPTY_DATA));
        }
        let result: ApiResult = serde_json::from_value(envelope.result)?;
        let Some(names) = names_from(&result.name) else {
            return Ok(RequestData::failure(MISSING_NAME));
        };
        Ok(assemble(
            &AlibabaDialect,
            ctx,
            names,
            &result.app_params,
            &result.return_params,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryStructureSource;
    use serde_json::json;

    #[tokio::test]
    async fn test_java_qualified_types() {
        let payload = json!({
            "success": true,
            "result": {
                "name": "alibaba.trade.get.buyerView",
                "apiAppParamVOList": [
                    {"name": "orderId", "type": "java.lang.Long", "required": true, "exampleValue": 1},
                    {"name": "includeFields", "type": "java.lang.String[]"}
                ],
                "apiReturnParamVOList": [
                    {"name": "result", "type": "com.alibaba.trade.param.TradeInfo", "complexTypeFlag": true, "children": [
                        {"name": "productItems", "type": "com.alibaba.trade.param.ProductItemInfo[]", "complexTypeFlag": true, "children": [
                            {"name": "price", "type": "java.lang.Double"}
                        ]}
                    ]}
                ]
            }
        })
        .to_string();
        let source = MemoryStructureSource::new();
        let ctx = ParseContext::new(&source);
        let data = ALIBABA.parse(&payload, &ctx).await.unwrap();

        assert_eq!(data.method_name.as_deref(), Some("AlibabaTradeGetBuyerView"));
        let params = &data.params[0].child_params;
        assert_eq!(params[0].type_name, "int");
        assert!(params[0].required);
        assert_eq!(params[0].example.as_deref(), Some("1"));
        assert_eq!(params[1].child_type.as_deref(), Some("str"));
        assert!(!params[1].required);

        let names: Vec<&str> = data.responses.iter().map(|m| m.class_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "result@TradeInfo#productItems@ProductItemInfo",
                "result@TradeInfo",
                "AlibabaTradeGetBuyerViewResponse"
            ]
        );
        assert_eq!(data.responses[0].child_params[0].type_name, "float");
    }

    #[tokio::test]
    async fn test_missing_result() {
        let source = MemoryStructureSource::new();
        let ctx = ParseContext::new(&source);
        let data = ALIBABA.parse(r#"{"success": true}"#, &ctx).await.unwrap();
        assert_eq!(data.comments, vec![EMPTY_DATA]);
    }

    #[tokio::test]
    async fn test_null_members_read_as_empty() {
        let payload = json!({
            "success": true,
            "result": {
                "name": "alibaba.product.get",
                "apiAppParamVOList": [
                    {"name": "productId", "type": "java.lang.Long", "complexTypeFlag": null, "children": null}
                ],
                "apiReturnParamVOList": null
            }
        })
        .to_string();
        let source = MemoryStructureSource::new();
        let ctx = ParseContext::new(&source);
        let data = ALIBABA.parse(&payload, &ctx).await.unwrap();

        assert_eq!(data.params[0].child_params[0].type_name, "int");
        assert_eq!(data.responses.len(), 1);
        assert!(data.responses[0].child_params.is_empty());
    }
}
