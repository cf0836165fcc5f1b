//! 支付宝 open docs payloads.
//!
//! The API description is a JSON document nested inside `data.content.text`,
//! and the parameter lists inside it are JSON-encoded strings again.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{
    EMPTY_DATA, MISSING_NAME, ParseContext, REQUEST_FAILED, Vendor, assemble, embedded_list,
    names_from,
};
use crate::builder::Dialect;
use crate::config::BaseTypes;
use crate::error::Result;
use crate::naming::{parse_array_name, parse_object_name};
use crate::types::{RequestData, VariableType};

const HOST: &str = "opendocs.alipay.com";
const OK_STAT: &str = "ok";
const COMPLEX_TYPE: &str = "COMPLEXTYPE";
const MUST: &str = "MUST";

fn scalar_type(name: &str) -> Option<VariableType> {
    Some(match name {
        "Price" => VariableType::Float,
        "Number" => VariableType::Int,
        "Boolean" => VariableType::Bool,
        "String" => VariableType::String,
        _ => return None,
    })
}

/// Documented `maxLength` counts characters; turn it into a value bound for
/// numeric types. Prices reserve two decimals and the point.
fn decode_max_length(exact_type: &str, max_length: Option<u64>) -> Option<u64> {
    let n = max_length.filter(|n| *n > 0)?;
    Some(match exact_type.to_ascii_lowercase().as_str() {
        "price" => {
            let exponent = u32::try_from(n.saturating_sub(3)).unwrap_or(u32::MAX);
            10u64.saturating_pow(exponent)
        }
        "number" if n <= 10 => 10u64.pow(n as u32),
        _ => n,
    })
}

#[derive(Debug, Deserialize)]
struct Envelope {
    stat: Option<String>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Content {
    api_data: ApiData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiData {
    name: String,
    request_param_list: Option<String>,
    response_param_list: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Field {
    children: Option<Vec<Field>>,
    value: FieldValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FieldValue {
    deprecated: bool,
    #[serde(deserialize_with = "super::lenient_text")]
    description: String,
    exact_type: String,
    #[serde(deserialize_with = "super::lenient_text")]
    example: String,
    field_name: String,
    field_type: String,
    must_type: String,
    list_type: bool,
    max_length: Option<u64>,
}

struct AlipayDialect;

impl Dialect for AlipayDialect {
    type Field = Field;

    fn name<'a>(&self, field: &'a Field) -> &'a str {
        &field.value.field_name
    }

    fn children<'a>(&self, field: &'a Field) -> &'a [Field] {
        field.children.as_deref().unwrap_or_default()
    }

    fn is_complex_object(&self, field: &Field) -> bool {
        field.children.is_some() && field.value.field_type == COMPLEX_TYPE
    }

    fn is_complex_list(&self, field: &Field) -> bool {
        field.value.list_type && scalar_type(&field.value.exact_type).is_none()
    }

    fn resolve_type(&self, field: &Field) -> (String, Option<String>) {
        let exact = field.value.exact_type.trim();
        if field.value.list_type {
            let child = match scalar_type(exact) {
                Some(t) => t.tag().to_string(),
                None => exact.to_string(),
            };
            return (VariableType::List.tag().to_string(), Some(child));
        }
        match scalar_type(exact) {
            Some(t) => (t.tag().to_string(), None),
            None => (String::new(), None),
        }
    }

    fn local_type_name(&self, field: &Field) -> String {
        parse_object_name(&parse_array_name(&field.value.exact_type))
    }

    fn is_required(&self, field: &Field) -> bool {
        field.value.must_type == MUST
    }

    fn is_deprecated(&self, field: &Field) -> bool {
        field.value.deprecated
    }

    fn description<'a>(&self, field: &'a Field) -> &'a str {
        &field.value.description
    }

    fn example<'a>(&self, field: &'a Field) -> Option<&'a str> {
        Some(&field.value.example)
    }

    fn max_length(&self, field: &Field) -> Option<u64> {
        decode_max_length(&field.value.exact_type, field.value.max_length)
    }
}

pub struct Alipay;

pub static ALIPAY: Alipay = Alipay;

#[async_trait]
impl Vendor for Alipay {
    fn id(&self) -> &'static str {
        "alipay"
    }

    fn display_name(&self) -> &'static str {
        "支付宝"
    }

    fn default_base_types(&self) -> BaseTypes {
        BaseTypes::with_prefix("Top")
    }

    fn matches_request(&self, host: &str, _method: &str, _url: &str) -> bool {
        host == HOST
    }

    async fn parse(&self, payload: &str, ctx: &ParseContext<'_>) -> Result<RequestData> {
        let envelope: Envelope = serde_json::from_str(payload)?;
        if envelope.stat.as_deref() != Some(OK_STAT) {
            return Ok(RequestData::failure(REQUEST_FAILED));
        }
        let text = envelope
            .data
            .pointer("/content/text")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty());
        let Some(text) = text else {
            return Ok(RequestData::failure(EMPTY_DATA));
        };
        let content: Content = serde_json::from_str(text)?;
        let api = content.api_data;
        let Some(names) = names_from(&api.name) else {
            return Ok(RequestData::failure(MISSING_NAME));
        };
        let params: Vec<Field> = embedded_list(api.request_param_list.as_deref())?;
        let responses: Vec<Field> = embedded_list(api.response_param_list.as_deref())?;

        Ok(assemble(&AlipayDialect, ctx, names, &params, &responses))
    }
}
