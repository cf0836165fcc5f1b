//! 抖店 (op.jinritemai.com) article payloads.
//!
//! The article body is a JSON document embedded as a string; field types are
//! numeric codes and optionality/deprecation are signalled by bracketed
//! markers in the description.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{EMPTY_DATA, MISSING_NAME, ParseContext, REQUEST_FAILED, Vendor, assemble, names_from};
use crate::builder::Dialect;
use crate::config::BaseTypes;
use crate::error::Result;
use crate::naming::snake_to_pascal;
use crate::types::{RequestData, VariableType};

const HOST: &str = "op.jinritemai.com";
const ARTICLE_PATH: &str = "/doc/external/open/queryDocArticleDetail";

const OPTIONAL_MARKER: &str = "【可选】";
const DEPRECATED_MARKER: &str = "【即将废弃】";
const SUNSET_LEAD: &str = "【该字段将在";
const SUNSET_WORD: &str = "下线";
const REMOVED_MARKER: &str = "【已废弃】";

const TYPE_CODES: [(i64, VariableType); 10] = [
    (0, VariableType::Int),
    (1, VariableType::Int),
    (2, VariableType::String),
    (3, VariableType::List),
    (4, VariableType::Bool),
    (5, VariableType::Object),
    (7, VariableType::Int),
    (8, VariableType::Dict),
    (9, VariableType::Float),
    (99, VariableType::Int),
];

fn code_type(code: Option<i64>) -> Option<VariableType> {
    let code = code?;
    TYPE_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, t)| *t)
}

// ----- payload -----

#[derive(Debug, Deserialize)]
struct Envelope {
    code: Option<i64>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct Data {
    article: Article,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    info: ArticleInfo,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct ArticleInfo {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Content {
    request: RequestSection,
    response: ResponseSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RequestSection {
    request_param: Option<Vec<Field>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ResponseSection {
    response_data: Option<Vec<Field>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Field {
    #[serde(rename = "type")]
    type_code: Option<i64>,
    sub_type: Option<i64>,
    #[serde(deserialize_with = "super::lenient_text")]
    example: String,
    #[serde(deserialize_with = "super::lenient_text")]
    description: String,
    request_name: Option<String>,
    response_name: Option<String>,
    must_need: Option<bool>,
    deprecated: Option<bool>,
    removed: Option<bool>,
    children: Option<Vec<Field>>,
}

// ----- dialect -----

struct DoudianDialect;

impl DoudianDialect {
    fn is_list(&self, field: &Field) -> bool {
        field.children.is_some() && code_type(field.type_code) == Some(VariableType::List)
    }
}

impl Dialect for DoudianDialect {
    type Field = Field;

    fn name<'a>(&self, field: &'a Field) -> &'a str {
        field
            .request_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(field.response_name.as_deref().filter(|n| !n.is_empty()))
            .unwrap_or("unknown")
    }

    fn children<'a>(&self, field: &'a Field) -> &'a [Field] {
        field.children.as_deref().unwrap_or_default()
    }

    fn is_complex_object(&self, field: &Field) -> bool {
        field.children.is_some() && code_type(field.type_code) == Some(VariableType::Object)
    }

    fn is_complex_list(&self, field: &Field) -> bool {
        self.is_list(field) && code_type(field.sub_type) == Some(VariableType::Object)
    }

    fn resolve_type(&self, field: &Field) -> (String, Option<String>) {
        let sub = code_type(field.sub_type).map(|t| t.tag().to_string());
        if self.is_list(field) {
            return (VariableType::List.tag().to_string(), sub);
        }
        match code_type(field.type_code) {
            Some(VariableType::List) => (VariableType::List.tag().to_string(), sub),
            Some(t) => (t.tag().to_string(), None),
            None => (String::new(), None),
        }
    }

    fn local_type_name(&self, field: &Field) -> String {
        snake_to_pascal(self.name(field))
    }

    fn is_required(&self, field: &Field) -> bool {
        field
            .must_need
            .unwrap_or_else(|| !field.description.contains(OPTIONAL_MARKER))
    }

    fn is_deprecated(&self, field: &Field) -> bool {
        let d = &field.description;
        field.deprecated.unwrap_or(false)
            || d.contains(DEPRECATED_MARKER)
            || (d.starts_with(SUNSET_LEAD) && d.contains(SUNSET_WORD))
    }

    fn is_removed(&self, field: &Field) -> bool {
        field.removed.unwrap_or(false) || field.description.contains(REMOVED_MARKER)
    }

    fn description<'a>(&self, field: &'a Field) -> &'a str {
        &field.description
    }

    fn example<'a>(&self, field: &'a Field) -> Option<&'a str> {
        Some(field.example.as_str())
    }
}

// ----- vendor -----

pub struct Doudian;

pub static DOUDIAN: Doudian = Doudian;

#[async_trait]
impl Vendor for Doudian {
    fn id(&self) -> &'static str {
        "doudian"
    }

    fn display_name(&self) -> &'static str {
        "抖店"
    }

    fn default_base_types(&self) -> BaseTypes {
        BaseTypes::with_prefix("Top")
    }

    fn matches_request(&self, host: &str, method: &str, url: &str) -> bool {
        host == HOST && method.eq_ignore_ascii_case("GET") && url.contains(ARTICLE_PATH)
    }

    async fn parse(&self, payload: &str, ctx: &ParseContext<'_>) -> Result<RequestData> {
        let envelope: Envelope = serde_json::from_str(payload)?;
        if envelope.code != Some(0) {
            return Ok(RequestData::failure(REQUEST_FAILED));
        }
        if super::is_blank(Some(&envelope.data)) {
            return Ok(RequestData::failure(EMPTY_DATA));
        }
        let data: Data = serde_json::from_value(envelope.data)?;
        let Some(names) = names_from(&data.article.info.title) else {
            return Ok(RequestData::failure(MISSING_NAME));
        };
        let content: Content = if data.article.content.trim().is_empty() {
            Content::default()
        } else {
            serde_json::from_str(&data.article.content)?
        };

        Ok(assemble(
            &DoudianDialect,
            ctx,
            names,
            content.request.request_param.as_deref().unwrap_or_default(),
            content.response.response_data.as_deref().unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryStructureSource;
    use serde_json::json;

    fn payload(title: &str, content: Value) -> String {
        json!({
            "code": 0,
            "data": {"article": {"info": {"title": title}, "content": content.to_string()}}
        })
        .to_string()
    }

    async fn parse(payload: &str) -> RequestData {
        let source = MemoryStructureSource::new();
        let ctx = ParseContext::new(&source).with_source_url("https://op.jinritemai.com/docs/1");
        DOUDIAN.parse(payload, &ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_envelope_failure() {
        let data = parse(r#"{"code": 10001, "data": null}"#).await;
        assert_eq!(data.comments, vec![REQUEST_FAILED]);
        assert!(!data.has_models());

        let data = parse(r#"{"code": 0, "data": null}"#).await;
        assert_eq!(data.comments, vec![EMPTY_DATA]);
    }

    #[tokio::test]
    async fn test_names_and_nested_models() {
        let content = json!({
            "request": {"requestParam": [
                {"requestName": "order_id", "type": 2, "mustNeed": true, "description": "订单号", "example": "123"},
                {"requestName": "page", "type": 1, "description": "【可选】页码"},
                {"requestName": "receiver", "type": 5, "mustNeed": false, "description": "收件人",
                 "children": [{"requestName": "name", "type": 2, "mustNeed": true, "description": ""}]}
            ]},
            "response": {"responseData": [
                {"responseName": "list", "type": 3, "subType": 5, "description": "列表",
                 "children": [{"responseName": "sku_id", "type": 0, "description": ""}]},
                {"responseName": "tags", "type": 3, "subType": 2, "description": ""}
            ]}
        });
        let data = parse(&payload("/order/searchList", content)).await;

        assert_eq!(data.method_name.as_deref(), Some("OrderSearchList"));
        assert_eq!(data.request_name.as_deref(), Some("order.searchList"));
        assert_eq!(data.comments, vec!["https://op.jinritemai.com/docs/1"]);

        assert_eq!(data.params.len(), 2);
        assert_eq!(data.params[0].class_name, "receiver@Receiver");
        let root = &data.params[1];
        assert_eq!(root.class_name, "OrderSearchListParam");
        assert!(root.child_params[0].required);
        assert_eq!(root.child_params[0].example.as_deref(), Some("123"));
        assert!(!root.child_params[1].required);
        assert_eq!(root.child_params[2].type_name, "receiver@Receiver");

        let resp = data.responses.last().unwrap();
        assert_eq!(resp.child_params[0].type_name, "list");
        assert_eq!(resp.child_params[0].child_type.as_deref(), Some("list@List"));
        assert_eq!(resp.child_params[1].child_type.as_deref(), Some("str"));
    }

    #[tokio::test]
    async fn test_lifecycle_markers() {
        let content = json!({
            "request": {"requestParam": [
                {"requestName": "a", "type": 2, "description": "【即将废弃】旧字段"},
                {"requestName": "b", "type": 2, "description": "【该字段将在2024年下线】"},
                {"requestName": "c", "type": 2, "description": "【已废弃】"},
                {"requestName": "d", "type": 2, "description": "说明【该字段将在下线】"}
            ]},
            "response": {}
        });
        let data = parse(&payload("order.get", content)).await;
        let flags: Vec<(bool, bool)> = data.params[0]
            .child_params
            .iter()
            .map(|p| (p.deprecated, p.removed))
            .collect();
        assert_eq!(
            flags,
            vec![(true, false), (true, false), (false, true), (false, false)]
        );
    }

    #[tokio::test]
    async fn test_missing_title() {
        let data = parse(&payload("", json!({}))).await;
        assert_eq!(data.comments, vec![MISSING_NAME]);
    }
}
