//! 微信 documentation pages (视频号小店, 小商店, 小程序).
//!
//! Unlike the other vendors there is no JSON API behind the docs: the browser
//! side extracts the page into a [`Document`]. Parameter tables list one row
//! per field; nesting is written as dotted names (`order.items[].sku_id`) or
//! as a named type whose members live in a separate table anchored at the
//! type name.

use async_trait::async_trait;
use tracing::debug;

use super::{ParseContext, Vendor, assemble, names_from};
use crate::builder::Dialect;
use crate::config::BaseTypes;
use crate::document::Document;
use crate::error::{GenerateError, Result};
use crate::naming::{parse_array_name, snake_to_pascal};
use crate::types::{RequestData, VariableType};

const HOST: &str = "developers.weixin.qq.com";
const API_ORIGIN: &str = "https://api.weixin.qq.com/";

pub const PRODUCT_NOT_FOUND: &str = "未找到产品类型";
pub const URL_NOT_FOUND: &str = "解析 URL 失败";
pub const PLACEHOLDER_DESCRIPTION: &str = "缺少类型描述，请自行补充";

const REQUIRED_MARK: &str = "是";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Product {
    Channels,
    MiniStore,
    MiniProgram,
}

struct Anchors {
    url: &'static str,
    param: &'static str,
    response: &'static str,
}

impl Product {
    fn detect(page_url: &str) -> Option<Self> {
        if page_url.contains("/doc/channels/") {
            Some(Self::Channels)
        } else if page_url.contains("/doc/ministore/") {
            Some(Self::MiniStore)
        } else if page_url.contains("/miniprogram/dev/") {
            Some(Self::MiniProgram)
        } else {
            None
        }
    }

    fn anchors(self) -> Anchors {
        let response = match self {
            Self::Channels => "返回参数说明",
            Self::MiniStore | Self::MiniProgram => "回包参数说明",
        };
        Anchors {
            url: "接口调用请求说明",
            param: "请求参数说明",
            response,
        }
    }
}

// ---------------------------------------------------------------------------
// Type text
// ---------------------------------------------------------------------------

fn scalar_type(text: &str) -> Option<VariableType> {
    Some(match text.trim().to_ascii_lowercase().as_str() {
        "number" | "int" | "integer" | "int32" | "int64" | "uint32" | "uint64" => {
            VariableType::Int
        }
        "string" | "string(uint64)" => VariableType::String,
        "bool" | "boolean" => VariableType::Bool,
        "float" | "double" => VariableType::Float,
        "array" | "array(string)" | "array[string]" => VariableType::List,
        "object" | "objct" => VariableType::Object,
        "map" => VariableType::Dict,
        _ => return None,
    })
}

/// `Object Foo`, `Array<Foo>`, `array(string)` → `Foo`, `Foo`, `string`.
fn bare_type_name(text: &str) -> String {
    let spaced: String = text
        .chars()
        .map(|c| if "()<>[]".contains(c) { ' ' } else { c })
        .collect();
    spaced
        .split_whitespace()
        .filter(|w| !matches!(w.to_ascii_lowercase().as_str(), "object" | "objct" | "array"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_array(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("[]") || lower.contains("array")
}

/// Anchor id of a named object type, if `text` names one.
fn named_object(text: &str) -> Option<String> {
    if scalar_type(text).is_some() {
        return None;
    }
    let bare = bare_type_name(text);
    let name = bare.split_whitespace().next()?;
    let named = name.len() > 1
        && name.starts_with(|c: char| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && scalar_type(name).is_none();
    named.then(|| fix_type_id(name))
}

fn fix_type_id(name: &str) -> String {
    match name {
        "AtrrInfo" => "AttrInfo".to_string(),
        other => other.to_string(),
    }
}

/// `(type, child_type)` from a type column.
fn parse_type_text(text: &str) -> (String, Option<String>) {
    if is_array(text) {
        let inner = bare_type_name(text);
        let child = if inner.is_empty() {
            None
        } else {
            Some(match scalar_type(&inner) {
                Some(t) => t.tag().to_string(),
                None => snake_to_pascal(&fix_type_id(&inner)),
            })
        };
        return (VariableType::List.tag().to_string(), child);
    }
    if let Some(t) = scalar_type(text) {
        return (t.tag().to_string(), None);
    }
    match named_object(text) {
        Some(name) => (snake_to_pascal(&name), None),
        None => (String::new(), None),
    }
}

/// Type implied by a dotted-name segment such as `items[]`.
fn parse_segment_type(segment: &str) -> (String, Option<String>) {
    let bare = snake_to_pascal(&parse_array_name(segment));
    if segment.contains("[]") {
        (VariableType::List.tag().to_string(), Some(bare))
    } else {
        (bare, None)
    }
}

// ---------------------------------------------------------------------------
// Table rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Row {
    name: String,
    type_text: String,
    required: bool,
    description: String,
    /// Rows without a required column describe a response type table.
    has_required_column: bool,
}

impl Row {
    fn from_cells(cells: &[String]) -> Option<Self> {
        let cell = |i: usize| cells.get(i).map(|c| c.trim().to_string()).unwrap_or_default();
        let name = cell(0);
        if name.is_empty() || cells.len() < 2 {
            return None;
        }
        Some(if cells.len() >= 4 {
            Self {
                name,
                type_text: cell(1),
                required: cell(2) == REQUIRED_MARK,
                description: cell(3),
                has_required_column: true,
            }
        } else {
            Self {
                name,
                type_text: cell(1),
                required: true,
                description: cell(2),
                has_required_column: false,
            }
        })
    }
}

/// Rows of `anchor`'s table with named types inlined as dotted rows.
fn collect_rows(document: &Document, anchor: &str) -> Result<Vec<Row>> {
    let mut out = Vec::new();
    if let Some(rows) = document.table(anchor) {
        let rows: Vec<&[String]> = rows.collect();
        inline_rows(document, anchor, "", &rows, &mut Vec::new(), &mut out)?;
    }
    Ok(out)
}

fn inline_rows(
    document: &Document,
    anchor: &str,
    prefix: &str,
    rows: &[&[String]],
    chain: &mut Vec<String>,
    out: &mut Vec<Row>,
) -> Result<()> {
    for cells in rows {
        let Some(mut row) = Row::from_cells(cells) else {
            continue;
        };
        row.name = format!("{prefix}{}", row.name);
        let expand = if row.has_required_column {
            None
        } else {
            named_object(&row.type_text)
        };
        let full_name = row.name.clone();
        let array = is_array(&row.type_text);
        out.push(row);

        let Some(type_id) = expand else {
            continue;
        };
        if chain.contains(&type_id) {
            debug!(type_id = %type_id, "recursive type table, not inlined again");
            continue;
        }
        let lower = type_id.to_lowercase();
        let table = document
            .table(&type_id)
            .or_else(|| document.table(&lower))
            .ok_or_else(|| GenerateError::TypeNotFound {
                table: anchor.to_string(),
                type_name: type_id.clone(),
            })?;
        let members: Vec<&[String]> = table.collect();
        let suffix = if array && !full_name.ends_with("[]") { "[]" } else { "" };

        chain.push(type_id);
        inline_rows(
            document,
            anchor,
            &format!("{full_name}{suffix}."),
            &members,
            chain,
            out,
        )?;
        chain.pop();
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Field tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct Node {
    name: String,
    type_name: String,
    child_type: Option<String>,
    required: bool,
    description: String,
    children: Vec<Node>,
}

fn build_tree(rows: &[Row]) -> Vec<Node> {
    let mut tree = Vec::new();
    for row in rows {
        insert(&mut tree, row);
    }
    tree
}

fn insert(tree: &mut Vec<Node>, row: &Row) {
    let segments: Vec<&str> = row.name.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut level = tree;
    for segment in parents {
        let name = parse_array_name(segment);
        let index = match level.iter().position(|n| n.name == name) {
            Some(i) => i,
            None => {
                let (type_name, child_type) = parse_segment_type(segment);
                level.push(Node {
                    name,
                    type_name,
                    child_type,
                    required: false,
                    description: PLACEHOLDER_DESCRIPTION.to_string(),
                    children: Vec::new(),
                });
                level.len() - 1
            }
        };
        level = &mut level[index].children;
    }

    let name = parse_array_name(last);
    if level.iter().any(|n| n.name == name) {
        return;
    }
    let (type_name, child_type) = if parents.is_empty() && last.contains("[]") {
        parse_segment_type(last)
    } else {
        parse_type_text(&row.type_text)
    };
    level.push(Node {
        name,
        type_name,
        child_type,
        required: row.required,
        description: row.description.clone(),
        children: Vec::new(),
    });
}

struct WeixinDialect;

impl WeixinDialect {
    fn is_list(&self, node: &Node) -> bool {
        node.type_name == VariableType::List.tag()
    }

    fn model_child<'a>(&self, node: &'a Node) -> Option<&'a str> {
        node.child_type
            .as_deref()
            .filter(|c| !VariableType::is_primitive(c))
    }
}

impl Dialect for WeixinDialect {
    type Field = Node;

    fn name<'a>(&self, node: &'a Node) -> &'a str {
        &node.name
    }

    fn children<'a>(&self, node: &'a Node) -> &'a [Node] {
        &node.children
    }

    fn is_complex_object(&self, node: &Node) -> bool {
        !self.is_list(node)
            && (!node.children.is_empty()
                || (!node.type_name.is_empty() && !VariableType::is_primitive(&node.type_name)))
    }

    fn is_complex_list(&self, node: &Node) -> bool {
        self.is_list(node) && (!node.children.is_empty() || self.model_child(node).is_some())
    }

    fn resolve_type(&self, node: &Node) -> (String, Option<String>) {
        (node.type_name.clone(), node.child_type.clone())
    }

    fn local_type_name(&self, node: &Node) -> String {
        if self.is_list(node) {
            return match self.model_child(node) {
                Some(child) => child.to_string(),
                None => snake_to_pascal(&node.name),
            };
        }
        if !node.type_name.is_empty() && !VariableType::is_primitive(&node.type_name) {
            return node.type_name.clone();
        }
        snake_to_pascal(&node.name)
    }

    fn is_required(&self, node: &Node) -> bool {
        node.required
    }

    fn description<'a>(&self, node: &'a Node) -> &'a str {
        &node.description
    }
}

// ---------------------------------------------------------------------------
// Vendor
// ---------------------------------------------------------------------------

/// First `https://api.weixin.qq.com/...` address in the request block.
fn api_url(document: &Document, anchor: &str) -> Option<url::Url> {
    let block = document.block(anchor)?;
    block
        .split_whitespace()
        .find_map(|token| token.find(API_ORIGIN).map(|at| &token[at..]))
        .and_then(|raw| url::Url::parse(raw).ok())
}

pub struct Weixin;

pub static WEIXIN: Weixin = Weixin;

#[async_trait]
impl Vendor for Weixin {
    fn id(&self) -> &'static str {
        "weixin"
    }

    fn display_name(&self) -> &'static str {
        "微信"
    }

    fn default_base_types(&self) -> BaseTypes {
        BaseTypes::with_prefix("Wop")
    }

    fn matches_request(&self, host: &str, _method: &str, _url: &str) -> bool {
        host == HOST
    }

    /// The payload is a serialized [`Document`].
    async fn parse(&self, payload: &str, ctx: &ParseContext<'_>) -> Result<RequestData> {
        let document = Document::from_json(payload)?;
        self.parse_document(&document, ctx).await
    }

    async fn parse_document(
        &self,
        document: &Document,
        ctx: &ParseContext<'_>,
    ) -> Result<RequestData> {
        let page = if document.url.is_empty() {
            ctx.source_url.as_deref().unwrap_or_default()
        } else {
            document.url.as_str()
        };
        let Some(product) = Product::detect(page) else {
            return Ok(RequestData::failure(PRODUCT_NOT_FOUND));
        };
        let anchors = product.anchors();
        let Some(names) = api_url(document, anchors.url).and_then(|u| names_from(u.path())) else {
            return Ok(RequestData::failure(URL_NOT_FOUND));
        };
        debug!(?product, request = %names.1, "parsing document");

        let params = build_tree(&collect_rows(document, anchors.param)?);
        let responses = build_tree(&collect_rows(document, anchors.response)?);
        let mut out = assemble(&WeixinDialect, ctx, names, &params, &responses);
        if out.comments.is_empty() && !document.url.is_empty() {
            out.comments.push(document.url.clone());
        }
        Ok(out)
    }
}
