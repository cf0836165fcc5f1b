//! Vendor documentation parsers.
//!
//! Each vendor turns one captured documentation payload into a
//! [`RequestData`]. Built-in vendors are registered on first use; callers
//! may add their own with [`register_vendor`].

use std::sync::{OnceLock, PoisonError, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::builder::{Dialect, build_models};
use crate::config::BaseTypes;
use crate::document::Document;
use crate::error::{GenerateError, Result};
use crate::fetch::StructureSource;
use crate::naming::{pathname_to_request_name, snake_to_pascal};
use crate::types::{ModelKind, RequestData};

pub mod alibaba;
pub mod alipay;
pub mod doudian;
pub mod kuaishou;
pub mod taobao;
pub mod weixin;

pub const REQUEST_FAILED: &str = "请求失败，未正常返回接口文档数据";
pub const EMPTY_DATA: &str = "接口文档数据为空，请检查接口文档是否正确";
pub const MISSING_NAME: &str = "解析请求名称失败";
pub const UNEXPANDED_STRUCTURES: &str = "存在未展开的嵌套结构，请配置结构查询地址";

/// Per-call inputs a parser may need besides the payload itself.
pub struct ParseContext<'a> {
    /// Page the payload was captured on; becomes the first comment.
    pub source_url: Option<String>,
    pub structures: &'a dyn StructureSource,
}

impl<'a> ParseContext<'a> {
    pub fn new(structures: &'a dyn StructureSource) -> Self {
        Self {
            source_url: None,
            structures,
        }
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    fn comments(&self) -> Vec<String> {
        self.source_url.iter().cloned().collect()
    }
}

#[async_trait]
pub trait Vendor: Send + Sync {
    /// Registry key, e.g. `taobao`.
    fn id(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    /// Base types used when the configuration names none for this vendor.
    fn default_base_types(&self) -> BaseTypes;

    /// Whether an intercepted request carries this vendor's documentation.
    fn matches_request(&self, host: &str, method: &str, url: &str) -> bool;

    /// Parse a raw JSON documentation payload.
    async fn parse(&self, payload: &str, ctx: &ParseContext<'_>) -> Result<RequestData>;

    /// Parse an extracted page snapshot.
    async fn parse_document(
        &self,
        _document: &Document,
        _ctx: &ParseContext<'_>,
    ) -> Result<RequestData> {
        Err(GenerateError::DocumentUnsupported(self.id().to_string()))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

static VENDORS: RwLock<Vec<&'static dyn Vendor>> = RwLock::new(Vec::new());
static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Add a vendor. Lookups return the first match, so an id already taken by
/// a built-in keeps resolving to the built-in.
pub fn register_vendor(vendor: &'static dyn Vendor) {
    init_builtin();
    VENDORS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(vendor);
}

fn init_builtin() {
    INITIALIZED.get_or_init(|| {
        let mut vendors = VENDORS.write().unwrap_or_else(PoisonError::into_inner);
        vendors.push(&doudian::DOUDIAN);
        vendors.push(&weixin::WEIXIN);
        vendors.push(&alipay::ALIPAY);
        vendors.push(&alibaba::ALIBABA);
        vendors.push(&kuaishou::KUAISHOU);
        vendors.push(&taobao::TAOBAO);
    });
}

/// Look a vendor up by id (case-insensitive).
pub fn get_vendor(id: &str) -> Option<&'static dyn Vendor> {
    init_builtin();
    VENDORS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|v| v.id().eq_ignore_ascii_case(id))
        .copied()
}

pub fn vendors() -> Vec<&'static dyn Vendor> {
    init_builtin();
    VENDORS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

pub fn vendor_ids() -> Vec<&'static str> {
    vendors().iter().map(|v| v.id()).collect()
}

/// Map an intercepted request to the vendor whose documentation it carries.
pub fn detect_vendor(host: &str, method: &str, url: &str) -> Option<&'static str> {
    vendors()
        .into_iter()
        .find(|v| v.matches_request(host, method, url))
        .map(|v| v.id())
}

// ---------------------------------------------------------------------------
// Shared parsing helpers
// ---------------------------------------------------------------------------

/// `(method_name, request_name)` from a dotted name or a slashed path.
pub(crate) fn names_from(raw: &str) -> Option<(String, String)> {
    let trimmed = raw.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let request_name = if trimmed.contains('/') {
        pathname_to_request_name(trimmed)
    } else {
        trimmed.to_string()
    };
    Some((snake_to_pascal(&request_name), request_name))
}

/// Build both model lists and wrap them into a [`RequestData`].
pub(crate) fn assemble<D: Dialect>(
    dialect: &D,
    ctx: &ParseContext<'_>,
    (method_name, request_name): (String, String),
    params: &[D::Field],
    responses: &[D::Field],
) -> RequestData {
    RequestData {
        params: build_models(
            dialect,
            &format!("{method_name}Param"),
            ModelKind::Param,
            params,
        ),
        responses: build_models(
            dialect,
            &format!("{method_name}Response"),
            ModelKind::Response,
            responses,
        ),
        method_name: Some(method_name),
        request_name: Some(request_name),
        comments: ctx.comments(),
    }
}

/// `true` when `value` is missing, `null`, or an empty object/array/string.
pub(crate) fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Object(m)) => m.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// Free-text field that vendors send as a string, a number, or `null`.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Missing and `null` both read as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Field list embedded as a JSON-encoded string (`"[]"` when absent).
pub(crate) fn embedded_list<T: serde::de::DeserializeOwned>(raw: Option<&str>) -> Result<Vec<T>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(text) => Ok(serde_json::from_str(text)?),
    }
}
