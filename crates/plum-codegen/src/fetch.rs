//! Remote structure lookups.
//!
//! Some vendors describe a nested object only by a structure id; the members
//! live behind a separate documentation endpoint. [`expand_structures`]
//! resolves those ids through a [`StructureSource`] and grafts the fetched
//! members into the field tree before model building.

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::GeneratorConfig;
use crate::error::{GenerateError, Result};

pub const USER_AGENT: &str = concat!("plum-codegen/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait StructureSource: Send + Sync {
    /// Whether lookups for `vendor` can be served at all.
    fn supports(&self, _vendor: &str) -> bool {
        true
    }

    /// Raw documentation payload of structure `id`.
    async fn fetch(&self, vendor: &str, id: &str) -> Result<Value>;
}

// ---------------------------------------------------------------------------
// HTTP source
// ---------------------------------------------------------------------------

/// Fetches structures from per-vendor URL templates (`{id}` placeholder).
pub struct HttpStructureSource {
    client: reqwest::Client,
    endpoints: IndexMap<String, String>,
}

impl HttpStructureSource {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| GenerateError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoints: config.structure_endpoints.clone(),
        })
    }

    fn url_for(&self, vendor: &str, id: &str) -> Result<url::Url> {
        let template = self
            .endpoints
            .get(vendor)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GenerateError::Fetch {
                id: id.to_string(),
                reason: format!("no structure endpoint configured for {vendor}"),
            })?;
        url::Url::parse(&template.replace("{id}", id)).map_err(|e| GenerateError::Fetch {
            id: id.to_string(),
            reason: format!("invalid endpoint {template}: {e}"),
        })
    }
}

#[async_trait]
impl StructureSource for HttpStructureSource {
    fn supports(&self, vendor: &str) -> bool {
        self.endpoints.get(vendor).is_some_and(|t| !t.is_empty())
    }

    async fn fetch(&self, vendor: &str, id: &str) -> Result<Value> {
        let url = self.url_for(vendor, id)?;
        debug!(vendor, id, url = %url, "fetching structure");
        let failed = |e: reqwest::Error| GenerateError::Fetch {
            id: id.to_string(),
            reason: e.to_string(),
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(failed)?;
        response.json::<Value>().await.map_err(failed)
    }
}

// ---------------------------------------------------------------------------
// In-memory source
// ---------------------------------------------------------------------------

/// Serves pre-captured structure payloads keyed by id.
#[derive(Debug, Default, Clone)]
pub struct MemoryStructureSource {
    structures: HashMap<String, Value>,
}

impl MemoryStructureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, payload: Value) -> Self {
        self.structures.insert(id.into(), payload);
        self
    }
}

#[async_trait]
impl StructureSource for MemoryStructureSource {
    async fn fetch(&self, _vendor: &str, id: &str) -> Result<Value> {
        self.structures
            .get(id)
            .cloned()
            .ok_or_else(|| GenerateError::Fetch {
                id: id.to_string(),
                reason: "not captured".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Expansion
// ---------------------------------------------------------------------------

/// A raw field that may reference a remote structure.
pub trait Expandable: Clone + DeserializeOwned {
    fn structure_id(&self) -> Option<String>;
    fn children(&self) -> &[Self];
    fn children_mut(&mut self) -> &mut Vec<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    /// No field referenced a structure without inline members.
    NotNeeded,
    /// This many structures were fetched and grafted.
    Expanded(usize),
    /// References exist but the source cannot serve this vendor.
    Unavailable,
}

/// Structure id as carried in payloads: a non-zero number or a non-empty string.
pub fn structure_id_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() && s != "0" => Some(s.clone()),
        _ => None,
    }
}

/// Resolve every unexpanded structure reference in `fields`.
///
/// Ids are fetched one after another; ids discovered inside fetched
/// structures join the queue. Each id is fetched at most once, and a
/// structure that contains itself is grafted only once per branch.
/// `locate` picks the field array out of a fetched payload.
pub async fn expand_structures<F: Expandable>(
    source: &dyn StructureSource,
    vendor: &str,
    fields: &mut [F],
    locate: fn(&Value) -> Option<&Value>,
) -> Result<Expansion> {
    let mut queue = VecDeque::new();
    collect_pending(fields, &mut queue);
    if queue.is_empty() {
        return Ok(Expansion::NotNeeded);
    }
    if !source.supports(vendor) {
        warn!(vendor, pending = queue.len(), "structure references left unexpanded");
        return Ok(Expansion::Unavailable);
    }

    let mut visited = HashSet::new();
    let mut cache: HashMap<String, Vec<F>> = HashMap::new();
    while let Some(id) = queue.pop_front() {
        if !visited.insert(id.clone()) {
            continue;
        }
        let payload = source.fetch(vendor, &id).await?;
        let raw = locate(&payload).ok_or_else(|| GenerateError::Fetch {
            id: id.clone(),
            reason: "payload carries no structure members".to_string(),
        })?;
        let members: Vec<F> = serde_json::from_value(raw.clone())?;
        debug!(vendor, id = %id, members = members.len(), "structure fetched");
        collect_pending(&members, &mut queue);
        cache.insert(id, members);
    }

    let fetched = cache.len();
    graft(fields, &cache, &mut Vec::new());
    Ok(Expansion::Expanded(fetched))
}

fn collect_pending<F: Expandable>(fields: &[F], queue: &mut VecDeque<String>) {
    for field in fields {
        if field.children().is_empty()
            && let Some(id) = field.structure_id()
        {
            queue.push_back(id);
        }
        collect_pending(field.children(), queue);
    }
}

fn graft<F: Expandable>(fields: &mut [F], cache: &HashMap<String, Vec<F>>, chain: &mut Vec<String>) {
    for field in fields {
        let Some(id) = field.structure_id() else {
            graft(field.children_mut(), cache, chain);
            continue;
        };
        if chain.contains(&id) {
            debug!(id = %id, "recursive structure, not expanded again");
            continue;
        }
        if field.children().is_empty()
            && let Some(members) = cache.get(&id)
        {
            *field.children_mut() = members.clone();
        }
        chain.push(id);
        graft(field.children_mut(), cache, chain);
        chain.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Field {
        name: String,
        #[serde(default)]
        structure_id: Option<Value>,
        #[serde(default)]
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

    fn fields(value: Value) -> Vec<Field> {
        serde_json::from_value(value).unwrap()
    }

    fn data(v: &Value) -> Option<&Value> {
        v.get("data")
    }

    #[test]
    fn test_structure_id_of() {
        assert_eq!(structure_id_of(Some(&json!(42))), Some("42".into()));
        assert_eq!(structure_id_of(Some(&json!(0))), None);
        assert_eq!(structure_id_of(Some(&json!("s1"))), Some("s1".into()));
        assert_eq!(structure_id_of(Some(&json!(""))), None);
        assert_eq!(structure_id_of(Some(&json!(null))), None);
        assert_eq!(structure_id_of(None), None);
    }

    #[tokio::test]
    async fn test_expands_transitively() {
        let source = MemoryStructureSource::new()
            .with("1", json!({"data": [{"name": "buyer", "structureId": 2}, {"name": "id"}]}))
            .with("2", json!({"data": [{"name": "nick"}]}));
        let mut tree = fields(json!([{"name": "order", "structureId": 1}]));

        let outcome = expand_structures(&source, "kuaishou", &mut tree, data)
            .await
            .unwrap();
        assert_eq!(outcome, Expansion::Expanded(2));
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].children[0].name, "nick");
    }

    #[tokio::test]
    async fn test_self_reference_terminates() {
        let source = MemoryStructureSource::new().with(
            "7",
            json!({"data": [{"name": "parent", "structureId": 7}, {"name": "label"}]}),
        );
        let mut tree = fields(json!([{"name": "node", "structureId": 7}]));

        let outcome = expand_structures(&source, "taobao", &mut tree, data)
            .await
            .unwrap();
        assert_eq!(outcome, Expansion::Expanded(1));
        let inner = &tree[0].children[0];
        assert_eq!(inner.name, "parent");
        assert!(inner.children.is_empty());
    }

    #[tokio::test]
    async fn test_inline_members_need_no_fetch() {
        let source = MemoryStructureSource::new();
        let mut tree = fields(json!([{"name": "a", "structureId": 3, "children": [{"name": "b"}]}]));
        let outcome = expand_structures(&source, "taobao", &mut tree, data)
            .await
            .unwrap();
        assert_eq!(outcome, Expansion::NotNeeded);
    }

    #[tokio::test]
    async fn test_missing_structure_is_fetch_error() {
        let source = MemoryStructureSource::new();
        let mut tree = fields(json!([{"name": "a", "structureId": 3}]));
        let err = expand_structures(&source, "taobao", &mut tree, data)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Fetch { ref id, .. } if id == "3"));
    }

    #[tokio::test]
    async fn test_unconfigured_vendor_is_unavailable() {
        let source = HttpStructureSource::new(&GeneratorConfig::default()).unwrap();
        let mut tree = fields(json!([{"name": "a", "structureId": 3}]));
        let outcome = expand_structures(&source, "taobao", &mut tree, data)
            .await
            .unwrap();
        assert_eq!(outcome, Expansion::Unavailable);
        assert!(tree[0].children.is_empty());
    }

    #[tokio::test]
    async fn test_http_source_fetches_template_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/structure/12"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"name": "title"}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut config = GeneratorConfig::default();
        config
            .structure_endpoints
            .insert("taobao".into(), format!("{}/structure/{{id}}", server.uri()));
        let source = HttpStructureSource::new(&config).unwrap();
        assert!(source.supports("taobao"));
        assert!(!source.supports("kuaishou"));

        let mut tree = fields(json!([{"name": "item", "structureId": 12}]));
        expand_structures(&source, "taobao", &mut tree, data)
            .await
            .unwrap();
        assert_eq!(tree[0].children[0].name, "title");
    }

    #[tokio::test]
    async fn test_http_error_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let mut config = GeneratorConfig::default();
        config
            .structure_endpoints
            .insert("kuaishou".into(), format!("{}/s?id={{id}}", server.uri()));
        let source = HttpStructureSource::new(&config).unwrap();
        let err = source.fetch("kuaishou", "5").await.unwrap_err();
        assert!(matches!(err, GenerateError::Fetch { .. }));
    }
}
