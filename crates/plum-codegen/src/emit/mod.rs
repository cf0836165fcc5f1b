//! Language emitters: [`RequestData`] in, source lines out.

use std::sync::{OnceLock, PoisonError, RwLock};

use crate::config::{BaseTypes, GeneratorConfig};
use crate::types::{ModelKind, Param, RequestData, RequestModel};

pub mod python;
pub mod typescript;

/// Rendering switches for one emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub need_removed: bool,
    pub need_deprecated: bool,
    pub need_example: bool,
    pub need_description: bool,
    pub base_types: BaseTypes,
}

impl EmitOptions {
    pub fn new(config: &GeneratorConfig, base_types: BaseTypes) -> Self {
        Self {
            need_removed: config.need_removed,
            need_deprecated: config.need_deprecated,
            need_example: config.need_example,
            need_description: config.need_description,
            base_types,
        }
    }

    pub fn base_for(&self, kind: ModelKind) -> &str {
        self.base_types.for_kind(kind)
    }

    /// Fields of `model` that survive the removed/deprecated toggles.
    pub fn visible_fields<'a>(&self, model: &'a RequestModel) -> impl Iterator<Item = &'a Param> {
        let (removed, deprecated) = (self.need_removed, self.need_deprecated);
        model
            .child_params
            .iter()
            .filter(move |p| p.is_visible(removed, deprecated))
    }
}

pub trait Emitter: Send + Sync {
    /// Display name, also the registry key (matched case-insensitively).
    fn language(&self) -> &'static str;

    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    /// A single comment line in this language.
    fn comment(&self, text: &str) -> String;

    fn generate(&self, data: &RequestData, options: &EmitOptions) -> Vec<String>;
}

/// The request wrapper is emitted only for a named method with a param model.
pub(crate) fn wrapper_parts(data: &RequestData) -> Option<(&str, &str, &str)> {
    let method = data.method_name.as_deref().filter(|s| !s.is_empty())?;
    let request = data.request_name.as_deref().filter(|s| !s.is_empty())?;
    let param = data.root_param()?;
    Some((method, request, param.class_name.as_str()))
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

static EMITTERS: RwLock<Vec<&'static dyn Emitter>> = RwLock::new(Vec::new());
static INITIALIZED: OnceLock<()> = OnceLock::new();

pub fn register_emitter(emitter: &'static dyn Emitter) {
    init_builtin();
    EMITTERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(emitter);
}

fn init_builtin() {
    INITIALIZED.get_or_init(|| {
        let mut emitters = EMITTERS.write().unwrap_or_else(PoisonError::into_inner);
        emitters.push(&python::PYTHON);
        emitters.push(&typescript::TYPESCRIPT);
    });
}

pub fn get_emitter(language: &str) -> Option<&'static dyn Emitter> {
    init_builtin();
    EMITTERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|e| e.language().eq_ignore_ascii_case(language.trim()))
        .copied()
}

pub fn languages() -> Vec<&'static str> {
    init_builtin();
    EMITTERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .map(|e| e.language())
        .collect()
}
