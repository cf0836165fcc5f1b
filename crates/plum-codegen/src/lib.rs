//! Model code generation from e-commerce open-platform API documentation.
//!
//! A captured documentation payload goes through three stages:
//!
//! 1. a [`Vendor`] parser normalizes it into a [`RequestData`]
//! 2. [`dedup::deduplicate`] collapses identical nested models and assigns
//!    final class names
//! 3. an [`Emitter`] renders the models as source lines
//!
//! [`generate`] and [`generate_by_document`] never fail: any error is
//! rendered as a comment in the target language.

pub mod builder;
pub mod config;
pub mod dedup;
pub mod document;
pub mod emit;
pub mod error;
pub mod fetch;
pub mod naming;
pub mod types;
pub mod vendors;

use std::sync::Arc;

use tracing::{debug, warn};

pub use crate::config::{BaseTypes, GeneratorConfig};
pub use crate::document::Document;
pub use crate::emit::{EmitOptions, Emitter};
pub use crate::error::{GenerateError, Result};
pub use crate::fetch::{HttpStructureSource, MemoryStructureSource, StructureSource};
pub use crate::types::{ModelKind, Param, RequestData, RequestModel, VariableType};
pub use crate::vendors::{ParseContext, Vendor, detect_vendor};

/// Parser, dedup and emitter wired to one configuration.
pub struct Generator {
    config: GeneratorConfig,
    structures: Arc<dyn StructureSource>,
}

impl Generator {
    /// Structure lookups go over HTTP to the configured endpoints.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let structures = Arc::new(HttpStructureSource::new(&config)?);
        Ok(Self { config, structures })
    }

    pub fn with_structure_source(
        config: GeneratorConfig,
        structures: Arc<dyn StructureSource>,
    ) -> Self {
        Self { config, structures }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn vendor(&self, id: &str) -> Result<&'static dyn Vendor> {
        vendors::get_vendor(id).ok_or_else(|| GenerateError::UnknownVendor(id.to_string()))
    }

    pub fn emitter(&self, language: &str) -> Result<&'static dyn Emitter> {
        emit::get_emitter(language)
            .ok_or_else(|| GenerateError::UnknownLanguage(language.to_string()))
    }

    /// Parse a JSON payload and deduplicate the result.
    pub async fn parse(
        &self,
        vendor: &dyn Vendor,
        payload: &str,
        source_url: Option<&str>,
    ) -> Result<RequestData> {
        let ctx = self.context(source_url);
        let data = vendor.parse(payload, &ctx).await?;
        Ok(self.finish(vendor, data))
    }

    /// Parse an extracted page and deduplicate the result.
    pub async fn parse_document(
        &self,
        vendor: &dyn Vendor,
        document: &Document,
        source_url: Option<&str>,
    ) -> Result<RequestData> {
        let ctx = self.context(source_url);
        let data = vendor.parse_document(document, &ctx).await?;
        Ok(self.finish(vendor, data))
    }

    /// Render already parsed data with this generator's switches.
    pub fn render(
        &self,
        vendor: &dyn Vendor,
        emitter: &dyn Emitter,
        data: &RequestData,
    ) -> Vec<String> {
        let base_types = self
            .config
            .base_types(vendor.id(), vendor.default_base_types());
        emitter.generate(data, &EmitOptions::new(&self.config, base_types))
    }

    /// Payload to source lines; failures become comment lines.
    pub async fn generate(&self, vendor: &str, language: &str, payload: &str) -> Vec<String> {
        self.generate_from(vendor, language, Input::Payload(payload)).await
    }

    /// Extracted page to source lines; failures become comment lines.
    pub async fn generate_by_document(
        &self,
        vendor: &str,
        language: &str,
        document: &Document,
    ) -> Vec<String> {
        self.generate_from(vendor, language, Input::Document(document)).await
    }

    async fn generate_from(&self, vendor: &str, language: &str, input: Input<'_>) -> Vec<String> {
        let emitter = match self.emitter(language) {
            Ok(e) => e,
            Err(e) => return vec![emit::python::PYTHON.comment(&e.to_string())],
        };
        let vendor = match self.vendor(vendor) {
            Ok(v) => v,
            Err(e) => return vec![emitter.comment(&e.to_string())],
        };

        let parsed = match input {
            Input::Payload(payload) => self.parse(vendor, payload, None).await,
            Input::Document(document) => self.parse_document(vendor, document, None).await,
        };
        match parsed {
            Ok(data) => self.render(vendor, emitter, &data),
            Err(e) => {
                warn!(vendor = vendor.id(), error = %e, "generation failed");
                vec![emitter.comment(&e.to_string())]
            }
        }
    }

    fn context(&self, source_url: Option<&str>) -> ParseContext<'_> {
        let ctx = ParseContext::new(self.structures.as_ref());
        match source_url {
            Some(url) => ctx.with_source_url(url),
            None => ctx,
        }
    }

    fn finish(&self, vendor: &dyn Vendor, data: RequestData) -> RequestData {
        let data = dedup::deduplicate(data);
        debug!(
            vendor = vendor.id(),
            params = data.params.len(),
            responses = data.responses.len(),
            "parsed"
        );
        data
    }
}

enum Input<'a> {
    Payload(&'a str),
    Document(&'a Document),
}

/// One-shot form of [`Generator::generate`].
pub async fn generate(
    vendor: &str,
    language: &str,
    payload: &str,
    config: &GeneratorConfig,
) -> Vec<String> {
    match Generator::new(config.clone()) {
        Ok(generator) => generator.generate(vendor, language, payload).await,
        Err(e) => vec![comment_for(language, &e)],
    }
}

/// One-shot form of [`Generator::generate_by_document`].
pub async fn generate_by_document(
    vendor: &str,
    language: &str,
    document: &Document,
    config: &GeneratorConfig,
) -> Vec<String> {
    match Generator::new(config.clone()) {
        Ok(generator) => generator.generate_by_document(vendor, language, document).await,
        Err(e) => vec![comment_for(language, &e)],
    }
}

fn comment_for(language: &str, error: &GenerateError) -> String {
    emit::get_emitter(language)
        .unwrap_or(&emit::python::PYTHON)
        .comment(&error.to_string())
}
