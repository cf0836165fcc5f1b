//! Extracted content of a rendered documentation page.
//!
//! The browser side walks the DOM and hands over the text found after each
//! anchor: the first block element after an anchor goes into `blocks`, the
//! first table after it into `tables` (one `Vec<String>` of cell texts per
//! body row).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    /// Address of the page the snapshot was taken from.
    pub url: String,
    pub blocks: IndexMap<String, String>,
    pub tables: IndexMap<String, Vec<Vec<String>>>,
}

impl Document {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_block(mut self, anchor: impl Into<String>, text: impl Into<String>) -> Self {
        self.blocks.insert(anchor.into(), text.into());
        self
    }

    pub fn with_table<R, C>(mut self, anchor: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        self.tables.insert(anchor.into(), rows);
        self
    }

    pub fn block(&self, anchor: &str) -> Option<&str> {
        self.blocks.get(anchor).map(String::as_str)
    }

    /// Rows of the table following `anchor`, skipping rows without cells.
    pub fn table(&self, anchor: &str) -> Option<impl Iterator<Item = &[String]>> {
        self.tables
            .get(anchor)
            .map(|rows| rows.iter().map(Vec::as_slice).filter(|r| !r.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_defaults_missing_sections() {
        let doc = Document::from_json(r#"{"url": "https://developers.weixin.qq.com/doc/x"}"#).unwrap();
        assert!(doc.blocks.is_empty());
        assert!(doc.table("请求参数说明").is_none());
    }

    #[test]
    fn test_table_skips_empty_rows() {
        let doc = Document::new("u").with_table("t", vec![vec![], vec!["a", "string", "desc"]]);
        let rows: Vec<&[String]> = doc.table("t").unwrap().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "a");
    }
}
