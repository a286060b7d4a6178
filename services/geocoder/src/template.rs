//! Address query templates such as `"{City}, {State}, {Country }"`.
//!
//! Placeholders name CSV columns exactly, including any stray whitespace in
//! the header. A placeholder whose column is missing renders as empty.

use anyhow::{bail, Result};

use crate::table::Table;

/// Default query built from city, state and country.
pub const DEFAULT_TEMPLATE: &str = "{City}, {State}, {Country }";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Column(String),
}

/// A parsed query template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    segments: Vec<Segment>,
}

impl QueryTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                bail!("Unclosed placeholder in template: {}", template);
            };
            let name = &after[..close];
            if name.is_empty() {
                bail!("Empty placeholder in template: {}", template);
            }
            segments.push(Segment::Column(name.to_string()));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        if !segments.iter().any(|s| matches!(s, Segment::Column(_))) {
            bail!("Template has no placeholders: {}", template);
        }
        Ok(Self { segments })
    }

    /// Column names referenced by the template.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Column(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Referenced columns that the table lacks.
    pub fn missing_columns(&self, table: &Table) -> Vec<String> {
        self.columns()
            .filter(|name| table.column(name).is_none())
            .map(str::to_string)
            .collect()
    }

    /// Query text for one row, trimmed of surrounding separators.
    pub fn render(&self, table: &Table, row: usize) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Column(name) => {
                    out.push_str(table.get_named(row, name).unwrap_or("").trim())
                }
            }
        }
        out.trim_matches(|c: char| c == ',' || c.is_whitespace())
            .to_string()
    }
}
