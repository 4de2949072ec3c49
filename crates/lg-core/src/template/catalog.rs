//! Template catalogs and their text format
//!
//! ```text
//! @name category weight [rot]
//! #######
//! #.....#
//! ...
//! ```
//!
//! Blocks are separated by blank lines and lines starting with `//` are
//! ignored. `rot` adds the three rotated copies of the block. Every catalog
//! needs one `filler` template.

use std::str::FromStr;

use super::tile::{TileCategory, TileTemplate};
use crate::error::{GenError, GenResult, report};

/// A set of templates plus the filler used for unused slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCatalog {
    templates: Vec<TileTemplate>,
    filler: usize,
}

struct Header {
    name: String,
    category: TileCategory,
    weight: u32,
    rotate: bool,
    line: usize,
}

fn parse_error(line: usize, reason: impl Into<String>) -> GenError {
    report(GenError::TemplateParse {
        line,
        reason: reason.into(),
    })
}

fn parse_header(text: &str, line: usize) -> GenResult<Header> {
    let mut parts = text.trim_start_matches('@').split_whitespace();
    let name = parts
        .next()
        .ok_or_else(|| parse_error(line, "missing template name"))?;
    let category = parts
        .next()
        .ok_or_else(|| parse_error(line, "missing category"))?;
    let category = TileCategory::from_str(category)
        .map_err(|_| parse_error(line, format!("unknown category '{}'", category)))?;
    let weight = match parts.next() {
        Some(w) => w
            .parse::<u32>()
            .map_err(|_| parse_error(line, format!("bad weight '{}'", w)))?,
        None => 1,
    };
    let rotate = match parts.next() {
        Some("rot") => true,
        Some(other) => return Err(parse_error(line, format!("unexpected '{}'", other))),
        None => false,
    };
    Ok(Header {
        name: name.to_string(),
        category,
        weight,
        rotate,
        line,
    })
}

fn finish_block(
    header: Option<Header>,
    rows: &mut Vec<Vec<char>>,
    out: &mut Vec<TileTemplate>,
) -> GenResult<()> {
    let Some(h) = header else {
        return Ok(());
    };
    let tile = TileTemplate::from_rows(&h.name, h.category, h.weight, std::mem::take(rows))
        .map_err(|reason| parse_error(h.line, reason))?;
    if h.rotate {
        let mut prev = tile.clone();
        out.push(tile);
        for deg in [90, 180, 270] {
            let mut next = prev.rotated();
            next.name = format!("{}_r{}", h.name, deg);
            out.push(next.clone());
            prev = next;
        }
    } else {
        out.push(tile);
    }
    Ok(())
}

impl TemplateCatalog {
    /// Parse a catalog from text
    pub fn parse(text: &str) -> GenResult<Self> {
        let mut templates = Vec::new();
        let mut header: Option<Header> = None;
        let mut rows: Vec<Vec<char>> = Vec::new();

        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let trimmed = raw.trim();
            if trimmed.starts_with("//") {
                continue;
            }
            if trimmed.is_empty() {
                finish_block(header.take(), &mut rows, &mut templates)?;
                continue;
            }
            if trimmed.starts_with('@') {
                finish_block(header.take(), &mut rows, &mut templates)?;
                header = Some(parse_header(trimmed, line)?);
                continue;
            }
            if header.is_none() {
                return Err(parse_error(line, "rows before any '@' header"));
            }
            rows.push(trimmed.chars().collect());
        }
        finish_block(header.take(), &mut rows, &mut templates)?;
        Self::from_templates(templates)
    }

    /// Build from already constructed templates
    pub fn from_templates(templates: Vec<TileTemplate>) -> GenResult<Self> {
        let filler = templates
            .iter()
            .position(TileTemplate::is_filler)
            .ok_or_else(|| parse_error(0, "catalog has no filler template"))?;
        Ok(Self { templates, filler })
    }

    pub fn templates(&self) -> &[TileTemplate] {
        &self.templates
    }

    pub fn filler(&self) -> &TileTemplate {
        &self.templates[self.filler]
    }

    pub fn filler_index(&self) -> usize {
        self.filler
    }

    pub fn get(&self, name: &str) -> GenResult<&TileTemplate> {
        self.templates
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| report(GenError::UnknownTemplate(name.to_string())))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
