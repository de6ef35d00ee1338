//! Rendering of search results.
//!
//! Templates use `{{.Field}}` placeholders naming [`DisplayRecord`] fields:
//! - `table ...` renders an aligned table whose columns are the placeholders
//!   (all fields when none are given)
//! - `json` renders the records as a JSON array
//! - anything else is expanded once per record, one line each

use comfy_table::{ContentArrangement, Table};
use quarry_core::error::{Result, SearchError};
use quarry_core::search::DisplayRecord;

/// Default search output.
pub const DEFAULT_SEARCH_FORMAT: &str =
    "table {{.Index}}\t{{.Name}}\t{{.Description}}\t{{.Stars}}\t{{.Official}}\t{{.Automated}}";

/// Create a styled table with the given headers.
pub fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.load_preset(comfy_table::presets::NOTHING);
    table.set_header(headers);
    table
}

/// Resolve the user's `--format`, turning a typed `\t` into a tab.
pub fn search_format(format: Option<&str>) -> String {
    match format {
        Some(f) if !f.is_empty() => f.replace(r"\t", "\t"),
        _ => DEFAULT_SEARCH_FORMAT.to_string(),
    }
}

/// Render records with a template.
pub fn render_records(records: &[DisplayRecord], template: &str) -> Result<String> {
    if template.trim() == "json" {
        let mut out = serde_json::to_string_pretty(records)?;
        out.push('\n');
        return Ok(out);
    }

    if let Some(columns) = template.strip_prefix("table") {
        return render_table(records, columns);
    }

    let mut out = String::new();
    for record in records {
        out.push_str(&apply_template(template, record)?);
        out.push('\n');
    }
    Ok(out)
}

fn render_table(records: &[DisplayRecord], columns: &str) -> Result<String> {
    let mut fields = placeholders(columns)?;
    if fields.is_empty() {
        fields = DisplayRecord::FIELDS.iter().map(|(name, _)| *name).collect();
    }

    let headers = fields
        .iter()
        .map(|field| DisplayRecord::header(field).ok_or_else(|| unknown_field(field)))
        .collect::<Result<Vec<&str>>>()?;

    let mut table = new_table(&headers);
    for record in records {
        let row = fields
            .iter()
            .map(|field| record.field(field).ok_or_else(|| unknown_field(field)))
            .collect::<Result<Vec<String>>>()?;
        table.add_row(row);
    }

    Ok(format!("{table}\n"))
}

/// Expand every `{{.Field}}` placeholder in `template` for one record.
fn apply_template(template: &str, record: &DisplayRecord) -> Result<String> {
    let mut out = String::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| SearchError::Template(format!("unclosed placeholder in {:?}", template)))?;
        let field = field_name(&after[..end])?;
        let value = record.field(field).ok_or_else(|| unknown_field(field))?;
        out.push_str(&value);
        rest = &after[end + 2..];
    }
    out.push_str(rest);

    Ok(out)
}

/// Field names referenced by a template, in order.
fn placeholders(template: &str) -> Result<Vec<&str>> {
    let mut fields = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| SearchError::Template(format!("unclosed placeholder in {:?}", template)))?;
        fields.push(field_name(&after[..end])?);
        rest = &after[end + 2..];
    }

    Ok(fields)
}

fn field_name(placeholder: &str) -> Result<&str> {
    placeholder
        .trim()
        .strip_prefix('.')
        .ok_or_else(|| SearchError::Template(format!("invalid placeholder {{{{{}}}}}", placeholder)))
}

fn unknown_field(field: &str) -> SearchError {
    SearchError::Template(format!("unknown field {:?}", field))
}
