//! Field and preset listings.

use owo_colors::OwoColorize;
use serde::Serialize;
use timeline_filter::filter::Preset;
use timeline_filter::Schema;

/// JSON output structure for the fields command.
#[derive(Serialize)]
pub struct FieldsOutput<'a> {
    pub format: &'a str,
    pub fields: &'a [String],
}

/// Formats a schema as JSON.
pub fn format_fields_json(schema: &Schema, format: &str) -> Result<String, serde_json::Error> {
    let output = FieldsOutput {
        format,
        fields: schema.fields(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats a schema as one field name per line.
pub fn format_fields_text(schema: &Schema) -> String {
    if schema.is_empty() {
        return "No fields found (the dataset has no records).\n".to_string();
    }

    let mut output = String::new();
    for field in schema.fields() {
        output.push_str(field);
        output.push('\n');
    }
    output
}

/// JSON output structure for a preset.
#[derive(Serialize)]
pub struct PresetOutput<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub query: &'a str,
}

/// Formats presets as JSON.
pub fn format_presets_json(presets: &[Preset]) -> Result<String, serde_json::Error> {
    let output: Vec<PresetOutput> = presets
        .iter()
        .map(|p| PresetOutput {
            name: p.name,
            description: p.description,
            query: p.query,
        })
        .collect();
    serde_json::to_string_pretty(&output)
}

/// Formats presets as a table.
pub fn format_presets_table(presets: &[Preset], use_colors: bool, verbose: bool) -> String {
    let mut output = String::new();

    let header = format!("{:<17} {}", "Name", "Description");
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(&header);
        output.push('\n');
    }

    for preset in presets {
        let name = format!("{:<17}", preset.name);
        if use_colors {
            output.push_str(&format!("{} {}\n", name.green(), preset.description));
        } else {
            output.push_str(&format!("{} {}\n", name, preset.description));
        }
        if verbose {
            output.push_str(&format!("{:<17} {}\n", "", preset.query));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeline_filter::filter::PRESETS;

    #[test]
    fn test_fields_text() {
        let schema = Schema::new(vec!["date".into(), "desc".into()]);
        assert_eq!(format_fields_text(&schema), "date\ndesc\n");
        assert!(format_fields_text(&Schema::default()).starts_with("No fields"));
    }

    #[test]
    fn test_fields_json() {
        let schema = Schema::new(vec!["date".into(), "desc".into()]);
        let json = format_fields_json(&schema, "l2tcsv").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["format"], "l2tcsv");
        assert_eq!(value["fields"][1], "desc");
    }

    #[test]
    fn test_presets_table_lists_every_preset() {
        let table = format_presets_table(PRESETS, false, false);
        assert_eq!(table.lines().count(), PRESETS.len() + 1);
        assert!(table.contains("prefetch"));
        assert!(!table.contains("iregex"));

        let verbose = format_presets_table(PRESETS, false, true);
        assert!(verbose.contains("ANY iregex"));
    }

    #[test]
    fn test_presets_json() {
        let json = format_presets_json(PRESETS).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), PRESETS.len());
        assert_eq!(value[0]["name"], "prefetch");
    }
}
