//! Rendering and JSON serialization for CLI output.

use std::process::ExitCode;

use esq_compile::{CompileError, FieldMapping};
use serde::Serialize;

/// JSON output for one field mapping.
#[derive(Serialize)]
struct JsonField<'a> {
    /// Logical field name.
    field: &'a str,
    /// Backend property path.
    property: &'a str,
    /// Nested paths, outermost first.
    nested: Vec<&'a str>,
    /// Child types, outermost first.
    join: Vec<&'a str>,
    /// Number of preconditions.
    preconditions: usize,
}

impl<'a> From<&'a FieldMapping> for JsonField<'a> {
    fn from(mapping: &'a FieldMapping) -> Self {
        Self {
            field: mapping.name(),
            property: mapping.property(),
            nested: mapping.nesting().iter().map(|l| l.path.as_str()).collect(),
            join: mapping.join().iter().map(|l| l.child_type.as_str()).collect(),
            preconditions: mapping.preconditions().len(),
        }
    }
}

/// Prints `value` as JSON, pretty unless `compact`.
pub fn print_json(value: &impl Serialize, compact: bool) -> ExitCode {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    match rendered {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints a compile error with its hint.
pub fn print_compile_error(error: &CompileError) -> ExitCode {
    eprintln!("error: {error}");
    eprintln!("hint: {}", error.suggestion());
    ExitCode::FAILURE
}

/// Prints field mappings as JSON.
pub fn print_fields_json(mappings: &[&FieldMapping]) -> ExitCode {
    let fields: Vec<JsonField<'_>> = mappings.iter().map(|m| JsonField::from(*m)).collect();
    print_json(&fields, false)
}

/// Prints field mappings as aligned text, one per line.
pub fn print_fields(mappings: &[&FieldMapping]) -> ExitCode {
    let width = mappings.iter().map(|m| m.name().len()).max().unwrap_or(0);
    for mapping in mappings {
        println!("{:width$}  {}", mapping.name(), describe(mapping));
    }
    ExitCode::SUCCESS
}

/// Describes where a mapping's property lives, e.g. `offer > variants > variants.size`.
fn describe(mapping: &FieldMapping) -> String {
    let mut parts: Vec<String> = mapping
        .join()
        .iter()
        .map(|l| format!("[{}]", l.child_type))
        .collect();
    parts.extend(mapping.nesting().iter().map(|l| l.path.clone()));
    parts.push(mapping.property().to_string());

    let mut line = parts.join(" > ");
    match mapping.preconditions().len() {
        0 => {}
        1 => line.push_str(" (1 precondition)"),
        n => line.push_str(&format!(" ({n} preconditions)")),
    }
    line
}

#[cfg(test)]
mod tests {
    use esq_compile::{FieldDefinition, FieldRegistry, Precondition};
    use serde_json::json;

    use super::*;

    /// Registry with a joined nested field guarded by a precondition.
    fn registry() -> FieldRegistry {
        let mut registry = FieldRegistry::new();
        registry.register(FieldDefinition::new("market", "market")).unwrap();
        registry
            .register(
                FieldDefinition::new("size", "variants.size")
                    .child("offer")
                    .nested("variants")
                    .precondition(Precondition::value("market", vec![json!("nl")])),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_describes_join_nesting_and_property() {
        let registry = registry();
        assert_eq!(
            describe(registry.lookup("size").unwrap()),
            "[offer] > variants > variants.size (1 precondition)"
        );
        assert_eq!(describe(registry.lookup("market").unwrap()), "market");
    }

    #[test]
    fn test_json_field_lists_chains() {
        let registry = registry();
        let field = JsonField::from(registry.lookup("size").unwrap());
        assert_eq!(
            serde_json::to_value(&field).unwrap(),
            json!({
                "field": "size",
                "property": "variants.size",
                "nested": ["variants"],
                "join": ["offer"],
                "preconditions": 1
            })
        );
    }
}
