use serde_json::Value;

use crate::{
    domain::{Type, TypeError, TypeRegistry, type_to_string},
    editor::EditorTree,
};

#[derive(Debug, PartialEq)]
pub enum ValidationOutcome {
    Valid(Value),
    Invalid { issues: usize, messages: Vec<String> },
}

/// Check the document against its root type and collect every row error
/// (regex and format mismatches, unmatched unions, missing editors).
pub fn validate_document(
    types: &TypeRegistry,
    root: &Type,
    value: &Value,
    tree: &EditorTree,
) -> Result<ValidationOutcome, TypeError> {
    let mut messages = Vec::new();
    if !types.is_instance(value, root)? {
        messages.push(format!("<root>: not an instance of {}", type_to_string(root)));
    }
    messages.extend(
        tree.rows()
            .iter()
            .filter_map(|row| row.error.as_ref().map(|err| format!("{}: {err}", row.accessor))),
    );
    if messages.is_empty() {
        Ok(ValidationOutcome::Valid(value.clone()))
    } else {
        Ok(ValidationOutcome::Invalid {
            issues: messages.len(),
            messages,
        })
    }
}
