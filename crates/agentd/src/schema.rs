//! JSON Schemas handed to the Structured LLM Client (C3) for each
//! AI-mediated operation. Kept as plain `serde_json::Value` literals rather
//! than derived, since the wire shape (a single top-level object with one
//! list field) is deliberately simpler than the corresponding Rust type in
//! a few places — e.g. `FileChange` lists are wrapped so empty output is
//! unambiguous (§4.8).

use serde_json::{json, Value};

/// C7 Planner: a non-empty ordered list of steps.
pub fn plan_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "steps": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "description": { "type": "string" },
                        "plan": { "type": "string" }
                    },
                    "required": ["name", "description", "plan"]
                }
            }
        },
        "required": ["steps"]
    })
}

/// C8 File-Change Generator: zero or more whole-file replacements.
pub fn file_changes_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "changes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "path": { "type": "string" },
                        "content": { "type": "string" }
                    },
                    "required": ["path", "content"]
                }
            }
        },
        "required": ["changes"]
    })
}

/// C9 Code Reviewer output.
pub fn review_analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": { "type": "string" },
            "file_analyses": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "path": { "type": "string" },
                        "analysis": { "type": "string" }
                    },
                    "required": ["path", "analysis"]
                }
            },
            "overall_suggestions": {
                "type": "array",
                "items": { "type": "string" }
            }
        },
        "required": ["summary", "file_analyses", "overall_suggestions"]
    })
}

/// C10 Test Gating decision.
pub fn gating_decision_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "should_generate": { "type": "boolean" },
            "reasoning": { "type": "string" },
            "recommendation": { "type": "string" }
        },
        "required": ["should_generate", "reasoning", "recommendation"]
    })
}

/// C11/C12: a list of test proposals, shared by generation and repair.
pub fn test_proposals_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "proposals": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "path": { "type": "string" },
                        "test_content": { "type": "string" },
                        "action": {
                            "type": "string",
                            "enum": ["create", "update", "rename"]
                        },
                        "old_path": { "type": "string" }
                    },
                    "required": ["path", "test_content", "action"]
                }
            }
        },
        "required": ["proposals"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_schema_is_a_json_object_with_a_required_list_field() {
        for schema in [
            plan_schema(),
            file_changes_schema(),
            review_analysis_schema(),
            gating_decision_schema(),
            test_proposals_schema(),
        ] {
            assert_eq!(schema["type"], "object");
            assert!(schema["required"].is_array());
        }
    }
}
