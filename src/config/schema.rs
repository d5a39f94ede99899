use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "llm": {
                "type": "object",
                "properties": {
                    "provider": { "type": "string", "enum": ["openrouter", "openai_compatible"] },
                    "model": { "type": "string", "minLength": 1 },
                    "api_key": { "type": "string" },
                    "base_url": { "type": "string", "format": "uri" },
                    "timeout_secs": { "type": "integer", "minimum": 1 }
                }
            },
            "lifecycle": {
                "type": "object",
                "properties": {
                    "min_interval_ms": { "type": "integer", "minimum": 0 },
                    "max_failures": { "type": "integer", "minimum": 1 },
                    "cooldown_secs": { "type": "integer", "minimum": 0 }
                }
            },
            "analysis": {
                "type": "object",
                "properties": {
                    "depth": { "type": "integer", "minimum": 1, "maximum": 10 },
                    "mode": { "type": "string", "enum": ["recon", "active", "greybox", "code"] },
                    "validate": { "type": "boolean" },
                    "deep_analysis": { "type": "boolean" }
                }
            },
            "prompts": {
                "type": "object",
                "properties": {
                    "directory": { "type": "string" }
                }
            },
            "output": {
                "type": "object",
                "properties": {
                    "directory": { "type": "string" },
                    "format": { "type": "string", "enum": ["markdown", "json"] }
                }
            }
        }
    })
});
