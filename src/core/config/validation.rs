use serde_json::{Map, Value};
use crate::core::errors::ApiError;

pub fn validate_config(config: &Value) -> Result<(), ApiError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(rag) = expect_optional_object(root, "rag")? {
        validate_optional_string_field(rag, "rag.roster_path", "roster_path")?;
        validate_u64_field(rag, "rag.top_k", "top_k", 1, 50)?;
    }

    if let Some(embedding) = expect_optional_object(root, "embedding")? {
        validate_enum_field(
            embedding,
            "embedding.provider",
            "provider",
            &["local", "hashing", "ollama", "lmstudio"],
        )?;
        validate_optional_string_field(embedding, "embedding.base_url", "base_url")?;
        validate_optional_string_field(embedding, "embedding.model", "model")?;
        validate_u64_field(embedding, "embedding.dimension", "dimension", 8, 4096)?;
        validate_u64_field(embedding, "embedding.timeout_secs", "timeout_secs", 1, 600)?;
    }

    if let Some(llm) = expect_optional_object(root, "llm")? {
        validate_enum_field(
            llm,
            "llm.provider",
            "provider",
            &["ollama", "lmstudio", "disabled"],
        )?;
        validate_optional_string_field(llm, "llm.base_url", "base_url")?;
        validate_optional_string_field(llm, "llm.model", "model")?;
        validate_optional_string_field(llm, "llm.api_key", "api_key")?;
        validate_u64_field(llm, "llm.timeout_secs", "timeout_secs", 1, 600)?;
    }

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65535)?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ApiError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(config_type_error(key, "object")),
        None => Ok(None),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_str().is_none() {
        return Err(config_type_error(path, "string"));
    }
    Ok(())
}

fn validate_enum_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    allowed: &[&str],
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if !allowed.contains(&text) {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': expected one of {}",
            path,
            allowed.join(", ")
        )));
    }
    Ok(())
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ApiError::BadRequest(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ApiError {
    ApiError::BadRequest(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_empty_and_complete_configs() {
        validate_config(&json!({})).unwrap();
        validate_config(&json!({
            "rag": { "roster_path": "data/employees.json", "top_k": 3 },
            "embedding": { "provider": "ollama", "model": "all-minilm", "timeout_secs": 10 },
            "llm": { "provider": "lmstudio", "base_url": "http://localhost:1234" },
            "server": { "host": "0.0.0.0", "port": 8000, "cors_allowed_origins": ["http://localhost:8501"] }
        }))
        .unwrap();
    }

    #[test]
    fn rejects_out_of_range_top_k() {
        let err = validate_config(&json!({ "rag": { "top_k": 0 } })).unwrap_err();
        assert!(err.to_string().contains("rag.top_k"));
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = validate_config(&json!({ "llm": { "provider": "gpt" } })).unwrap_err();
        assert!(err.to_string().contains("ollama, lmstudio, disabled"));
    }

    #[test]
    fn rejects_non_object_section() {
        let err = validate_config(&json!({ "server": "localhost" })).unwrap_err();
        assert!(err.to_string().contains("'server': expected object"));
    }

    #[test]
    fn rejects_blank_origin() {
        let err = validate_config(&json!({ "server": { "cors_allowed_origins": [" "] } }))
            .unwrap_err();
        assert!(err.to_string().contains("cors_allowed_origins[0]"));
    }
}
