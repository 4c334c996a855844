use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};

use crate::errors::CompletionError;
use crate::providers::base::CompletionRequest;

/// Encode raw image bytes as the data URI vision endpoints expect.
pub fn image_to_data_uri(image: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", BASE64.encode(image))
}

/// Build the JSON body for a completion request.
///
/// Plain chat requests become `{model, messages, max_tokens}`. When an
/// image is attached, the final user message is rewritten as a multi-part
/// content array carrying the text plus the image URL, and the sampling
/// parameters use the vision endpoint's field names.
pub fn request_to_payload(request: &CompletionRequest) -> Value {
    let mut messages: Vec<Value> = request
        .messages
        .iter()
        .map(|m| json!({ "role": m.role, "content": m.content }))
        .collect();

    match &request.image {
        None => {
            let mut payload = json!({
                "model": request.model,
                "messages": messages,
                "max_tokens": request.max_tokens,
            });
            if let Some(temperature) = request.temperature {
                payload["temperature"] = json!(temperature);
            }
            if let Some(top_p) = request.top_p {
                payload["top_p"] = json!(top_p);
            }
            payload
        }
        Some(data_uri) => {
            if let Some(last) = messages.last_mut() {
                let text = last["content"].as_str().unwrap_or_default().to_string();
                last["content"] = json!([
                    { "type": "text", "text": text },
                    { "type": "image_url", "image_url": { "url": data_uri } },
                ]);
            }

            let mut payload = json!({
                "model": request.model,
                "messages": messages,
                "max_completion_tokens": request.max_tokens,
            });
            if let Some(temperature) = request.temperature {
                payload["temperature"] = json!(temperature);
            }
            if let Some(top_p) = request.top_p {
                payload["top_p"] = json!(top_p);
            }
            payload
        }
    }
}

/// Extract `choices[0].message.content` from a 200 response body.
pub fn response_to_text(response: &Value) -> Result<String, CompletionError> {
    response
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .map(|t| t.trim().to_string())
        .ok_or_else(|| {
            CompletionError::MalformedResponse(format!(
                "missing choices[0].message.content in {}",
                response
            ))
        })
}
