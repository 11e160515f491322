use serde::{Deserialize, Serialize};

// Proxy request format
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    // history is assembled client-side; accepted for compatibility only
    #[serde(default)]
    pub include_history: bool,
}

// Proxy success format
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProxyResponse {
    pub success: bool,
    pub response: String,
    pub usage: Usage,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Usage {
    pub remaining: u32,
    pub limit: u32,
}

impl ProxyResponse {
    pub fn new(response: String, remaining: u32, limit: u32) -> Self {
        Self {
            success: true,
            response,
            usage: Usage { remaining, limit },
        }
    }
}

// Proxy error format, every failure carries at least `error`
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_time: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// Gemini generateContent request format
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// A single user turn whose only part is `prompt`.
    pub fn single_turn(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// Gemini generateContent response format (only the fields we read)
#[derive(Deserialize, Debug, Clone, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_request_accepts_camel_case_history_flag() {
        let req: PromptRequest =
            serde_json::from_value(json!({"prompt": "plan Kyoto", "includeHistory": true})).unwrap();
        assert_eq!(req.prompt.as_deref(), Some("plan Kyoto"));
        assert!(req.include_history);

        let empty: PromptRequest = serde_json::from_value(json!({})).unwrap();
        assert!(empty.prompt.is_none());
        assert!(!empty.include_history);
    }

    #[test]
    fn single_turn_envelope_shape() {
        let body = serde_json::to_value(GenerateContentRequest::single_turn("hi")).unwrap();
        assert_eq!(body, json!({"contents": [{"parts": [{"text": "hi"}]}]}));
    }

    #[test]
    fn first_text_reads_first_candidate_part() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "first"}, {"text": "second"}]}, "finishReason": "STOP"},
                {"content": {"parts": [{"text": "other"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(resp.first_text(), Some("first"));
        assert_eq!(resp.candidates[0].finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn first_text_missing_shapes() {
        for raw in [
            json!({}),
            json!({"candidates": []}),
            json!({"candidates": [{"finishReason": "SAFETY"}]}),
            json!({"candidates": [{"content": {"parts": []}}]}),
            json!({"candidates": [{"content": {"parts": [{"inlineData": {}}]}}]}),
        ] {
            let resp: GenerateContentResponse = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(resp.first_text(), None, "{raw}");
        }
    }

    #[test]
    fn error_body_skips_absent_fields() {
        let body = serde_json::to_value(ErrorBody::new("Method not allowed")).unwrap();
        assert_eq!(body, json!({"error": "Method not allowed"}));

        let body = ErrorBody {
            reset_time: Some("2026-10-19T00:00:00.000Z".into()),
            ..ErrorBody::new("limited").with_message("50 per day")
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"error": "limited", "message": "50 per day", "resetTime": "2026-10-19T00:00:00.000Z"})
        );
    }
}
