/// Google Gemini `generateContent`

use serde::{Deserialize, Serialize};
use url::Url;

use super::{HttpRequest, ProviderAdapter, decode_envelope};
use crate::error::ClassifyError;
use crate::settings::ProviderConfig;

pub struct GeminiAdapter;

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl ProviderAdapter for GeminiAdapter {
    fn build_request(&self, prompt: &str, config: &ProviderConfig) -> Result<HttpRequest, ClassifyError> {
        // The key travels in the query string, not a header
        let raw = format!("{}/{}:generateContent", config.normalized_endpoint(), config.model);
        let mut url = Url::parse(&raw)
            .map_err(|e| ClassifyError::config(format!("Invalid API endpoint \"{}\": {}", raw, e)))?;
        url.query_pairs_mut().append_pair("key", config.api_key());

        let body = GenerateContentRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        Ok(HttpRequest {
            url: url.to_string(),
            headers: vec![("Content-Type", "application/json".to_string())],
            body: serde_json::to_string(&body)
                .map_err(|e| ClassifyError::provider(format!("Failed to encode request: {}", e)))?,
        })
    }

    fn extract_text(&self, body: &str) -> Result<String, ClassifyError> {
        let response: GenerateContentResponse = decode_envelope(body, "Gemini")?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| ClassifyError::provider("Gemini response has no candidates[0].content.parts[0].text"))
    }
}
