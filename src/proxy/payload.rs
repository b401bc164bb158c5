//! Outbound `generateContent` payload construction

use super::request::PromptRequest;
use crate::gemini::types::{
    Content, GenerateContentRequest, GenerationConfig, HarmBlockThreshold, HarmCategory,
    SafetySetting,
};

/// Model ids containing this substring accept `thinking_level`.
pub const THINKING_MODEL_FAMILY: &str = "gemini-3";

const TEMPERATURE: f64 = 0.8;
const TOP_K: u32 = 40;
const TOP_P: f64 = 0.95;
const MAX_OUTPUT_TOKENS: u32 = 2048;

const SAFETY_CATEGORIES: [HarmCategory; 4] = [
    HarmCategory::HarmCategoryHarassment,
    HarmCategory::HarmCategoryHateSpeech,
    HarmCategory::HarmCategorySexuallyExplicit,
    HarmCategory::HarmCategoryDangerousContent,
];

pub fn supports_thinking_level(model: &str) -> bool {
    model.contains(THINKING_MODEL_FAMILY)
}

/// Build the upstream payload. Pure: the same request always yields the same
/// payload.
pub fn build_payload(request: &PromptRequest) -> GenerateContentRequest {
    let thinking_level = request
        .thinking_level
        .clone()
        .filter(|_| supports_thinking_level(&request.model));

    GenerateContentRequest {
        contents: vec![Content::text(request.prompt.clone())],
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            top_k: TOP_K,
            top_p: TOP_P,
            max_output_tokens: MAX_OUTPUT_TOKENS,
            thinking_level,
        },
        safety_settings: SAFETY_CATEGORIES
            .iter()
            .map(|&category| SafetySetting {
                category,
                threshold: HarmBlockThreshold::BlockOnlyHigh,
            })
            .collect(),
        system_instruction: request.system_prompt.clone().map(Content::text),
    }
}
