/*!
 * Tests for the generation service, prompts and token budgets
 */

use lessonforge::app_config::{GenerationCommonConfig, GenerationConfig};
use lessonforge::generation::{GenerationService, LessonPromptBuilder, PromptTemplate};
use lessonforge::providers::anthropic::MessagesRequest;
use lessonforge::providers::openai::{ChatCompletionRequest, ChatMessage};

use crate::common;

fn service_with(common: GenerationCommonConfig) -> GenerationService {
    let config = GenerationConfig {
        common,
        ..GenerationConfig::default()
    };
    GenerationService::new(config).unwrap()
}

/// Token budget: base plus per-lesson increment, capped at the ceiling
#[test]
fn test_tokenBudget_withSingleLesson_shouldUseBaseBudget() {
    let service = service_with(GenerationCommonConfig::default());
    assert_eq!(service.token_budget(1), 3000);
}

#[test]
fn test_tokenBudget_withFourLessons_shouldAddThreeIncrements() {
    let service = service_with(GenerationCommonConfig::default());
    assert_eq!(service.token_budget(4), 3000 + 3 * 1200);
}

#[test]
fn test_tokenBudget_withExcessiveLessons_shouldCapAtCeiling() {
    let service = service_with(GenerationCommonConfig::default());
    assert_eq!(service.token_budget(100), 8000);
}

#[test]
fn test_tokenBudget_withCustomLimits_shouldRespectThem() {
    let common = GenerationCommonConfig {
        base_token_budget: 500,
        tokens_per_extra_lesson: 100,
        max_token_budget: 650,
        ..GenerationCommonConfig::default()
    };
    let service = service_with(common);

    assert_eq!(service.token_budget(1), 500);
    assert_eq!(service.token_budget(2), 600);
    // Third lesson would be 700, clamped to the ceiling
    assert_eq!(service.token_budget(3), 650);
}

#[test]
fn test_promptTemplate_withAllPlaceholders_shouldSubstituteEach() {
    let template = PromptTemplate::new(
        "{subject}|{level}|{strand}|{sub_strand}|{content_standard}|{template_name}|{lesson_count}",
    );
    let rendered = template.render(&common::sample_request());
    assert_eq!(
        rendered,
        "Science|Basic 4|Diversity of Matter|Materials|B4.1.1.1|GES Standard|1"
    );
}

#[test]
fn test_lessonPromptBuilder_withRequest_shouldListCurriculumFields() {
    let prompt = LessonPromptBuilder::new(common::sample_request()).build();

    assert!(prompt.contains("Subject: Science"));
    assert!(prompt.contains("Strand: Diversity of Matter"));
    assert!(prompt.contains("Content standard: B4.1.1.1"));
    assert!(prompt.contains("Tier 1 / Tier 2 / Tier 3"));
}

/// The wire shape of an Anthropic request: system prompt at top level,
/// user content in the messages array
#[test]
fn test_messagesRequest_serialization_shouldMatchWireShape() {
    let request = MessagesRequest::new("claude-3-haiku", 4096)
        .system("You are a teacher")
        .user("Write the note")
        .temperature(0.7);

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["model"], "claude-3-haiku");
    assert_eq!(value["max_tokens"], 4096);
    assert_eq!(value["system"], "You are a teacher");
    assert_eq!(value["messages"][0]["role"], "user");
    assert_eq!(value["messages"][0]["content"], "Write the note");
}

/// Optional fields are omitted, not serialized as null
#[test]
fn test_messagesRequest_withoutSystem_shouldOmitField() {
    let request = MessagesRequest::new("claude-3-haiku", 100).user("hi");
    let value = serde_json::to_value(&request).unwrap();
    assert!(value.get("system").is_none());
    assert!(value.get("temperature").is_none());
}

#[test]
fn test_chatCompletionRequest_serialization_shouldCarryMessagesInOrder() {
    let request = ChatCompletionRequest::new("gpt-4o-mini")
        .message(ChatMessage::system("sys"))
        .message(ChatMessage::user("usr"))
        .max_tokens(256);

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["model"], "gpt-4o-mini");
    assert_eq!(value["messages"][0]["role"], "system");
    assert_eq!(value["messages"][1]["role"], "user");
    assert_eq!(value["max_tokens"], 256);
}
