//! Prompt building for quiz generation.
//!
//! The system instruction fixes the question count, the language and the
//! code fence placeholder; the response schema constrains structured output
//! to the quiz shape the decoder expects.

use serde_json::{json, Value as JsonValue};

use recap_core::defaults::{CODE_FENCE_PLACEHOLDER, FREE_ANSWER, MULTIPLE_CHOICE};

/// System instruction for a quiz request.
pub fn system_instruction(number_of_questions: u32, language: &str) -> String {
    let noun = if number_of_questions == 1 {
        "question"
    } else {
        "questions"
    };
    format!(
        "You are a quiz generator. Create a quiz with exactly {count} {noun} about the content \
the user provides: their prompt, any attached images, and the text that follows \
\"Attached Website Content:\". Write the title, every question, every option and every \
answer in {language}.\n\
Use the question type \"{mc}\" with several options where exactly one is marked correct, \
or \"{free}\" with a short model answer in \"answer\".\n\
Markdown is allowed. Never write three backticks; write {fence} wherever a code fence \
would begin or end.\n\
Respond only with a JSON object of the form {{\"quiz_title\": string, \"questions\": \
[{{\"question\": string, \"type\": \"{mc}\" | \"{free}\", \"options\": [{{\"text\": string, \
\"correct\": boolean}}], \"answer\": string}}]}}.",
        count = number_of_questions,
        noun = noun,
        language = language,
        mc = MULTIPLE_CHOICE,
        free = FREE_ANSWER,
        fence = CODE_FENCE_PLACEHOLDER,
    )
}

/// Response schema for structured quiz output.
pub fn quiz_response_schema() -> JsonValue {
    json!({
        "type": "OBJECT",
        "properties": {
            "quiz_title": {"type": "STRING"},
            "questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": {"type": "STRING"},
                        "type": {
                            "type": "STRING",
                            "enum": [MULTIPLE_CHOICE, FREE_ANSWER]
                        },
                        "options": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "text": {"type": "STRING"},
                                    "correct": {"type": "BOOLEAN"}
                                },
                                "required": ["text", "correct"]
                            }
                        },
                        "answer": {"type": "STRING"}
                    },
                    "required": ["question", "type"],
                    "propertyOrdering": ["question", "type", "options", "answer"]
                }
            }
        },
        "required": ["quiz_title", "questions"],
        "propertyOrdering": ["quiz_title", "questions"]
    })
}
