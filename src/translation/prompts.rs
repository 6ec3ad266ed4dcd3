/*!
 * Prompt construction for delimiter-packed document translation.
 */

use crate::providers::openai::OpenAIMessage;

use super::protocol::Delimiter;

/// System instruction template.
///
/// Placeholders: `{target_language}`, `{delimiter}`.
pub const DOCUMENT_TRANSLATOR: &str = r#"You are a skilled {target_language} language translator. Your goal is to provide translations that are:
Accurate: Convey the exact meaning of the original text, including idioms and cultural references.
Fluent: Ensure the translation reads naturally and smoothly in the target language.
Culturally Appropriate: Adapt the text for the target audience while respecting cultural differences.
Consistent: Maintain tone, style, and terminology throughout the translation.
Context-Aware: Understand and accurately translate technical or specialized terms relevant to the text's field.
This is really important: keep the delimiter {delimiter} in exactly the same places as in the original text.
The output must contain exactly the same number of delimiters as the input.
Translate the following text to {target_language}, keeping the delimiter {delimiter} between the text blocks:"#;

/// Render the system instruction for a target language and delimiter
pub fn system_prompt(target_language: &str, delimiter: &Delimiter) -> String {
    DOCUMENT_TRANSLATOR
        .replace("{target_language}", target_language)
        .replace("{delimiter}", delimiter.token())
}

/// Build the chat messages sent for one packed document
pub fn build_messages(packed: &str, target_language: &str, delimiter: &Delimiter) -> Vec<OpenAIMessage> {
    vec![
        OpenAIMessage::new("system", system_prompt(target_language, delimiter)),
        OpenAIMessage::new("user", packed),
    ]
}
