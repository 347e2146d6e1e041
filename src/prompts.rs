//! System prompts for the vision OCR engine.
//!
//! Callers can override the default via [`crate::config::BatchConfig::system_prompt`];
//! the constants here are used only when no override is provided.

/// Default system prompt for transcribing an image to plain text.
///
/// The output feeds a word counter, so the prompt asks for the visible text
/// only: no Markdown, no commentary, no invented words.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an OCR engine. Transcribe all text visible in the image.

Follow these rules precisely:

1. TEXT
   - Reproduce every word exactly as printed, including punctuation
   - Keep the reading order a human would use
   - Do NOT correct spelling or grammar

2. LAYOUT
   - Put each visual line of text on its own line
   - Separate paragraphs or blocks with one blank line
   - Read table cells row by row, separated by spaces

3. OUTPUT FORMAT
   - Output ONLY the transcribed text
   - Do NOT use Markdown formatting or code fences
   - Do NOT describe images, logos or layout
   - If the image contains no text, output nothing"#;

/// Extra instruction naming the expected language of the text.
///
/// `language` is a Tesseract-style code such as `eng` or `deu`.
pub fn language_hint(language: &str) -> String {
    format!(
        "The text is expected to be in the language with code '{}'. Do not translate it.",
        language
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_forbids_fences() {
        assert!(DEFAULT_SYSTEM_PROMPT.contains("code fences"));
    }

    #[test]
    fn hint_mentions_code() {
        assert!(language_hint("deu").contains("'deu'"));
    }
}
