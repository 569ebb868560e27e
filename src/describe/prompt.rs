//! Prompt templates for image description

/// Template when the element's detected language is English
const PROMPT_ENGLISH: &str = "Please help me analyze this picture and extract its content and features. \
Identify the main objects and scenes in the diagram. \
Extract the text information in the image (if any). \
Please analyze and summarize the main content expressed by the image. \
Note, please return the corresponding language according to the language of the picture (this picture is in English)
Some information known about this picture is: {{rawText}}";

/// Template for any other (or unknown) language
const PROMPT_DEFAULT: &str = "Please help me analyze this picture and extract its content and features. \
Identify the main objects and scenes in the diagram. \
Extract the text information in the image (if any). \
Please analyze and summarize the main content expressed by the image. \
Note, please reply in the same language as the picture (an English picture gets an English reply, and so on)
Some information known about this picture is: {{rawText}}";

/// Render the description prompt for an element, interpolating its original
/// text into the template selected by detected language.
pub fn render_description_prompt(language: Option<&str>, raw_text: &str) -> String {
    let template = match language {
        Some("eng") => PROMPT_ENGLISH,
        _ => PROMPT_DEFAULT,
    };
    template.replace("{{rawText}}", raw_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_language_selects_english_template() {
        let prompt = render_description_prompt(Some("eng"), "Figure 3: throughput");
        assert!(prompt.contains("this picture is in English"));
        assert!(prompt.ends_with("Some information known about this picture is: Figure 3: throughput"));
    }

    #[test]
    fn other_languages_fall_back_to_default_template() {
        for language in [None, Some("fra"), Some("deu")] {
            let prompt = render_description_prompt(language, "tableau");
            assert!(prompt.contains("same language as the picture"));
            assert!(prompt.contains("tableau"));
        }
    }
}
