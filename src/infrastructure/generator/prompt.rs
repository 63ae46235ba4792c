use crate::domain::LayoutKind;

/// Build the generation prompt for a topic
///
/// The same topic and slide count always produce the same prompt.
pub fn build_prompt(topic: &str, num_slides: u32) -> String {
    let citations = if num_slides > 1 {
        format!(
            "- The last slide (slide {n}) must use the \"{bullets}\" layout and list the sources \
             used for the presentation as citations.\n",
            n = num_slides,
            bullets = LayoutKind::BulletList.hint(),
        )
    } else {
        String::new()
    };

    format!(
        r#"Generate a presentation about "{topic}".
The presentation must have exactly {num_slides} slides.

Provide the output as a single, valid JSON object. Do not include any text, introductory phrases, or markdown formatting like ```json before or after the JSON object.
The entire response must be only the JSON content. Pay close attention to syntax, especially commas between objects in lists.

CONTENT RULES:
- Each bullet point or definition should be descriptive and detailed, ideally between 15 and 20 words long.
- You can use markdown for emphasis. Use **double asterisks** for bold and __double underscores__ for underline.
- Provide bullet points as a list of strings without any leading characters like '*' or '-'.
- The first slide must use the "{title}" layout.
{citations}
The JSON object must have a single key "slides", which is a list of exactly {num_slides} slide objects.
Each slide object must have two keys: "layout" and "content".

The "layout" key must be one of the following strings:
1. "{title}"
2. "{bullets}"
3. "{two_column}"

The "content" key must be an object with the following structure based on layout:
- For "{title}": {{"title": "...", "subtitle": "..."}}
- For "{bullets}": {{"title": "...", "points": ["...", "..."]}}
- For "{two_column}": {{"title": "...", "left_column": {{"heading": "...", "points": ["...", "..."]}}, "right_column": {{"heading": "...", "points": ["...", "..."]}}}}

Now, generate the complete JSON for the presentation on "{topic}"."#,
        topic = topic,
        num_slides = num_slides,
        citations = citations,
        title = LayoutKind::Title.hint(),
        bullets = LayoutKind::BulletList.hint(),
        two_column = LayoutKind::TwoColumn.hint(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(build_prompt("Mars", 5), build_prompt("Mars", 5));
        assert_ne!(build_prompt("Mars", 5), build_prompt("Mars", 6));
    }

    #[test]
    fn test_prompt_names_topic_count_and_layouts() {
        let prompt = build_prompt("Saturn's Rings", 3);

        assert!(prompt.contains("\"Saturn's Rings\""));
        assert!(prompt.contains("exactly 3 slides"));
        assert!(prompt.contains("\"title_slide\""));
        assert!(prompt.contains("\"bullet_points\""));
        assert!(prompt.contains("\"two_column\""));
        assert!(prompt.contains("**double asterisks**"));
        assert!(prompt.contains("__double underscores__"));
    }

    #[test]
    fn test_single_slide_prompt_has_no_citation_slide() {
        assert!(build_prompt("Mars", 3).contains("citations"));
        assert!(!build_prompt("Mars", 1).contains("citations"));
    }

    #[test]
    fn test_content_shapes_are_valid_braces() {
        let prompt = build_prompt("Mars", 2);
        assert!(prompt.contains(r#"{"title": "...", "subtitle": "..."}"#));
        assert!(prompt.contains(r#""right_column": {"heading": "...", "points": ["...", "..."]}}"#));
    }
}
