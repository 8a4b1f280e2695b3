//! Prompt builders for the AI endpoints.
//!
//! Each function assembles the user message for one workflow step from
//! pre-gathered context sections. The matching system prompt comes from
//! the `system_prompt` setting.

/// Legacy single-shot chapter generation.
pub fn generate_chapter(
    catalog: &str,
    chapter_list: &str,
    previous_chapter: &str,
    brief: &str,
) -> String {
    format!(
        "STORY BIBLE:\n{catalog}\n\n\
         CHAPTERS SO FAR:\n{chapter_list}\n\n\
         MOST RECENT CHAPTER:\n{previous_chapter}\n\n\
         Write the next chapter. Direction from the author:\n{brief}\n\n\
         Respond with the chapter prose in markdown. Do not include any \
         commentary outside the chapter itself."
    )
}

/// Continuity summary plus relevance selection for an upcoming chapter.
pub fn smart_context(
    catalog: &str,
    chapter_list: &str,
    previous_chapter: &str,
    chapter_brief: &str,
) -> String {
    format!(
        "STORY BIBLE CATALOG:\n{catalog}\n\n\
         CHAPTERS SO FAR:\n{chapter_list}\n\n\
         MOST RECENT CHAPTER:\n{previous_chapter}\n\n\
         The author wants to write a chapter described as:\n{chapter_brief}\n\n\
         Analyze the story so far and respond with ONLY a JSON object:\n\
         {{\n\
           \"story_so_far\": \"a continuity summary of events and open threads\",\n\
           \"relevant_elements\": [\"names of existing bible elements needed for this chapter\"],\n\
           \"suggested_new_elements\": [{{\"name\": \"...\", \"type\": \"character|location|arc\", \"reason\": \"...\"}}]\n\
         }}"
    )
}

/// Chapter outline, optionally revising a prior outline against author
/// comments.
pub fn outline(
    smart_context: &str,
    chapter_brief: &str,
    current_outline: Option<&str>,
    comments: Option<&str>,
) -> String {
    match (current_outline, comments) {
        (Some(outline), Some(comments)) => format!(
            "CONTEXT:\n{smart_context}\n\n\
             CHAPTER BRIEF:\n{chapter_brief}\n\n\
             CURRENT OUTLINE:\n{outline}\n\n\
             The author commented:\n{comments}\n\n\
             Revise the outline to address the comments. Respond with the \
             full revised outline in markdown, nothing else."
        ),
        _ => format!(
            "CONTEXT:\n{smart_context}\n\n\
             CHAPTER BRIEF:\n{chapter_brief}\n\n\
             Produce a beat-by-beat outline for this chapter in markdown. \
             Respond with the outline only."
        ),
    }
}

/// Full chapter prose from an approved outline, optionally rewriting a
/// prior draft against author comments.
pub fn write_chapter(
    smart_context: &str,
    relevant_content: &str,
    previous_chapter: &str,
    outline: &str,
    current_content: Option<&str>,
    comments: Option<&str>,
) -> String {
    let base = format!(
        "CONTEXT:\n{smart_context}\n\n\
         RELEVANT BIBLE ELEMENTS:\n{relevant_content}\n\n\
         MOST RECENT CHAPTER:\n{previous_chapter}\n\n\
         OUTLINE:\n{outline}\n\n"
    );
    match (current_content, comments) {
        (Some(draft), Some(comments)) => format!(
            "{base}CURRENT DRAFT:\n{draft}\n\n\
             The author commented:\n{comments}\n\n\
             Rewrite the chapter to address the comments while following \
             the outline. Respond with the complete chapter in markdown."
        ),
        _ => format!(
            "{base}Write the chapter following the outline. Respond with \
             the complete chapter in markdown, no commentary."
        ),
    }
}

/// Relevance analysis for a new or revised bible element.
pub fn analyze_brief(catalog: &str, element_type: &str, user_brief: &str) -> String {
    format!(
        "STORY BIBLE CATALOG:\n{catalog}\n\n\
         The author wants to create a {element_type} described as:\n{user_brief}\n\n\
         Respond with ONLY a JSON object:\n\
         {{\n\
           \"relevant_elements\": [\"names of existing elements this {element_type} should connect to\"],\n\
           \"reasoning\": \"one short paragraph explaining the selection\"\n\
         }}"
    )
}

/// Structured proposal for a bible element, shaped by the type's schema
/// fields.
pub fn propose_element(
    element_type: &str,
    user_brief: &str,
    relevant_content: &str,
    schema_fields: &str,
) -> String {
    format!(
        "RELEVANT BIBLE ELEMENTS:\n{relevant_content}\n\n\
         The author wants a {element_type} described as:\n{user_brief}\n\n\
         The {element_type} schema declares these fields:\n{schema_fields}\n\n\
         Respond with ONLY a JSON object:\n\
         {{\n\
           \"name\": \"the element's name\",\n\
           \"type\": \"{element_type}\",\n\
           \"content\": {{ \"description\": \"...\", plus a value for each declared field }}\n\
         }}"
    )
}
