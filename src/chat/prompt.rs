use crate::entity::tutors;
use crate::memory::Snippet;

/// Name used for tutors saved without one.
pub const UNNAMED_TUTOR: &str = "Unknown Tutor";

pub fn tutor_display_name(tutor: &tutors::Model) -> &str {
    let name = tutor.name.trim();
    if name.is_empty() { UNNAMED_TUTOR } else { name }
}

/// Assembles the model prompt: persona, retrieved snippets, recent history, then the
/// new user message. The persona comes first so retrieved text reads as supporting
/// material rather than instructions.
pub fn build_prompt(
    tutor: &tutors::Model,
    snippets: &[Snippet],
    history: &str,
    user_prompt: &str,
) -> String {
    let relevant = snippets
        .iter()
        .map(|s| s.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are {name}, a friendly and engaging tutor. Your personality is {description}. \
         Please respond in a casual, approachable manner, as if speaking to a student you know well. \
         Here are your instructions: {instructions}\n\n\
         Relevant past information:\n{relevant}\n\n\
         Recent chat history:\n{history}\n\n\
         User: {user_prompt}",
        name = tutor_display_name(tutor),
        description = tutor.description,
        instructions = tutor.instructions,
    )
}
