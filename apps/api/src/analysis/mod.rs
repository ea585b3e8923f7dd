// Job posting × résumé analysis.
// Fetches the posting, extracts résumé text, and streams the model's Markdown back.
// All LLM calls go through llm_client, never a provider directly.

pub mod handlers;
pub mod job_posting;
pub mod prompts;
pub mod resume;

/// Trims every line and drops the blank ones.
pub fn non_empty_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
