// Prompt for the job posting × résumé analysis.
// The shared system prompt lives in llm_client::prompts.

/// Stands in for the résumé when none was uploaded or it had no extractable text.
pub const NO_RESUME_PLACEHOLDER: &str = "No resume provided.";

/// Builds the user prompt. The four `###` sections are what the client renders.
pub fn build_analysis_prompt(job_content: &str, resume_text: Option<&str>) -> String {
    let resume = resume_text
        .filter(|r| !r.trim().is_empty())
        .unwrap_or(NO_RESUME_PLACEHOLDER);

    format!(
        r#"Analyze the job posting and the current resume below.
Rate the resume by how many of the posting's key terms it already covers, then advise which keywords to add and how to reshape the resume to match the posting.

Format the entire output in Markdown.

CURRENT RESUME:
{resume}

JOB POSTING:
{job_content}

Return exactly these sections:

### 1. Core Technical Skills & Qualifications Required
Concise bullet points: programming languages, tools, frameworks, systems and certifications the posting names.

### 2. Critical Keywords & Phrases to Include
High-impact terms and acronyms an applicant tracking system (ATS) will match on.

### 3. Must-Have Experience or Background
Years of experience, domains (e.g. fintech, cloud) and project types the posting expects.

### 4. Tailoring Recommendations
* **Current Rating:** a score from 0 to 100 for how well this resume fits the posting (required).
* **Resume Sections:** which sections to emphasize or reorder (optional).
* **Bullet Points:** specific bullets to revise or add, with metrics.
* **Content to Remove:** what to downplay or drop.
"#
    )
}
