//! Prompt templates for the analysis and extraction calls.
//!
//! Templates use `{placeholder}` slots filled by plain string replacement;
//! both attach the caller-supplied text verbatim.

pub const ANALYZE_SYSTEM: &str = "You are a helpful assistant for skill extraction and matching.";

pub const ANALYZE_PROMPT_TEMPLATE: &str = "\
Given the following resume and job description, extract:

- resumeSkills: All technical and soft skills found in the resume (as a JSON array).
- jobSkills: All skills required by the job description (as a JSON array).
- matchedSkills: Skills from jobSkills that are present in resumeSkills (as a JSON array).
- missingSkills: Skills from jobSkills that are NOT present in resumeSkills (as a JSON array).
- matchPercentage: Percentage of jobSkills present in resumeSkills (as a number between 0 and 100).

Return your answer as a single JSON object with these properties.

Resume:
{resume_text}

Job Description:
{jd_text}";

pub const EXTRACT_SYSTEM: &str = "You are a helpful assistant for skill extraction.";

pub const EXTRACT_PROMPT_TEMPLATE: &str = "\
Extract all technical and soft skills from the following text. \
Return the result as a JSON array of skill names.

Text:
{text}";

pub fn build_analyze_prompt(resume_text: &str, jd_text: &str) -> String {
    ANALYZE_PROMPT_TEMPLATE
        .replace("{resume_text}", resume_text)
        .replace("{jd_text}", jd_text)
}

pub fn build_extract_prompt(text: &str) -> String {
    EXTRACT_PROMPT_TEMPLATE.replace("{text}", text)
}
