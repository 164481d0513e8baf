// Prompt template for the résumé rewrite.
// The template is fixed; only the two bodies are substituted.

/// Résumé optimization prompt. Replace `{jd_text}` and `{resume_text}` before sending.
pub const OPTIMIZE_PROMPT_TEMPLATE: &str = "
You are a resume optimization assistant. I am applying for the following job role:

JOB DESCRIPTION:
{jd_text}

Here is my current resume:
{resume_text}

Please rewrite my resume to better match the job description using appropriate keywords, \
phrasing, and skills. Ensure it is still truthful and reflects the resume structure \
(Summary, Work Experience, Education, Skills, and Certifications). \
Keep the output as plain text resume content.
";

/// Fills the optimization template.
///
/// The job description is substituted first so that a résumé containing the
/// literal text `{jd_text}` is left untouched.
pub fn build_optimize_prompt(resume_text: &str, jd_text: &str) -> String {
    let (head, tail) = OPTIMIZE_PROMPT_TEMPLATE
        .split_once("{resume_text}")
        .unwrap_or((OPTIMIZE_PROMPT_TEMPLATE, ""));
    let mut prompt = head.replace("{jd_text}", jd_text);
    prompt.push_str(resume_text);
    prompt.push_str(tail);
    prompt
}
