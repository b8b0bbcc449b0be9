// All LLM prompt constants for the generation pipeline. Templates are filled
// with `.replace` before sanitation; placeholders never reach a provider.

/// Final cover-letter prompt. Replace `{cv_text}` and `{job_description}`
/// before sending.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = "\
    Write a creative cover letter based on this CV: {cv_text} \
    and the following job description: {job_description} \
    Weave recurring themes from the CV into the letter instead of restating it line by line. \
    Address the hiring manager directly, keep it to one page, and close with a short call to action. \
    Return only the letter text.";

/// CV summarization pass. Replace `{cv_text}` before sending.
pub const CV_SUMMARY_PROMPT_TEMPLATE: &str = "\
    Summarise the following CV into a short professional profile covering skills, \
    experience, and notable achievements. Keep every concrete fact; drop formatting \
    and boilerplate. CV: {cv_text}";

/// Job-description summarization pass. Replace `{job_description}` before sending.
pub const JOB_SUMMARY_PROMPT_TEMPLATE: &str = "\
    Summarise the following job description into its core responsibilities, required \
    skills, and company context, in a few short sentences. \
    Job description: {job_description}";
