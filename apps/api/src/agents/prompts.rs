// Prompt templates for the extraction agents.
// Placeholders in `{braces}` are filled with `str::replace` before sending.

/// Resume parsing. Replace `{resume_text}`.
pub const RESUME_PARSE_PROMPT_TEMPLATE: &str = r#"Analyze the following resume and extract the key information into a JSON format.
The output must strictly be a JSON object with exactly these keys:
- "role": The primary job title or role described (e.g., "Full-Stack Engineer", "Data Scientist").
- "skills": A list of the top 5-10 technical and soft skills.
- "experience_level": One of "Entry", "Mid", "Senior", or "Executive".

{json_only}

Resume Text:
{resume_text}"#;

/// Job discovery. Replace `{role}`, `{location}`.
pub const JOB_DISCOVERY_PROMPT_TEMPLATE: &str = r#"Generate exactly 3 mock job opportunities for a {role} in {location}.
Return output as a JSON array of objects. Each object must have:
- "company_name": Fictional tech company name.
- "job_title": The specific role title.
- "contact_email": <company>@example.recruiting.com

{json_only}"#;

/// Cover letter. Replace `{role}`, `{experience_level}`, `{skills}`,
/// `{company_name}`, `{job_title}`.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a professional and hyper-personalized cover letter.
Candidate Role: {role}
Candidate Experience Level: {experience_level}
Candidate Skills: {skills}

Target Company: {company_name}
Target Job Title: {job_title}

Keep it concise, structured, and persuasive. {no_placeholders}"#;

/// Interview prep. Replace `{role}`.
pub const INTERVIEW_PREP_PROMPT_TEMPLATE: &str = r#"Generate exactly 10 tailored interview preparation questions for a {role} position.
Include a mix of technical, behavioral, and architectural questions appropriate for this role.
Format as a numbered markdown list."#;

/// Generic guide used whenever live generation is unavailable.
/// Deliberately independent of the role.
pub const INTERVIEW_PREP_FALLBACK: &str = "1. Tell me about yourself.
2. What are your greatest strengths?
3. Describe a challenging project you worked on.
4. How do you handle tight deadlines?
5. Where do you see yourself in 5 years?
6. Why do you want to work here?
7. Describe a time you disagreed with a coworker.
8. How do you stay updated with industry trends?
9. What is your preferred work environment?
10. Do you have any questions for us?";
