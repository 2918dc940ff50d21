// All LLM prompt templates for the generation pipeline.
// Placeholders use `{{NAME}}` and are resolved by `pipeline::prompt`.

/// JD extraction prompt. Placeholders: `JOB_DESCRIPTION`.
pub const PARSE_JD: &str = r#"You are an expert job description analyst.

Parse the job description below and extract structured information.

Respond with valid JSON only. Do NOT include any text outside the JSON object.

Return a JSON object with this EXACT schema (no extra fields):
{
  "metadata": {
    "company": "Acme Corp",
    "listing_job_title": "Senior Backend Engineer",
    "role": "Software Engineer",
    "specialization": "Backend",
    "level": "Senior",
    "location": "Seattle, WA",
    "work_setting": "Remote",
    "min_experience_years": 5,
    "min_salary": 150000,
    "max_salary": 200000
  },
  "requirements": [
    {
      "text": "5+ years building distributed systems",
      "keywords": ["distributed systems"],
      "relevance": 0.9
    }
  ]
}

Rules:
- "role" must be exactly one of: "Software Engineer", "Data Engineer",
  "Data Analyst", "Analytics Engineer", "Business Analyst",
  "Business Intelligence Engineer".
- "level" must be exactly one of: "I", "II", "III", "Senior".
- "work_setting" must be exactly one of: "On-site", "Hybrid", "Remote".
- "specialization", "location", "min_experience_years", "min_salary" and
  "max_salary" may be null when the posting does not state them.
- "relevance" is a score in [0, 1] for how central the requirement is to the
  role. Order requirements from most to least relevant.
- "keywords" lists the concrete technologies or skills named by the
  requirement; use an empty list for purely behavioral requirements.

Job description:

{{JOB_DESCRIPTION}}"#;

/// Experience-bullet generation prompt.
/// Placeholders: `MAX_BULLET_COUNT`, `TARGET_ROLE`, `REQUIREMENTS`,
/// `EXPERIENCE_PROJECTS`.
pub const GENERATE_EXPERIENCE_BULLETS: &str = r#"You are an expert resume writer for {{TARGET_ROLE}} positions.

Write at most {{MAX_BULLET_COUNT}} resume bullets for one past role, drawing
ONLY on the project material below. Never invent projects, tools, or metrics
that the material does not support.

Respond with valid JSON only. Do NOT include any text outside the JSON.

Return a JSON object with this EXACT schema (no extra fields):
{
  "bullets": [
    {"order": 1, "text": "Rebuilt the ingestion pipeline in Rust, cutting p99 latency from 900ms to 120ms"}
  ]
}

Rules:
- "order" ranks bullets by priority, starting at 1.
- Each "text" is a single achievement statement of 20 to 500 characters,
  leading with an action verb and ending with a measurable outcome where the
  material provides one.
- Prefer bullets that address the highest-relevance requirements.

Job requirements (most relevant first):
{{REQUIREMENTS}}

Project material for this role:
{{EXPERIENCE_PROJECTS}}"#;

/// Skill-category generation prompt.
/// Placeholders: `MAX_CATEGORY_COUNT`, `TARGET_ROLE`, `REQUIREMENTS`,
/// `TOOL_VOCABULARY`.
pub const GENERATE_SKILLS: &str = r#"You are an expert resume writer for {{TARGET_ROLE}} positions.

Group the candidate's tools and technologies into at most
{{MAX_CATEGORY_COUNT}} skill categories, drawing ONLY on the vocabulary below.
Never list a skill that does not appear in the vocabulary.

Respond with valid JSON only. Do NOT include any text outside the JSON.

Return a JSON object with this EXACT schema (no extra fields):
{
  "skill_categories": [
    {"order": 1, "category": "Programming Languages", "skills": "Rust, Python, SQL"}
  ]
}

Rules:
- "order" ranks categories by priority, starting at 1.
- "category" is a short label of 3 to 100 characters.
- "skills" is a comma-separated list, 2 to 500 characters.
- Put skills that match job keywords in the highest-priority categories.

Job keywords:
{{REQUIREMENTS}}

Candidate tool vocabulary:
{{TOOL_VOCABULARY}}"#;

/// Base interview-preparation prompt.
/// Placeholders: `JOB_DESCRIPTION`, `RESUME`.
pub const GENERATE_INTERVIEW_PREP: &str = r#"You are preparing a candidate for interviews at a company they applied to.

Using the job description and the candidate's resume below, write base
preparation material the candidate will study before every interview in the
process.

Respond with valid JSON only. Do NOT include any text outside the JSON.

Return a JSON object with this EXACT schema (no extra fields):
{
  "formatted_jd": "...",
  "company_context": "...",
  "primary_drivers": "...",
  "background_narrative": "..."
}

Rules:
- Each field is markdown text.
- "formatted_jd" restructures the job description into concise sections
  (responsibilities, requirements, signals of what the team values).
- "company_context" summarizes what the company does and why this role exists.
- "primary_drivers" lists the 3-5 strengths in the resume most likely to have
  driven the callback, each tied to a specific requirement.
- "background_narrative" is a first-person "walk me through your background"
  answer built strictly from the resume content.

Job description:
{{JOB_DESCRIPTION}}

Candidate resume:
{{RESUME}}"#;

/// Match evaluation prompt.
/// Placeholders: `REQUIREMENTS`, `RESUME_SKILLS`.
pub const EVALUATE_MATCH: &str = r#"You are evaluating how well a resume's skill set covers a job's requirements.

Respond with valid JSON only. Do NOT include any text outside the JSON.

Return a JSON object with this EXACT schema (no extra fields):
{
  "unmet_requirements": "Kubernetes, Terraform",
  "match_ratio": 0.75
}

Rules:
- A requirement is MET when the resume skills cover its keywords, directly or
  through a clearly equivalent technology.
- "unmet_requirements" is a comma-separated list of the keywords from unmet
  requirements; use an empty string when everything is covered.
- "match_ratio" is (met requirements / total requirements), in [0, 1].

Job requirements (numbered, with keywords):
{{REQUIREMENTS}}

Resume skills:
{{RESUME_SKILLS}}"#;
