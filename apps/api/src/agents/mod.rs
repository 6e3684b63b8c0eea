// Structured extraction agents.
// Each pairs a prompt template with a typed fallback and calls the gateway;
// none of them talks to the provider directly.

pub mod cover_letter;
pub mod decode;
pub mod interview_prep;
pub mod job_discovery;
pub mod prompts;
pub mod resume_parser;
