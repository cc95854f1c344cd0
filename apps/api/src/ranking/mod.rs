pub mod aggregate;
pub mod criteria;
pub mod handlers;
pub mod prompts;
pub mod scoring;
