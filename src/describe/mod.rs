//! Image and table description via a vision LLM

mod describer;
mod prompt;

pub use describer::{DescribeContext, ElementDescriber};
pub use prompt::render_description_prompt;
