use crate::error::Result;
use crate::generator::TextGenerator;

pub const SUMMARY_INSTRUCTION: &str = "Summarize the simulation loop:";

pub fn summary_prompt(log: &str) -> String {
    format!("{}\n\n{}", SUMMARY_INSTRUCTION, log)
}

/// Asks the default backend for a narrative summary of a simulation log.
pub fn summarize_simulation(generator: &TextGenerator, log: &str) -> Result<String> {
    generator.generate(&summary_prompt(log))
}
