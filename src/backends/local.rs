use super::LLMBackend;
use crate::error::{BackendError, Result};

use candle_core::quantized::gguf_file;
use candle_core::{Device, Tensor};
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::quantized_qwen3::ModelWeights as Qwen3;
use hf_hub::api::sync::Api;
use std::sync::Mutex;
use tokenizers::Tokenizer;
use tracing::{debug, info};

pub const RESPONSE_MARKER: &str = "### Response:";
pub const INSTRUCTION_MARKER: &str = "### Instruction:";

const CONTEXT_LIMIT: usize = 32_000;
const EOS_TOKENS: [&str; 2] = ["<|endoftext|>", "<|im_end|>"];

#[derive(Clone, Debug)]
pub struct LocalConfig {
    pub model_repo: String,
    pub model_file: String,
    pub tokenizer_repo: String,
    pub temperature: f64,
    pub top_p: f64,
    /// Tokens allowed on top of the prompt's character count.
    pub extra_tokens: usize,
    /// Fixed sampling seed. `None` draws a fresh seed on every load.
    pub seed: Option<u64>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            model_repo: "unsloth/Qwen3-0.6B-GGUF".to_string(),
            model_file: "Qwen3-0.6B-Q4_K_M.gguf".to_string(),
            tokenizer_repo: "Qwen/Qwen3-0.6B".to_string(),
            temperature: 0.7,
            top_p: 0.95,
            extra_tokens: 128,
            seed: None,
        }
    }
}

impl LocalConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_extra_tokens(mut self, extra_tokens: usize) -> Self {
        self.extra_tokens = extra_tokens;
        self
    }
}

/// Strips the instruction framing a local model tends to echo around its answer.
///
/// Only the block between the first `### Response:` and the next one is kept,
/// then anything from the first `### Instruction:` onwards is dropped. Output
/// without markers is only trimmed.
pub fn trim_instruction_echo(raw: &str) -> &str {
    let mut out = raw;
    if let Some((_, after)) = out.split_once(RESPONSE_MARKER) {
        out = after.split(RESPONSE_MARKER).next().unwrap_or(after);
    }
    if let Some((before, _)) = out.split_once(INSTRUCTION_MARKER) {
        out = before;
    }
    out.trim()
}

/// Joins prompt and continuation the way a text-generation pipeline reports
/// them, then strips the echoed framing.
pub fn shape_output(prompt: &str, continuation: &str) -> String {
    let full = format!("{}{}", prompt, continuation);
    trim_instruction_echo(&full).to_string()
}

/// Number of new tokens left once the prompt has used its share of
/// `prompt_chars + extra` total tokens.
pub fn generation_budget(prompt_chars: usize, prompt_tokens: usize, extra: usize) -> usize {
    (prompt_chars + extra).saturating_sub(prompt_tokens)
}

struct Engine {
    model: Qwen3,
    tokenizer: Tokenizer,
    logits_processor: LogitsProcessor,
    device: Device,
    eos_ids: Vec<u32>,
}

/// A quantized model running in-process.
///
/// Built once through [`LocalBackend::load`]; weights are freed when the
/// backend is dropped. Inference is serialized through an internal lock.
pub struct LocalBackend {
    engine: Mutex<Engine>,
    config: LocalConfig,
}

impl LocalBackend {
    pub fn load(config: LocalConfig) -> Result<Self> {
        let engine = Self::load_engine(&config)?;
        Ok(Self {
            engine: Mutex::new(engine),
            config,
        })
    }

    fn load_engine(config: &LocalConfig) -> std::result::Result<Engine, BackendError> {
        let device = Device::cuda_if_available(0)?;
        let api = Api::new()?;

        //tokenizer
        let tokenizer_path = api
            .model(config.tokenizer_repo.clone())
            .get("tokenizer.json")?;
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| BackendError::Tokenizer(e.to_string()))?;

        //model
        let model_path = api.model(config.model_repo.clone()).get(&config.model_file)?;
        let mut file = std::fs::File::open(&model_path)?;
        let content = gguf_file::Content::read(&mut file)?;
        let model = Qwen3::from_gguf(content, &mut file, &device)?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let logits_processor =
            LogitsProcessor::new(seed, Some(config.temperature), Some(config.top_p));

        let eos_ids = EOS_TOKENS
            .iter()
            .filter_map(|t| tokenizer.token_to_id(t))
            .collect();

        info!(
            repo = %config.model_repo,
            file = %config.model_file,
            device = ?device,
            "local model loaded"
        );

        Ok(Engine {
            model,
            tokenizer,
            logits_processor,
            device,
            eos_ids,
        })
    }

    pub fn config(&self) -> &LocalConfig {
        &self.config
    }
}

impl Engine {
    fn continue_text(
        &mut self,
        prompt: &str,
        extra_tokens: usize,
    ) -> std::result::Result<String, BackendError> {
        self.model.clear_kv_cache();

        let tokens = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| BackendError::Tokenizer(e.to_string()))?;
        let tokens = tokens.get_ids().to_vec();

        if tokens.len() > CONTEXT_LIMIT {
            return Err(BackendError::ContextLimitExceeded {
                limit: CONTEXT_LIMIT,
                current: tokens.len(),
            });
        }

        let budget = generation_budget(prompt.chars().count(), tokens.len(), extra_tokens);
        if budget == 0 || tokens.is_empty() {
            return Ok(String::new());
        }
        let mut generated_tokens = Vec::with_capacity(budget);

        let mut input = Tensor::new(tokens.as_slice(), &self.device)?.unsqueeze(0)?;
        let mut pos = 0;

        for _ in 0..budget {
            let logits = self.model.forward(&input, pos)?;
            let logits = logits.squeeze(0)?;
            let next_token = self.logits_processor.sample(&logits)?;

            if self.eos_ids.contains(&next_token) {
                break;
            }
            generated_tokens.push(next_token);

            let (_b, seq_len) = input.dims2()?;
            pos += seq_len;
            input = Tensor::new(&[next_token], &self.device)?.unsqueeze(0)?;
        }

        self.tokenizer
            .decode(&generated_tokens, true)
            .map_err(|e| BackendError::Tokenizer(e.to_string()))
    }
}

impl LLMBackend for LocalBackend {
    fn complete(&self, prompt: &str) -> Result<String> {
        // decoding state is per-engine; one request at a time
        let mut engine = self
            .engine
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let continuation = engine.continue_text(prompt, self.config.extra_tokens)?;
        debug!(
            generated_chars = continuation.chars().count(),
            "local completion"
        );

        Ok(shape_output(prompt, &continuation))
    }
}

impl Drop for LocalBackend {
    fn drop(&mut self) {
        debug!(repo = %self.config.model_repo, "releasing local model");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_answer_between_markers() {
        let raw = "Tell me a story\n### Response:  Once upon a time.\n### Instruction: more";
        assert_eq!(trim_instruction_echo(raw), "Once upon a time.");
    }

    #[test]
    fn output_without_markers_is_only_trimmed() {
        assert_eq!(trim_instruction_echo("  plain text\n"), "plain text");
    }

    #[test]
    fn instruction_marker_alone_cuts_the_tail() {
        assert_eq!(
            trim_instruction_echo("answer first ### Instruction: echoed"),
            "answer first"
        );
    }

    #[test]
    fn repeated_response_block_is_dropped() {
        let raw = "x ### Response: a ### Response: b";
        assert_eq!(trim_instruction_echo(raw), "a");
    }

    #[test]
    fn answer_ends_at_whichever_marker_comes_first() {
        let raw = "q ### Response: a ### Instruction: i ### Response: b";
        assert_eq!(trim_instruction_echo(raw), "a");
        let raw = "q ### Response: a ### Response: b ### Instruction: i";
        assert_eq!(trim_instruction_echo(raw), "a");
    }

    #[test]
    fn shaped_output_drops_the_echoed_prompt() {
        let prompt = "### Instruction:\nRate the inn.\n\n### Response:\n";
        assert_eq!(shape_output(prompt, " 7 out of 10\n### Instruction: again"), "7 out of 10");
    }

    #[test]
    fn shaped_output_without_markers_keeps_prompt_and_continuation() {
        assert_eq!(
            shape_output("Once upon a time", ", a fox ran.  "),
            "Once upon a time, a fox ran."
        );
    }

    #[test]
    fn empty_continuation_after_response_marker_is_empty() {
        assert_eq!(shape_output("Q\n### Response:", ""), "");
    }

    #[test]
    fn instruction_before_response_is_discarded_with_the_preamble() {
        let raw = "### Instruction: do it\n### Response: done";
        assert_eq!(trim_instruction_echo(raw), "done");
    }

    #[test]
    fn budget_counts_prompt_tokens_against_the_cap() {
        assert_eq!(generation_budget(10, 4, 128), 134);
        assert_eq!(generation_budget(0, 0, 128), 128);
        assert_eq!(generation_budget(5, 500, 0), 0);
    }

    #[test]
    fn default_config_allows_128_extra_tokens() {
        let config = LocalConfig::default();
        assert_eq!(config.extra_tokens, 128);
        assert!(config.seed.is_none());
    }
}
