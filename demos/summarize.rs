use anyhow::Result;
use simscribe::{
    BackendKind, LocalBackend, LocalConfig, RemoteBackend, TextGenerator, extract_min_rating,
    summarize_simulation,
};
use std::sync::Arc;

const LOG_OUTPUT: &str = "Toblen Stonehill action: I get out of bed and have breakfast. \
Then, I go to the market to buy supplies for the trading post. After that, I arrive at the \
trading post and unload the supplies. Finally, I start trading.";

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("---- test: extract_min_rating ----");
    let text = "我有8个苹果, 他有90个苹果; --> 提取string中最小的数字";
    println!("input: {}", text);
    println!("extract output: {:?}", extract_min_rating(text));

    // DEEPSEEK_API_KEY / DEEPSEEK_BASE_URL, optionally from .env
    let remote = RemoteBackend::from_env()?;
    let mut generator = TextGenerator::new(Arc::new(remote));

    let use_local = std::env::args().any(|arg| arg == "--local");
    if use_local {
        println!(">>> Loading local model...");
        generator = generator.with_local(Arc::new(LocalBackend::load(LocalConfig::default())?));
    }

    println!("---- test: summarize_simulation ----");
    println!("log_output: {}", LOG_OUTPUT);
    println!("summary: {}", summarize_simulation(&generator, LOG_OUTPUT)?);

    if use_local {
        let prompt = format!(
            "### Instruction:\nRate this day from 1 to 10.\n\n{}\n\n### Response:\n",
            LOG_OUTPUT
        );
        let reply = generator.generate_with(&prompt, BackendKind::Local)?;
        println!("local reply: {}", reply);
        println!("local rating: {:?}", extract_min_rating(&reply));
    }

    Ok(())
}
