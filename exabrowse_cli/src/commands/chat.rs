use crate::cli::Cli;
use crate::commands::{spinner, Context, Result};
use crate::output::{emit, OutputData};
use exabrowse_core::{ChatInput, ChatMessage, TopicChat};
use std::path::Path;

pub async fn run(
    cli: &Cli,
    message: &str,
    context: Option<&str>,
    context_file: Option<&Path>,
) -> Result<()> {
    let context = match context_file {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => context.map(str::to_string),
    };
    let input = ChatInput {
        messages: vec![ChatMessage::user(message)],
        context,
    };

    let chat = TopicChat::new(Context::load()?.chat_provider()?);
    let progress = spinner("Thinking...");
    let result = chat.reply(&input).await;
    progress.finish_and_clear();

    emit(cli, &OutputData::ChatReply(result?))
}
