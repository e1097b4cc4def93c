use eyre::Result;
use log::debug;

use crate::llm::Generator;

const SUMMARY_INSTRUCTIONS: &str = "You are an advanced AI designed to interpret video transcripts and generate detailed summaries.
Do not use any markdown syntax; instead, write headings plainly, e.g., \"Introduction\".

Task Instructions:
- Review the video transcript.
- Craft a 4-5 paragraph summary including purpose, highlights, and insights.";

const CHAT_INSTRUCTIONS: &str = "You are a chatbot tasked with providing informative and concise answers to users based on context and a specific question provided.

Always base your response on the video transcript provided in the context.
Begin your reply with \"This video\" or \"From the video\" instead of \"this document\".
Ensure that your responses are concise and do not exceed five lines.";

/// Prompt asking for a multi-paragraph summary of `transcript`
pub fn summary_prompt(transcript: &str) -> String {
    format!("{SUMMARY_INSTRUCTIONS}\n\nTranscript: {transcript}")
}

/// Prompt asking a short question about `transcript`
pub fn chat_prompt(transcript: &str, question: &str) -> String {
    format!("{CHAT_INSTRUCTIONS}\n\nFormat:\n  Context: {transcript}\n  Question: {question}")
}

/// Summarize transcript text; the generated text is returned unmodified
pub async fn summarize(generator: &dyn Generator, transcript: &str) -> Result<String> {
    debug!("Summarizing transcript ({} chars)", transcript.len());
    generator.generate(&summary_prompt(transcript)).await
}

/// Answer a question from transcript text; the generated text is returned unmodified
pub async fn answer(generator: &dyn Generator, transcript: &str, question: &str) -> Result<String> {
    debug!("Answering question ({} chars of context)", transcript.len());
    generator.generate(&chat_prompt(transcript, question)).await
}
