// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! Prompt construction
//!
//! Pure rendering, no I/O: retrieved chunks, trimmed history, and the raw
//! query become exactly two chat messages. Absent inputs are always rendered
//! as explicit placeholders so the model can tell "nothing retrieved" apart
//! from a formatting accident.

use serde::Serialize;

use crate::storage::MessageRecord;

/// Separator rendered between context chunks
const CHUNK_SEPARATOR: &str = "\n\n---\n\n";
const EMPTY_CONTEXT: &str = "[no relevant context retrieved]";
const EMPTY_HISTORY: &str = "[none]";

pub const DEFAULT_CONTEXT_BUDGET: usize = 4000;
pub const DEFAULT_HISTORY_PAIRS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
}

/// One chat message on the completions wire; transient, never persisted
#[derive(Debug, Clone, Serialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

pub struct PromptBuilder {
    system_prompt: String,
    context_budget: usize,
    history_pairs: usize,
}

impl PromptBuilder {
    pub fn new(company_name: &str, context_budget: usize, history_pairs: usize) -> Self {
        Self {
            system_prompt: system_prompt(company_name),
            context_budget,
            history_pairs,
        }
    }

    /// Concatenate trimmed chunks in store order until the next chunk (plus
    /// separator) would overflow the budget. Chunks are included whole or not
    /// at all; the overflowing chunk ends assembly.
    fn format_context(&self, chunks: &[String]) -> String {
        let mut block = String::new();
        for chunk in chunks {
            let chunk = chunk.trim();
            if chunk.is_empty() {
                continue;
            }
            let added = if block.is_empty() {
                chunk.len()
            } else {
                CHUNK_SEPARATOR.len() + chunk.len()
            };
            if block.len() + added > self.context_budget {
                break;
            }
            if !block.is_empty() {
                block.push_str(CHUNK_SEPARATOR);
            }
            block.push_str(chunk);
        }
        block
    }

    /// Most recent `history_pairs * 2` entries, restored to chronological
    /// order, one `role: content` line each
    fn format_history(&self, history: &[MessageRecord]) -> String {
        let keep = self.history_pairs * 2;
        let mut lines: Vec<String> = history
            .iter()
            .rev()
            .take(keep)
            .map(|m| format!("{}: {}", m.role, m.content.trim()))
            .collect();
        lines.reverse();
        lines.join("\n")
    }

    /// Render the final prompt: the fixed system instruction plus one user
    /// message with delimited context, recent history, and query blocks
    pub fn build(
        &self,
        chunks: &[String],
        history: &[MessageRecord],
        query: &str,
    ) -> Vec<PromptMessage> {
        let context_block = self.format_context(chunks);
        // A single prior entry is the bare opening turn; not worth a block
        let history_block = if history.len() > 1 {
            self.format_history(history)
        } else {
            String::new()
        };

        let user_content = format!(
            "\"\"\"\nCONTEXT:\n{}\n\"\"\"\n\n---\n\n\"\"\"\nCHAT HISTORY (recent):\n{}\n\"\"\"\n\n---\nUser Query:\n{}\n",
            if context_block.is_empty() {
                EMPTY_CONTEXT
            } else {
                context_block.as_str()
            },
            if history_block.is_empty() {
                EMPTY_HISTORY
            } else {
                history_block.as_str()
            },
            query.trim()
        );

        vec![
            PromptMessage {
                role: PromptRole::System,
                content: self.system_prompt.clone(),
            },
            PromptMessage {
                role: PromptRole::User,
                content: user_content,
            },
        ]
    }
}

fn system_prompt(company_name: &str) -> String {
    format!(
        r#"You are FinBot, an AI assistant for {company}, a fintech company.
You help users with account, payments, security, regulations, and support questions.

## Core Behavior
- Professional, clear, and empathetic
- Prioritize user safety and privacy
- Give direct, step-by-step answers in plain language
- Keep responses concise; avoid long paragraphs
- Use a trustworthy tone, but stay approachable

## Knowledge Areas
1. Account & Registration - sign-up, verification (KYC), profile updates
2. Payments & Transactions - transfers, methods, fees, history
3. Security & Fraud Prevention - suspicious activity, safe practices
4. Regulations & Compliance - basic rules, user obligations
5. Technical Support - login issues, app errors, troubleshooting

## Guidelines
- Base answers on {company}'s docs when possible
- If unsure, say: "I don't have specific info in our knowledge base"
- For account-specific issues: always direct to customer support
- Never invent policies, fees, or legal rules
- Never request personal or login details

## Style & Readability
- Break long answers into sections with **bold headers** or bullet points
- Aim for 2-4 short sentences per bubble
- Insert the delimiter [[NEW_BUBBLE]] whenever a new chat bubble should start. You have to split bubbles to ensure ease of reading for user
- The frontend will split responses at [[NEW_BUBBLE]]
- End with a clear next step or reassurance

## Escalation
Always direct to customer support if user mentions:
- Account errors, failed payments, or unauthorized activity
- Legal/regulatory disputes
- Technical issues needing account access
"#,
        company = company_name
    )
}
