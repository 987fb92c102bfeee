//! Deterministic rule-based provider for local runs and contract tests
//!
//! Reads the list snapshot and id seed back out of the instruction and
//! follows the same rules the real model is asked to follow: append on add,
//! filter on remove, map on toggle, resolve "first"/"last"/by-name references.
//! It understands a small fixed vocabulary and is never used as a fallback for
//! a failing real provider.

use async_trait::async_trait;
use serde_json::json;

use super::{Completion, CompletionRequest, LlmProvider, ProviderError};
use crate::intent::{has_removal_intent, ordinal_index, words};
use crate::models::{Role, Task};
use crate::prompt::{read_id_seed, read_snapshot, UPDATE_TOOL_NAME};

const ADD_PREFIXES: &[&str] = &["add ", "create ", "new task ", "remind me to ", "i need to "];
const LIST_SUFFIXES: &[&str] = &[" to my list", " to the list", " to my tasks", " to the tasks"];
const UNCOMPLETE_WORDS: &[&str] = &["uncheck", "untick", "undo", "reopen", "incomplete", "unfinished"];
const COMPLETE_WORDS: &[&str] = &[
    "finished", "finish", "done", "complete", "completed", "check", "tick", "did",
];
const STOP_WORDS: &[&str] = &["the", "and", "task", "for", "with", "from", "that", "this"];

/// What the rules decided
#[derive(Debug, PartialEq)]
enum Outcome {
    Update(Vec<Task>),
    Reply(String),
}

#[derive(Debug, Default, Clone)]
pub struct OfflineProvider;

impl OfflineProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LlmProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    fn model(&self) -> &str {
        "rules"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let todos = read_snapshot(&request.instructions).ok_or_else(|| {
            ProviderError::MalformedResponse("instruction carries no list snapshot".to_string())
        })?;
        let seed = read_id_seed(&request.instructions)
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());

        let command = request
            .messages
            .iter()
            .rev()
            .find(|turn| turn.role == Role::User)
            .map(|turn| turn.content.as_str())
            .unwrap_or_default();

        let may_update = request.tools.iter().any(|t| t.name == UPDATE_TOOL_NAME);
        match interpret(command, &todos, seed) {
            Outcome::Update(new_list) if may_update => Ok(Completion::ToolCall {
                name: UPDATE_TOOL_NAME.to_string(),
                arguments: json!({ "newList": new_list }).to_string(),
            }),
            Outcome::Update(_) => Ok(Completion::Text(Some(
                "I can't change the list right now.".to_string(),
            ))),
            Outcome::Reply(text) => Ok(Completion::Text(Some(text))),
        }
    }
}

fn interpret(command: &str, todos: &[Task], seed: i64) -> Outcome {
    let command = command.trim();
    let tokens = words(command);

    if command.is_empty() {
        return Outcome::Reply("Tell me what to do!".to_string());
    }
    if is_question(command, &tokens) {
        return Outcome::Reply(describe(command, &tokens, todos));
    }
    if let Some(text) = added_text(command) {
        return add(todos, text, seed);
    }
    if has_removal_intent(command) {
        return remove(command, &tokens, todos);
    }
    if tokens.iter().any(|w| w == "all" || w == "everything") {
        let uncomplete = tokens.iter().any(|w| UNCOMPLETE_WORDS.contains(&w.as_str()));
        if uncomplete || tokens.iter().any(|w| COMPLETE_WORDS.contains(&w.as_str())) {
            return set_all(todos, !uncomplete);
        }
    }
    if tokens.iter().any(|w| UNCOMPLETE_WORDS.contains(&w.as_str()))
        || contains_pair(&tokens, "not", "done")
    {
        return toggle(command, &tokens, todos, false);
    }
    if tokens.iter().any(|w| COMPLETE_WORDS.contains(&w.as_str())) {
        return toggle(command, &tokens, todos, true);
    }
    if matches!(tokens.first().map(String::as_str), Some("rename" | "change")) {
        return rename(command, todos);
    }

    Outcome::Reply(format!("I'm not sure what to do with that. {}", summary(todos)))
}

fn is_question(command: &str, tokens: &[String]) -> bool {
    command.ends_with('?')
        || matches!(
            tokens.first().map(String::as_str),
            Some("what" | "which" | "how" | "show" | "list")
        )
}

fn contains_pair(tokens: &[String], first: &str, second: &str) -> bool {
    tokens.windows(2).any(|w| w[0] == first && w[1] == second)
}

/// Case-insensitive ASCII prefix strip that keeps the original casing of the rest
fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

fn strip_suffix_ci<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = text.len().checked_sub(suffix.len())?;
    let tail = text.get(cut..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &text[..cut])
}

fn clean(text: &str) -> &str {
    text.trim()
        .trim_end_matches(['.', '!'])
        .trim()
        .trim_matches(['"', '\''])
        .trim()
}

fn added_text(command: &str) -> Option<&str> {
    let rest = ADD_PREFIXES
        .iter()
        .find_map(|prefix| strip_prefix_ci(command, prefix))?;
    let rest = clean(rest);
    let rest = LIST_SUFFIXES
        .iter()
        .find_map(|suffix| strip_suffix_ci(rest, suffix))
        .unwrap_or(rest);
    Some(clean(rest))
}

fn quoted(command: &str) -> Option<&str> {
    let start = command.find('"')? + 1;
    let len = command[start..].find('"')?;
    Some(&command[start..start + len]).filter(|q| !q.trim().is_empty())
}

/// Finds the task a command refers to: quoted text, exact text, ordinal, then closest wording
fn resolve_target(command: &str, tokens: &[String], todos: &[Task]) -> Option<usize> {
    if let Some(q) = quoted(command) {
        let q = q.trim().to_lowercase();
        if let Some(i) = todos.iter().position(|t| t.text.to_lowercase() == q) {
            return Some(i);
        }
    }

    // Whole task text appearing word for word in the command
    if let Some(i) = todos.iter().position(|t| {
        let text_words = words(&t.text);
        !text_words.is_empty()
            && tokens
                .windows(text_words.len())
                .any(|w| w == text_words.as_slice())
    }) {
        return Some(i);
    }

    if let Some(i) = ordinal_index(tokens, todos.len()) {
        return Some(i);
    }

    // Closest wording: most shared significant words, first wins on ties
    let mut best: Option<(usize, usize)> = None;
    for (i, task) in todos.iter().enumerate() {
        let score = words(&task.text)
            .iter()
            .filter(|w| w.len() >= 3 && !STOP_WORDS.contains(&w.as_str()))
            .filter(|w| tokens.contains(w))
            .count();
        if score > 0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

fn next_id(todos: &[Task], seed: i64) -> i64 {
    let max = todos.iter().map(|t| t.id).max().unwrap_or(0);
    seed.max(max.saturating_add(1))
}

fn add(todos: &[Task], text: &str, seed: i64) -> Outcome {
    if text.is_empty() {
        return Outcome::Reply("What should I add?".to_string());
    }
    let mut new_list = todos.to_vec();
    new_list.push(Task::new(next_id(todos, seed), text));
    Outcome::Update(new_list)
}

fn remove(command: &str, tokens: &[String], todos: &[Task]) -> Outcome {
    if todos.is_empty() {
        return Outcome::Reply("Your list is already empty.".to_string());
    }

    if tokens
        .iter()
        .any(|w| w == "completed" || w == "done" || w == "finished")
    {
        return Outcome::Update(todos.iter().filter(|t| !t.completed).cloned().collect());
    }

    let wipes_everything = tokens
        .iter()
        .any(|w| w == "everything" || w == "all" || w == "list")
        || matches!(tokens, [only] if matches!(only.as_str(), "clear" | "wipe" | "empty" | "purge"));
    if wipes_everything {
        return Outcome::Update(Vec::new());
    }

    match resolve_target(command, tokens, todos) {
        Some(index) => {
            let mut new_list = todos.to_vec();
            new_list.remove(index);
            Outcome::Update(new_list)
        }
        None => Outcome::Reply("I couldn't find that task.".to_string()),
    }
}

fn set_all(todos: &[Task], completed: bool) -> Outcome {
    if todos.iter().all(|t| t.completed == completed) {
        return Outcome::Reply("Nothing to change.".to_string());
    }
    Outcome::Update(
        todos
            .iter()
            .cloned()
            .map(|t| Task { completed, ..t })
            .collect(),
    )
}

fn toggle(command: &str, tokens: &[String], todos: &[Task], completed: bool) -> Outcome {
    let Some(index) = resolve_target(command, tokens, todos) else {
        return Outcome::Reply("I couldn't find that task.".to_string());
    };
    if todos[index].completed == completed {
        return Outcome::Reply(format!("\"{}\" is already marked that way.", todos[index].text));
    }
    let mut new_list = todos.to_vec();
    new_list[index].completed = completed;
    Outcome::Update(new_list)
}

fn rename(command: &str, todos: &[Task]) -> Outcome {
    let Some(split) = rfind_ascii_ci(command, " to ") else {
        return Outcome::Reply("Tell me the new name, e.g. 'rename the first task to call mom'.".to_string());
    };
    let (target_part, new_text) = (&command[..split], &command[split + 4..]);
    let new_text = clean(new_text);
    if new_text.is_empty() {
        return Outcome::Reply("The new name can't be empty.".to_string());
    }

    match resolve_target(target_part, &words(target_part), todos) {
        Some(index) => {
            let mut new_list = todos.to_vec();
            new_list[index].text = new_text.to_string();
            Outcome::Update(new_list)
        }
        None => Outcome::Reply("I couldn't find that task.".to_string()),
    }
}

/// Byte offset of the last ASCII case-insensitive match of `needle` in `haystack`
fn rfind_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let (hay, pat) = (haystack.as_bytes(), needle.as_bytes());
    if pat.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - pat.len())
        .rev()
        .find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
}

fn summary(todos: &[Task]) -> String {
    if todos.is_empty() {
        return "Your list is empty.".to_string();
    }
    let done = todos.iter().filter(|t| t.completed).count();
    let names = todos
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("You have {} tasks ({} done): {}.", todos.len(), done, names)
}

fn describe(command: &str, tokens: &[String], todos: &[Task]) -> String {
    match ordinal_index(tokens, todos.len()) {
        Some(index) => {
            let task = &todos[index];
            let status = if task.completed { "done" } else { "not done yet" };
            format!("Task {} is \"{}\" ({}).", index + 1, task.text, status)
        }
        None if command.to_lowercase().contains("how many") => {
            format!("You have {} tasks.", todos.len())
        }
        None => summary(todos),
    }
}
