//! Instruction contract for the list-update model
//!
//! Builds the system instruction that embeds the current list snapshot, and
//! declares the one tool the model is allowed to call.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::Task;
use crate::provider::ToolDefinition;

/// Name of the only tool the model may invoke
pub const UPDATE_TOOL_NAME: &str = "update_todo_list";

/// Reply returned to the caller whenever the model replaced the list
pub const UPDATE_CONFIRMATION: &str = "I've updated your list!";

const SNAPSHOT_HEADER: &str = "### CURRENT DATA STATE:";
const ID_SEED_PREFIX: &str = "- When ADDING: Generate a unique ID using the current timestamp: ";

lazy_static! {
    static ref UPDATE_TODO_LIST_TOOL: ToolDefinition = ToolDefinition {
        name: UPDATE_TOOL_NAME.to_string(),
        description: "Update the user's todo list".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "newList": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "text": { "type": "string" },
                            "completed": { "type": "boolean" }
                        },
                        "required": ["id", "text", "completed"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["newList"],
            "additionalProperties": false
        }),
    };
}

/// The tool declaration handed to the provider on every call
pub fn update_todo_list_tool() -> ToolDefinition {
    UPDATE_TODO_LIST_TOOL.clone()
}

/// Argument object of `update_todo_list`
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTodoListArgs {
    #[serde(rename = "newList")]
    pub new_list: Vec<Task>,
}

/// Parses the raw JSON argument string of an `update_todo_list` call
pub fn parse_update_arguments(arguments: &str) -> Result<Vec<Task>, serde_json::Error> {
    serde_json::from_str::<UpdateTodoListArgs>(arguments).map(|args| args.new_list)
}

/// Builds the system instruction for one command
///
/// `id_seed` is the wall-clock timestamp (ms) new tasks must use as their id.
pub fn build_instructions(current: &[Task], id_seed: i64) -> String {
    // Serializing a Vec of plain structs cannot fail
    let snapshot = serde_json::to_string(current).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"You are the "System Architect" for a smart To-Do list.
The user will provide a command, and you must translate it into a structured list update.

{SNAPSHOT_HEADER}
{snapshot}

### THE GOLDEN RULE:
- NEVER delete an item unless the user explicitly asks to "remove", "delete", or "clear".
- When adding a task, you MUST take the CURRENT DATA STATE and APPEND the new task to it.
- Your output 'newList' must contain ALL previous items PLUS the new ones.

### OPERATIONAL RULES:
1. IDENTIFY INTENT: Determine if the user wants to ADD, REMOVE, TOGGLE (check/uncheck), or EDIT a task.
2. REFERENCE BY CONTEXT:
- "First", "Top", "Number 1" refers to index 0.
- "Last", "Bottom" refers to the final index.
- If they name a task (e.g., "Buy milk"), find the item with that exact or similar text.
3. ID MANAGEMENT:
{ID_SEED_PREFIX}{id_seed}.
- When REMOVING/EDITING: Preserve the existing IDs of all other items.
4. CALCULATE NEW STATE:
- You must perform the logic (filter, map, or push) on the CURRENT DATA STATE provided above.
- You must return the ENTIRE resulting array, not just the change.
5. MANDATORY TOOL CALL:
- If the list changes in ANY way, you MUST call '{UPDATE_TOOL_NAME}'.
- Accompany the call with a short, punchy confirmation (e.g., "Task removed!").
- If nothing needs to change, answer in plain text and do not call the tool.

### EXAMPLES:
- User: "Delete the second one" -> Filter out the item at index 1 -> Call tool with the new array.
- User: "I finished the milk task" -> Find "milk", set completed: true -> Call tool.
- User: "Clear everything" -> Call tool with an empty array [].
"#
    )
}

/// Reads the list snapshot back out of an instruction built by [`build_instructions`]
pub fn read_snapshot(instructions: &str) -> Option<Vec<Task>> {
    let mut lines = instructions.lines();
    lines.find(|line| line.trim() == SNAPSHOT_HEADER)?;
    serde_json::from_str(lines.next()?.trim()).ok()
}

/// Reads the id seed back out of an instruction built by [`build_instructions`]
pub fn read_id_seed(instructions: &str) -> Option<i64> {
    instructions
        .lines()
        .find_map(|line| line.strip_prefix(ID_SEED_PREFIX))
        .and_then(|rest| rest.trim_end_matches('.').parse().ok())
}
