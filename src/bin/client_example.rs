//! Example client for the todo agent API
//!
//! Start a server first, e.g. `todo-agent serve --provider offline`.

use todo_agent::api::{ClientConfig, HttpClientImpl};
use todo_agent::{Controller, SubmitOutcome};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url =
        std::env::var("TODO_AGENT_SERVER").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let client = HttpClientImpl::with_config(ClientConfig { base_url });
    let mut controller = Controller::new(client);

    println!("Todo Agent API Client Example");
    println!("-----------------------------");

    for command in [
        "Add go to the gym",
        "add buy milk",
        "I finished the milk task",
        "remove the first task",
        "what's my first task?",
    ] {
        println!("\n> {}", command);
        let outcome = controller.submit(command).await;
        if let Some(reply) = controller.transcript().last() {
            println!("{}", reply.content);
        }
        if let SubmitOutcome::Failed(message) = outcome {
            return Err(message.into());
        }
        for task in controller.todos() {
            println!(
                "  [{}] {} (id {})",
                if task.completed { "x" } else { " " },
                task.text,
                task.id
            );
        }
    }

    println!("\nAll commands completed successfully!");
    Ok(())
}
