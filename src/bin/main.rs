//! Binary entrypoint for the todo agent

#[tokio::main]
async fn main() {
    if let Err(e) = todo_agent::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
