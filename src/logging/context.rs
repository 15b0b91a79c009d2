use crate::cli::Command;

/// Execution contexts that influence how logging is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Long-running HTTP service started with `serve`.
    Service,
    /// One-shot local commands such as `transform`.
    LocalDev,
}

/// Derive the active execution context from a parsed CLI command.
pub fn detect_context(command: &Command) -> ExecutionContext {
    match command {
        Command::Serve(_) => ExecutionContext::Service,
        Command::Transform(_) => ExecutionContext::LocalDev,
    }
}
