//! Chat memory server binary.
//! Run with: cargo run --bin chat-memory-server

use std::process::ExitCode;

use chat_memory::start_server;

fn main() -> ExitCode {
    start_server::run()
}
