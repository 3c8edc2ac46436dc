pub mod console;
pub mod memory;

pub use console::{ConsoleAdapter, ConsoleConfig};
pub use memory::{MemoryHost, SentMessage};
