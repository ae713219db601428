mod help;
mod input_state;
mod reader;
mod repl;

pub use input_state::InputState;
pub use reader::{LineReader, ReadEvent, RustylineReader};
pub use repl::{Repl, SessionEnd};
