/// Where the accumulator is in a multi-line block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputState {
    #[default]
    SingleLine,
    MultiLine,
    /// The block has dedented back to level zero; one more blank line (or
    /// further input) confirms it.
    AwaitingMore,
}
