mod painter;

pub use painter::Painter;

use std::io::{self, stdout};

use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};

/// Clear the terminal and park the cursor at the top-left corner.
pub fn clear_screen() -> io::Result<()> {
    execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0))
}
