use crossterm::style::{Color, Stylize};

/// Applies ANSI colors to terminal output. When colors are disabled in the
/// configuration, text passes through untouched.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn apply(&self, text: &str, color: Color) -> String {
        if self.enabled {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn red(&self, text: &str) -> String {
        self.apply(text, Color::Red)
    }

    pub fn green(&self, text: &str) -> String {
        self.apply(text, Color::Green)
    }

    pub fn yellow(&self, text: &str) -> String {
        self.apply(text, Color::Yellow)
    }

    pub fn blue(&self, text: &str) -> String {
        self.apply(text, Color::Blue)
    }

    pub fn magenta(&self, text: &str) -> String {
        self.apply(text, Color::Magenta)
    }

    pub fn cyan(&self, text: &str) -> String {
        self.apply(text, Color::Cyan)
    }
}
