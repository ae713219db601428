use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// One read from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadEvent {
    Line(String),
    Interrupted,
    Eof,
    Failed(String),
}

/// Line-buffered input. Abstracted so the REPL and the config editor can be
/// driven by scripted input in tests.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> ReadEvent;

    /// Read with text pre-filled after the prompt. The default ignores the
    /// prefill, for readers that cannot seed the input buffer.
    fn read_line_with_initial(&mut self, prompt: &str, initial: &str) -> ReadEvent {
        let _ = initial;
        self.read_line(prompt)
    }
}

/// Rustyline-backed reader with in-session history.
pub struct RustylineReader {
    editor: DefaultEditor,
}

impl RustylineReader {
    pub fn new() -> Result<Self, String> {
        let editor =
            DefaultEditor::new().map_err(|e| format!("cannot initialize line editor: {e}"))?;
        Ok(Self { editor })
    }

    fn classify(&mut self, result: rustyline::Result<String>) -> ReadEvent {
        match result {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                ReadEvent::Line(line)
            }
            Err(ReadlineError::Interrupted) => ReadEvent::Interrupted,
            Err(ReadlineError::Eof) => ReadEvent::Eof,
            Err(err) => ReadEvent::Failed(err.to_string()),
        }
    }
}

impl LineReader for RustylineReader {
    fn read_line(&mut self, prompt: &str) -> ReadEvent {
        let result = self.editor.readline(prompt);
        self.classify(result)
    }

    fn read_line_with_initial(&mut self, prompt: &str, initial: &str) -> ReadEvent {
        let result = self.editor.readline_with_initial(prompt, (initial, ""));
        self.classify(result)
    }
}
