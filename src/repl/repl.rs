use crate::config::{ConfigEditor, Document, Settings};
use crate::engine::{CompileOutcome, LanguageEngine};
use crate::error::{FatalError, FatalKind};
use crate::script::{FileOp, FileSession};
use crate::term::{self, Painter};

use super::help;
use super::input_state::InputState;
use super::reader::{LineReader, ReadEvent};

/// How the session ended; main maps this onto a process exit code.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    Interrupted,
}

/// The interactive session: accumulates lines into blocks, dispatches
/// whole-line commands, and hands completed blocks to the language engine
/// or the active file capture.
pub struct Repl<E: LanguageEngine> {
    engine: E,
    session: FileSession,
    document: Document,
    settings: Settings,
    painter: Painter,
    buffer: String,
    indent_level: usize,
    state: InputState,
    running: bool,
}

impl<E: LanguageEngine> Repl<E> {
    pub fn new(engine: E, session: FileSession, document: Document, settings: Settings) -> Self {
        let painter = Painter::new(settings.enable_colors);
        Self {
            engine,
            session,
            document,
            settings,
            painter,
            buffer: String::new(),
            indent_level: 0,
            state: InputState::SingleLine,
            running: true,
        }
    }

    fn indent_str(&self) -> String {
        " ".repeat(self.indent_level * self.settings.indent_step)
    }

    fn prompt(&self) -> String {
        if self.indent_level == 0 && self.state == InputState::SingleLine {
            self.painter.green(">>> ")
        } else {
            self.painter.blue("... ")
        }
    }

    fn error_prompt(&self) -> String {
        self.painter.red("!!! ")
    }

    fn print_banner(&self) {
        println!(
            "{}",
            self.painter
                .yellow(&format!("rill version {}", env!("CARGO_PKG_VERSION")))
        );
        println!(
            "{}",
            self.painter.magenta(&format!(
                "Scripting: {} on {} {}",
                self.engine.language(),
                std::env::consts::OS,
                std::env::consts::ARCH
            ))
        );
    }

    /// Run the interactive loop until exit, interrupt, or a fatal error.
    pub fn run<R: LineReader>(&mut self, reader: &mut R) -> Result<SessionEnd, FatalError> {
        let _ = term::clear_screen();
        self.print_banner();

        while self.running {
            if self.session.is_reading() {
                self.replay_file(reader);
                continue;
            }

            let prompt = self.prompt();
            let event = if self.indent_level > 0 {
                reader.read_line_with_initial(&prompt, &self.indent_str())
            } else {
                reader.read_line(&prompt)
            };

            let line = match event {
                ReadEvent::Line(line) => line.trim().to_string(),
                ReadEvent::Interrupted => {
                    if self.buffer.is_empty() && self.state == InputState::SingleLine {
                        return Ok(SessionEnd::Interrupted);
                    }
                    println!("{}", self.painter.cyan("input cancelled"));
                    self.reset_accumulation();
                    continue;
                }
                ReadEvent::Eof => return Ok(SessionEnd::Quit),
                ReadEvent::Failed(err) => {
                    return Err(FatalError::new(
                        FatalKind::Unknown,
                        "input stream failed",
                        err,
                    ));
                }
            };

            // Commands never collide with in-progress multi-line input.
            if self.buffer.is_empty() && self.dispatch_command(reader, &line)? {
                continue;
            }

            self.feed_line(&line);
        }

        Ok(SessionEnd::Quit)
    }

    /// Release the file handle at the end of a controlled session.
    pub fn close_session(&mut self) {
        self.session.close();
    }

    /// Abnormal-termination path: close any open file and tell the user.
    pub fn shutdown(&mut self) {
        self.running = false;
        self.session.close();
        println!(
            "{}",
            self.painter.red("rill stopped running due to a fatal error")
        );
    }

    /// Recognize whole-line commands. Returns false when the line should
    /// fall through to the accumulator.
    fn dispatch_command<R: LineReader>(
        &mut self,
        reader: &mut R,
        line: &str,
    ) -> Result<bool, FatalError> {
        let lowered = line.to_lowercase();

        match lowered.as_str() {
            "exit" | "quit" => {
                self.running = false;
                return Ok(true);
            }
            "clear" => {
                let _ = term::clear_screen();
                return Ok(true);
            }
            "dictionary" => {
                self.print_dictionary();
                return Ok(true);
            }
            "reset" => {
                self.reset_environment();
                return Ok(true);
            }
            "save" => {
                if self.session.is_capturing() {
                    self.session.close();
                    println!("{}", self.painter.cyan("file saved successfully"));
                } else {
                    println!(
                        "{}",
                        self.painter
                            .red("rill error: no file is currently being written to")
                    );
                }
                return Ok(true);
            }
            "config" => {
                self.run_config_editor(reader)?;
                return Ok(true);
            }
            _ => {}
        }

        if lowered == "help" || lowered.starts_with("help ") {
            let topic = if lowered == "help" {
                "intro"
            } else {
                line.split_whitespace().last().unwrap_or("intro")
            };
            help::show(reader, &self.painter, topic);
            return Ok(true);
        }

        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or("").to_lowercase();
        if let Some(op) = FileOp::parse(&head) {
            match words.next() {
                None => println!(
                    "{}",
                    self.painter
                        .red("rill error: missing file name for the command")
                ),
                Some(name) => {
                    let name = name.trim_matches('"');
                    match self.session.open(op, name) {
                        Ok(message) => {
                            if !message.is_empty() {
                                println!("{}", self.painter.cyan(&message));
                            }
                        }
                        Err(message) => {
                            println!("{}", self.painter.red(&format!("rill error: {message}")));
                        }
                    }
                }
            }
            return Ok(true);
        }

        Ok(false)
    }

    fn print_dictionary(&self) {
        let names = self.engine.names();
        if names.is_empty() {
            println!("{}", self.painter.cyan("the namespace is empty"));
            return;
        }
        for (name, constant, value) in names {
            if constant {
                println!("{name} = {value} (const)");
            } else {
                println!("{name} = {value}");
            }
        }
    }

    /// Clear screen, namespace, and session state, as if freshly started.
    fn reset_environment(&mut self) {
        let _ = term::clear_screen();
        self.engine.reset();
        self.session.close();
        self.reset_accumulation();
        self.print_banner();
        println!("{}", self.painter.cyan("Note: the session namespace has been cleared."));
    }

    fn run_config_editor<R: LineReader>(&mut self, reader: &mut R) -> Result<(), FatalError> {
        if self.settings.disable_config_editor {
            println!("{}", self.painter.yellow("rill config editor: disabled"));
            println!(
                "{}",
                self.painter.cyan(
                    "Note: set 'disable-config-editor' to false in config.json to enable it."
                )
            );
            return Ok(());
        }
        ConfigEditor::new(&mut self.document, reader, self.painter).run()
    }

    fn reset_accumulation(&mut self) {
        self.buffer.clear();
        self.indent_level = 0;
        self.state = InputState::SingleLine;
    }

    /// Feed one interactively typed line through the accumulator.
    fn feed_line(&mut self, line: &str) {
        if line.is_empty() {
            if !self.buffer.is_empty() {
                // A blank line dedents one level; at level zero it confirms
                // the block.
                self.indent_level = self.indent_level.saturating_sub(1);
                self.try_complete(None);
            }
            return;
        }

        self.buffer.push_str(&self.indent_str());
        self.buffer.push_str(line);
        self.buffer.push('\n');

        // Open-bracket line endings always mean more input is coming, even
        // when the engine would accept the buffer as-is (multi-line
        // literals).
        if ends_with_open_bracket(line) {
            self.state = InputState::MultiLine;
            self.indent_level += 1;
            return;
        }

        match self.engine.compile(&self.buffer) {
            CompileOutcome::Incomplete => {
                self.state = InputState::MultiLine;
                self.indent_level += 1;
            }
            CompileOutcome::Invalid(err)
                if err.unmatched_bracket && self.state == InputState::MultiLine =>
            {
                // The engine cannot see that the block is still being typed.
            }
            CompileOutcome::Invalid(err) => {
                self.report_error(&err.message);
                self.reset_accumulation();
            }
            CompileOutcome::Ready(unit) => self.try_complete(Some(unit)),
        }
    }

    /// At level zero a non-empty buffer is finished: multi-line blocks wait
    /// for one confirming blank line, everything else runs or is captured.
    fn try_complete(&mut self, ready: Option<E::Unit>) {
        if self.indent_level != 0 || self.buffer.is_empty() {
            return;
        }
        if self.state == InputState::MultiLine {
            self.state = InputState::AwaitingMore;
            return;
        }

        let unit = match ready {
            Some(unit) => unit,
            None => match self.engine.compile(&self.buffer) {
                CompileOutcome::Ready(unit) => unit,
                CompileOutcome::Incomplete => {
                    self.state = InputState::MultiLine;
                    self.indent_level += 1;
                    return;
                }
                CompileOutcome::Invalid(err) => {
                    self.report_error(&err.message);
                    self.reset_accumulation();
                    return;
                }
            },
        };

        self.run_block(unit);
    }

    /// Execute a completed block, or capture it when a file is being
    /// written. Capture never executes.
    fn run_block(&mut self, unit: E::Unit) {
        if self.session.is_capturing() {
            if !self.session.write(self.buffer.trim_end()) {
                println!("{}", self.painter.red("rill error: failed to write to file"));
            }
        } else {
            match self.engine.execute(&unit) {
                Ok(Some(value)) => println!("{value}"),
                Ok(None) => {}
                Err(err) => self.report_error(&err),
            }
        }
        self.reset_accumulation();
    }

    fn report_error(&self, message: &str) {
        println!("{}{}", self.error_prompt(), self.painter.red(message));
    }

    /// Replay the open script file into the buffer and dispatch it as one
    /// block. Incomplete input is fatal for the block: there is no way to
    /// backtrack interactively into a file.
    fn replay_file<R: LineReader>(&mut self, reader: &mut R) {
        while let Some(line) = self.session.read_line() {
            println!("{}{line}", self.painter.blue("... "));
            self.buffer.push_str(&line);
            self.buffer.push('\n');
        }
        self.session.close();

        let _ = reader.read_line(&self.painter.cyan("Press Enter to finish reading the file..."));

        match self.engine.compile(&self.buffer) {
            CompileOutcome::Ready(unit) => self.run_block(unit),
            CompileOutcome::Incomplete => {
                self.report_error("rill error: the file ends mid-block");
                self.reset_accumulation();
            }
            CompileOutcome::Invalid(err) => {
                self.report_error(&err.message);
                self.reset_accumulation();
            }
        }
    }
}

/// Rough lexical-nesting heuristic; bracket characters inside strings or
/// comments can both over- and under-trigger it.
fn ends_with_open_bracket(line: &str) -> bool {
    matches!(line.trim_end().chars().last(), Some('{' | '[' | '('))
}
