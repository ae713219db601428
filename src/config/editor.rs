use serde_json::Value;

use super::document::{Document, render, type_name};
use crate::error::FatalError;
use crate::repl::{LineReader, ReadEvent};
use crate::term::Painter;

const EDITOR_HELP: &str = "\
--- rill config editor commands ---
<path>=<value>        : set the value at path; numbers, booleans, JSON
                        structures, and null/none are inferred
<path>                : navigate into a sub-key or list index
show [path]           : display the value at the current or given path
delete <path>         : delete the key or index at path
append <value>        : append an element to the list at the current path
insert <idx> <value>  : insert an element into the list at the current path
/                     : go back to the root
..                    : go up one level
save                  : save changes to file and quit the editor
Ctrl+C                : quit without saving (reverts the document)
-----------------------------------";

/// Interactive console for navigating and mutating the config document.
/// Saving persists and exits; interrupt reverts to the last loaded state.
pub struct ConfigEditor<'a, R: LineReader> {
    document: &'a mut Document,
    reader: &'a mut R,
    painter: Painter,
    path: Vec<String>,
}

impl<'a, R: LineReader> ConfigEditor<'a, R> {
    pub fn new(document: &'a mut Document, reader: &'a mut R, painter: Painter) -> Self {
        Self {
            document,
            reader,
            painter,
            path: Vec::new(),
        }
    }

    fn prompt(&self) -> String {
        let path = if self.path.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", self.path.join("/"))
        };
        let dirty = if self.document.is_dirty() { "*" } else { "" };
        self.painter.magenta(&format!("config{dirty}:{path} > "))
    }

    /// Run the editor loop. Errors are fatal save/revert failures only.
    pub fn run(&mut self) -> Result<(), FatalError> {
        println!(
            "{}",
            self.painter
                .yellow("You are in the rill config editor. Enter 'help' for commands.")
        );
        println!(
            "{}",
            self.painter
                .cyan("Note: 'save' saves and quits. Ctrl+C quits without saving (revert).")
        );

        loop {
            let prompt = self.prompt();
            let line = match self.reader.read_line(&prompt) {
                ReadEvent::Line(line) => line.trim().to_string(),
                ReadEvent::Interrupted => {
                    self.document.revert()?;
                    return Ok(());
                }
                ReadEvent::Eof | ReadEvent::Failed(_) => {
                    println!("{}", self.painter.red("use 'save' or Ctrl+C to quit"));
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            let parts = split_command(&line);
            let command = parts[0].to_lowercase();

            match command.as_str() {
                "save" => {
                    self.document.save()?;
                    println!("{}", self.painter.cyan("config saved"));
                    return Ok(());
                }
                "help" => {
                    println!("{EDITOR_HELP}");
                    continue;
                }
                "/" => {
                    self.path.clear();
                    continue;
                }
                ".." => {
                    if self.path.pop().is_none() {
                        println!("{}", self.painter.cyan("already at the root"));
                    }
                    continue;
                }
                "show" => {
                    self.show(parts.get(1).map(String::as_str));
                    continue;
                }
                "delete" => {
                    match parts.get(1) {
                        None => println!(
                            "{}",
                            self.painter
                                .red("missing target; example: delete key_to_delete")
                        ),
                        Some(arg) => {
                            let target = self.resolve_relative(arg);
                            let result = self.document.delete(&target);
                            self.report(result);
                        }
                    }
                    continue;
                }
                "append" => {
                    match parts.get(1) {
                        None => println!(
                            "{}",
                            self.painter.red("missing element; example: append \"item\"")
                        ),
                        Some(value) => {
                            let result = self.document.append(&self.path.clone(), value);
                            self.report(result);
                        }
                    }
                    continue;
                }
                "insert" => {
                    match (parts.get(1), parts.get(2)) {
                        (Some(index), Some(value)) => {
                            let result = self.document.insert(&self.path.clone(), index, value);
                            self.report(result);
                        }
                        _ => println!(
                            "{}",
                            self.painter
                                .red("missing index or value; example: insert 0 \"first\"")
                        ),
                    }
                    continue;
                }
                _ => {}
            }

            if let Some((path_str, value_str)) = line.split_once('=') {
                let target = self.resolve_relative(path_str.trim());
                let result = self.document.set(&target, value_str.trim());
                self.report(result);
            } else {
                self.navigate(&line);
            }
        }
    }

    fn resolve_relative(&self, input: &str) -> Vec<String> {
        let mut target = self.path.clone();
        target.extend(parse_path(input));
        target
    }

    fn report(&self, result: Result<String, String>) {
        match result {
            Ok(message) => println!("{}", self.painter.green(&message)),
            Err(message) => println!("{}", self.painter.red(&message)),
        }
    }

    fn show(&self, arg: Option<&str>) {
        println!("{}", self.view(arg));
    }

    /// Rendered contents of the current or given path.
    fn view(&self, arg: Option<&str>) -> String {
        let target = match arg {
            Some(path_str) => self.resolve_relative(path_str),
            None => self.path.clone(),
        };
        let display = if target.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", target.join("/"))
        };

        let body = match self.document.get(&target) {
            None => self.painter.red("path not found"),
            Some(value @ (Value::Object(_) | Value::Array(_))) => {
                serde_json::to_string_pretty(value).unwrap_or_default()
            }
            Some(Value::Null) => "value: null".to_string(),
            Some(value) => format!("value: {} ({})", render(value), type_name(value)),
        };

        format!("\n--- contents of {display} ---\n{body}\n--- end ---\n")
    }

    /// Bare path tokens navigate one level into child containers only.
    fn navigate(&mut self, input: &str) {
        let relative = parse_path(input);
        if relative.is_empty() {
            println!("{}", self.painter.red("invalid command or path"));
            return;
        }
        if relative.len() > 1 {
            println!(
                "{}",
                self.painter
                    .red("cannot navigate multiple levels at once; enter a single key or index")
            );
            return;
        }

        let segment = relative[0].clone();
        let in_array = matches!(self.document.get(&self.path), Some(Value::Array(_)));
        if in_array && segment.parse::<usize>().is_err() {
            println!(
                "{}",
                self.painter
                    .red("currently in an array; use a numeric index to navigate")
            );
            return;
        }

        let target = self.resolve_relative(&segment);
        match self.document.get(&target) {
            Some(Value::Object(_) | Value::Array(_)) => self.path.push(segment),
            Some(Value::Null) => {
                println!(
                    "{}",
                    self.painter
                        .red(&format!("'{segment}' exists but its value is null"))
                );
            }
            Some(other) => {
                println!(
                    "{}",
                    self.painter.red(&format!(
                        "'{segment}' is a {}, not a container; use 'show {segment}' to view or '{segment}=<value>' to modify",
                        type_name(other)
                    ))
                );
            }
            None => {
                let message = if in_array {
                    format!("index '{segment}' is out of range")
                } else {
                    format!("key '{segment}' not found")
                };
                println!("{}", self.painter.red(&message));
            }
        }
    }
}

/// Parse `a.b[0].c` style input into path segments.
fn parse_path(input: &str) -> Vec<String> {
    input
        .replace(['[', ']'], ".")
        .split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a console line into at most three fields, so values with embedded
/// whitespace survive in the final one.
fn split_command(line: &str) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut rest = line.trim();
    while parts.len() < 2 && !rest.is_empty() {
        match rest.find(char::is_whitespace) {
            Some(pos) => {
                parts.push(rest[..pos].to_string());
                rest = rest[pos..].trim_start();
            }
            None => {
                parts.push(rest.to_string());
                rest = "";
            }
        }
    }
    if !rest.is_empty() {
        parts.push(rest.to_string());
    }
    parts
}
