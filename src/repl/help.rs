use super::reader::{LineReader, ReadEvent};
use crate::term::Painter;

const HELP_TEXT: &str = include_str!("help.txt");
const BOOK_URL: &str = "https://rhai.rs/book/";

/// Map a `help <topic>` argument onto its chapter heading in the manual.
fn chapter_title(topic: &str) -> Option<&'static str> {
    match topic {
        "all" => Some("all"),
        "intro" => Some("rill User Manual"),
        "cmdline-args" => Some("Command Line Arguments"),
        "internal-cmds" => Some("Internal Commands"),
        "coding" => Some("Coding"),
        "examples" => Some("Long Code Examples"),
        "note" => Some("Note"),
        _ => None,
    }
}

fn chapter_lines(title: &str) -> Vec<String> {
    if title == "all" {
        return HELP_TEXT.lines().map(str::to_string).collect();
    }

    let mut lines = vec!["-".repeat(80)];
    let mut in_chapter = false;
    for line in HELP_TEXT.lines() {
        if line.starts_with(title) {
            in_chapter = true;
        }
        if in_chapter {
            lines.push(line.to_string());
            if line.ends_with("---") {
                break;
            }
        }
    }
    lines
}

/// Page the requested help chapter one line per Enter; `return` (or `r`)
/// goes straight back to the REPL.
pub fn show<R: LineReader>(reader: &mut R, painter: &Painter, topic: &str) {
    let topic = topic.trim_matches(|c| c == '"' || c == '\'');
    let Some(title) = chapter_title(topic) else {
        println!(
            "{}",
            painter.cyan(&format!(
                "no built-in help for '{topic}'; see the Rhai book at {BOOK_URL}"
            ))
        );
        return;
    };

    let prompt =
        painter.cyan("Press Enter to show the next line, type 'return' to go back to the REPL...");
    if !matches!(reader.read_line(&prompt), ReadEvent::Line(_)) {
        return;
    }

    for line in chapter_lines(title) {
        match reader.read_line(&line) {
            ReadEvent::Line(input) => {
                let input = input.trim().to_lowercase();
                if input == "return" || input == "r" {
                    return;
                }
            }
            _ => return,
        }
    }

    let _ = reader.read_line(&painter.cyan("Press Enter to continue..."));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_topic_has_a_chapter() {
        for topic in [
            "intro",
            "cmdline-args",
            "internal-cmds",
            "coding",
            "examples",
            "note",
        ] {
            let title = chapter_title(topic).unwrap();
            let lines = chapter_lines(title);
            // Divider plus heading plus at least one body line.
            assert!(lines.len() > 2, "chapter '{topic}' is empty");
        }
    }

    #[test]
    fn chapters_stop_at_the_divider() {
        let lines = chapter_lines("Command Line Arguments");
        assert!(lines.last().unwrap().ends_with("---"));
        assert!(!lines.iter().any(|l| l.starts_with("Internal Commands")));
    }

    #[test]
    fn unknown_topic_has_no_chapter() {
        assert!(chapter_title("mystery").is_none());
    }
}
