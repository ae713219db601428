use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

/// What the single script-file handle is currently being used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileOp {
    #[default]
    Idle,
    Write,
    Append,
    Read,
    Delete,
}

impl FileOp {
    /// Parse a command word into a file operation.
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "write" => Some(FileOp::Write),
            "append" => Some(FileOp::Append),
            "read" => Some(FileOp::Read),
            "delete" => Some(FileOp::Delete),
            _ => None,
        }
    }
}

/// File-based script capture and replay.
///
/// At most one handle is open per session; a new open is rejected until the
/// active one is closed. Delete acts immediately and returns to idle.
pub struct FileSession {
    scripts_dir: PathBuf,
    op: FileOp,
    writer: Option<File>,
    reader: Option<BufReader<File>>,
}

impl FileSession {
    pub fn new(scripts_dir: PathBuf) -> Self {
        Self {
            scripts_dir,
            op: FileOp::Idle,
            writer: None,
            reader: None,
        }
    }

    pub fn op(&self) -> FileOp {
        self.op
    }

    pub fn is_active(&self) -> bool {
        self.op != FileOp::Idle
    }

    /// True while completed blocks should be captured instead of executed.
    pub fn is_capturing(&self) -> bool {
        matches!(self.op, FileOp::Write | FileOp::Append)
    }

    pub fn is_reading(&self) -> bool {
        self.op == FileOp::Read
    }

    /// Open a script file for the given operation. Fails without touching an
    /// already-active session.
    pub fn open(&mut self, op: FileOp, name: &str) -> Result<String, String> {
        if self.op != FileOp::Idle {
            return Err("a file is already open; close it before opening another".to_string());
        }

        let path = self.scripts_dir.join(name);

        match op {
            FileOp::Write | FileOp::Append => {
                fs::create_dir_all(&self.scripts_dir)
                    .map_err(|e| format!("cannot create scripts directory: {e}"))?;
                let file = if op == FileOp::Write {
                    File::create(&path)
                } else {
                    OpenOptions::new().create(true).append(true).open(&path)
                }
                .map_err(|e| format!("cannot open '{}': {e}", path.display()))?;
                self.writer = Some(file);
                self.op = op;
                Ok(String::new())
            }
            FileOp::Read => {
                let file = File::open(&path)
                    .map_err(|_| format!("file '{}' not found", path.display()))?;
                self.reader = Some(BufReader::new(file));
                self.op = FileOp::Read;
                Ok(String::new())
            }
            FileOp::Delete => {
                if path.exists() {
                    fs::remove_file(&path)
                        .map_err(|e| format!("cannot delete '{}': {e}", path.display()))?;
                    Ok(format!("file '{}' deleted successfully", path.display()))
                } else {
                    Err(format!("file '{}' not found", path.display()))
                }
            }
            FileOp::Idle => Err("no file operation given".to_string()),
        }
    }

    /// Close the handle and return to idle. Safe to call when already idle.
    pub fn close(&mut self) {
        self.writer = None;
        self.reader = None;
        self.op = FileOp::Idle;
    }

    /// Capture a completed block. Returns false when no capture is active.
    pub fn write(&mut self, block: &str) -> bool {
        if !self.is_capturing() {
            return false;
        }
        match self.writer.as_mut() {
            Some(file) => writeln!(file, "{block}").is_ok(),
            None => false,
        }
    }

    /// Next non-blank line from the open file, or None at end of file.
    /// Blank lines are never surfaced to the caller.
    pub fn read_line(&mut self) -> Option<String> {
        let reader = self.reader.as_mut()?;
        let mut raw = String::new();
        loop {
            raw.clear();
            match reader.read_line(&mut raw) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {
                    if !raw.trim().is_empty() {
                        return Some(raw.trim_end().to_string());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rill-session-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn write_then_read_round_trip() {
        let dir = temp_dir("round-trip");
        let mut session = FileSession::new(dir.clone());

        session.open(FileOp::Write, "demo.rhai").unwrap();
        assert!(session.write("let x = 1;"));
        session.close();

        session.open(FileOp::Read, "demo.rhai").unwrap();
        assert_eq!(session.read_line(), Some("let x = 1;".to_string()));
        assert_eq!(session.read_line(), None);
        session.close();

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_skips_blank_lines() {
        let dir = temp_dir("blank-lines");
        fs::write(dir.join("gaps.rhai"), "let a = 1;\n\n   \nlet b = 2;\n\n").unwrap();

        let mut session = FileSession::new(dir.clone());
        session.open(FileOp::Read, "gaps.rhai").unwrap();
        assert_eq!(session.read_line(), Some("let a = 1;".to_string()));
        assert_eq!(session.read_line(), Some("let b = 2;".to_string()));
        assert_eq!(session.read_line(), None);
        session.close();

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn second_open_fails_without_disturbing_the_first() {
        let dir = temp_dir("exclusive");
        let mut session = FileSession::new(dir.clone());

        session.open(FileOp::Write, "one.rhai").unwrap();
        assert!(session.open(FileOp::Write, "two.rhai").is_err());
        assert_eq!(session.op(), FileOp::Write);
        assert!(session.write("let x = 1;"));
        session.close();

        assert!(dir.join("one.rhai").exists());
        assert!(!dir.join("two.rhai").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_missing_file_fails_and_stays_idle() {
        let dir = temp_dir("missing-read");
        let mut session = FileSession::new(dir.clone());

        assert!(session.open(FileOp::Read, "nope.rhai").is_err());
        assert_eq!(session.op(), FileOp::Idle);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn delete_missing_file_fails() {
        let dir = temp_dir("missing-delete");
        let mut session = FileSession::new(dir.clone());

        assert!(session.open(FileOp::Delete, "nope.rhai").is_err());
        assert_eq!(session.op(), FileOp::Idle);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn delete_returns_to_idle_immediately() {
        let dir = temp_dir("delete-idle");
        fs::write(dir.join("gone.rhai"), "let x = 1;\n").unwrap();

        let mut session = FileSession::new(dir.clone());
        session.open(FileOp::Delete, "gone.rhai").unwrap();
        assert_eq!(session.op(), FileOp::Idle);
        assert!(!dir.join("gone.rhai").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_when_idle_is_a_no_op() {
        let dir = temp_dir("idle-write");
        let mut session = FileSession::new(dir.clone());
        assert!(!session.write("let x = 1;"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn append_extends_an_existing_file() {
        let dir = temp_dir("append");
        let mut session = FileSession::new(dir.clone());

        session.open(FileOp::Write, "log.rhai").unwrap();
        assert!(session.write("let a = 1;"));
        session.close();

        session.open(FileOp::Append, "log.rhai").unwrap();
        assert!(session.write("let b = 2;"));
        session.close();

        let text = fs::read_to_string(dir.join("log.rhai")).unwrap();
        assert_eq!(text, "let a = 1;\nlet b = 2;\n");

        let _ = fs::remove_dir_all(&dir);
    }
}
