use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod engine;
mod error;
mod repl;
mod script;
mod term;

use config::{Document, Settings};
use engine::RhaiEngine;
use error::{FatalError, FatalKind};
use repl::{Repl, RustylineReader, SessionEnd};
use script::FileSession;
use term::Painter;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--version" || a == "-v") {
        let painter = Painter::new(resolve_colors(config::config_file()));
        println!(
            "{}",
            painter.magenta(&format!("version: {}", env!("CARGO_PKG_VERSION")))
        );
        return ExitCode::SUCCESS;
    }
    if args.iter().any(|a| a == "--credits" || a == "-c") {
        let painter = Painter::new(resolve_colors(config::config_file()));
        println!("{}", painter.magenta("created by the rill contributors"));
        return ExitCode::SUCCESS;
    }

    match run() {
        Ok(code) => code,
        Err(fatal) => {
            eprintln!("{fatal}");
            ExitCode::from(fatal.exit_code())
        }
    }
}

/// The `enable-colors` toggle, read best-effort for output printed outside a
/// session. A missing or unreadable config leaves colors on.
fn resolve_colors(config_path: Option<PathBuf>) -> bool {
    config_path
        .and_then(|path| Document::load(path).ok())
        .map(|document| Settings::from_document(document.data()).enable_colors)
        .unwrap_or(true)
}

fn run() -> Result<ExitCode, FatalError> {
    let config_path = config::config_file().unwrap_or_else(|| PathBuf::from("config.json"));
    let config_missing = !config_path.exists();

    let document = Document::load(config_path.clone())?;
    let settings = Settings::from_document(document.data());
    let painter = Painter::new(settings.enable_colors);

    if config_missing {
        println!(
            "{}",
            painter.red(&format!(
                "config file not found at '{}'; using defaults",
                config_path.display()
            ))
        );
    }

    let scripts_dir = config::scripts_dir().unwrap_or_else(|| PathBuf::from("scripts"));
    let session = FileSession::new(scripts_dir);

    let mut reader = RustylineReader::new()
        .map_err(|e| FatalError::new(FatalKind::Unknown, "terminal initialization failed", e))?;

    let mut repl = Repl::new(RhaiEngine::new(), session, document, settings);

    match repl.run(&mut reader) {
        Ok(SessionEnd::Quit) => {
            repl.close_session();
            Ok(ExitCode::SUCCESS)
        }
        Ok(SessionEnd::Interrupted) => {
            repl.close_session();
            Ok(ExitCode::from(1))
        }
        Err(fatal) => {
            repl.shutdown();
            Err(fatal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn colors_follow_the_config_toggle() {
        let dir = std::env::temp_dir().join(format!("rill-colors-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        fs::write(&path, r#"{"enable-colors": false}"#).unwrap();

        assert!(!resolve_colors(Some(path)));
        assert!(resolve_colors(Some(dir.join("missing.json"))));
        assert!(resolve_colors(None));

        let _ = fs::remove_dir_all(&dir);
    }
}
