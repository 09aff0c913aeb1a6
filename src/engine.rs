use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to launch engine {path:?}: {source}")]
    Spawn { path: String, source: std::io::Error },
    #[error("engine closed its pipe unexpectedly")]
    Closed,
    #[error("engine i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("engine returned no usable move: {line:?}")]
    NullMove { line: String },
}

/// Client side of the UCI protocol for a spawned engine process.
#[derive(Debug)]
pub struct UciEngine {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    name: String,
}

impl UciEngine {
    /// Spawn the engine and run the `uci`/`isready` handshake.
    pub fn launch(program: &str, args: &[&str]) -> Result<Self, EngineError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Spawn { path: program.to_string(), source })?;
        let stdin = child.stdin.take().ok_or(EngineError::Closed)?;
        let stdout = BufReader::new(child.stdout.take().ok_or(EngineError::Closed)?);
        let mut engine = Self { child, stdin, stdout, name: program.to_string() };
        engine.handshake()?;
        Ok(engine)
    }

    fn handshake(&mut self) -> Result<(), EngineError> {
        self.send("uci")?;
        loop {
            let line = self.read_line()?;
            if let Some(rest) = line.strip_prefix("id name ") {
                self.name = rest.trim().to_string();
            }
            if line == "uciok" {
                break;
            }
        }
        self.send("isready")?;
        self.wait_for("readyok")
    }

    fn send(&mut self, command: &str) -> Result<(), EngineError> {
        debug!("uci> {command}");
        writeln!(self.stdin, "{command}")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(EngineError::Closed);
        }
        let line = line.trim().to_string();
        debug!("uci< {line}");
        Ok(line)
    }

    fn wait_for(&mut self, token: &str) -> Result<(), EngineError> {
        loop {
            if self.read_line()? == token {
                return Ok(());
            }
        }
    }

    /// Name the engine reported during the handshake.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask for a move from `fen` within a fixed thinking-time budget.
    pub fn best_move(&mut self, fen: &str, movetime: Duration) -> Result<String, EngineError> {
        self.send(&format!("position fen {fen}"))?;
        self.send(&format!("go movetime {}", movetime.as_millis()))?;
        loop {
            let line = self.read_line()?;
            if let Some(rest) = line.strip_prefix("bestmove ") {
                let mv = rest.split_whitespace().next().unwrap_or_default();
                if mv.is_empty() || mv == "0000" || mv == "(none)" {
                    return Err(EngineError::NullMove { line });
                }
                return Ok(mv.to_string());
            }
            if line == "bestmove" {
                return Err(EngineError::NullMove { line });
            }
        }
    }

    /// Reset engine state between games.
    pub fn new_game(&mut self) -> Result<(), EngineError> {
        self.send("ucinewgame")?;
        self.send("isready")?;
        self.wait_for("readyok")
    }

    /// Tell the engine to exit and reap the process.
    pub fn quit(mut self) -> Result<(), EngineError> {
        self.send("quit")?;
        self.child.wait()?;
        Ok(())
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        if matches!(self.child.try_wait(), Ok(None)) {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
