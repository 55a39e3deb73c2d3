// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process invocation descriptor — executable, argv, and working
//! directory for a spawned worker.

use std::path::PathBuf;

/// Describes how to spawn a worker process. The supervisor never
/// interprets `argv` beyond passing it to the OS; it owns no knowledge
/// of the interpreter's command-line surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoker {
    executable: PathBuf,
    argv: Vec<String>,
}

impl Invoker {
    pub fn new(executable: impl Into<PathBuf>, argv: Vec<String>) -> Self {
        Self { executable: executable.into(), argv }
    }

    pub fn executable(&self) -> &PathBuf {
        &self.executable
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

impl std::fmt::Display for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.executable.display())?;
        for arg in &self.argv {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
