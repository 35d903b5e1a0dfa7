//! Shared integration-test harness for running the `vague` binary with an
//! isolated preference location.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// An isolated environment for one CLI invocation sequence.
///
/// `HOME` and `XDG_CONFIG_HOME` point into a temporary directory so stored
/// preferences never touch the real user profile.
pub struct VagueProcess {
    home: TempDir,
}

impl VagueProcess {
    /// Creates a fresh isolated environment.
    #[allow(clippy::missing_panics_doc)]
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("failed to create temp home"),
        }
    }

    /// Temporary home directory.
    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// Preference file used when `--prefs` is not given.
    pub fn default_prefs_path(&self) -> PathBuf {
        self.home.path().join("config").join("vague").join("prefs.json")
    }

    /// Runs `vague` with `args` and waits for it to exit.
    #[allow(clippy::missing_panics_doc)]
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_vague"))
            .args(args)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join("config"))
            .env("LANG", "en_US.UTF-8")
            .env_remove("LC_ALL")
            .env_remove("VAGUE_LOG_LEVEL")
            .env_remove("VAGUE_CONFIG")
            .env_remove("VAGUE_PREFS")
            .output()
            .expect("failed to run vague")
    }

    /// Runs `vague` and asserts success, returning stdout.
    #[allow(clippy::missing_panics_doc)]
    pub fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "vague {args:?} should exit 0: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}

/// Reads a JSONL file into values.
#[allow(clippy::missing_panics_doc)]
pub fn read_jsonl(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .expect("events file should exist")
        .lines()
        .filter(|l| !l.is_empty())
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("invalid JSON: {e}\nline: {l}")))
        .collect()
}
