use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory holding a config file and its database.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn database(&self) -> PathBuf {
        self.dir.path().join("ledger.db")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("oddsledger.toml")
    }

    /// Write a config pointing at this workspace's database, followed by
    /// `sections`.
    pub fn write_config(&self, sections: &str) -> PathBuf {
        let path = self.config_path();
        let contents = format!(
            "database = {:?}\n\n{sections}",
            self.database().display().to_string()
        );
        fs::write(&path, contents).expect("write temp config");
        path
    }

    /// Config granting `operator` every role.
    pub fn write_default_config(&self) -> PathBuf {
        self.write_config(concat!(
            "[ledger]\n",
            "fee_recipient = \"treasury\"\n",
            "\n",
            "[roles]\n",
            "administrators = [\"operator\"]\n",
            "resolvers = [\"oracle\"]\n",
        ))
    }
}
