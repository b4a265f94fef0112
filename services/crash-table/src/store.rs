//! Wallet persistence.
//!
//! Balances live in a single JSON object keyed by wallet id. Writes go to a sibling temp
//! file that is then renamed over the original, so a crash mid-write leaves the previous
//! file intact.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub trait WalletStore {
    /// Stored balance for `id`, or `None` for an unknown wallet.
    fn load(&self, id: &str) -> Result<Option<f64>>;

    fn save(&mut self, id: &str, balance: f64) -> Result<()>;
}

/// `{ "<wallet id>": <balance> }` on disk.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, f64>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = fs::read(&self.path).context("Failed to read wallet file")?;
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&data).context("Failed to parse wallet file")
    }
}

impl WalletStore for JsonFileStore {
    fn load(&self, id: &str) -> Result<Option<f64>> {
        Ok(self.read_all()?.get(id).copied())
    }

    fn save(&mut self, id: &str, balance: f64) -> Result<()> {
        let mut wallets = self.read_all()?;
        wallets.insert(id.to_string(), balance);
        let data = serde_json::to_vec_pretty(&wallets).context("Failed to serialize wallets")?;
        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        fs::write(&tmp_path, data).context("Failed to write wallet file")?;
        fs::rename(&tmp_path, &self.path).context("Failed to replace wallet file")?;
        Ok(())
    }
}

/// Keeps balances for the lifetime of the process only.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    wallets: BTreeMap<String, f64>,
}

impl WalletStore for MemoryStore {
    fn load(&self, id: &str) -> Result<Option<f64>> {
        Ok(self.wallets.get(id).copied())
    }

    fn save(&mut self, id: &str, balance: f64) -> Result<()> {
        self.wallets.insert(id.to_string(), balance);
        Ok(())
    }
}

/// File store when a path is configured, memory otherwise.
pub fn open_store(path: Option<&Path>) -> Box<dyn WalletStore + Send> {
    match path {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::default()),
    }
}
