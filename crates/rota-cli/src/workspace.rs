//! Files in a rota directory and how to open them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rota_core::domain::{QuotaContract, Roster, SemesterConfig};
use rota_core::impls::{FileCheckpointStore, FileLedger};
use rota_core::Scheduler;

pub const CONFIG_FILE: &str = "rota.toml";
pub const ROSTER_FILE: &str = "roster.toml";
pub const CONTRACT_FILE: &str = "contract.json";

pub type FileScheduler = Scheduler<FileCheckpointStore, FileLedger>;

#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn read(&self, file: &str) -> Result<String> {
        let path = self.path(file);
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
    }

    pub fn config(&self) -> Result<SemesterConfig> {
        let text = self.read(CONFIG_FILE)?;
        SemesterConfig::from_toml(&text).with_context(|| format!("loading {CONFIG_FILE}"))
    }

    pub fn roster(&self) -> Result<Roster> {
        let text = self.read(ROSTER_FILE)?;
        Roster::from_toml(&text).with_context(|| format!("loading {ROSTER_FILE}"))
    }

    /// The contract written by `rota init`.
    pub fn contract(&self) -> Result<QuotaContract> {
        let text = self
            .read(CONTRACT_FILE)
            .context("no quota contract yet; run `rota init` first")?;
        QuotaContract::from_json(&text).with_context(|| format!("loading {CONTRACT_FILE}"))
    }

    pub fn write_contract(&self, contract: &QuotaContract) -> Result<()> {
        let path = self.path(CONTRACT_FILE);
        let text = serde_json::to_string_pretty(contract)?;
        std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))
    }

    pub fn store(&self) -> FileCheckpointStore {
        FileCheckpointStore::in_dir(&self.dir)
    }

    pub fn ledger(&self) -> FileLedger {
        FileLedger::in_dir(&self.dir)
    }

    /// Scheduler over the roster and the stored contract.
    pub fn scheduler(&self) -> Result<FileScheduler> {
        self.scheduler_with(self.contract()?)
    }

    pub fn scheduler_with(&self, contract: QuotaContract) -> Result<FileScheduler> {
        Ok(Scheduler::new(
            self.roster()?,
            contract,
            self.store(),
            self.ledger(),
        )?)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rota_core::domain::Group;

    const DEMO_CONFIG: &str = include_str!("../../../demos/rota.toml");
    const DEMO_ROSTER: &str = include_str!("../../../demos/roster.toml");

    fn demo_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), DEMO_CONFIG).unwrap();
        std::fs::write(dir.path().join(ROSTER_FILE), DEMO_ROSTER).unwrap();
        dir
    }

    #[test]
    fn demo_files_derive_a_contract() {
        let dir = demo_dir();
        let ws = Workspace::new(dir.path());
        let roster = ws.roster().unwrap();
        let contract = ws.config().unwrap().derive_contract(&roster).unwrap();

        assert_eq!(roster.len(), 14);
        assert_eq!(roster.get("hal").unwrap().group, Group::OutOfHouse);
        assert_eq!(contract.num_weeks, 17);
        assert_eq!(contract.total_slots(), 14);
        let second = contract.base_for(Group::SecondDeck).unwrap();
        assert!(!second.contains_key("bathroom_3"));
    }

    #[tokio::test]
    async fn contract_roundtrips_through_the_directory() {
        let dir = demo_dir();
        let ws = Workspace::new(dir.path());
        assert!(ws.contract().is_err());

        let contract = ws.config().unwrap().derive_contract(&ws.roster().unwrap()).unwrap();
        ws.write_contract(&contract).unwrap();
        assert_eq!(ws.contract().unwrap(), contract);

        let scheduler = ws.scheduler().unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let plans = scheduler.run_weeks(2, &mut rng).await.unwrap();
        assert_eq!(plans.len(), 2);
        scheduler.verify().await.unwrap();
    }
}
