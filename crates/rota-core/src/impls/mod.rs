//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryCheckpointStore / InMemoryLedger**: テスト用
//! - **FileCheckpointStore / FileLedger**: CLI が使う JSON ファイル実装
//!
//! ファイル実装はどちらも「一時ファイルに書いて rename」で原子的に置き換え、
//! 書き込み中は隣の `.lock` ファイルに advisory lock を取ります。

mod fsio;
pub mod file_ledger;
pub mod file_store;
pub mod inmem_ledger;
pub mod inmem_store;

// 主要な型を再エクスポート
pub use self::file_ledger::FileLedger;
pub use self::file_store::FileCheckpointStore;
pub use self::inmem_ledger::InMemoryLedger;
pub use self::inmem_store::InMemoryCheckpointStore;
