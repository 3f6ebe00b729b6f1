//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 永続化の詳細（ファイル、メモリ）は impls 側に閉じ込めます。
//!
//! # 設計原則
//! - Checkpoint は単一ライター（lease を持つ者だけが commit できる）
//! - 割り当て表（ledger）が正本で、Checkpoint はそこから再構築可能

pub mod checkpoint_store;
pub mod ledger;

// 主要な trait を再エクスポート
pub use self::checkpoint_store::{CheckpointLease, CheckpointStore};
pub use self::ledger::AssignmentLedger;
