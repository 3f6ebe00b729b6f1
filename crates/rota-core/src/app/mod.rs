//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **Scheduler**: 週の実行・rollback・rebuild・verify・reset
//! - **Summary**: 学期の集計と違反の一覧

pub mod scheduler;
pub mod summary;

// 主要な型を再エクスポート
pub use self::scheduler::Scheduler;
pub use self::summary::{Deviation, IllegalAssignment, IllegalReason, PersonTally, Summary};
