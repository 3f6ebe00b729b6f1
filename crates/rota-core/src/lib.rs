//! rota-core
//!
//! Core building blocks for the weekly cleanup rota.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（names, group, roster, contract, semester, plan, checkpoint, table, errors）
//! - **assign**: 週ごとの割り当てアルゴリズム（純粋関数、乱数は注入）
//! - **ports**: 抽象化レイヤー（CheckpointStore, AssignmentLedger）
//! - **impls**: 実装（InMemory / File）
//! - **app**: アプリケーションロジック（Scheduler, Summary）

pub mod app;
pub mod assign;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{Scheduler, Summary};
pub use domain::{ErrorKind, RotaError};
