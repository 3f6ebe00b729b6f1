//! Scheduler - 週次スケジューリングのコマンド実行
//!
//! # 学習ポイント
//! - ports（CheckpointStore, AssignmentLedger）を組み合わせるだけで、
//!   割り当て・状態遷移のロジックは domain / assign 側の純粋関数に任せる
//! - 起動時検証（Fail-fast 設計）: contract と roster の不整合は new() で弾く
//!
//! # 書き込み順序
//! 台帳（ledger）が正本なので、どの操作も ledger を先に更新し、
//! そのあと Checkpoint を commit します。途中で失敗しても
//! `rebuild_from_ledger` で Checkpoint を台帳に揃え直せます。

use rand::Rng;

use crate::assign;
use crate::domain::{Checkpoint, QuotaContract, RotaError, Roster, StateError, TableRow, WeekPlan};
use crate::ports::{AssignmentLedger, CheckpointStore};

/// Scheduler は roster・contract・store・ledger を束ねる
///
/// # 使用例
/// ```ignore
/// let scheduler = Scheduler::new(roster, contract, store, ledger)?;
/// let plan = scheduler.run_next_week(&mut rng).await?;
/// ```
pub struct Scheduler<S, L> {
    roster: Roster,
    contract: QuotaContract,
    store: S,
    ledger: L,
}

impl<S, L> Scheduler<S, L>
where
    S: CheckpointStore,
    L: AssignmentLedger,
{
    /// contract が roster の全グループを扱えることを確認してから構築する
    pub fn new(
        roster: Roster,
        contract: QuotaContract,
        store: S,
        ledger: L,
    ) -> Result<Self, RotaError> {
        contract.validate_for(&roster)?;
        Ok(Self {
            roster,
            contract,
            store,
            ledger,
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn contract(&self) -> &QuotaContract {
        &self.contract
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// 最後に commit された状態（lock は取らない）
    pub async fn checkpoint(&self) -> Result<Checkpoint, RotaError> {
        Ok(self.store.snapshot().await?)
    }

    /// 次の週を割り当てて確定する。
    /// 保存済みの Checkpoint が履歴と食い違っていれば、何も書かずに失敗する。
    pub async fn run_next_week<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<WeekPlan, RotaError> {
        let lease = self.store.acquire().await?;
        let current = lease.checkpoint();
        current.verify()?;
        if current.current_week() >= self.contract.num_weeks {
            return Err(StateError::SemesterComplete {
                num_weeks: self.contract.num_weeks,
            }
            .into());
        }

        let plan = assign::plan_next_week(current, &self.roster, &self.contract, rng)?;
        let next = current.apply(&plan.delta())?;

        self.ledger
            .append(TableRow::from_assignment(plan.week, &plan.assignment()))
            .await?;
        lease.commit(next).await?;

        tracing::info!(
            week = plan.week,
            people = plan.placements.len(),
            degraded = plan.degraded().count(),
            "week committed"
        );
        Ok(plan)
    }

    /// 最大 `count` 週を順に実行する。学期末に達したらそこで止まる。
    pub async fn run_weeks<R: Rng + ?Sized>(
        &self,
        count: u32,
        rng: &mut R,
    ) -> Result<Vec<WeekPlan>, RotaError> {
        let done = self.checkpoint().await?.current_week();
        let remaining = self.contract.num_weeks.saturating_sub(done);
        let mut plans = Vec::new();
        for _ in 0..count.min(remaining) {
            plans.push(self.run_next_week(rng).await?);
        }
        Ok(plans)
    }

    /// 学期末まで全週を実行する
    pub async fn run_remaining<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<WeekPlan>, RotaError> {
        self.run_weeks(u32::MAX, rng).await
    }

    /// 直近の週を取り消す。台帳の該当行も削除する。
    pub async fn rollback_last_week(&self) -> Result<Checkpoint, RotaError> {
        let lease = self.store.acquire().await?;
        lease.checkpoint().verify()?;
        let removed = lease.checkpoint().current_week();
        let previous = lease.checkpoint().rollback()?;

        self.ledger.truncate_to(previous.current_week()).await?;
        lease.commit(previous.clone()).await?;

        tracing::info!(week = removed, "week rolled back");
        Ok(previous)
    }

    /// 台帳だけから Checkpoint を作り直す（既存の内容は捨てる）
    pub async fn rebuild_from_ledger(&self) -> Result<Checkpoint, RotaError> {
        let lease = self.store.acquire().await?;
        let table = self.ledger.load().await?;
        let rebuilt = table.rebuild()?;

        if let Some(detail) = lease.checkpoint().first_difference(&rebuilt) {
            tracing::warn!(%detail, "stored checkpoint disagreed with ledger");
        }
        if rebuilt.current_week() > self.contract.num_weeks {
            tracing::warn!(
                weeks = rebuilt.current_week(),
                num_weeks = self.contract.num_weeks,
                "ledger runs past the semester"
            );
        }
        lease.commit(rebuilt.clone()).await?;

        tracing::info!(weeks = rebuilt.current_week(), "checkpoint rebuilt from ledger");
        Ok(rebuilt)
    }

    /// Checkpoint が自身の履歴とも台帳とも一致しているか確認する
    pub async fn verify(&self) -> Result<Checkpoint, RotaError> {
        let checkpoint = self.checkpoint().await?;
        checkpoint.verify()?;

        let from_ledger = self.ledger.load().await?.rebuild()?;
        if let Some(detail) = checkpoint.first_difference(&from_ledger) {
            return Err(StateError::Diverged {
                source_name: "the ledger",
                detail,
            }
            .into());
        }
        Ok(checkpoint)
    }

    /// 学期を最初からやり直す（空の Checkpoint、空の台帳）
    pub async fn reset(&self) -> Result<(), RotaError> {
        let lease = self.store.acquire().await?;
        let discarded = lease.checkpoint().current_week();
        self.ledger.truncate_to(0).await?;
        lease.commit(Checkpoint::empty()).await?;
        tracing::info!(discarded, "semester reset");
        Ok(())
    }
}
