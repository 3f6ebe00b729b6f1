//! `rota rollback`, `rota rebuild`, `rota verify`

use anyhow::Result;

use crate::workspace::Workspace;

pub async fn rollback(ws: &Workspace) -> Result<()> {
    let checkpoint = ws.scheduler()?.rollback_last_week().await?;
    println!("rolled back; {} week(s) remain scheduled", checkpoint.current_week());
    Ok(())
}

pub async fn rebuild(ws: &Workspace) -> Result<()> {
    let checkpoint = ws.scheduler()?.rebuild_from_ledger().await?;
    println!("rebuilt checkpoint from {} week(s)", checkpoint.current_week());
    Ok(())
}

pub async fn verify(ws: &Workspace) -> Result<()> {
    let checkpoint = ws.scheduler()?.verify().await?;
    println!("ok: {} week(s) consistent", checkpoint.current_week());
    Ok(())
}
