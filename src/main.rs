// ==========================================
// 魔法搬运调度系统 - 运维入口
// ==========================================
// 职责: 初始化日志 → 打开数据库（幂等建表）→ 输出搬运者排行 (JSON)
// ==========================================

use anyhow::{anyhow, Context, Result};
use magic_mover::app::{get_default_db_path, AppState};
use magic_mover::logging;

fn main() -> Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", magic_mover::APP_NAME, magic_mover::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    let top_movers = app_state
        .mover_api
        .list_top_movers()
        .context("读取搬运者排行失败")?;

    println!("{}", serde_json::to_string_pretty(&top_movers)?);
    Ok(())
}
