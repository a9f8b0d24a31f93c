// ==========================================
// 列车投运排班系统 - 命令行入口
// ==========================================
// 用法: train-induction [db_path] [--weighted] [--export <csv>] [--date <YYYY-MM-DD>]
// 环境变量: TRAIN_INDUCTION_DB_PATH / TRAIN_INDUCTION_LOG_FORMAT / RUST_LOG
// 流程: 载入演示车队 → 执行排班 → 打印计划与冲突 → 可选导出 CSV
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use train_induction::api::{fixed_clock, Operator};
use train_induction::app::{demo_fact_store, get_default_db_path, AppState};
use train_induction::domain::types::UserRole;

#[derive(Debug, Default)]
struct CliArgs {
    db_path: Option<String>,
    weighted: bool,
    export: Option<String>,
    date: Option<NaiveDate>,
}

fn parse_args() -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--weighted" => parsed.weighted = true,
            "--export" => {
                let path = args.next().context("--export 需要输出文件路径")?;
                parsed.export = Some(path);
            }
            "--date" => {
                let raw = args.next().context("--date 需要日期参数")?;
                let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .with_context(|| format!("日期格式错误: {}", raw))?;
                parsed.date = Some(date);
            }
            flag if flag.starts_with("--") => bail!("未知参数: {}", flag),
            path => {
                if parsed.db_path.is_some() {
                    bail!("只能指定一个数据库路径: {}", path);
                }
                parsed.db_path = Some(path.to_string());
            }
        }
    }

    Ok(parsed)
}

fn main() -> Result<()> {
    // TRAIN_INDUCTION_LOG_FORMAT=json 输出 JSON 行
    match std::env::var("TRAIN_INDUCTION_LOG_FORMAT").as_deref() {
        Ok("json") => train_induction::logging::init_json(),
        _ => train_induction::logging::init(),
    }

    let args = parse_args()?;
    let db_path = args.db_path.clone().unwrap_or_else(get_default_db_path);

    tracing::info!("==================================================");
    tracing::info!("{}", train_induction::SYSTEM_NAME);
    tracing::info!("系统版本: {}", train_induction::VERSION);
    tracing::info!("使用数据库: {}", db_path);
    tracing::info!("==================================================");

    let now: NaiveDateTime = match args.date {
        Some(date) => date.and_time(NaiveTime::MIN),
        None => Local::now().naive_local(),
    };

    let facts = demo_fact_store(now).context("演示数据初始化失败")?;
    let weighted = args.weighted;
    let state = AppState::build(db_path, facts, fixed_clock(now), move |config| {
        if weighted {
            config.weighted()
        } else {
            config
        }
    })?;

    let operator = Operator::new("cli", UserRole::DepotSupervisor);
    let run = state.induction_api.run_scheduler(&operator)?;

    println!(
        "Induction plan {} ({} mode, {})",
        run.plan.plan_id,
        run.plan.mode,
        now.format("%Y-%m-%d %H:%M")
    );
    println!(
        "{:>4}  {:<6} {:<8} {:>5}  {:<6}  Reasons",
        "Rank", "Train", "Action", "Cost", "Risk"
    );
    for entry in &run.plan.entries {
        println!(
            "{:>4}  {:<6} {:<8} {:>5}  {:<6}  {}",
            entry.rank,
            entry.train_id,
            entry.recommended_action,
            entry.shunt_cost,
            entry.predicted_risk,
            entry.reasons.join("; ")
        );
    }

    println!();
    println!("Conflicts ({})", run.conflicts.len());
    for conflict in &run.conflicts {
        println!(
            "  [{}] {} {}: {}",
            conflict.severity, conflict.conflict_type, conflict.train_id, conflict.description
        );
    }

    let summary = state.induction_api.fleet_summary()?;
    println!();
    println!(
        "Service {} / Standby {} / IBL {}  availability {}%",
        summary.service, summary.standby, summary.ibl, summary.availability_pct
    );

    if let Some(path) = args.export {
        state.induction_api.export_plan(&path)?;
        println!("Plan exported to {}", path);
    }

    Ok(())
}
