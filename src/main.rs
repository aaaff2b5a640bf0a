//! Agent Court 入口：加载配置与案例，逐个案例运行庭审模拟。

use std::path::PathBuf;
use std::sync::Arc;

use agent_court::config::load_config;
use agent_court::court::load_cases;
use agent_court::observability::{self, ConsolePresenter, TracingObserver};
use agent_court::SimulationBuilder;
use anyhow::Context;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "agent-court", about = "Run simulated court sessions over a case file")]
struct Cli {
    /// 配置文件（叠加在 config/default.toml 之上）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 案例文件（JSONL），覆盖 app.case_file
    #[arg(long)]
    case: Option<PathBuf>,

    /// 日志级别：trace / debug / info / warn / error
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 以 info 级别输出 Agent 的思考过程
    #[arg(long)]
    log_think: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    observability::init(Some(cli.log_level.as_str()));

    let mut cfg = load_config(cli.config.clone()).context("Failed to load config")?;
    if let Some(case) = cli.case {
        cfg.app.case_file = case;
    }
    cfg.app.log_think |= cli.log_think;

    let cases = load_cases(&cfg.app.case_file, cfg.app.case_limit)
        .with_context(|| format!("Failed to load cases from {}", cfg.app.case_file.display()))?;

    let mut simulation = SimulationBuilder::new(cfg)
        .build()
        .context("Failed to set up court simulation")?;
    simulation.add_observer(Arc::new(ConsolePresenter));
    simulation.add_observer(Arc::new(TracingObserver));

    let outcomes = simulation.run(&cases).await.context("Court simulation aborted")?;
    for outcome in &outcomes {
        tracing::info!(
            case = outcome.case_index + 1,
            turns = outcome.turns,
            debate_rounds = outcome.debate_rounds,
            plaintiff_legal_reference = outcome.plaintiff.legal_reflection.needed_reference,
            defendant_legal_reference = outcome.defendant.legal_reflection.needed_reference,
            "Case completed"
        );
    }
    tracing::info!(completed = outcomes.len(), total = cases.len(), "Simulation finished");
    Ok(())
}
