//! 庭审编排器：按固定阶段推进每个案例
//!
//! 阶段：分配角色 -> 开庭 -> 程序确认 -> 原被告陈述 -> 审判长归纳争议焦点
//! -> 辩论 N 轮 -> 判决 -> 双方律师反思 -> 写出庭审记录。
//! 每个案例完成后保存断点；中途失败时整个运行中止，重启后该案例从头重跑。

use std::sync::Arc;

use serde::Serialize;

use crate::agent::{Agent, Reflection};
use crate::config::StenographerConfig;
use crate::core::CourtError;
use crate::court::{
    CaseLogSink, CaseRecord, CheckpointStore, CourtRole, CourtScript, History, HistoryObserver,
    InMemoryCaseLog, InMemoryCheckpoint, Progress, RandomRounds, RoundPicker, Turn,
};

/// 单个案例的运行结果
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub case_index: usize,
    pub turns: usize,
    pub debate_rounds: usize,
    pub plaintiff: Reflection,
    pub defendant: Reflection,
}

pub struct CourtSimulation {
    judge: Agent,
    /// 固定顺序：[0] 为原告律师，[1] 为被告律师
    lawyers: [Agent; 2],
    stenographer: StenographerConfig,
    script: CourtScript,
    min_rounds: usize,
    max_rounds: usize,
    rounds: Box<dyn RoundPicker>,
    checkpoint: Arc<dyn CheckpointStore>,
    case_log: Arc<dyn CaseLogSink>,
    observers: Vec<Arc<dyn HistoryObserver>>,
    history: History,
}

impl CourtSimulation {
    /// 需要恰好两名律师
    pub fn new(
        judge: Agent,
        lawyers: Vec<Agent>,
        stenographer: StenographerConfig,
    ) -> Result<Self, CourtError> {
        let count = lawyers.len();
        let lawyers: [Agent; 2] = lawyers.try_into().map_err(|_| {
            CourtError::Config(format!("exactly two lawyers are required, got {}", count))
        })?;

        Ok(Self {
            judge,
            lawyers,
            stenographer,
            script: CourtScript::default(),
            min_rounds: 3,
            max_rounds: 5,
            rounds: Box::new(RandomRounds::new()),
            checkpoint: Arc::new(InMemoryCheckpoint::new()),
            case_log: Arc::new(InMemoryCaseLog::new()),
            observers: Vec::new(),
            history: History::new(),
        })
    }

    pub fn with_script(mut self, script: CourtScript) -> Self {
        self.script = script;
        self
    }

    /// 辩论轮数闭区间
    pub fn with_round_range(mut self, min: usize, max: usize) -> Result<Self, CourtError> {
        if min == 0 || min > max {
            return Err(CourtError::Config(format!(
                "invalid debate round range {}..={}",
                min, max
            )));
        }
        self.min_rounds = min;
        self.max_rounds = max;
        Ok(self)
    }

    pub fn with_round_picker(mut self, picker: Box<dyn RoundPicker>) -> Self {
        self.rounds = picker;
        self
    }

    pub fn with_checkpoint(mut self, checkpoint: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoint = checkpoint;
        self
    }

    pub fn with_case_log(mut self, case_log: Arc<dyn CaseLogSink>) -> Self {
        self.case_log = case_log;
        self
    }

    pub fn add_observer(&mut self, observer: Arc<dyn HistoryObserver>) {
        self.observers.push(observer);
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn judge(&self) -> &Agent {
        &self.judge
    }

    pub fn lawyers(&self) -> &[Agent] {
        &self.lawyers
    }

    /// 从断点处开始依次运行所有案例，返回本次运行的结果
    pub async fn run(&mut self, cases: &[CaseRecord]) -> Result<Vec<CaseOutcome>, CourtError> {
        let start = self
            .checkpoint
            .load()?
            .map_or(0, |p| p.current_case_index);
        if start > 0 {
            tracing::info!(start_index = start, "Resuming from checkpoint");
        }
        if start >= cases.len() {
            tracing::info!(total = cases.len(), "All cases already processed");
            return Ok(Vec::new());
        }

        let mut outcomes = Vec::with_capacity(cases.len() - start);
        for (index, case) in cases.iter().enumerate().skip(start) {
            let outcome = self.run_case(index, case).await?;
            self.checkpoint.save(Progress {
                current_case_index: index + 1,
            })?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// 运行单个案例并写出其庭审记录（不保存断点）
    pub async fn run_case(
        &mut self,
        index: usize,
        case: &CaseRecord,
    ) -> Result<CaseOutcome, CourtError> {
        tracing::info!(case = index + 1, "Starting case simulation");

        self.assign_roles();
        self.initialize_court();
        self.confirm_rights_and_obligations();
        self.initial_statements(case);
        self.judge_initial_question().await?;

        let picked = self.rounds.pick(self.min_rounds, self.max_rounds);
        let rounds = picked.clamp(self.min_rounds, self.max_rounds);
        if rounds != picked {
            tracing::warn!(picked, rounds, "Debate round count out of range, clamped");
        }
        self.debate_rounds(rounds).await?;

        self.final_judgment().await?;
        let (plaintiff, defendant) = self.reflect_and_summarize().await?;

        self.case_log.write(index, self.history.turns())?;
        tracing::info!(case = index + 1, turns = self.history.len(), "Case simulation finished");

        Ok(CaseOutcome {
            case_index: index,
            turns: self.history.len(),
            debate_rounds: rounds,
            plaintiff,
            defendant,
        })
    }

    /// 追加一条发言并通知观察者
    pub fn add_to_history(&mut self, speaker: CourtRole, name: &str, content: impl Into<String>) {
        let turn = Turn::new(self.script.label(speaker), name, content);
        let index = self.history.push(turn);
        if let Some(turn) = self.history.turns().get(index) {
            for observer in &self.observers {
                observer.on_turn(index, speaker, turn);
            }
        }
    }

    fn lawyer(&self, role: CourtRole) -> &Agent {
        match role {
            CourtRole::Defendant => &self.lawyers[1],
            _ => &self.lawyers[0],
        }
    }

    fn assign_roles(&mut self) {
        self.lawyers[0].set_role(CourtRole::Plaintiff);
        self.lawyers[1].set_role(CourtRole::Defendant);
        tracing::debug!(
            plaintiff = %self.lawyers[0].name(),
            defendant = %self.lawyers[1].name(),
            "Roles assigned"
        );
    }

    fn initialize_court(&mut self) {
        self.history = History::new();
        let clerk = self.stenographer.name.clone();
        let rules = self.stenographer.court_rules.clone();
        self.add_to_history(CourtRole::Clerk, &clerk, rules);

        let judge = self.judge.name().to_string();
        let opening = self.script.opening.clone();
        self.add_to_history(CourtRole::Judge, &judge, opening);
    }

    fn confirm_rights_and_obligations(&mut self) {
        let judge = self.judge.name().to_string();
        let plaintiff = self.lawyers[0].name().to_string();
        let defendant = self.lawyers[1].name().to_string();

        for confirmation in self.script.confirmations.clone() {
            self.add_to_history(CourtRole::Judge, &judge, confirmation.question);
            self.add_to_history(CourtRole::Plaintiff, &plaintiff, confirmation.plaintiff_reply);
            self.add_to_history(CourtRole::Defendant, &defendant, confirmation.defendant_reply);
        }
    }

    fn initial_statements(&mut self, case: &CaseRecord) {
        let judge = self.judge.name().to_string();
        let plaintiff = self.lawyers[0].name().to_string();
        let defendant = self.lawyers[1].name().to_string();

        let invite = self.script.invite_plaintiff.clone();
        self.add_to_history(CourtRole::Judge, &judge, invite);
        self.add_to_history(CourtRole::Plaintiff, &plaintiff, case.plaintiff_statement.clone());

        let invite = self.script.invite_defendant.clone();
        self.add_to_history(CourtRole::Judge, &judge, invite);
        self.add_to_history(CourtRole::Defendant, &defendant, case.defendant_statement.clone());
    }

    async fn judge_initial_question(&mut self) -> Result<(), CourtError> {
        let content = self
            .judge
            .execute(None, self.history.turns(), &self.script.framing_prompt)
            .await?;
        let judge = self.judge.name().to_string();
        self.add_to_history(CourtRole::Judge, &judge, content);
        Ok(())
    }

    async fn debate_rounds(&mut self, rounds: usize) -> Result<(), CourtError> {
        for round in 1..=rounds {
            tracing::info!(round, total = rounds, "Starting debate round");
            for role in [CourtRole::Plaintiff, CourtRole::Defendant] {
                let prompt = self.script.debate_prompt_for(role);
                let agent = self.lawyer(role);
                let plan = agent.plan(self.history.turns()).await?;
                let content = agent
                    .execute(Some(&plan), self.history.turns(), &prompt)
                    .await?;
                let name = agent.name().to_string();
                self.add_to_history(role, &name, content);
            }
        }
        Ok(())
    }

    async fn final_judgment(&mut self) -> Result<(), CourtError> {
        let content = self
            .judge
            .execute(None, self.history.turns(), &self.script.judgment_prompt)
            .await?;
        let judge = self.judge.name().to_string();
        self.add_to_history(CourtRole::Judge, &judge, content);
        Ok(())
    }

    async fn reflect_and_summarize(&self) -> Result<(Reflection, Reflection), CourtError> {
        let plaintiff = self.lawyers[0].reflect(self.history.turns()).await?;
        let defendant = self.lawyers[1].reflect(self.history.turns()).await?;
        Ok((plaintiff, defendant))
    }
}
