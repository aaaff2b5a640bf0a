//! 庭审固定台词与提示语（可在配置 `[court.script]` 中覆盖）

use serde::Deserialize;

use crate::court::CourtRole;

/// 各角色在庭审记录中的标签
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RoleLabels {
    pub clerk: String,
    pub judge: String,
    pub plaintiff: String,
    pub defendant: String,
}

impl Default for RoleLabels {
    fn default() -> Self {
        Self {
            clerk: "Clerk".to_string(),
            judge: "Presiding Judge".to_string(),
            plaintiff: "Plaintiff Counsel".to_string(),
            defendant: "Defendant Counsel".to_string(),
        }
    }
}

/// 一轮程序确认：审判长提问，原被告依次回答
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Confirmation {
    pub question: String,
    pub plaintiff_reply: String,
    pub defendant_reply: String,
}

impl Confirmation {
    fn new(question: &str, plaintiff_reply: &str, defendant_reply: &str) -> Self {
        Self {
            question: question.to_string(),
            plaintiff_reply: plaintiff_reply.to_string(),
            defendant_reply: defendant_reply.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CourtScript {
    pub labels: RoleLabels,
    pub opening: String,
    pub confirmations: Vec<Confirmation>,
    pub invite_plaintiff: String,
    pub invite_defendant: String,
    pub framing_prompt: String,
    /// `{role}` 替换为发言方标签
    pub debate_prompt: String,
    pub judgment_prompt: String,
}

impl Default for CourtScript {
    fn default() -> Self {
        Self {
            labels: RoleLabels::default(),
            opening: "The court is now in session.".to_string(),
            confirmations: vec![
                Confirmation::new(
                    "Does either party object to the appearance of the other party's representatives?",
                    "No objection.",
                    "No objection.",
                ),
                Confirmation::new(
                    "The identities of the parties and their counsel have been verified and comply with the law. \
                     The parties were notified in writing of their procedural rights and obligations before the hearing. \
                     Are the parties clear on these rights and obligations?",
                    "Clear.",
                    "Clear.",
                ),
                Confirmation::new(
                    "If a party believes that a member of the bench or the clerk is a close relative of a party or counsel, \
                     or has an interest in this case that may affect a fair trial, that party may apply for recusal. \
                     Does either party apply for recusal?",
                    "No application.",
                    "No application.",
                ),
            ],
            invite_plaintiff: "The plaintiff will first state the claims, facts and reasons.".to_string(),
            invite_defendant: "The defendant may now respond.".to_string(),
            framing_prompt: "Based on the statements of plaintiff counsel and defendant counsel, summarize the issues \
                             both sides should debate. Keep the summary realistic, concise and effective."
                .to_string(),
            debate_prompt: "Based on experience, statutes, cases and the court record, begin your argument. \
                            If you cite statutes from the context, quote the cited part. \
                            Note: 1. This is the debate phase, not the investigation phase. 2. You are {role}."
                .to_string(),
            judgment_prompt: "Judge, please deliver the judgment. (Your judgment should reflect realistic practice.)"
                .to_string(),
        }
    }
}

impl CourtScript {
    pub fn label(&self, role: CourtRole) -> &str {
        match role {
            CourtRole::Clerk => &self.labels.clerk,
            CourtRole::Judge => &self.labels.judge,
            CourtRole::Plaintiff => &self.labels.plaintiff,
            CourtRole::Defendant => &self.labels.defendant,
        }
    }

    pub fn debate_prompt_for(&self, role: CourtRole) -> String {
        self.debate_prompt.replace("{role}", self.label(role))
    }

    /// 不含辩论轮次的发言条数：开庭 2 + 确认 3×k + 陈述 4 + 归纳 1 + 判决 1
    pub fn scripted_turns(&self) -> usize {
        2 + 3 * self.confirmations.len() + 4 + 1 + 1
    }
}
