//! Agent 各阶段使用的提示语

use crate::knowledge::KnowledgeKind;

pub const PLAN_PROMPT: &str = "Based on the court history, analyze whether information from the experience, \
case, or legal database is needed. Return a JSON string with three key-value pairs for experience, case, \
and legal, with values being true or false.";

const EXPERIENCE_QUERY_PROMPT: &str = r#"Based on the court history, analyze what kind of experience information is needed.
Identify the key points and formulate a query to retrieve relevant experiences that can improve logic.
Provide a JSON string containing the query statement, like
{"query": "specific steps for handling a labor dispute"}"#;

const CASE_QUERY_PROMPT: &str = r#"Based on the court history, analyze what kind of case information is needed.
Identify the key points and formulate a query to retrieve relevant case precedents that can improve agility.
Provide a JSON string containing query keywords, like
{"query": "labor contract dispute judgment analysis"}"#;

const LEGAL_QUERY_PROMPT: &str = r#"Based on the court history, analyze what kind of legal information is needed.
Identify the relevant laws or regulations, such as Civil Law, Labor Law, Family Law, or Labor Dispute, and formulate a query to retrieve relevant legal references that can improve professionalism.
Provide a JSON string containing query keywords, like
{"query": "statutes on tortfeasor conduct"}"#;

pub fn query_prompt(kind: KnowledgeKind) -> &'static str {
    match kind {
        KnowledgeKind::Experience => EXPERIENCE_QUERY_PROMPT,
        KnowledgeKind::Case => CASE_QUERY_PROMPT,
        KnowledgeKind::Legal => LEGAL_QUERY_PROMPT,
    }
}

/// 上下文中各检索结果的小节标题
pub fn section_label(kind: KnowledgeKind) -> &'static str {
    match kind {
        KnowledgeKind::Experience => {
            "Refer to the following experience to strengthen the logical rigor of your response:"
        }
        KnowledgeKind::Case => "Case Context:",
        KnowledgeKind::Legal => "Law Context:",
    }
}

pub const HISTORY_LABEL: &str = "Communication History:";

pub const NEED_LEGAL_INSTRUCTION: &str = "Review the provided court case history and evaluate its thoroughness \
and professionalism. Determine if referencing specific legal statutes or regulations would enhance the quality \
of the response. Return 'true' if additional legal references are needed, otherwise return 'false'.";

pub fn need_legal_prompt(history_context: &str) -> String {
    format!(
        "Court Case History:\n\n{}\n\nIs additional legal reference needed? Output true unless it is \
         absolutely unnecessary. Provide only a simple 'true' or 'false' answer.",
        history_context
    )
}

pub const CASE_CONTENT_INSTRUCTION: &str =
    "You are a professional judge skilled at summarizing the situation of a case.\n\n";

pub const CASE_CONTENT_PROMPT: &str =
    "Based on the court record, summarize the situation of the case in three sentences.";

pub fn experience_summary_prompt(case_content: &str, history_context: &str) -> String {
    format!(
        r#"Based on the case content and conversation record below, produce a logically consistent experience summary. Make sure it is rigorous and serves as an effective guide for handling similar cases.

Case content: {case_content}
Conversation record: {history_context}

Include:
1. A brief case background with the main issues and each side's position (do not use real names).
2. An experience description focused on logical consistency, presenting the issues and strategies to focus on in similar cases.
3. Three to five key points that help improve logical consistency, and how to apply them in practice.
4. Three to five guidelines for maintaining logical consistency, with cautions and advice for similar cases.

Write the response as a JSON object with this structure:
{{
    "context": "brief background...",
    "content": "experience description focused on logical consistency...",
    "focus_points": "key point 1, key point 2, key point 3",
    "guidelines": "guideline 1, guideline 2, guideline 3"
}}"#
    )
}

pub fn case_summary_instruction(role: &str, description: &str) -> String {
    format!(
        "You are a {}, skilled at analyzing cases quickly and responding with agility. {}\n\n",
        role, description
    )
}

pub fn case_summary_prompt(case_content: &str, history_context: &str) -> String {
    format!(
        r#"Based on the case content and conversation record below, write a concise case summary that improves response agility in similar situations. It should help understand the case quickly and form a response strategy fast.

Case content: {case_content}
Conversation record: {history_context}

Include:
1. Case name and background: a concise name, plus the main issues and each side's position (do not use real names).
2. Case type: what kind of case it is (for example labor dispute or contract dispute).
3. Keywords: three to five keywords that capture the essence of the case.
4. Quick reaction points: three to five points essential for understanding and handling similar cases quickly.
5. Response directions: three to five possible directions or perspectives for a fast response strategy.

Write the response as a JSON object with this structure:
{{
    "content": "Case name and background: ...",
    "case_type": "case type...",
    "keywords": "keyword1, keyword2, keyword3",
    "quick_reaction_points": "point1, point2, point3",
    "response_directions": "direction1, direction2, direction3"
}}

Keep it concise and clear, focused on information that helps identify the core issue and form a response strategy."#
    )
}
