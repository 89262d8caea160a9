//! 测验会话状态机 - 流程层
//!
//! 状态流转：
//! 1. Idle → Loading（开始生成）
//! 2. Loading → InProgress（生成成功）/ Loading → Idle（生成失败，保留错误）
//! 3. InProgress → Complete（全部作答后交卷）
//! 4. 任意状态 → Idle（重置）
//!
//! 所有操作都是同步的；被拒绝的操作返回 `SessionError` 且不修改状态。

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GenerationError, SessionError};
use crate::models::{validate_batch, OptionKey, Question, QuestionParams};

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// 没有题目
    #[default]
    Idle,
    /// 生成请求进行中
    Loading,
    /// 作答中
    InProgress,
    /// 已交卷
    Complete,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionPhase::Idle => "siap",
            SessionPhase::Loading => "memuat",
            SessionPhase::InProgress => "mengerjakan",
            SessionPhase::Complete => "selesai",
        };
        f.write_str(name)
    }
}

/// 结果页中的一行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewItem<'a> {
    /// 题号（从 1 开始）
    pub number: usize,
    pub question: &'a Question,
    pub selected: Option<OptionKey>,
    pub is_correct: bool,
}

/// 测验会话
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    phase: SessionPhase,
    /// 开始生成时的参数快照
    params: Option<QuestionParams>,
    questions: Vec<Question>,
    current_index: usize,
    /// 题目 id → 选择的选项
    answers: BTreeMap<i64, OptionKey>,
    /// 已核对（锁定）的题目 id
    checked: BTreeSet<i64>,
    last_error: Option<GenerationError>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn params(&self) -> Option<&QuestionParams> {
        self.params.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn is_last_question(&self) -> bool {
        !self.questions.is_empty() && self.current_index + 1 == self.questions.len()
    }

    pub fn answer(&self, question_id: i64) -> Option<OptionKey> {
        self.answers.get(&question_id).copied()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn all_answered(&self) -> bool {
        !self.questions.is_empty() && self.questions.iter().all(|q| self.answers.contains_key(&q.id))
    }

    pub fn is_checked(&self, question_id: i64) -> bool {
        self.checked.contains(&question_id)
    }

    pub fn is_submitted(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    /// 最近一次生成失败的错误
    pub fn last_error(&self) -> Option<&GenerationError> {
        self.last_error.as_ref()
    }

    fn require(&self, phase: SessionPhase, action: &'static str) -> Result<(), SessionError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                action,
                phase: self.phase,
            })
        }
    }

    fn question(&self, question_id: i64) -> Result<&Question, SessionError> {
        self.questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or(SessionError::QuestionNotFound(question_id))
    }

    /// 开始生成；同一时间只允许一个生成请求
    pub fn start_generation(&mut self, params: QuestionParams) -> Result<(), SessionError> {
        self.require(SessionPhase::Idle, "mulai")?;
        params.validate().map_err(SessionError::InvalidParams)?;

        debug!("会话: Idle → Loading");
        self.phase = SessionPhase::Loading;
        self.params = Some(params);
        self.last_error = None;
        Ok(())
    }

    /// 生成成功，题目整批校验通过后才会进入作答状态
    pub fn complete_generation(&mut self, questions: Vec<Question>) -> Result<(), SessionError> {
        self.require(SessionPhase::Loading, "terima soal")?;
        validate_batch(&questions)?;

        debug!("会话: Loading → InProgress ({} 道题)", questions.len());
        self.phase = SessionPhase::InProgress;
        self.questions = questions;
        self.current_index = 0;
        self.answers.clear();
        self.checked.clear();
        Ok(())
    }

    /// 生成失败，回到 Idle 并保留错误用于显示
    pub fn fail_generation(&mut self, error: GenerationError) -> Result<(), SessionError> {
        self.require(SessionPhase::Loading, "gagal memuat")?;

        debug!("会话: Loading → Idle ({:?})", error);
        self.phase = SessionPhase::Idle;
        self.params = None;
        self.last_error = Some(error);
        Ok(())
    }

    /// 选择答案，核对前可以反复修改
    pub fn select_answer(&mut self, question_id: i64, key: OptionKey) -> Result<(), SessionError> {
        self.require(SessionPhase::InProgress, "pilih jawaban")?;

        let question = self.question(question_id)?;
        if self.checked.contains(&question_id) {
            return Err(SessionError::QuestionLocked(question_id));
        }
        if !question.has_option(key) {
            return Err(SessionError::OptionNotFound { question_id, key });
        }

        self.answers.insert(question_id, key);
        Ok(())
    }

    /// 核对答案，之后这道题不能再修改
    pub fn check_answer(&mut self, question_id: i64) -> Result<(), SessionError> {
        self.require(SessionPhase::InProgress, "cek jawaban")?;
        self.question(question_id)?;

        if !self.answers.contains_key(&question_id) {
            return Err(SessionError::NoAnswer(question_id));
        }

        self.checked.insert(question_id);
        Ok(())
    }

    /// 下一题；已在最后一题时不动，返回是否移动
    pub fn advance(&mut self) -> bool {
        if self.phase != SessionPhase::InProgress || self.current_index + 1 >= self.questions.len() {
            return false;
        }
        self.current_index += 1;
        true
    }

    /// 上一题；已在第一题时不动，返回是否移动
    pub fn retreat(&mut self) -> bool {
        if self.phase != SessionPhase::InProgress || self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        true
    }

    /// 交卷，要求每道题都有答案
    pub fn submit(&mut self) -> Result<(), SessionError> {
        self.require(SessionPhase::InProgress, "kirim")?;

        if !self.all_answered() {
            return Err(SessionError::Incomplete {
                answered: self.answered_count(),
                total: self.questions.len(),
            });
        }

        debug!("会话: InProgress → Complete");
        self.phase = SessionPhase::Complete;
        Ok(())
    }

    pub fn correct_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| self.answer(q.id) == Some(q.correct_answer))
            .count()
    }

    /// 得分 = round(100 * 答对数 / 总题数)
    ///
    /// 作答中也可调用（实时反馈）；没有题目时为 `None`。
    pub fn score(&self) -> Option<u32> {
        if !matches!(self.phase, SessionPhase::InProgress | SessionPhase::Complete) {
            return None;
        }
        percentage(self.correct_count(), self.questions.len())
    }

    /// 逐题回顾
    pub fn review(&self) -> Vec<ReviewItem<'_>> {
        self.questions
            .iter()
            .enumerate()
            .map(|(idx, q)| {
                let selected = self.answer(q.id);
                ReviewItem {
                    number: idx + 1,
                    question: q,
                    selected,
                    is_correct: selected == Some(q.correct_answer),
                }
            })
            .collect()
    }

    /// 任意状态下回到空会话
    pub fn reset(&mut self) {
        debug!("会话: {:?} → Idle (重置)", self.phase);
        *self = Self::default();
    }
}

/// 四舍五入的百分比，`total` 为 0 时没有定义
fn percentage(correct: usize, total: usize) -> Option<u32> {
    if total == 0 {
        return None;
    }
    // (200c + t) / 2t 等价于 round(100c / t)，半数向上取整
    let value = (200 * correct + total) / (2 * total);
    u32::try_from(value).ok()
}
