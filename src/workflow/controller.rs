//! 测验控制器 - 流程层
//!
//! 唯一持有界面状态的对象：表单参数、API Key、会话，以及出题服务。
//! 界面层把用户意图交给这里，再根据返回的状态重新渲染。

use tracing::{error, info, warn};

use crate::error::{AppError, AppResult, GenerationError, SessionError, StoreError};
use crate::models::{CognitiveLevel, Difficulty, Grade, MathSubTopic, OptionKey, QuestionParams, Subject};
use crate::services::{CompletionBackend, GenerationClient, KeyStore};
use crate::workflow::session::{Session, SessionPhase};

/// API Key 来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    /// 用户保存在本地的密钥
    Saved,
    /// 环境变量中的默认密钥
    Environment,
    /// 没有可用密钥
    Missing,
}

/// 测验控制器
pub struct QuizController<B> {
    params: QuestionParams,
    session: Session,
    key_store: KeyStore,
    saved_key: Option<String>,
    generator: GenerationClient<B>,
}

impl<B: CompletionBackend> QuizController<B> {
    /// 创建控制器，启动时读取一次本地密钥
    pub async fn new(generator: GenerationClient<B>, key_store: KeyStore) -> Result<Self, StoreError> {
        let saved_key = key_store.load().await?;
        if saved_key.is_some() {
            info!("🔑 已读取本地 API Key: {}", key_store.path().display());
        }

        Ok(Self {
            params: QuestionParams::default(),
            session: Session::new(),
            key_store,
            saved_key,
            generator,
        })
    }

    pub fn params(&self) -> &QuestionParams {
        &self.params
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn credential_status(&self) -> CredentialStatus {
        if self.saved_key.is_some() {
            CredentialStatus::Saved
        } else if self.generator.has_fallback_key() {
            CredentialStatus::Environment
        } else {
            CredentialStatus::Missing
        }
    }

    // ========== 表单 ==========

    /// 只有在没有题目、也没有请求进行中时才能修改表单
    fn form_mut(&mut self) -> Result<&mut QuestionParams, SessionError> {
        match self.session.phase() {
            SessionPhase::Idle => Ok(&mut self.params),
            phase => Err(SessionError::InvalidState {
                action: "ubah pengaturan",
                phase,
            }),
        }
    }

    pub fn set_subject(&mut self, subject: Subject) -> Result<(), SessionError> {
        self.form_mut()?.subject = subject;
        Ok(())
    }

    pub fn set_grade(&mut self, grade: Grade) -> Result<(), SessionError> {
        self.form_mut()?.grade = grade;
        Ok(())
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), SessionError> {
        self.form_mut()?.difficulty = difficulty;
        Ok(())
    }

    pub fn set_cognitive_level(&mut self, level: CognitiveLevel) -> Result<(), SessionError> {
        self.form_mut()?.cognitive_level = level;
        Ok(())
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) -> Result<(), SessionError> {
        self.form_mut()?.topic = topic.into();
        Ok(())
    }

    pub fn set_sub_topic(&mut self, sub_topic: MathSubTopic) -> Result<(), SessionError> {
        self.form_mut()?.sub_topic = sub_topic;
        Ok(())
    }

    pub fn set_count(&mut self, count: u32) -> AppResult<()> {
        self.form_mut()?.set_count(count)?;
        Ok(())
    }

    // ========== API Key ==========

    pub async fn save_key(&mut self, key: &str) -> Result<(), StoreError> {
        self.key_store.save(key).await?;
        self.saved_key = Some(key.trim().to_string());
        Ok(())
    }

    pub async fn clear_key(&mut self) -> Result<(), StoreError> {
        self.key_store.clear().await?;
        self.saved_key = None;
        Ok(())
    }

    /// 调用时重新读取本地密钥，读取失败时沿用内存中的值
    async fn current_key(&mut self) -> Option<String> {
        match self.key_store.load().await {
            Ok(key) => self.saved_key = key,
            Err(e) => warn!("⚠️ 读取本地 API Key 失败，使用已加载的值: {}", e),
        }
        self.saved_key.clone()
    }

    // ========== 生成 ==========

    /// 生成一批题目并进入作答状态
    ///
    /// 失败时会话回到 Idle 并保留错误；题目不合法时整批丢弃，按格式错误处理。
    pub async fn generate(&mut self) -> AppResult<usize> {
        self.session.start_generation(self.params.clone())?;

        let key = self.current_key().await;
        let result = self.generator.generate(&self.params, key.as_deref()).await;

        let error = match result {
            Ok(questions) => match self.session.complete_generation(questions) {
                Ok(()) => {
                    let count = self.session.questions().len();
                    info!("✅ 题目已就绪，共 {} 道", count);
                    return Ok(count);
                }
                Err(SessionError::InvalidQuestions(invalid)) => {
                    warn!("❌ 模型返回的题目不合法: {}", invalid);
                    GenerationError::MalformedOutput
                }
                Err(other) => return Err(other.into()),
            },
            Err(e) => e,
        };

        error!("生成失败: {}", error);
        self.session.fail_generation(error.clone())?;
        Err(AppError::Generation(error))
    }

    // ========== 作答 ==========

    fn current_id(&self, action: &'static str) -> Result<i64, SessionError> {
        self.session
            .current_question()
            .map(|q| q.id)
            .ok_or(SessionError::InvalidState {
                action,
                phase: self.session.phase(),
            })
    }

    /// 为当前题选择答案
    pub fn select(&mut self, key: OptionKey) -> Result<(), SessionError> {
        let id = self.current_id("pilih jawaban")?;
        self.session.select_answer(id, key)
    }

    /// 核对当前题
    pub fn check(&mut self) -> Result<(), SessionError> {
        let id = self.current_id("cek jawaban")?;
        self.session.check_answer(id)
    }

    pub fn next(&mut self) -> bool {
        self.session.advance()
    }

    pub fn prev(&mut self) -> bool {
        self.session.retreat()
    }

    pub fn submit(&mut self) -> Result<u32, SessionError> {
        self.session.submit()?;
        let score = self.session.score().unwrap_or(0);
        info!(
            "📊 交卷完成: 答对 {}/{}，得分 {}",
            self.session.correct_count(),
            self.session.questions().len(),
            score
        );
        Ok(score)
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }
}
