//! 出题服务 - 业务能力层
//!
//! 把一份出题参数变成一次 LLM 请求，返回解析好的题目列表或分类后的错误。
//! 不做重试、不做缓存；失败后调用方用同样的参数重新调用即可。

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::GenerationError;
use crate::models::{Question, QuestionParams};
use crate::services::llm_service::{CompletionBackend, CompletionRequest, ProviderFailure};
use crate::services::prompt::{build_prompt, response_schema, SCHEMA_NAME, SYSTEM_MESSAGE};
use crate::utils::logging::truncate_text;

/// 出题服务
pub struct GenerationClient<B> {
    backend: B,
    /// 环境变量中的默认密钥
    fallback_key: Option<String>,
}

impl<B: CompletionBackend> GenerationClient<B> {
    pub fn new(backend: B, fallback_key: Option<String>) -> Self {
        Self {
            backend,
            fallback_key: fallback_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn has_fallback_key(&self) -> bool {
        self.fallback_key.is_some()
    }

    /// 用户保存的密钥优先，否则使用环境变量中的默认密钥
    pub fn resolve_credential<'a>(&'a self, user_key: Option<&'a str>) -> Option<&'a str> {
        user_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .or(self.fallback_key.as_deref())
    }

    /// 生成一批题目
    ///
    /// 返回的题目未做一致性校验（答案是否在选项中等），由会话在接收时检查。
    pub async fn generate(
        &self,
        params: &QuestionParams,
        user_key: Option<&str>,
    ) -> Result<Vec<Question>, GenerationError> {
        let api_key = self
            .resolve_credential(user_key)
            .ok_or(GenerationError::MissingCredential)?;

        let request = CompletionRequest {
            system_message: SYSTEM_MESSAGE.to_string(),
            user_message: build_prompt(params),
            schema_name: SCHEMA_NAME.to_string(),
            schema: response_schema(),
        };

        info!(
            "🤖 正在生成 {} 道题: {} / 年级 {} / {}",
            params.count,
            params.subject,
            params.grade,
            params.effective_topic()
        );

        let text = self
            .backend
            .complete(api_key, &request)
            .await
            .map_err(|failure| {
                warn!("⚠️ 生成失败: {}", failure);
                classify_failure(&failure)
            })?
            .ok_or_else(|| {
                warn!("⚠️ 模型没有返回文本");
                GenerationError::EmptyResponse
            })?;

        let questions = parse_questions(&text)?;
        info!("✓ 收到 {} 道题", questions.len());
        Ok(questions)
    }
}

/// 根据服务端信息对失败分类
pub fn classify_failure(failure: &ProviderFailure) -> GenerationError {
    let lower = failure.message.to_lowercase();

    const INVALID_KEY_MARKERS: [&str; 5] = [
        "api_key_invalid",
        "invalid_api_key",
        "api key not valid",
        "incorrect api key",
        "invalid api key",
    ];

    if INVALID_KEY_MARKERS.iter().any(|m| lower.contains(m)) {
        GenerationError::InvalidCredential
    } else if lower.contains("quota") || lower.contains("resource_exhausted") {
        GenerationError::QuotaExceeded
    } else {
        GenerationError::Unknown(failure.message.clone())
    }
}

fn code_fence() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n(.*?)\n?\s*```\s*$").ok())
        .as_ref()
}

/// 去掉部分模型会包在 JSON 外面的 Markdown 代码块
fn strip_code_fence(text: &str) -> &str {
    code_fence()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map_or(text.trim(), |m| m.as_str().trim())
}

/// 解析模型输出
///
/// 必须是非空的题目数组，字段缺失、多余或类型不符都视为格式错误。
pub fn parse_questions(text: &str) -> Result<Vec<Question>, GenerationError> {
    let body = strip_code_fence(text);

    let questions: Vec<Question> = serde_json::from_str(body).map_err(|e| {
        warn!(
            "❌ 题目 JSON 解析失败: {} | 原始文本: {}",
            e,
            truncate_text(text, 2000)
        );
        GenerationError::MalformedOutput
    })?;

    if questions.is_empty() {
        warn!("❌ 模型返回了空数组 | 原始文本: {}", truncate_text(text, 2000));
        return Err(GenerationError::MalformedOutput);
    }

    debug!("解析得到 {} 道题", questions.len());
    Ok(questions)
}
