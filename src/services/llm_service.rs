//! LLM 服务 - 业务能力层
//!
//! 只负责"发一次请求、拿回一段文本"，不关心题目结构和会话流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 默认走 Gemini 的 OpenAI 兼容端点，也可以换成其他兼容服务
//! - 通过 `response_format = json_schema` 约束输出结构

use std::future::Future;
use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;

/// 一次补全请求
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_message: String,
    pub user_message: String,
    /// 输出结构名称
    pub schema_name: String,
    /// 输出结构（JSON Schema）
    pub schema: Value,
}

/// 服务端或传输层的失败，保留原始信息供上层分类
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub message: String,
}

impl ProviderFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<OpenAIError> for ProviderFailure {
    fn from(err: OpenAIError) -> Self {
        Self::new(err.to_string())
    }
}

/// 文本生成后端
///
/// `Ok(None)` 表示请求成功但没有返回文本。
pub trait CompletionBackend {
    fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<Option<String>, ProviderFailure>> + Send;
}

/// LLM 服务
///
/// 每次请求用调用时传入的 API Key 创建客户端，保证用户刚保存的新密钥立即生效。
pub struct LlmService {
    api_base_url: String,
    model_name: String,
    timeout: Duration,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        Self {
            api_base_url: config.llm_api_base_url.clone(),
            model_name: config.llm_model_name.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    fn client(&self, api_key: &str) -> Result<Client<OpenAIConfig>, ProviderFailure> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&self.api_base_url);

        let http_client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ProviderFailure::new(format!("gagal membuat HTTP client: {e}")))?;

        Ok(Client::with_config(openai_config).with_http_client(http_client))
    }
}

/// 构建聊天补全请求：一条系统消息 + 一条用户消息，输出受 json_schema 约束
pub fn build_chat_request(
    model_name: &str,
    request: &CompletionRequest,
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    let system_msg = ChatCompletionRequestSystemMessageArgs::default()
        .content(request.system_message.as_str())
        .build()?;
    let user_msg = ChatCompletionRequestUserMessageArgs::default()
        .content(request.user_message.as_str())
        .build()?;

    let messages = vec![
        ChatCompletionRequestMessage::System(system_msg),
        ChatCompletionRequestMessage::User(user_msg),
    ];

    CreateChatCompletionRequestArgs::default()
        .model(model_name)
        .messages(messages)
        .response_format(ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: None,
                name: request.schema_name.clone(),
                schema: Some(request.schema.clone()),
                strict: Some(true),
            },
        })
        .build()
}

impl CompletionBackend for LlmService {
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<Option<String>, ProviderFailure> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", request.user_message.len());

        let chat_request = build_chat_request(&self.model_name, request)?;

        let response = self
            .client(api_key)?
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                ProviderFailure::from(e)
            })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionParams;
    use crate::services::prompt::{build_prompt, response_schema, SCHEMA_NAME, SYSTEM_MESSAGE};

    fn sample_request() -> CompletionRequest {
        CompletionRequest {
            system_message: SYSTEM_MESSAGE.to_string(),
            user_message: build_prompt(&QuestionParams::default()),
            schema_name: SCHEMA_NAME.to_string(),
            schema: response_schema(),
        }
    }

    #[test]
    fn test_build_chat_request_sets_schema() {
        let request = build_chat_request("gemini-3-flash-preview", &sample_request()).unwrap();
        assert_eq!(request.model, "gemini-3-flash-preview");
        assert_eq!(request.messages.len(), 2);
        assert!(matches!(
            request.response_format,
            Some(ResponseFormat::JsonSchema { .. })
        ));
    }

    #[test]
    fn test_service_takes_model_and_timeout_from_config() {
        let config = Config {
            llm_model_name: "gemini-2.5-flash".to_string(),
            request_timeout_secs: 30,
            ..Config::default()
        };
        let service = LlmService::new(&config);
        assert_eq!(service.model_name, "gemini-2.5-flash");
        assert_eq!(service.timeout, Duration::from_secs(30));
        assert_eq!(service.api_base_url, config.llm_api_base_url);
    }

    /// 测试真实 API 调用
    ///
    /// 运行方式：
    /// ```bash
    /// GEMINI_API_KEY=... cargo test test_live_completion -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_live_completion() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env();
        let api_key = config.gemini_api_key.clone().expect("需要设置 GEMINI_API_KEY");
        let service = LlmService::new(&config);

        let result = service.complete(&api_key, &sample_request()).await;

        match result {
            Ok(Some(text)) => {
                println!("\n========== LLM 响应 ==========");
                println!("{}", text);
                println!("==============================\n");
                assert!(text.starts_with('[') || text.starts_with("```"));
            }
            Ok(None) => panic!("LLM 没有返回文本"),
            Err(e) => panic!("LLM 调用失败: {}", e),
        }
    }
}
