//! # Simulator TKA
//!
//! 初中学业能力测试（TKA SMP）模拟工具：按科目、年级、难度、专题让 LLM 出选择题，
//! 然后在终端里作答、核对、交卷并查看解析。
//!
//! ## 架构设计
//!
//! ### ① 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `KeyStore` - 保存/读取/删除 API Key
//! - `LlmService` - 一次 LLM 请求（实现 `CompletionBackend`）
//! - `GenerationClient` - 出题：提示词 + 输出结构 + 解析 + 错误分类
//! - `ReportWriter` - 把结果写成文本文件
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一次测验"的状态流转
//! - `Session` - 会话状态机（Idle → Loading → InProgress → Complete）
//! - `QuizController` - 持有表单、密钥和会话，编排生成流程
//!
//! ### ③ 界面层（App）
//! - `app/` - 终端输入解析与渲染
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult, GenerationError, SessionError};
pub use models::{Question, QuestionParams};
pub use services::{GenerationClient, KeyStore, LlmService};
pub use workflow::{QuizController, Session, SessionPhase};
