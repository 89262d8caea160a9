//! 终端界面 - 界面层
//!
//! 读取输入的每一行，解析为意图交给控制器，再按会话状态重新渲染。
//! 生成题目期间读到的输入只提示正在加载，不会交给控制器。

pub mod intent;
pub mod render;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::services::{CompletionBackend, GenerationClient, KeyStore, LlmService, ReportWriter};
use crate::utils::logging::log_startup;
use crate::workflow::{QuizController, SessionPhase};

pub use intent::{parse_intent, Intent, IntentError};

/// 处理一个意图后的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// 应用主结构
pub struct App<B = LlmService> {
    controller: QuizController<B>,
    reports: ReportWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let generator = GenerationClient::new(LlmService::new(&config), config.gemini_api_key.clone());
        let key_store = KeyStore::new(&config.key_store_path);
        let controller = QuizController::new(generator, key_store)
            .await
            .with_context(|| format!("无法读取密钥文件: {}", config.key_store_path))?;

        Ok(Self::new(controller, ReportWriter::new(&config.report_dir)))
    }
}

impl<B: CompletionBackend> App<B> {
    pub fn new(controller: QuizController<B>, reports: ReportWriter) -> Self {
        Self { controller, reports }
    }

    pub fn controller(&self) -> &QuizController<B> {
        &self.controller
    }

    /// 运行应用主循环（标准输入）
    pub async fn run(mut self) -> Result<()> {
        self.run_with(BufReader::new(tokio::io::stdin())).await
    }

    /// 从任意按行输入运行主循环，输入结束时返回
    pub async fn run_with<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        self.show();

        while let Some(line) = lines.next_line().await.context("读取输入失败")? {
            let intent = match parse_intent(&line) {
                Ok(intent) => intent,
                Err(e) => {
                    println!("⚠️  {e}");
                    continue;
                }
            };

            let flow = match intent {
                Intent::Generate => self.generate(&mut lines).await?,
                intent => self.dispatch(intent).await,
            };
            if flow == Flow::Quit {
                break;
            }
        }

        info!("👋 程序结束");
        Ok(())
    }

    /// 生成题目；等待期间继续读输入，但只回复加载提示
    async fn generate<R>(&mut self, lines: &mut Lines<R>) -> Result<Flow>
    where
        R: AsyncBufRead + Unpin,
    {
        if self.controller.session().phase() != SessionPhase::Idle {
            println!("⚠️  Selesaikan atau `ulang` simulasi ini terlebih dahulu.");
            return Ok(Flow::Continue);
        }

        let loading = render::render_loading(self.controller.params());
        println!("\n{loading}");

        let result = {
            let generation = self.controller.generate();
            tokio::pin!(generation);
            let mut input_open = true;

            loop {
                tokio::select! {
                    result = &mut generation => break result,
                    line = lines.next_line(), if input_open => match line.context("读取输入失败")? {
                        Some(line) => {
                            debug!("加载中，忽略输入: {}", line.trim());
                            if matches!(parse_intent(&line), Ok(Intent::Help)) {
                                println!("\n{}", render::render_help(SessionPhase::Loading));
                            } else {
                                println!("{loading}");
                            }
                        }
                        None => input_open = false,
                    },
                }
            }
        };

        // 生成失败时错误显示在表单顶部
        if let Err(e) = result {
            warn!("生成失败: {}", e);
        }
        self.show();
        Ok(Flow::Continue)
    }

    /// 按当前状态渲染整个屏幕
    fn show(&self) {
        let session = self.controller.session();
        let screen = match session.phase() {
            SessionPhase::Idle => render::render_form(
                self.controller.params(),
                self.controller.credential_status(),
                session.last_error(),
            ),
            SessionPhase::Loading => render::render_loading(self.controller.params()),
            SessionPhase::InProgress => render::render_question(session),
            SessionPhase::Complete => render::render_report(session),
        };
        println!("\n{screen}");
    }

    fn notice(&self, result: Result<(), AppError>) {
        match result {
            Ok(()) => self.show(),
            Err(e) => println!("⚠️  {e}"),
        }
    }

    async fn dispatch(&mut self, intent: Intent) -> Flow {
        let ctl = &mut self.controller;

        match intent {
            Intent::Quit => return Flow::Quit,
            Intent::Show => self.show(),
            Intent::Help => println!("\n{}", render::render_help(ctl.session().phase())),

            Intent::Subject(v) => {
                let r = ctl.set_subject(v).map_err(AppError::from);
                self.notice(r);
            }
            Intent::Grade(v) => {
                let r = ctl.set_grade(v).map_err(AppError::from);
                self.notice(r);
            }
            Intent::Difficulty(v) => {
                let r = ctl.set_difficulty(v).map_err(AppError::from);
                self.notice(r);
            }
            Intent::CognitiveLevel(v) => {
                let r = ctl.set_cognitive_level(v).map_err(AppError::from);
                self.notice(r);
            }
            Intent::Topic(v) => {
                let r = ctl.set_topic(v).map_err(AppError::from);
                self.notice(r);
            }
            Intent::SubTopic(v) => {
                let r = ctl.set_sub_topic(v).map_err(AppError::from);
                self.notice(r);
            }
            Intent::Count(v) => {
                let r = ctl.set_count(v);
                self.notice(r);
            }

            Intent::SaveKey(key) => match ctl.save_key(&key).await {
                Ok(()) => println!("🔑 API Key disimpan."),
                Err(e) => println!("⚠️  {e}"),
            },
            Intent::ClearKey => match ctl.clear_key().await {
                Ok(()) => println!("🗑️  API Key dihapus."),
                Err(e) => println!("⚠️  {e}"),
            },

            // 由 run_with 带着输入流处理
            Intent::Generate => {}

            Intent::Select(key) => {
                let r = ctl.select(key).map_err(AppError::from);
                self.notice(r);
            }
            Intent::Check => {
                let r = ctl.check().map_err(AppError::from);
                self.notice(r);
            }
            Intent::Next => {
                if ctl.next() {
                    self.show();
                } else {
                    println!("⚠️  Tidak ada soal berikutnya.");
                }
            }
            Intent::Prev => {
                if ctl.prev() {
                    self.show();
                } else {
                    println!("⚠️  Tidak ada soal sebelumnya.");
                }
            }
            Intent::Submit => {
                let r = ctl.submit().map(|_| ()).map_err(AppError::from);
                self.notice(r);
            }
            Intent::Reset => {
                ctl.reset();
                self.show();
            }
            Intent::Print => {
                if ctl.session().phase() != SessionPhase::Complete {
                    println!("⚠️  Hasil hanya bisa dicetak setelah simulasi selesai.");
                    return Flow::Continue;
                }
                let body = render::render_report(ctl.session());
                match self.reports.write(&body).await {
                    Ok(path) => println!("🖨️  Hasil disimpan ke {}", path.display()),
                    Err(e) => {
                        error!("打印失败: {:#}", e);
                        println!("⚠️  Gagal mencetak hasil: {e}");
                    }
                }
            }
        }

        Flow::Continue
    }
}
