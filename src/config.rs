/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 环境变量中的默认 API Key（本地未保存密钥时使用）
    pub gemini_api_key: Option<String>,
    // --- LLM 配置 ---
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 请求超时（秒）
    pub request_timeout_secs: u64,
    // --- 本地存储 ---
    /// API Key 存放文件
    pub key_store_path: String,
    /// 打印结果输出目录
    pub report_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-3-flash-preview".to_string(),
            request_timeout_secs: 120,
            key_store_path: "gensoal.toml".to_string(),
            report_dir: "hasil".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量加载配置（会先尝试读取当前目录下的 .env）
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let default = Self::default();
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            key_store_path: std::env::var("KEY_STORE_PATH").unwrap_or(default.key_store_path),
            report_dir: std::env::var("REPORT_DIR").unwrap_or(default.report_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }
}
