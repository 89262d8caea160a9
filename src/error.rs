//! 错误类型
//!
//! 面向用户的错误（生成失败、会话操作被拒绝）使用印尼语提示，
//! 直接显示在终端界面上。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::OptionKey;
use crate::workflow::SessionPhase;

/// 生成题目失败的分类
///
/// 所有失败都在会话层被恢复（Loading → Idle），不会导致程序退出。
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GenerationError {
    /// 本地和环境变量都没有 API Key，未发起网络请求
    #[error("API Key tidak ditemukan. Silakan masukkan API Key di menu Pengaturan (perintah `kunci <API_KEY>`).")]
    MissingCredential,
    /// 服务端拒绝了 API Key
    #[error("API Key tidak valid. Silakan periksa kembali di menu Pengaturan.")]
    InvalidCredential,
    /// 配额耗尽
    #[error("Kuota API Key Anda telah habis.")]
    QuotaExceeded,
    /// 响应中没有文本
    #[error("Model tidak mengembalikan teks. Pastikan API Key Anda aktif dan memiliki kuota.")]
    EmptyResponse,
    /// 连接正常，但输出不符合约定的 JSON 结构
    #[error("Gagal membaca format data soal. Silakan coba lagi.")]
    MalformedOutput,
    /// 其他传输层/服务端错误，原样保留服务端信息
    #[error("{}", unknown_message(.0))]
    Unknown(String),
}

fn unknown_message(message: &str) -> &str {
    if message.trim().is_empty() {
        "Gagal memuat simulasi."
    } else {
        message
    }
}

/// 题目或参数不满足约束
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("daftar soal kosong")]
    EmptyQuestionSet,
    #[error("soal #{question_id} tidak memiliki pilihan jawaban")]
    EmptyOptions { question_id: i64 },
    #[error("soal #{question_id} memiliki pilihan {key} lebih dari sekali")]
    DuplicateOptionKey { question_id: i64, key: OptionKey },
    #[error("kunci jawaban soal #{question_id} ({key}) tidak ada di pilihan")]
    CorrectAnswerNotInOptions { question_id: i64, key: OptionKey },
    #[error("id soal #{0} muncul lebih dari sekali")]
    DuplicateQuestionId(i64),
    #[error("jumlah soal harus 1 sampai 10 (diberikan: {0})")]
    CountOutOfRange(u32),
}

/// 会话状态机拒绝的操作
///
/// 被拒绝的操作不会修改会话状态。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("aksi `{action}` tidak tersedia saat status {phase}")]
    InvalidState {
        action: &'static str,
        phase: SessionPhase,
    },
    #[error("soal #{0} tidak ditemukan")]
    QuestionNotFound(i64),
    #[error("pilihan {key} tidak ada pada soal #{question_id}")]
    OptionNotFound { question_id: i64, key: OptionKey },
    #[error("jawaban soal #{0} sudah dikunci")]
    QuestionLocked(i64),
    #[error("pilih jawaban untuk soal #{0} terlebih dahulu")]
    NoAnswer(i64),
    #[error("baru {answered} dari {total} soal yang dijawab")]
    Incomplete { answered: usize, total: usize },
    #[error("pengaturan tidak valid: {0}")]
    InvalidParams(ValidationError),
    #[error("data soal tidak valid: {0}")]
    InvalidQuestions(#[from] ValidationError),
}

/// API Key 本地存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("gagal membaca {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("gagal menulis {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("format {path} tidak valid: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("gagal menyusun isi penyimpanan: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("API Key tidak boleh kosong")]
    EmptyKey,
}

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("kesalahan berkas: {0}")]
    Io(#[from] std::io::Error),
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keeps_provider_message() {
        let err = GenerationError::Unknown("503 Service Unavailable".to_string());
        assert_eq!(err.to_string(), "503 Service Unavailable");
    }

    #[test]
    fn test_unknown_without_message_falls_back() {
        let err = GenerationError::Unknown("  ".to_string());
        assert_eq!(err.to_string(), "Gagal memuat simulasi.");
    }

    #[test]
    fn test_session_error_wraps_validation() {
        let err: SessionError = ValidationError::EmptyQuestionSet.into();
        assert!(matches!(err, SessionError::InvalidQuestions(ValidationError::EmptyQuestionSet)));
    }
}
