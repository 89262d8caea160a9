//! 用户输入解析
//!
//! 每行输入对应一个意图，命令词使用印尼语，与界面文字一致。

use thiserror::Error;

use crate::models::{Choice, CognitiveLevel, Difficulty, Grade, MathSubTopic, OptionKey, Subject};

/// 用户意图
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    // --- 表单 ---
    Subject(Subject),
    Grade(Grade),
    Difficulty(Difficulty),
    CognitiveLevel(CognitiveLevel),
    Topic(String),
    SubTopic(MathSubTopic),
    Count(u32),
    // --- API Key ---
    SaveKey(String),
    ClearKey,
    // --- 测验 ---
    Generate,
    Select(OptionKey),
    Check,
    Next,
    Prev,
    Submit,
    Reset,
    Print,
    // --- 其他 ---
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("perintah tidak dikenal: `{0}` (ketik `bantuan`)")]
    Unknown(String),
    #[error("perintah `{0}` membutuhkan nilai")]
    MissingArgument(&'static str),
    #[error("nilai `{value}` tidak valid untuk `{command}`")]
    InvalidValue {
        command: &'static str,
        value: String,
    },
}

fn required<'a>(command: &'static str, arg: &'a str) -> Result<&'a str, IntentError> {
    if arg.is_empty() {
        Err(IntentError::MissingArgument(command))
    } else {
        Ok(arg)
    }
}

fn choice<T: Choice>(command: &'static str, arg: &str) -> Result<T, IntentError> {
    T::find(required(command, arg)?).ok_or_else(|| IntentError::InvalidValue {
        command,
        value: arg.to_string(),
    })
}

/// 解析一行输入
pub fn parse_intent(line: &str) -> Result<Intent, IntentError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Intent::Show);
    }

    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };
    let command_lower = command.to_lowercase();

    if arg.is_empty() {
        if let Some(key) = OptionKey::parse(command) {
            return Ok(Intent::Select(key));
        }
    }

    let intent = match command_lower.as_str() {
        "mapel" => {
            let value = required("mapel", arg)?;
            Intent::Subject(Subject::find(value).ok_or_else(|| IntentError::InvalidValue {
                command: "mapel",
                value: value.to_string(),
            })?)
        }
        "kelas" => Intent::Grade(choice("kelas", arg)?),
        "kesulitan" => Intent::Difficulty(choice("kesulitan", arg)?),
        "level" => Intent::CognitiveLevel(choice("level", arg)?),
        "submateri" => Intent::SubTopic(choice("submateri", arg)?),
        // 允许清空专题
        "topik" => Intent::Topic(arg.to_string()),
        "jumlah" => {
            let value = required("jumlah", arg)?;
            Intent::Count(value.parse().map_err(|_| IntentError::InvalidValue {
                command: "jumlah",
                value: value.to_string(),
            })?)
        }
        "kunci" => Intent::SaveKey(required("kunci", arg)?.to_string()),
        "hapus-kunci" => Intent::ClearKey,
        "mulai" => Intent::Generate,
        "jawab" => {
            let value = required("jawab", arg)?;
            Intent::Select(OptionKey::parse(value).ok_or_else(|| IntentError::InvalidValue {
                command: "jawab",
                value: value.to_string(),
            })?)
        }
        "cek" => Intent::Check,
        "lanjut" | "n" => Intent::Next,
        "kembali" | "p" => Intent::Prev,
        "kirim" => Intent::Submit,
        "ulang" | "reset" => Intent::Reset,
        "cetak" => Intent::Print,
        "lihat" => Intent::Show,
        "bantuan" | "?" => Intent::Help,
        "keluar" | "q" => Intent::Quit,
        _ => return Err(IntentError::Unknown(command.to_string())),
    };

    Ok(intent)
}
