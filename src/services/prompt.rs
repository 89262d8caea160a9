//! 出题提示词与输出结构描述

use serde_json::{json, Value};

use crate::models::{Choice, QuestionParams};

/// 输出结构名称（json_schema 的 name 字段）
pub const SCHEMA_NAME: &str = "soal_tka";

pub const SYSTEM_MESSAGE: &str = "Anda adalah Master TKA SMP untuk UPT SMPN 4 Mappedeceng. \
Anda menyusun soal pilihan ganda berkualitas untuk simulasi Tes Kemampuan Akademik.";

/// 构建出题提示词，包含全部出题参数
pub fn build_prompt(params: &QuestionParams) -> String {
    format!(
        r#"Buatkan soal simulasi TKA dalam format JSON.

Mata Pelajaran: {subject}
Kelas: {grade}
Sub-Materi: {topic}
Level Kognitif: {level}
Jumlah Soal: {count}
Tingkat Kesulitan: {difficulty}

Panduan Penting:
- Gunakan konteks lokal Mappedeceng/Luwu Utara jika memungkinkan.
- Pastikan soal menantang nalar (HOTS).
- Setiap soal memiliki pilihan A, B, C, dan D dengan tepat satu jawaban benar.
- WAJIB memberikan penjelasan logika yang sangat mendetail, langkah demi langkah, agar siswa paham mengapa jawaban tersebut benar.
- Output HARUS berupa valid JSON array of objects."#,
        subject = params.subject,
        grade = params.grade.label(),
        topic = params.effective_topic(),
        level = params.cognitive_level.label(),
        count = params.count,
        difficulty = params.difficulty.label(),
    )
}

/// 输出结构描述：题目对象数组，所有字段必填
pub fn response_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "id": { "type": "integer" },
                "text": {
                    "type": "string",
                    "description": "Teks pertanyaan dalam Markdown"
                },
                "options": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "key": {
                                "type": "string",
                                "enum": ["A", "B", "C", "D"],
                                "description": "A, B, C, atau D"
                            },
                            "text": { "type": "string" }
                        },
                        "required": ["key", "text"],
                        "additionalProperties": false
                    }
                },
                "correctAnswer": {
                    "type": "string",
                    "enum": ["A", "B", "C", "D"],
                    "description": "A, B, C, atau D"
                },
                "explanation": {
                    "type": "string",
                    "description": "Penjelasan logika jawaban yang sangat detail"
                }
            },
            "required": ["id", "text", "options", "correctAnswer", "explanation"],
            "additionalProperties": false
        }
    })
}
