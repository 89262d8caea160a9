use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// 选项字母
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl OptionKey {
    pub const ALL: [OptionKey; 4] = [OptionKey::A, OptionKey::B, OptionKey::C, OptionKey::D];

    pub fn as_str(self) -> &'static str {
        match self {
            OptionKey::A => "A",
            OptionKey::B => "B",
            OptionKey::C => "C",
            OptionKey::D => "D",
        }
    }

    /// 解析单个字母（忽略大小写）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "A" | "a" => Some(OptionKey::A),
            "B" | "b" => Some(OptionKey::B),
            "C" | "c" => Some(OptionKey::C),
            "D" | "d" => Some(OptionKey::D),
            _ => None,
        }
    }
}

impl std::fmt::Display for OptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionOption {
    pub key: OptionKey,
    pub text: String,
}

/// 一道选择题
///
/// `id` 由模型生成，只在当前这一批题目内有意义。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Question {
    pub id: i64,
    /// Markdown 题干
    pub text: String,
    pub options: Vec<QuestionOption>,
    pub correct_answer: OptionKey,
    pub explanation: String,
}

impl Question {
    pub fn option(&self, key: OptionKey) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.key == key)
    }

    pub fn has_option(&self, key: OptionKey) -> bool {
        self.option(key).is_some()
    }

    pub fn is_correct(&self, key: OptionKey) -> bool {
        self.correct_answer == key
    }

    /// 检查单题约束：选项非空、字母不重复、答案必须是已有选项
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.options.is_empty() {
            return Err(ValidationError::EmptyOptions {
                question_id: self.id,
            });
        }

        let mut seen = HashSet::new();
        for option in &self.options {
            if !seen.insert(option.key) {
                return Err(ValidationError::DuplicateOptionKey {
                    question_id: self.id,
                    key: option.key,
                });
            }
        }

        if !self.has_option(self.correct_answer) {
            return Err(ValidationError::CorrectAnswerNotInOptions {
                question_id: self.id,
                key: self.correct_answer,
            });
        }

        Ok(())
    }
}

/// 检查整批题目：非空、每题合法、id 不重复
pub fn validate_batch(questions: &[Question]) -> Result<(), ValidationError> {
    if questions.is_empty() {
        return Err(ValidationError::EmptyQuestionSet);
    }

    let mut ids = HashSet::new();
    for question in questions {
        question.validate()?;
        if !ids.insert(question.id) {
            return Err(ValidationError::DuplicateQuestionId(question.id));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "id": 1,
        "text": "Hasil dari $3^2 + 4^2$ adalah ...",
        "options": [
            {"key": "A", "text": "7"},
            {"key": "B", "text": "12"},
            {"key": "C", "text": "25"},
            {"key": "D", "text": "49"}
        ],
        "correctAnswer": "C",
        "explanation": "9 + 16 = 25"
    }"#;

    #[test]
    fn test_parse_keeps_all_fields() {
        let q: Question = serde_json::from_str(PAYLOAD).unwrap();
        assert_eq!(q.id, 1);
        assert_eq!(q.text, "Hasil dari $3^2 + 4^2$ adalah ...");
        assert_eq!(q.options.len(), 4);
        assert_eq!(q.options[1].key, OptionKey::B);
        assert_eq!(q.options[1].text, "12");
        assert_eq!(q.correct_answer, OptionKey::C);
        assert_eq!(q.explanation, "9 + 16 = 25");
        assert!(q.validate().is_ok());
    }

    #[test]
    fn test_parse_rejects_unknown_and_missing_fields() {
        let extra = PAYLOAD.replace("\"explanation\"", "\"hint\": \"x\", \"explanation\"");
        assert!(serde_json::from_str::<Question>(&extra).is_err());

        let missing = r#"{"id": 1, "text": "x", "options": [], "correctAnswer": "A"}"#;
        assert!(serde_json::from_str::<Question>(missing).is_err());

        let bad_key = PAYLOAD.replace("\"correctAnswer\": \"C\"", "\"correctAnswer\": \"E\"");
        assert!(serde_json::from_str::<Question>(&bad_key).is_err());
    }

    #[test]
    fn test_validate_correct_answer_not_in_options() {
        let mut q: Question = serde_json::from_str(PAYLOAD).unwrap();
        q.options.retain(|o| o.key != OptionKey::C);
        assert_eq!(
            q.validate(),
            Err(ValidationError::CorrectAnswerNotInOptions {
                question_id: 1,
                key: OptionKey::C
            })
        );
    }

    #[test]
    fn test_validate_empty_and_duplicate_options() {
        let mut q: Question = serde_json::from_str(PAYLOAD).unwrap();
        q.options[3].key = OptionKey::A;
        assert_eq!(
            q.validate(),
            Err(ValidationError::DuplicateOptionKey {
                question_id: 1,
                key: OptionKey::A
            })
        );

        q.options.clear();
        assert_eq!(
            q.validate(),
            Err(ValidationError::EmptyOptions { question_id: 1 })
        );
    }

    #[test]
    fn test_validate_batch_rejects_duplicate_ids() {
        let q: Question = serde_json::from_str(PAYLOAD).unwrap();
        assert_eq!(validate_batch(&[]), Err(ValidationError::EmptyQuestionSet));
        assert!(validate_batch(&[q.clone()]).is_ok());
        assert_eq!(
            validate_batch(&[q.clone(), q]),
            Err(ValidationError::DuplicateQuestionId(1))
        );
    }

    #[test]
    fn test_option_key_parse() {
        assert_eq!(OptionKey::parse("b"), Some(OptionKey::B));
        assert_eq!(OptionKey::parse(" D "), Some(OptionKey::D));
        assert_eq!(OptionKey::parse("E"), None);
    }
}
