//! 出题参数
//!
//! 表单中每个下拉框对应一个枚举，序列化时使用界面上显示的文字。

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::Subject;

/// 单次最多生成的题目数
pub const MAX_QUESTION_COUNT: u32 = 10;

/// 固定选项集合
///
/// `find` 支持按表单序号（从 1 开始）或显示文字（忽略大小写）查找。
pub trait Choice: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    fn find(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied());
        }
        let lower = s.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.label().to_lowercase() == lower)
    }
}

/// 年级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Grade {
    #[default]
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
}

impl Choice for Grade {
    const ALL: &'static [Self] = &[Grade::Seven, Grade::Eight, Grade::Nine];

    fn label(self) -> &'static str {
        match self {
            Grade::Seven => "7",
            Grade::Eight => "8",
            Grade::Nine => "9",
        }
    }

    // 年级直接按数字匹配，不按序号
    fn find(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.iter().copied().find(|g| g.label() == s)
    }
}

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Mudah,
    #[default]
    Sedang,
    Sulit,
}

impl Choice for Difficulty {
    const ALL: &'static [Self] = &[Difficulty::Mudah, Difficulty::Sedang, Difficulty::Sulit];

    fn label(self) -> &'static str {
        match self {
            Difficulty::Mudah => "Mudah",
            Difficulty::Sedang => "Sedang",
            Difficulty::Sulit => "Sulit",
        }
    }
}

/// 认知层级，与难度相互独立
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CognitiveLevel {
    #[default]
    #[serde(rename = "Semua Level")]
    All,
    #[serde(rename = "Pengetahuan & Pemahaman (L1)")]
    Knowledge,
    #[serde(rename = "Aplikasi (L2)")]
    Application,
    #[serde(rename = "Penalaran (L3)")]
    Reasoning,
}

impl Choice for CognitiveLevel {
    const ALL: &'static [Self] = &[
        CognitiveLevel::All,
        CognitiveLevel::Knowledge,
        CognitiveLevel::Application,
        CognitiveLevel::Reasoning,
    ];

    fn label(self) -> &'static str {
        match self {
            CognitiveLevel::All => "Semua Level",
            CognitiveLevel::Knowledge => "Pengetahuan & Pemahaman (L1)",
            CognitiveLevel::Application => "Aplikasi (L2)",
            CognitiveLevel::Reasoning => "Penalaran (L3)",
        }
    }
}

/// 数学子专题（仅在科目为数学时使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MathSubTopic {
    #[default]
    General,
    RealNumbers,
    PowersAndRoots,
    LinearEquations,
    LinearSystems,
    Functions,
    Sequences,
    Angles,
    Pythagoras,
    Congruence,
    Solids,
    Transformations,
    PlaneMeasurement,
    Statistics,
    Probability,
}

impl Choice for MathSubTopic {
    const ALL: &'static [Self] = &[
        MathSubTopic::General,
        MathSubTopic::RealNumbers,
        MathSubTopic::PowersAndRoots,
        MathSubTopic::LinearEquations,
        MathSubTopic::LinearSystems,
        MathSubTopic::Functions,
        MathSubTopic::Sequences,
        MathSubTopic::Angles,
        MathSubTopic::Pythagoras,
        MathSubTopic::Congruence,
        MathSubTopic::Solids,
        MathSubTopic::Transformations,
        MathSubTopic::PlaneMeasurement,
        MathSubTopic::Statistics,
        MathSubTopic::Probability,
    ];

    fn label(self) -> &'static str {
        match self {
            MathSubTopic::General => "Umum",
            MathSubTopic::RealNumbers => "Bilangan: Bilangan Real (Operasi, Rasio, Skala)",
            MathSubTopic::PowersAndRoots => "Bilangan: Bilangan Berpangkat & Akar",
            MathSubTopic::LinearEquations => "Aljabar: Persamaan & Pertidaksamaan Linear",
            MathSubTopic::LinearSystems => "Aljabar: Sistem Persamaan Linear Dua Variabel (SPLDV)",
            MathSubTopic::Functions => "Aljabar: Fungsi & Relasi",
            MathSubTopic::Sequences => "Aljabar: Barisan & Deret",
            MathSubTopic::Angles => "Geometri: Hubungan Antar Sudut",
            MathSubTopic::Pythagoras => "Geometri: Teorema Pythagoras",
            MathSubTopic::Congruence => "Geometri: Kekongruenan & Kesebangunan",
            MathSubTopic::Solids => "Geometri: Bangun Ruang (Jaring-jaring & Volume)",
            MathSubTopic::Transformations => "Geometri: Transformasi (Refleksi, Rotasi, dll)",
            MathSubTopic::PlaneMeasurement => "Pengukuran: Keliling & Luas Bangun Datar",
            MathSubTopic::Statistics => "Data: Statistika (Mean, Median, Modus, Diagram)",
            MathSubTopic::Probability => "Peluang: Kejadian Tunggal",
        }
    }
}

impl From<MathSubTopic> for String {
    fn from(topic: MathSubTopic) -> Self {
        topic.label().to_string()
    }
}

impl TryFrom<String> for MathSubTopic {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MathSubTopic::ALL
            .iter()
            .copied()
            .find(|t| t.label() == value)
            .ok_or_else(|| format!("sub-materi tidak dikenal: {value}"))
    }
}

macro_rules! display_via_label {
    ($($ty:ty),*) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

display_via_label!(Grade, Difficulty, CognitiveLevel, MathSubTopic);

/// 出题参数
///
/// 生成前可通过表单修改；开始生成时取一份快照交给会话。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionParams {
    pub subject: Subject,
    pub grade: Grade,
    pub difficulty: Difficulty,
    pub cognitive_level: CognitiveLevel,
    /// 非数学科目的自由专题
    pub topic: String,
    pub sub_topic: MathSubTopic,
    pub count: u32,
}

impl Default for QuestionParams {
    fn default() -> Self {
        Self {
            subject: Subject::Math,
            grade: Grade::Seven,
            difficulty: Difficulty::Sedang,
            cognitive_level: CognitiveLevel::All,
            topic: String::new(),
            sub_topic: MathSubTopic::General,
            count: 5,
        }
    }
}

impl QuestionParams {
    /// 设置题目数量，超出 1..=10 时拒绝并保持原值
    pub fn set_count(&mut self, count: u32) -> Result<(), ValidationError> {
        if !(1..=MAX_QUESTION_COUNT).contains(&count) {
            return Err(ValidationError::CountOutOfRange(count));
        }
        self.count = count;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=MAX_QUESTION_COUNT).contains(&self.count) {
            return Err(ValidationError::CountOutOfRange(self.count));
        }
        Ok(())
    }

    /// 实际使用的子专题：数学取子专题下拉框，其他科目取自由专题（为空时为 "Umum"）
    pub fn effective_topic(&self) -> &str {
        if self.subject.is_math() {
            self.sub_topic.label()
        } else {
            let topic = self.topic.trim();
            if topic.is_empty() {
                "Umum"
            } else {
                topic
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_form() {
        let params = QuestionParams::default();
        assert_eq!(params.subject, Subject::Math);
        assert_eq!(params.grade, Grade::Seven);
        assert_eq!(params.count, 5);
        assert_eq!(params.difficulty, Difficulty::Sedang);
        assert_eq!(params.cognitive_level, CognitiveLevel::All);
        assert_eq!(params.sub_topic, MathSubTopic::General);
        assert!(params.topic.is_empty());
    }

    #[test]
    fn test_set_count_bounds() {
        let mut params = QuestionParams::default();
        assert!(params.set_count(10).is_ok());
        assert_eq!(params.count, 10);
        assert_eq!(params.set_count(0), Err(ValidationError::CountOutOfRange(0)));
        assert_eq!(params.set_count(11), Err(ValidationError::CountOutOfRange(11)));
        assert_eq!(params.count, 10);
    }

    #[test]
    fn test_effective_topic() {
        let mut params = QuestionParams::default();
        params.sub_topic = MathSubTopic::Pythagoras;
        params.topic = "Ekosistem".to_string();
        assert_eq!(params.effective_topic(), "Geometri: Teorema Pythagoras");

        params.subject = Subject::Science;
        assert_eq!(params.effective_topic(), "Ekosistem");

        params.topic = "   ".to_string();
        assert_eq!(params.effective_topic(), "Umum");
    }

    #[test]
    fn test_choice_find() {
        assert_eq!(Grade::find("9"), Some(Grade::Nine));
        assert_eq!(Grade::find("1"), None);
        assert_eq!(Difficulty::find("sulit"), Some(Difficulty::Sulit));
        assert_eq!(Difficulty::find("1"), Some(Difficulty::Mudah));
        assert_eq!(CognitiveLevel::find("4"), Some(CognitiveLevel::Reasoning));
        assert_eq!(MathSubTopic::find("15"), Some(MathSubTopic::Probability));
        assert_eq!(MathSubTopic::find("16"), None);
        assert_eq!(MathSubTopic::ALL.len(), 15);
    }

    #[test]
    fn test_params_json_uses_labels() {
        let value = serde_json::to_value(QuestionParams::default()).unwrap();
        assert_eq!(value["subject"], "Matematika");
        assert_eq!(value["grade"], "7");
        assert_eq!(value["cognitiveLevel"], "Semua Level");
        assert_eq!(value["subTopic"], "Umum");
    }
}
