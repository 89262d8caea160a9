use phf::phf_map;

/// 科目枚举（TKA SMP 的 7 个科目）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Subject {
    /// 数学
    #[default]
    #[serde(rename = "Matematika")]
    Math,
    /// 自然科学
    #[serde(rename = "IPA")]
    Science,
    /// 社会科学
    #[serde(rename = "IPS")]
    Social,
    /// 印尼语
    #[serde(rename = "Bahasa Indonesia")]
    Indonesian,
    /// 英语
    #[serde(rename = "Bahasa Inggris")]
    English,
    /// 公民教育
    #[serde(rename = "Pendidikan Pancasila")]
    Pancasila,
    /// 信息技术
    #[serde(rename = "Informatika")]
    Informatics,
}

/// 常用简称（小写）到科目的映射
static ALIASES: phf::Map<&'static str, Subject> = phf_map! {
    "mtk" => Subject::Math,
    "math" => Subject::Math,
    "ipa" => Subject::Science,
    "sains" => Subject::Science,
    "ips" => Subject::Social,
    "bindo" => Subject::Indonesian,
    "b. indonesia" => Subject::Indonesian,
    "bing" => Subject::English,
    "b. inggris" => Subject::English,
    "english" => Subject::English,
    "ppkn" => Subject::Pancasila,
    "pancasila" => Subject::Pancasila,
    "tik" => Subject::Informatics,
};

impl Subject {
    /// 表单中的固定顺序
    pub const ALL: [Subject; 7] = [
        Subject::Math,
        Subject::Science,
        Subject::Social,
        Subject::Indonesian,
        Subject::English,
        Subject::Pancasila,
        Subject::Informatics,
    ];

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Subject::Math => "Matematika",
            Subject::Science => "IPA",
            Subject::Social => "IPS",
            Subject::Indonesian => "Bahasa Indonesia",
            Subject::English => "Bahasa Inggris",
            Subject::Pancasila => "Pendidikan Pancasila",
            Subject::Informatics => "Informatika",
        }
    }

    pub fn is_math(self) -> bool {
        self == Subject::Math
    }

    /// 尝试从标准名称解析科目（精确匹配）
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|subject| subject.name() == s)
    }

    /// 智能查找科目
    ///
    /// 依次尝试：表单序号（从 1 开始）、标准名称（忽略大小写）、简称。
    pub fn find(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied());
        }

        if let Some(subject) = Self::from_name(s) {
            return Some(subject);
        }

        let lower = s.to_lowercase();
        if let Some(subject) = Self::ALL
            .into_iter()
            .find(|subject| subject.name().to_lowercase() == lower)
        {
            return Some(subject);
        }

        ALIASES.get(lower.as_str()).copied()
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
