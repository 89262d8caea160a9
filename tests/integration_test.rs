use tka_simulator::error::GenerationError;
use tka_simulator::models::{Grade, OptionKey, Subject};
use tka_simulator::services::{CompletionBackend, CompletionRequest, ProviderFailure};
use tka_simulator::utils::logging;
use tka_simulator::{AppError, Config, GenerationClient, KeyStore, LlmService, QuizController, SessionPhase};

/// 固定返回一段文本的后端
struct FixedBackend(String);

impl CompletionBackend for FixedBackend {
    async fn complete(
        &self,
        _api_key: &str,
        request: &CompletionRequest,
    ) -> Result<Option<String>, ProviderFailure> {
        assert!(request.user_message.contains("Mata Pelajaran: Matematika"));
        assert!(request.user_message.contains("Kelas: 7"));
        assert!(request.user_message.contains("Jumlah Soal: 3"));
        Ok(Some(self.0.clone()))
    }
}

const THREE_QUESTIONS: &str = r#"```json
[
  {
    "id": 1,
    "text": "Pak Andi di Mappedeceng memanen **120 kg** kakao. Sepertiganya dijual. Sisa kakao adalah ...",
    "options": [
      {"key": "A", "text": "40 kg"},
      {"key": "B", "text": "60 kg"},
      {"key": "C", "text": "80 kg"},
      {"key": "D", "text": "90 kg"}
    ],
    "correctAnswer": "C",
    "explanation": "Terjual 120 / 3 = 40 kg, sisa 120 - 40 = 80 kg."
  },
  {
    "id": 2,
    "text": "Nilai dari $-7 + 12$ adalah ...",
    "options": [
      {"key": "A", "text": "-19"},
      {"key": "B", "text": "-5"},
      {"key": "C", "text": "5"},
      {"key": "D", "text": "19"}
    ],
    "correctAnswer": "C",
    "explanation": "-7 + 12 = 5."
  },
  {
    "id": 3,
    "text": "Perbandingan 15 : 25 dalam bentuk paling sederhana adalah ...",
    "options": [
      {"key": "A", "text": "3 : 5"},
      {"key": "B", "text": "5 : 3"},
      {"key": "C", "text": "1 : 2"},
      {"key": "D", "text": "2 : 3"}
    ],
    "correctAnswer": "A",
    "explanation": "FPB dari 15 dan 25 adalah 5, sehingga 15 : 25 = 3 : 5."
  }
]
```"#;

#[tokio::test]
async fn test_end_to_end_three_questions_two_correct() {
    let dir = tempfile::tempdir().unwrap();
    let key_store = KeyStore::new(dir.path().join("gensoal.toml"));
    let generator = GenerationClient::new(FixedBackend(THREE_QUESTIONS.to_string()), None);
    let mut quiz = QuizController::new(generator, key_store).await.unwrap();

    // 没有密钥时不会发请求
    let err = quiz.generate().await.unwrap_err();
    assert!(matches!(err, AppError::Generation(GenerationError::MissingCredential)));
    assert_eq!(quiz.session().phase(), SessionPhase::Idle);

    quiz.save_key("AIzaSy-integration").await.unwrap();
    quiz.set_subject(Subject::Math).unwrap();
    quiz.set_grade(Grade::Seven).unwrap();
    quiz.set_count(3).unwrap();

    assert_eq!(quiz.generate().await.unwrap(), 3);
    assert_eq!(quiz.session().phase(), SessionPhase::InProgress);
    assert_eq!(quiz.session().questions()[0].correct_answer, OptionKey::C);

    // 第 1 题答对并核对
    quiz.select(OptionKey::C).unwrap();
    quiz.check().unwrap();
    assert!(quiz.select(OptionKey::A).is_err());

    // 第 2 题答错
    assert!(quiz.next());
    quiz.select(OptionKey::B).unwrap();

    // 还有一题没答，不能交卷
    assert!(quiz.submit().is_err());

    // 第 3 题答对
    assert!(quiz.next());
    assert!(!quiz.next());
    quiz.select(OptionKey::A).unwrap();

    assert_eq!(quiz.submit(), Ok(67));
    assert_eq!(quiz.session().phase(), SessionPhase::Complete);
    assert_eq!(quiz.session().score(), Some(67));

    quiz.reset();
    assert_eq!(quiz.session().phase(), SessionPhase::Idle);
    assert!(quiz.session().questions().is_empty());
    assert_eq!(quiz.session().answered_count(), 0);
    assert_eq!(quiz.session().current_index(), 0);
}

#[tokio::test]
#[ignore] // 需要真实 API Key：GEMINI_API_KEY=... cargo test -- --ignored
async fn test_generate_with_live_provider() {
    // 初始化日志
    logging::init(true);

    // 加载配置
    let config = Config::from_env();
    let dir = tempfile::tempdir().unwrap();

    let generator = GenerationClient::new(LlmService::new(&config), config.gemini_api_key.clone());
    let mut quiz = QuizController::new(generator, KeyStore::new(dir.path().join("gensoal.toml")))
        .await
        .expect("创建控制器失败");
    quiz.set_count(2).unwrap();

    let count = quiz.generate().await.expect("生成题目失败");
    assert!(count >= 1);

    for q in quiz.session().questions() {
        println!("#{} {}", q.id, q.text);
        assert!(q.validate().is_ok());
    }
}
