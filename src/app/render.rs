//! 终端界面渲染
//!
//! 只读取状态、返回字符串，不修改任何东西。

use std::fmt::Write;

use crate::error::GenerationError;
use crate::models::{Choice, CognitiveLevel, Difficulty, MathSubTopic, QuestionParams, Subject};
use crate::workflow::{CredentialStatus, Session, SessionPhase};

const WIDTH: usize = 60;

fn rule(out: &mut String, ch: &str) {
    let _ = writeln!(out, "{}", ch.repeat(WIDTH));
}

fn numbered<T: Copy>(items: &[T], label: impl Fn(T) -> String, current: T) -> String
where
    T: PartialEq,
{
    items
        .iter()
        .enumerate()
        .map(|(i, &item)| {
            let marker = if item == current { "*" } else { " " };
            format!("   {marker}{:>2}. {}", i + 1, label(item))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 配置表单
pub fn render_form(
    params: &QuestionParams,
    credential: CredentialStatus,
    last_error: Option<&GenerationError>,
) -> String {
    let mut out = String::new();
    rule(&mut out, "=");
    let _ = writeln!(out, "🏫 Simulator TKA · UPT SMPN 4 Mappedeceng");
    rule(&mut out, "=");

    let key_line = match credential {
        CredentialStatus::Saved => "🔑 API Key: tersimpan di perangkat ini",
        CredentialStatus::Environment => "🔑 API Key: bawaan lingkungan",
        CredentialStatus::Missing => "🔑 API Key: belum ada (ketik `kunci <API_KEY>`)",
    };
    let _ = writeln!(out, "{key_line}");

    if let Some(err) = last_error {
        let _ = writeln!(out, "\n❌ {err}");
    }

    let _ = writeln!(out, "\n⚙️  Mulai Simulasi Baru");
    let _ = writeln!(out, "  Mata Pelajaran (mapel):");
    let _ = writeln!(out, "{}", numbered(&Subject::ALL, |s| s.name().to_string(), params.subject));
    let _ = writeln!(out, "  Kelas (kelas 7|8|9): Kelas {}", params.grade);
    let _ = writeln!(out, "  Kesulitan (kesulitan):");
    let _ = writeln!(out, "{}", numbered(Difficulty::ALL, |d| d.label().to_string(), params.difficulty));
    let _ = writeln!(out, "  Level Kognitif (level):");
    let _ = writeln!(
        out,
        "{}",
        numbered(CognitiveLevel::ALL, |l| l.label().to_string(), params.cognitive_level)
    );

    if params.subject.is_math() {
        let _ = writeln!(out, "  Sub-Materi (submateri):");
        let _ = writeln!(out, "{}", numbered(MathSubTopic::ALL, |t| t.label().to_string(), params.sub_topic));
    } else {
        let topic = if params.topic.trim().is_empty() {
            "(kosong, Umum)"
        } else {
            params.topic.as_str()
        };
        let _ = writeln!(out, "  Topik (topik <teks>): {topic}");
    }

    let _ = writeln!(out, "  Jumlah Soal (jumlah 1-10): {}", params.count);
    let _ = writeln!(out, "\n✨ Ketik `mulai` untuk membuat soal, `bantuan` untuk daftar perintah.");
    out
}

/// 生成中提示
pub fn render_loading(params: &QuestionParams) -> String {
    format!(
        "⏳ Menyusun {} soal {} Kelas {} ({})...\n   Mohon tunggu, AI sedang berpikir.",
        params.count,
        params.subject,
        params.grade,
        params.effective_topic()
    )
}

/// 当前题目
pub fn render_question(session: &Session) -> String {
    let Some(question) = session.current_question() else {
        return String::new();
    };

    let total = session.questions().len();
    let selected = session.answer(question.id);
    let checked = session.is_checked(question.id);

    let mut out = String::new();
    rule(&mut out, "─");
    let _ = writeln!(
        out,
        "Soal {} dari {} · Terjawab {}/{}",
        session.current_index() + 1,
        total,
        session.answered_count(),
        total
    );
    rule(&mut out, "─");
    let _ = writeln!(out, "{}\n", question.text.trim());

    for option in &question.options {
        let is_selected = selected == Some(option.key);
        let marker = match (checked, is_selected, question.is_correct(option.key)) {
            (true, _, true) => "✓",
            (true, true, false) => "✗",
            (false, true, _) => ">",
            _ => " ",
        };
        let _ = writeln!(out, " {marker} [{}] {}", option.key, option.text.trim());
    }

    if checked {
        let verdict = if selected == Some(question.correct_answer) {
            "✅ Jawaban benar!".to_string()
        } else {
            format!("❌ Jawaban kurang tepat. Kunci: {}", question.correct_answer)
        };
        let _ = writeln!(out, "\n{verdict}");
        let _ = writeln!(out, "💡 Pembahasan:\n{}", question.explanation.trim());
    }

    let mut actions = Vec::new();
    if !checked {
        actions.push("a-d: pilih");
    }
    if selected.is_some() && !checked {
        actions.push("cek");
    }
    if session.current_index() > 0 {
        actions.push("kembali");
    }
    if session.is_last_question() {
        if session.all_answered() {
            actions.push("kirim");
        } else {
            actions.push("kirim (jawab semua soal dulu)");
        }
    } else {
        actions.push("lanjut");
    }
    let _ = writeln!(out, "\nAksi: {}", actions.join(" · "));
    out
}

/// 结果页（也用于打印）
pub fn render_report(session: &Session) -> String {
    let mut out = String::new();
    let total = session.questions().len();

    if let Some(params) = session.params() {
        let _ = writeln!(
            out,
            "{} · Kelas {} · {} · {}",
            params.subject,
            params.grade,
            params.difficulty,
            params.effective_topic()
        );
    }
    let _ = writeln!(out, "🏆 Nilai: {}", session.score().unwrap_or(0));
    let _ = writeln!(out, "Benar {} dari {} soal\n", session.correct_count(), total);
    rule(&mut out, "─");
    let _ = writeln!(out, "Pembahasan Soal");
    rule(&mut out, "─");

    for item in session.review() {
        let mark = if item.is_correct { "✓" } else { "✗" };
        let _ = writeln!(out, "{}. {} {}", item.number, mark, item.question.text.trim());
        for option in &item.question.options {
            let _ = writeln!(out, "     [{}] {}", option.key, option.text.trim());
        }
        let answer = item
            .selected
            .map_or_else(|| "-".to_string(), |k| k.to_string());
        let _ = writeln!(
            out,
            "   Jawaban Anda: {} · Kunci: {}",
            answer, item.question.correct_answer
        );
        let _ = writeln!(out, "   Pembahasan: {}\n", item.question.explanation.trim());
    }

    out
}

/// 当前状态下可用的命令
pub fn render_help(phase: SessionPhase) -> String {
    let body = match phase {
        SessionPhase::Idle => {
            "mapel <no|nama>      pilih mata pelajaran\n\
             kelas <7|8|9>        pilih kelas\n\
             kesulitan <no|nama>  pilih tingkat kesulitan\n\
             level <no|nama>      pilih level kognitif\n\
             submateri <no>       sub-materi (Matematika)\n\
             topik <teks>         topik (mapel selain Matematika)\n\
             jumlah <1-10>        jumlah soal\n\
             kunci <API_KEY>      simpan API Key\n\
             hapus-kunci          hapus API Key tersimpan\n\
             mulai                buat soal"
        }
        SessionPhase::Loading => "Sedang memuat soal, mohon tunggu.",
        SessionPhase::InProgress => {
            "a | b | c | d        pilih jawaban\n\
             cek                  kunci dan lihat pembahasan\n\
             lanjut (n)           soal berikutnya\n\
             kembali (p)          soal sebelumnya\n\
             kirim                selesai (semua soal harus dijawab)\n\
             ulang                batalkan dan kembali ke pengaturan"
        }
        SessionPhase::Complete => {
            "cetak                simpan hasil ke berkas\n\
             ulang                ulangi simulasi"
        }
    };
    format!("{body}\nlihat                tampilkan layar lagi\nkeluar (q)           keluar")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OptionKey, Question, QuestionOption};

    fn question(id: i64) -> Question {
        Question {
            id,
            text: format!("Berapakah {id} + {id}?"),
            options: vec![
                QuestionOption { key: OptionKey::A, text: format!("{}", id * 2) },
                QuestionOption { key: OptionKey::B, text: "0".to_string() },
            ],
            correct_answer: OptionKey::A,
            explanation: "Penjumlahan biasa".to_string(),
        }
    }

    fn session(n: i64) -> Session {
        let mut session = Session::new();
        session.start_generation(QuestionParams::default()).unwrap();
        session.complete_generation((1..=n).map(question).collect()).unwrap();
        session
    }

    #[test]
    fn test_form_shows_math_sub_topics_only_for_math() {
        let mut params = QuestionParams::default();
        let text = render_form(&params, CredentialStatus::Missing, None);
        assert!(text.contains("Sub-Materi"));
        assert!(text.contains("belum ada"));

        params.subject = Subject::Social;
        let text = render_form(&params, CredentialStatus::Saved, Some(&GenerationError::QuotaExceeded));
        assert!(!text.contains("Sub-Materi"));
        assert!(text.contains("Topik"));
        assert!(text.contains("Kuota API Key Anda telah habis."));
    }

    #[test]
    fn test_question_shows_progress_and_explanation_after_check() {
        let mut s = session(2);
        let text = render_question(&s);
        assert!(text.contains("Soal 1 dari 2"));
        assert!(!text.contains("Pembahasan"));

        s.select_answer(1, OptionKey::B).unwrap();
        s.check_answer(1).unwrap();
        let text = render_question(&s);
        assert!(text.contains("Kunci: A"));
        assert!(text.contains("Penjumlahan biasa"));
        assert!(text.contains("✗ [B]"));
    }

    #[test]
    fn test_submit_hint_on_last_question() {
        let mut s = session(2);
        s.advance();
        assert!(render_question(&s).contains("jawab semua soal dulu"));
        s.select_answer(1, OptionKey::A).unwrap();
        s.select_answer(2, OptionKey::A).unwrap();
        let text = render_question(&s);
        assert!(text.contains("cek · kembali · kirim"));
        assert!(!text.contains("jawab semua soal dulu"));
    }

    #[test]
    fn test_report_lists_every_question() {
        let mut s = session(3);
        s.select_answer(1, OptionKey::A).unwrap();
        s.select_answer(2, OptionKey::A).unwrap();
        s.select_answer(3, OptionKey::B).unwrap();
        s.submit().unwrap();

        let text = render_report(&s);
        assert!(text.contains("Nilai: 67"));
        assert!(text.contains("Benar 2 dari 3 soal"));
        assert!(text.contains("3. ✗"));
        assert!(text.contains("Jawaban Anda: B · Kunci: A"));
    }
}
