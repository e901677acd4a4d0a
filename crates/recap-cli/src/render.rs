//! Plain-text rendering of quizzes for the terminal.

use std::fmt::Write;

use recap_core::{render_markdown, Quiz};

/// Render a quiz. Correct options and model answers are only shown when
/// `show_answers` is set.
pub fn render_quiz(quiz: &Quiz, show_answers: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", render_markdown(&quiz.title));

    for (i, question) in quiz.questions.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}. {}", i + 1, render_markdown(&question.text));

        if question.is_multiple_choice() {
            for (j, option) in question.options.iter().flatten().enumerate() {
                let marker = if show_answers && option.correct { "*" } else { " " };
                let _ = writeln!(
                    out,
                    "   {}{}) {}",
                    marker,
                    option_letter(j),
                    render_markdown(&option.text)
                );
            }
        } else if show_answers {
            if let Some(answer) = &question.answer {
                let _ = writeln!(out, "   Answer: {}", render_markdown(answer));
            }
        }
    }

    if let Some(score) = quiz.score() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Score: {}", score);
    }
    out
}

/// One line of the history listing, numbered from 1.
pub fn render_history_line(index: usize, quiz: &Quiz) -> String {
    let status = match quiz.score() {
        Some(score) => score.to_string(),
        None => "unanswered".to_string(),
    };
    format!(
        "{:>3}. {} ({} questions, {})",
        index + 1,
        quiz.title,
        quiz.questions.len(),
        status
    )
}

fn option_letter(index: usize) -> char {
    char::from_u32('a' as u32 + (index % 26) as u32).unwrap_or('?')
}
