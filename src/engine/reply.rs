//! Line-oriented parser for assistant replies.
//!
//! Replies are loose markdown with embedded multiple-choice questions:
//!
//! ```text
//! **س1: ما الجهاز النفسي المسؤول عن الغرائز؟**
//! أ) الأنا
//! ب) الهو
//! الإجابة الصحيحة: ب
//! الشرح الأكاديمي: الهو خزان الطاقة الغريزية.
//! ```
//!
//! Each line is classified by the first matching token rule. A quiz header
//! followed by at least one option line becomes a single [`Block::Quiz`].

use std::sync::LazyLock;

use regex::Regex;

static QUIZ_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\*\*)?(?:س\s*\d+|Q\d+|(?i:question)\s+\d+)\s*:\s*(.+?)(?:\*\*)?$")
        .expect("static regex")
});
static OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([أبجده]|[A-E])[).]\s*(.+)$").expect("static regex"));
static ANSWER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*?(?:الإجابة الصحيحة|(?i:correct answer|answer))\s*:\s*(.+?)\*?$")
        .expect("static regex")
});
static EXPLANATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:الشرح الأكاديمي|التفسير|(?i:explanation))\s*:\s*(.+)$")
        .expect("static regex")
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizOption {
    pub label: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizBlock {
    pub question: String,
    pub options: Vec<QuizOption>,
    pub answer: Option<String>,
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Heading(String),
    Bullet(String),
    Paragraph(String),
    Blank,
    Quiz(QuizBlock),
}

pub fn parse(reply: &str) -> Vec<Block> {
    let lines: Vec<&str> = reply.lines().map(str::trim).collect();
    let mut blocks = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if let Some((quiz, next)) = parse_quiz(&lines, i) {
            blocks.push(Block::Quiz(quiz));
            i = next;
            continue;
        }
        blocks.push(classify(lines[i]));
        i += 1;
    }
    blocks
}

fn classify(line: &str) -> Block {
    if line.is_empty() {
        Block::Blank
    } else if line.starts_with("**") {
        Block::Heading(line.replace("**", "").trim().to_string())
    } else if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("• ")) {
        Block::Bullet(rest.to_string())
    } else {
        Block::Paragraph(line.to_string())
    }
}

/// Returns the quiz and the index of the first line after it.
fn parse_quiz(lines: &[&str], start: usize) -> Option<(QuizBlock, usize)> {
    let header = QUIZ_HEADER.captures(lines[start])?;
    let mut quiz = QuizBlock {
        question: header[1].trim().to_string(),
        options: Vec::new(),
        answer: None,
        explanation: None,
    };

    // Blank lines are consumed only when something follows them.
    let mut end = start + 1;
    for (offset, line) in lines[start + 1..].iter().enumerate() {
        let index = start + 1 + offset;
        if line.is_empty() {
            continue;
        }
        if let Some(caps) = OPTION.captures(line) {
            quiz.options.push(QuizOption {
                label: caps[1].to_string(),
                text: caps[2].trim().to_string(),
            });
        } else if let Some(caps) = ANSWER.captures(line) {
            quiz.answer = Some(caps[1].trim().to_string());
        } else if let Some(caps) = EXPLANATION.captures(line) {
            quiz.explanation = Some(caps[1].trim().to_string());
            end = index + 1;
            break;
        } else {
            break;
        }
        end = index + 1;
    }

    if quiz.options.is_empty() {
        return None;
    }
    Some((quiz, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arabic_quiz_becomes_one_block() {
        let reply = "**س1: ما الجهاز المسؤول عن الغرائز؟**\n\
                     أ) الأنا\n\
                     ب) الهو\n\
                     ج) الأنا الأعلى\n\
                     الإجابة الصحيحة: ب\n\
                     الشرح الأكاديمي: الهو خزان الطاقة الغريزية.";
        let blocks = parse(reply);
        assert_eq!(blocks.len(), 1);
        let Block::Quiz(quiz) = &blocks[0] else {
            panic!("expected quiz, got {blocks:?}");
        };
        assert_eq!(quiz.question, "ما الجهاز المسؤول عن الغرائز؟");
        assert_eq!(quiz.options.len(), 3);
        assert_eq!(quiz.options[1].label, "ب");
        assert_eq!(quiz.options[1].text, "الهو");
        assert_eq!(quiz.answer.as_deref(), Some("ب"));
        assert_eq!(
            quiz.explanation.as_deref(),
            Some("الهو خزان الطاقة الغريزية.")
        );
    }

    #[test]
    fn english_quiz_with_blank_lines_inside() {
        let reply = "Q2: Which principle guides the ego?\n\nA) Pleasure\nB. Reality\n\nCorrect answer: B\nExplanation: The ego mediates.\n\nMore text";
        let blocks = parse(reply);
        assert_eq!(
            blocks,
            vec![
                Block::Quiz(QuizBlock {
                    question: "Which principle guides the ego?".into(),
                    options: vec![
                        QuizOption {
                            label: "A".into(),
                            text: "Pleasure".into()
                        },
                        QuizOption {
                            label: "B".into(),
                            text: "Reality".into()
                        },
                    ],
                    answer: Some("B".into()),
                    explanation: Some("The ego mediates.".into()),
                }),
                Block::Blank,
                Block::Paragraph("More text".into()),
            ]
        );
    }

    #[test]
    fn unrecognized_line_ends_quiz_and_is_kept() {
        let reply = "Question 3: Pick one\nA) yes\nB) no\nThat is all.";
        let blocks = parse(reply);
        assert!(matches!(&blocks[0], Block::Quiz(q) if q.answer.is_none()));
        assert_eq!(blocks[1], Block::Paragraph("That is all.".into()));
    }

    #[test]
    fn header_without_options_is_not_a_quiz() {
        let blocks = parse("**س4: سؤال بلا خيارات**\nنص عادي");
        assert_eq!(
            blocks,
            vec![
                Block::Heading("س4: سؤال بلا خيارات".into()),
                Block::Paragraph("نص عادي".into()),
            ]
        );
    }

    #[test]
    fn headings_bullets_and_blanks() {
        let blocks = parse("**مفاهيم أساسية**\n- الهو\n• الأنا\n\n  نص  ");
        assert_eq!(
            blocks,
            vec![
                Block::Heading("مفاهيم أساسية".into()),
                Block::Bullet("الهو".into()),
                Block::Bullet("الأنا".into()),
                Block::Blank,
                Block::Paragraph("نص".into()),
            ]
        );
    }

    #[test]
    fn markdown_hashes_and_numbers_stay_paragraphs() {
        let blocks = parse("## مراجعة\n1. الهو\n**مراجعة**");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("## مراجعة".into()),
                Block::Paragraph("1. الهو".into()),
                Block::Heading("مراجعة".into()),
            ]
        );
    }

    #[test]
    fn trailing_blank_lines_after_quiz_are_preserved() {
        let blocks = parse("Q1: x\nA) a\n\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1], Block::Blank);
    }
}
