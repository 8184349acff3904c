//! Quiz builder and runner logic
//!
//! Questions are derived from the learner's source text: long words become
//! the subject of templated multiple-choice questions. Without source text a
//! canned set fills the first questions.

use serde::{Deserialize, Serialize};

use crate::models::UserRole;

/// Seconds allotted per question; the whole quiz shares one budget
pub const SECONDS_PER_QUESTION: u32 = 30;

pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 25;

/// Words of this length or shorter are not used as question subjects
const MIN_TOKEN_LEN: usize = 6;
const MAX_TOKENS: usize = 50;

/// Fraction of correct answers needed to pass
const PASS_RATIO: f64 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn next(&self) -> Difficulty {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

/// Question style a teacher asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Mcq,
    TrueFalse,
    Mix,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::TrueFalse => "truefalse",
            QuestionType::Mix => "mix",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "Multiple choice",
            QuestionType::TrueFalse => "True/False",
            QuestionType::Mix => "Mixed",
        }
    }

    pub fn next(&self) -> QuestionType {
        match self {
            QuestionType::Mcq => QuestionType::TrueFalse,
            QuestionType::TrueFalse => QuestionType::Mix,
            QuestionType::Mix => QuestionType::Mcq,
        }
    }
}

/// What the builder produces
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizSpec {
    pub topic: String,
    pub source_text: String,
    pub num_questions: usize,
    pub difficulty: Difficulty,
    pub enable_hints: bool,

    // Teacher setup, only used for the teach role
    pub grade_level: String,
    pub question_type: QuestionType,
    pub objectives: String,
}

impl Default for QuizSpec {
    fn default() -> Self {
        QuizSpec {
            topic: String::new(),
            source_text: String::new(),
            num_questions: 5,
            difficulty: Difficulty::Medium,
            enable_hints: true,
            grade_level: String::new(),
            question_type: QuestionType::Mcq,
            objectives: String::new(),
        }
    }
}

impl QuizSpec {
    /// Question count clamped to the allowed range
    pub fn question_count(&self) -> usize {
        self.num_questions.clamp(MIN_QUESTIONS, MAX_QUESTIONS)
    }

    pub fn total_seconds(&self) -> u32 {
        SECONDS_PER_QUESTION * self.question_count() as u32
    }

    /// A quiz needs a topic or some source text
    pub fn can_build(&self) -> bool {
        !self.topic.trim().is_empty() || !self.source_text.trim().is_empty()
    }

    /// Spec handed to the runner. For teachers the setup fields are
    /// appended to the source text, one `\n<Label>: <value>` part each.
    pub fn for_role(&self, role: UserRole) -> QuizSpec {
        let mut spec = self.clone();
        if role != UserRole::Teach {
            return spec;
        }

        let parts = [
            self.source_text.clone(),
            labelled("Grade", &self.grade_level),
            labelled("Question type", self.question_type.as_str()),
            labelled("Objectives", &self.objectives),
        ];
        spec.source_text = parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        spec
    }
}

fn labelled(label: &str, value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!("\n{}: {}", label, value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub hint: Option<String>,
}

struct CannedQuestion {
    question: String,
    hint: &'static str,
    options: [&'static str; 4],
    correct: usize,
}

fn canned_questions(topic: &str) -> [CannedQuestion; 3] {
    let or = |fallback: &str| {
        if topic.is_empty() {
            fallback.to_string()
        } else {
            topic.to_string()
        }
    };
    [
        CannedQuestion {
            question: format!("What is a key concept in {}?", or("this topic")),
            hint: "Recall the main definition.",
            options: ["Definition A", "Definition B", "Definition C", "Definition D"],
            correct: 1,
        },
        CannedQuestion {
            question: format!("Which statement best describes {}?", or("the subject")),
            hint: "Eliminate extremes.",
            options: ["Too broad", "Balanced statement", "Too specific", "Unrelated"],
            correct: 1,
        },
        CannedQuestion {
            question: format!("Pick the correct relation about {}", or("the idea")),
            hint: "Think about cause→effect.",
            options: ["X causes Y", "Y always causes X", "No relation", "Contradiction"],
            correct: 0,
        },
    ]
}

/// Candidate subject words from the source text
pub fn tokenize(source_text: &str) -> Vec<&str> {
    source_text
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_TOKEN_LEN)
        .take(MAX_TOKENS)
        .collect()
}

pub fn generate_questions(spec: &QuizSpec) -> Vec<QuizQuestion> {
    let tokens = tokenize(&spec.source_text);
    let count = spec.question_count();

    let mut questions: Vec<QuizQuestion> = (0..count)
        .map(|i| {
            let word = if tokens.is_empty() {
                if spec.topic.is_empty() {
                    "Concept"
                } else {
                    spec.topic.as_str()
                }
            } else {
                tokens[i % tokens.len()]
            };
            QuizQuestion {
                question: format!("Q{}. Identify the best match for {}.", i + 1, word),
                options: vec![
                    format!("{} concept", word),
                    format!("{} definition", word),
                    format!("{} example", word),
                    format!("{} exception", word),
                ],
                correct_index: (i + 1) % 4,
                hint: spec
                    .enable_hints
                    .then(|| format!("Focus on {} in context.", word)),
            }
        })
        .collect();

    if spec.source_text.is_empty() {
        for (slot, canned) in questions.iter_mut().zip(canned_questions(&spec.topic)) {
            *slot = QuizQuestion {
                question: canned.question,
                options: canned.options.iter().map(|o| o.to_string()).collect(),
                correct_index: canned.correct,
                hint: spec.enable_hints.then(|| canned.hint.to_string()),
            };
        }
    }

    if spec.difficulty == Difficulty::Hard {
        questions.reverse();
    }

    questions
}

/// A quiz being taken
#[derive(Clone, Debug)]
pub struct QuizSession {
    pub spec: QuizSpec,
    pub questions: Vec<QuizQuestion>,
    pub answers: Vec<Option<usize>>,
    pub current: usize,
    pub remaining_secs: u32,
    pub show_hint: bool,
    pub submitted: bool,
}

impl QuizSession {
    pub fn new(spec: QuizSpec) -> Self {
        let questions = generate_questions(&spec);
        let remaining_secs = spec.total_seconds();
        QuizSession {
            answers: vec![None; questions.len()],
            questions,
            spec,
            current: 0,
            remaining_secs,
            show_hint: false,
            submitted: false,
        }
    }

    pub fn current_question(&self) -> &QuizQuestion {
        &self.questions[self.current]
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    pub fn select_answer(&mut self, option: usize) {
        if self.submitted || option >= self.current_question().options.len() {
            return;
        }
        self.answers[self.current] = Some(option);
    }

    /// Move on; needs an answer to the current question
    pub fn next(&mut self) -> bool {
        if self.submitted || self.is_last() || self.answers[self.current].is_none() {
            return false;
        }
        self.current += 1;
        self.show_hint = false;
        true
    }

    pub fn prev(&mut self) -> bool {
        if self.submitted || self.current == 0 {
            return false;
        }
        self.current -= 1;
        self.show_hint = false;
        true
    }

    pub fn toggle_hint(&mut self) {
        if self.spec.enable_hints {
            self.show_hint = !self.show_hint;
        }
    }

    /// Submit from the last question once it is answered
    pub fn submit(&mut self) -> bool {
        if self.submitted || !self.is_last() || self.answers[self.current].is_none() {
            return false;
        }
        self.submitted = true;
        true
    }

    /// One second of the shared budget. Returns true when this tick ran the
    /// clock out and submitted the quiz.
    pub fn tick(&mut self) -> bool {
        if self.submitted {
            return false;
        }
        if self.remaining_secs <= 1 {
            self.remaining_secs = 0;
            self.submitted = true;
            return true;
        }
        self.remaining_secs -= 1;
        false
    }

    /// Correct answers; zero until submitted
    pub fn score(&self) -> usize {
        if !self.submitted {
            return 0;
        }
        self.answers
            .iter()
            .zip(&self.questions)
            .filter(|(a, q)| **a == Some(q.correct_index))
            .count()
    }

    pub fn pass_mark(&self) -> usize {
        (self.questions.len() as f64 * PASS_RATIO).ceil() as usize
    }

    pub fn passed(&self) -> bool {
        self.submitted && self.score() >= self.pass_mark()
    }

    /// Percent through the quiz, counting the current question
    pub fn progress(&self) -> u16 {
        (((self.current + 1) as f64 / self.questions.len() as f64) * 100.0).round() as u16
    }

    /// mm:ss
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_with_text(text: &str, n: usize) -> QuizSpec {
        QuizSpec {
            topic: "Biology".into(),
            source_text: text.into(),
            num_questions: n,
            ..Default::default()
        }
    }

    #[test]
    fn test_tokenize_keeps_long_words() {
        let tokens = tokenize("The  mitochondria\nis the powerhouse of\tthe cell");
        assert_eq!(tokens, vec!["mitochondria", "powerhouse"]);
    }

    #[test]
    fn test_questions_from_source_text() {
        let spec = spec_with_text("photosynthesis converts sunlight", 3);
        let qs = generate_questions(&spec);
        assert_eq!(qs.len(), 3);
        assert_eq!(qs[0].question, "Q1. Identify the best match for photosynthesis.");
        assert_eq!(qs[1].options[0], "converts concept");
        assert_eq!(qs[2].options[3], "sunlight exception");
        assert_eq!(qs[0].correct_index, 1);
        assert_eq!(qs[2].correct_index, 3);
        assert_eq!(qs[0].hint.as_deref(), Some("Focus on photosynthesis in context."));
    }

    #[test]
    fn test_tokens_wrap_around() {
        let qs = generate_questions(&spec_with_text("enzymes catalyse", 4));
        assert!(qs[2].question.contains("enzymes"));
        assert!(qs[3].question.contains("catalyse"));
        assert_eq!(qs[3].correct_index, 0);
    }

    #[test]
    fn test_short_words_fall_back_to_topic() {
        let qs = generate_questions(&spec_with_text("a cat sat", 2));
        assert_eq!(qs[0].question, "Q1. Identify the best match for Biology.");
    }

    #[test]
    fn test_canned_questions_without_source() {
        let spec = QuizSpec {
            num_questions: 5,
            enable_hints: false,
            ..Default::default()
        };
        let qs = generate_questions(&spec);
        assert_eq!(qs.len(), 5);
        assert_eq!(qs[0].question, "What is a key concept in this topic?");
        assert_eq!(qs[2].correct_index, 0);
        assert!(qs[3].question.contains("Concept"));
        assert!(qs.iter().all(|q| q.hint.is_none()));
    }

    #[test]
    fn test_hard_reverses() {
        let mut spec = spec_with_text("photosynthesis converts sunlight", 3);
        spec.difficulty = Difficulty::Hard;
        let qs = generate_questions(&spec);
        assert!(qs[0].question.starts_with("Q3."));
    }

    #[test]
    fn test_session_flow_and_score() {
        let mut session = QuizSession::new(spec_with_text("photosynthesis converts sunlight", 3));
        assert_eq!(session.remaining_secs, 90);
        assert!(!session.next());

        session.select_answer(1);
        assert!(session.next());
        session.select_answer(0);
        assert!(session.next());
        assert!(session.is_last());
        assert!(!session.submit());
        session.select_answer(3);
        assert!(session.prev());
        assert!(session.next());
        assert!(session.submit());

        // Q1 correct (1), Q2 wrong (0 vs 2), Q3 correct (3)
        assert_eq!(session.score(), 2);
        assert_eq!(session.pass_mark(), 3);
        assert!(!session.passed());
    }

    #[test]
    fn test_timer_auto_submits() {
        let mut session = QuizSession::new(spec_with_text("", 1));
        assert_eq!(session.clock(), "00:30");
        for _ in 0..29 {
            assert!(!session.tick());
        }
        assert_eq!(session.remaining_secs, 1);
        assert!(session.tick());
        assert!(session.submitted);
        assert_eq!(session.remaining_secs, 0);
        assert!(!session.tick());
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_question_count_clamped() {
        assert_eq!(spec_with_text("", 0).question_count(), 1);
        assert_eq!(spec_with_text("", 25).question_count(), 25);
        assert_eq!(spec_with_text("", 99).question_count(), 25);
    }

    #[test]
    fn test_can_build_needs_topic_or_text() {
        let mut spec = QuizSpec {
            topic: "   ".into(),
            ..Default::default()
        };
        assert!(!spec.can_build());
        spec.source_text = "\n\t".into();
        assert!(!spec.can_build());
        spec.source_text = "cells".into();
        assert!(spec.can_build());
    }

    #[test]
    fn test_teacher_setup_enriches_source() {
        let spec = QuizSpec {
            topic: "Plants".into(),
            source_text: "photosynthesis basics".into(),
            grade_level: "6th".into(),
            question_type: QuestionType::TrueFalse,
            objectives: "explain chlorophyll".into(),
            ..Default::default()
        };

        let learner = spec.for_role(UserRole::Learn);
        assert_eq!(learner.source_text, "photosynthesis basics");

        let teacher = spec.for_role(UserRole::Teach);
        assert_eq!(
            teacher.source_text,
            "photosynthesis basics \nGrade: 6th \nQuestion type: truefalse \nObjectives: explain chlorophyll"
        );
    }

    #[test]
    fn test_teacher_setup_skips_empty_parts() {
        let spec = QuizSpec {
            topic: "Plants".into(),
            ..Default::default()
        };
        // question type always has a value
        assert_eq!(spec.for_role(UserRole::Teach).source_text, "\nQuestion type: mcq");
    }

    #[test]
    fn test_hint_toggle_respects_spec() {
        let mut spec = spec_with_text("", 2);
        spec.enable_hints = false;
        let mut session = QuizSession::new(spec);
        session.toggle_hint();
        assert!(!session.show_hint);
    }
}
