//! Multiple-choice quiz engine.

use serde::{Deserialize, Serialize};

use crate::error::LevelError;
use crate::events::Event;
use crate::storage::TimingConfig;
use crate::timer::Scheduler;

/// Points per correct answer.
pub const POINTS_PER_CORRECT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub selected: String,
    pub correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Advance;

/// Answer-once quiz. Each answer schedules the move to the next question;
/// answering the last one schedules completion.
#[derive(Debug)]
pub struct QuizEngine {
    level_id: u32,
    questions: Vec<QuizQuestion>,
    index: usize,
    score: u32,
    answered: Option<Answer>,
    completed: bool,
    advance_ms: u64,
    scheduler: Scheduler<Advance>,
}

impl QuizEngine {
    pub fn new(
        level_id: u32,
        questions: Vec<QuizQuestion>,
        timing: &TimingConfig,
    ) -> Result<Self, LevelError> {
        if questions.is_empty() {
            return Err(LevelError::EmptyLevel(level_id));
        }
        Ok(Self {
            level_id,
            questions,
            index: 0,
            score: 0,
            answered: None,
            completed: false,
            advance_ms: timing.quiz_advance_ms,
            scheduler: Scheduler::new(),
        })
    }

    pub fn level_id(&self) -> u32 {
        self.level_id
    }

    pub fn current(&self) -> &QuizQuestion {
        &self.questions[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn answered(&self) -> Option<&Answer> {
        self.answered.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Due time of the pending advance, if any.
    pub fn next_due(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    /// Answer the current question with the text of one of its options.
    pub fn answer(&mut self, option: &str, now_ms: u64) -> Result<Event, LevelError> {
        if self.completed {
            return Err(LevelError::Completed);
        }
        if self.answered.is_some() {
            return Err(LevelError::AlreadyAnswered);
        }
        let question = &self.questions[self.index];
        if !question.options.iter().any(|o| o == option) {
            return Err(LevelError::UnknownOption(option.to_string()));
        }

        let correct = option == question.correct_answer;
        if correct {
            self.score += POINTS_PER_CORRECT;
        }
        self.answered = Some(Answer {
            selected: option.to_string(),
            correct,
        });
        self.scheduler.schedule(now_ms + self.advance_ms, Advance);
        Ok(Event::QuestionAnswered {
            index: self.index,
            correct,
            score: self.score,
        })
    }

    /// Answer by zero-based option position.
    pub fn answer_index(&mut self, option: usize, now_ms: u64) -> Result<Event, LevelError> {
        let options = &self.current().options;
        let Some(text) = options.get(option).cloned() else {
            return Err(LevelError::OutOfBounds {
                index: option,
                len: options.len(),
            });
        };
        self.answer(&text, now_ms)
    }

    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        while self.scheduler.pop_due(now_ms).is_some() {
            if self.index + 1 < self.questions.len() {
                self.index += 1;
                self.answered = None;
                events.push(Event::QuestionAdvanced { index: self.index });
            } else {
                self.completed = true;
                tracing::debug!(level = self.level_id, score = self.score, "quiz completed");
                events.push(Event::LevelCompleted {
                    level_id: self.level_id,
                    score: self.score,
                });
            }
        }
        events
    }

    /// Drop the pending advance and reopen the current question, taking
    /// back any points its answer earned.
    pub fn teardown(&mut self) {
        self.scheduler.cancel_all();
        if self.completed {
            return;
        }
        if let Some(answer) = self.answered.take() {
            if answer.correct {
                self.score -= POINTS_PER_CORRECT;
            }
        }
    }

    pub fn restart(&mut self) {
        self.scheduler.cancel_all();
        self.index = 0;
        self.score = 0;
        self.answered = None;
        self.completed = false;
    }
}
