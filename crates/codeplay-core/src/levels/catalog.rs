//! Built-in level content.

use serde::Serialize;

use super::blocks::{Block, BlockKind, BlockProblem, Solution};
use super::grid::{Cell, Puzzle};
use super::quiz::QuizQuestion;
use crate::error::PuzzleError;

pub const QUIZ_LEVEL: u32 = 1;
pub const BLOCKS_LEVEL: u32 = 2;
pub const PUZZLE_LEVEL: u32 = 3;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Lesson {
    pub title: &'static str,
    pub content: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Tutorial {
    pub title: &'static str,
    pub introduction: &'static str,
    pub lessons: &'static [Lesson],
    pub conclusion: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LevelInfo {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    /// Points shown on the level card.
    pub points: u32,
    pub tutorial: Tutorial,
}

pub static LEVELS: &[LevelInfo] = &[
    LevelInfo {
        id: QUIZ_LEVEL,
        title: "Coding Basics",
        description: "Learn the fundamental concepts of coding with a fun quiz.",
        points: 50,
        tutorial: Tutorial {
            title: "Welcome to Coding Basics!",
            introduction: "Let's start our adventure into the world of code! Coding is like giving instructions to a computer to make it do amazing things, like building games, websites, and apps.",
            lessons: &[
                Lesson {
                    title: "What is Coding?",
                    content: "Coding, or programming, is how we communicate with computers. We use special languages that computers understand to tell them what to do step-by-step.",
                },
                Lesson {
                    title: "Why is it useful?",
                    content: "Coding is a superpower! It helps you solve problems, be creative, and build anything you can imagine. It's used in almost every industry, from movies to medicine.",
                },
                Lesson {
                    title: "What are 'if' statements?",
                    content: "An 'if' statement is like a decision-maker. It tells the computer: IF something is true, THEN do a specific action. For example, IF the player has a key, THEN open the door.",
                },
            ],
            conclusion: "You've learned the very basics! Now, are you ready to test your knowledge in a quick quiz? Let's go!",
        },
    },
    LevelInfo {
        id: BLOCKS_LEVEL,
        title: "Block Builder",
        description: "Drag and drop blocks to build programs and solve challenges.",
        points: 100,
        tutorial: Tutorial {
            title: "Welcome to Block Builder!",
            introduction: "In this level, you'll be a code builder! Instead of typing, you'll use blocks to create programs. It's like building with digital LEGOs.",
            lessons: &[
                Lesson {
                    title: "How it works",
                    content: "Pick blocks from the toolbox and snap them together in the workspace. Each block is a command for the computer.",
                },
                Lesson {
                    title: "Printing Statements",
                    content: "A 'print' block tells the computer to show a message. If you use a print block with the word 'Hello', the computer will display 'Hello'.",
                },
                Lesson {
                    title: "Loops",
                    content: "A 'loop' or 'repeat' block is for doing things over and over again without writing the same code multiple times. If you want to say 'Hi' three times, you can use a loop!",
                },
            ],
            conclusion: "You're all set to become a master block builder. Let's solve some block puzzles!",
        },
    },
    LevelInfo {
        id: PUZZLE_LEVEL,
        title: "Puzzle Quest",
        description: "Use logic and commands to guide a character through a maze.",
        points: 150,
        tutorial: Tutorial {
            title: "Welcome to Puzzle Quest!",
            introduction: "Time to use your problem-solving skills! In this level, you need to give a sequence of commands to help our friend reach their goal.",
            lessons: &[
                Lesson {
                    title: "The Goal",
                    content: "Your goal is to guide the character from the start to the finish. You need to create a path using command blocks.",
                },
                Lesson {
                    title: "The Commands",
                    content: "You have four basic commands: move forward, move backward, move left, and move right. Your character will follow these commands in the exact order you set them.",
                },
                Lesson {
                    title: "Planning Your Path",
                    content: "Think about the path before you add commands. Count the steps and figure out where to turn. If you make a mistake, you can always reset and try again!",
                },
            ],
            conclusion: "Your quest awaits! Plan your moves carefully and lead your character to victory.",
        },
    },
];

pub fn level(id: u32) -> Option<&'static LevelInfo> {
    LEVELS.iter().find(|l| l.id == id)
}

/// Questions for the Coding Basics quiz.
pub fn quiz_questions() -> Vec<QuizQuestion> {
    const QUESTIONS: &[(&str, [&str; 4], &str)] = &[
        (
            "What is coding?",
            [
                "Talking to plants",
                "Giving instructions to a computer",
                "Reading a book",
                "Drawing a picture",
            ],
            "Giving instructions to a computer",
        ),
        (
            "An 'if' statement helps a computer to...",
            ["Sing a song", "Make a decision", "Count to ten", "Change color"],
            "Make a decision",
        ),
        (
            "Which of these can be built using code?",
            ["A sandwich", "A video game", "A bicycle", "A treehouse"],
            "A video game",
        ),
        (
            "What does a 'loop' do in coding?",
            [
                "Stops the program",
                "Makes a circle shape",
                "Repeats an action",
                "Adds two numbers",
            ],
            "Repeats an action",
        ),
        (
            "Why is coding considered a useful skill?",
            [
                "It helps you run faster",
                "It helps you solve problems and be creative",
                "It's only for scientists",
                "It's not useful at all",
            ],
            "It helps you solve problems and be creative",
        ),
    ];

    QUESTIONS
        .iter()
        .map(|(question, options, correct)| QuizQuestion {
            question: (*question).to_string(),
            options: options.iter().map(|o| (*o).to_string()).collect(),
            correct_answer: (*correct).to_string(),
        })
        .collect()
}

/// Blocks available in every Block Builder problem.
pub fn toolbox() -> Vec<Block> {
    vec![
        Block::new("print_hello", "Print \"Hello Coder!\"", BlockKind::Action),
        Block::new("print_play", "Print \"Let's play!\"", BlockKind::Action),
        Block::new("loop_3", "Repeat 3 times", BlockKind::Loop),
    ]
}

pub fn block_problems() -> Vec<BlockProblem> {
    vec![
        BlockProblem {
            id: 1,
            goal: "Make the computer say \"Hello Coder!\"".to_string(),
            toolbox: toolbox(),
            solution: Solution::Exact(vec!["print_hello".to_string()]),
            output: vec!["Hello Coder!".to_string()],
        },
        BlockProblem {
            id: 2,
            goal: "Make the computer say \"Let's play!\" three times.".to_string(),
            toolbox: toolbox(),
            solution: Solution::Contains(vec!["loop_3".to_string(), "print_play".to_string()]),
            output: vec!["Let's play!".to_string(); 3],
        },
    ]
}

/// The Puzzle Quest maze: a wall down column 2 between rows 1 and 3.
pub fn reference_puzzle() -> Result<Puzzle, PuzzleError> {
    Puzzle::new(
        1,
        5,
        Cell::new(0, 0),
        Cell::new(4, 4),
        [Cell::new(2, 1), Cell::new(2, 2), Cell::new(2, 3)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ids_are_unique_and_ordered() {
        let ids: Vec<u32> = LEVELS.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(level(2).map(|l| l.title), Some("Block Builder"));
        assert!(level(9).is_none());
    }

    #[test]
    fn every_question_lists_its_answer() {
        let questions = quiz_questions();
        assert_eq!(questions.len(), 5);
        for q in &questions {
            assert!(q.options.contains(&q.correct_answer), "{}", q.question);
        }
    }

    #[test]
    fn solutions_only_use_toolbox_blocks() {
        for problem in block_problems() {
            let ids = match &problem.solution {
                Solution::Exact(ids) | Solution::Contains(ids) => ids,
            };
            for id in ids {
                assert!(problem.toolbox.iter().any(|b| &b.id == id));
            }
        }
    }

    #[test]
    fn reference_puzzle_is_valid() {
        let puzzle = reference_puzzle().unwrap();
        assert_eq!(puzzle.grid_size(), 5);
        assert_eq!(puzzle.obstacles().count(), 3);
    }
}
