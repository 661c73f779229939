use codeplay_core::levels::{level, LEVELS};
use codeplay_core::narration::narrate_tutorial;
use codeplay_core::{Account, Config, LevelError, LogNarrator, Narrator, NullNarrator};
use serde_json::json;

use super::{open_session, print_json};

/// Print the level catalog, with best scores when a kid is logged in.
pub fn list() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let session = open_session(&config)?;
    let kid = match session.current_session() {
        Some(Account::Kid(kid)) => Some(kid),
        _ => None,
    };

    let levels: Vec<_> = LEVELS
        .iter()
        .map(|l| {
            json!({
                "id": l.id,
                "title": l.title,
                "description": l.description,
                "points": l.points,
                "best": kid.map(|k| k.best_score(l.id)),
            })
        })
        .collect();
    print_json(&levels)
}

/// Print a level's tutorial and read it aloud.
pub fn tutorial(level_id: u32, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    let info = level(level_id).ok_or(LevelError::UnknownLevel(level_id))?;
    let tutorial = &info.tutorial;

    println!("{}\n", tutorial.title);
    println!("{}\n", tutorial.introduction);
    for (i, lesson) in tutorial.lessons.iter().enumerate() {
        println!("{}. {}", i + 1, lesson.title);
        println!("   {}\n", lesson.content);
    }
    println!("{}", tutorial.conclusion);

    let mut narrator: Box<dyn Narrator> = if quiet {
        Box::new(NullNarrator)
    } else {
        Box::new(LogNarrator::new())
    };
    narrate_tutorial(narrator.as_mut(), tutorial);
    Ok(())
}
