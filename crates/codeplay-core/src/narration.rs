//! Read-aloud for tutorials.
//!
//! Fire-and-forget: callers never wait on speech and never see its errors.

pub trait Narrator {
    /// Start reading `text`, interrupting anything already being read.
    fn speak(&mut self, text: &str);

    /// Stop reading.
    fn stop(&mut self);
}

/// Narrator that writes spoken text to the log.
#[derive(Debug, Default)]
pub struct LogNarrator {
    speaking: bool,
}

impl LogNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }
}

impl Narrator for LogNarrator {
    fn speak(&mut self, text: &str) {
        if self.speaking {
            tracing::debug!("narration interrupted");
        }
        self.speaking = true;
        tracing::info!(text, "narrating");
    }

    fn stop(&mut self) {
        if std::mem::take(&mut self.speaking) {
            tracing::debug!("narration stopped");
        }
    }
}

/// Narrator that stays silent.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNarrator;

impl Narrator for NullNarrator {
    fn speak(&mut self, _text: &str) {}

    fn stop(&mut self) {}
}

/// Narrator that remembers what it was asked to read.
#[derive(Debug, Default)]
pub struct RecordingNarrator {
    pub spoken: Vec<String>,
    pub stops: usize,
}

impl Narrator for RecordingNarrator {
    fn speak(&mut self, text: &str) {
        self.spoken.push(text.to_string());
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}

/// Read a tutorial through `narrator`, one part at a time.
pub fn narrate_tutorial(narrator: &mut dyn Narrator, tutorial: &crate::levels::Tutorial) {
    narrator.speak(tutorial.title);
    narrator.speak(tutorial.introduction);
    for lesson in tutorial.lessons {
        narrator.speak(&format!("{} {}", lesson.title, lesson.content));
    }
    narrator.speak(tutorial.conclusion);
    narrator.stop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::level;

    #[test]
    fn tutorial_is_read_in_order() {
        let tutorial = &level(1).unwrap().tutorial;
        let mut narrator = RecordingNarrator::default();
        narrate_tutorial(&mut narrator, tutorial);
        assert_eq!(narrator.spoken.len(), 2 + tutorial.lessons.len() + 1);
        assert_eq!(narrator.spoken[0], "Welcome to Coding Basics!");
        assert!(narrator.spoken[2].starts_with("What is Coding? Coding,"));
        assert_eq!(narrator.stops, 1);
    }

    #[test]
    fn log_narrator_tracks_speaking() {
        let mut n = LogNarrator::new();
        n.speak("hi");
        assert!(n.is_speaking());
        n.stop();
        assert!(!n.is_speaking());
    }
}
