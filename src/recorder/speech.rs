//! Seam to the platform speech-to-text service.

use crate::error::RecognitionError;

/// Platform recognizer. Results arrive later as [`SpeechEvent`]s.
pub trait SpeechRecognizer: Send + Sync {
    fn is_available(&self) -> bool;

    fn start_listening(&self) -> Result<(), RecognitionError>;
}

/// Callback from the recognizer, delivered to the logs controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Recognized(String),
    Ended,
    Error(i32),
    Unavailable,
}

impl SpeechEvent {
    /// Join the recognizer's candidate phrases into one utterance.
    pub fn from_results<I, S>(results: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text = results
            .into_iter()
            .map(|part| part.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        SpeechEvent::Recognized(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_are_space_joined() {
        assert_eq!(
            SpeechEvent::from_results(["remember", "the milk"]),
            SpeechEvent::Recognized("remember the milk".into())
        );
        assert_eq!(
            SpeechEvent::from_results(Vec::<String>::new()),
            SpeechEvent::Recognized(String::new())
        );
    }
}
