use crate::errors::{CeremonyError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::VecDeque;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

pub const ENTROPY_PROMPT: &str = "Enter custom entropy (leave blank for auto): ";

/// Supplies the secret randomness for one contribution.
pub trait EntropySource {
    fn next_entropy(&mut self) -> Result<String>;
}

/// 32 bytes from the operating system's CSPRNG, hex-encoded.
pub fn random_entropy() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Prompts the operator once per contribution, falling back to [`random_entropy`] on a
/// blank answer or end of input.
pub struct InteractiveEntropy<R, W> {
    input: R,
    output: W,
}

impl InteractiveEntropy<StdinLock<'static>, Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> InteractiveEntropy<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> EntropySource for InteractiveEntropy<R, W> {
    fn next_entropy(&mut self) -> Result<String> {
        write!(self.output, "{}", ENTROPY_PROMPT).map_err(CeremonyError::Entropy)?;
        self.output.flush().map_err(CeremonyError::Entropy)?;

        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .map_err(CeremonyError::Entropy)?;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            Ok(random_entropy())
        } else {
            Ok(trimmed.to_string())
        }
    }
}

/// Replays a fixed list of answers, then behaves like a blank answer.
#[derive(Debug, Default)]
pub struct FixedEntropy {
    answers: VecDeque<String>,
    served: usize,
}

impl FixedEntropy {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            served: 0,
        }
    }

    /// Number of times entropy has been requested.
    pub fn served(&self) -> usize {
        self.served
    }
}

impl EntropySource for FixedEntropy {
    fn next_entropy(&mut self) -> Result<String> {
        self.served += 1;
        match self.answers.pop_front() {
            Some(answer) if !answer.trim().is_empty() => Ok(answer.trim().to_string()),
            _ => Ok(random_entropy()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn is_hex64(s: &str) -> bool {
        s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
    }

    #[test]
    fn test_operator_input_is_trimmed_and_used() {
        let mut out = Vec::new();
        let mut source = InteractiveEntropy::new(Cursor::new("  my secret words \n"), &mut out);
        assert_eq!(source.next_entropy().unwrap(), "my secret words");
        assert_eq!(String::from_utf8(out).unwrap(), ENTROPY_PROMPT);
    }

    #[test]
    fn test_blank_input_falls_back_to_random() {
        let mut source = InteractiveEntropy::new(Cursor::new("\n   \n"), Vec::new());
        let first = source.next_entropy().unwrap();
        let second = source.next_entropy().unwrap();
        assert!(is_hex64(&first));
        assert!(is_hex64(&second));
        assert_ne!(first, second);
    }

    #[test]
    fn test_end_of_input_falls_back_to_random() {
        let mut source = InteractiveEntropy::new(Cursor::new(""), Vec::new());
        assert!(is_hex64(&source.next_entropy().unwrap()));
    }

    #[test]
    fn test_one_line_per_call() {
        let mut source = InteractiveEntropy::new(Cursor::new("alpha\nbeta\n"), Vec::new());
        assert_eq!(source.next_entropy().unwrap(), "alpha");
        assert_eq!(source.next_entropy().unwrap(), "beta");
    }

    #[test]
    fn test_fixed_entropy() {
        let mut source = FixedEntropy::new(["one", "", "three"]);
        assert_eq!(source.next_entropy().unwrap(), "one");
        assert!(is_hex64(&source.next_entropy().unwrap()));
        assert_eq!(source.next_entropy().unwrap(), "three");
        assert!(is_hex64(&source.next_entropy().unwrap()));
        assert_eq!(source.served(), 4);
    }
}
