use std::{collections::HashMap, io, path::Path};

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

#[cfg(test)]
use mockall::automock;

#[derive(Error, Debug)]
pub enum DecisionError {
    #[error("failed to read input")]
    Io(#[from] io::Error),
    #[error("decisions file is not a json object of strings")]
    Json(#[from] serde_json::Error),
}

/// Something that can pick an icon for a poi type the catalog has no default for
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait DecisionProvider {
    /// Returns the icon name to use, or `None` to leave the poi type unmapped for now
    async fn decide(&mut self, poi_type: &str) -> Result<Option<String>, DecisionError>;
}

/// Trims the answer and treats an empty one as a skip
fn normalize(answer: &str) -> Option<String> {
    let answer = answer.trim();
    let answer = answer.strip_prefix("fa-").unwrap_or(answer);
    (!answer.is_empty()).then(|| answer.to_string())
}

/// Asks on the terminal
pub struct Interactive {
    lines: Lines<BufReader<Stdin>>,
    greeted: bool,
}

impl Interactive {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            greeted: false,
        }
    }
}

impl Default for Interactive {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DecisionProvider for Interactive {
    async fn decide(&mut self, poi_type: &str) -> Result<Option<String>, DecisionError> {
        let mut stdout = tokio::io::stdout();

        if !self.greeted {
            self.greeted = true;
            stdout
                .write_all(
                    b"\nSearch icons at https://fontawesome.com/search?o=r&m=free\n\
                      Enter the icon name only, e.g. 'circle' for 'fa-circle'.\n\
                      Press ENTER without input to skip.\n\n",
                )
                .await?;
        }

        stdout
            .write_all(format!("Icon for '{poi_type}': ").as_bytes())
            .await?;
        stdout.flush().await?;

        // eof behaves like skipping everything that's left
        let line = self.lines.next_line().await?.unwrap_or_default();
        Ok(normalize(&line))
    }
}

/// Answers from a prepared json object, for scripted runs
#[derive(Debug, Default)]
pub struct FromFile {
    answers: HashMap<String, String>,
}

impl FromFile {
    pub fn new(answers: HashMap<String, String>) -> Self {
        Self { answers }
    }

    pub fn load(path: &Path) -> Result<Self, DecisionError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(serde_json::from_str(&text)?))
    }
}

#[async_trait::async_trait]
impl DecisionProvider for FromFile {
    async fn decide(&mut self, poi_type: &str) -> Result<Option<String>, DecisionError> {
        Ok(self.answers.get(poi_type).and_then(|a| normalize(a)))
    }
}

/// Skips every poi type
pub struct SkipAll;

#[async_trait::async_trait]
impl DecisionProvider for SkipAll {
    async fn decide(&mut self, _poi_type: &str) -> Result<Option<String>, DecisionError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  circle \n"), Some("circle".to_string()));
        assert_eq!(normalize("fa-circle"), Some("circle".to_string()));
        assert_eq!(normalize("   "), None);
        assert_eq!(normalize(""), None);
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.json");
        std::fs::write(&path, r#"{"unicorn_shop": "horse", "dragon_lair": ""}"#).unwrap();

        let mut provider = FromFile::load(&path).unwrap();

        assert_eq!(
            provider.decide("unicorn_shop").await.unwrap(),
            Some("horse".to_string())
        );
        assert_eq!(provider.decide("dragon_lair").await.unwrap(), None);
        assert_eq!(provider.decide("anything_else").await.unwrap(), None);
    }

    #[test]
    fn test_from_file_rejects_non_string_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.json");
        std::fs::write(&path, r#"{"unicorn_shop": 3}"#).unwrap();

        assert!(matches!(
            FromFile::load(&path),
            Err(DecisionError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_skip_all() {
        assert_eq!(SkipAll.decide("pharmacy").await.unwrap(), None);
    }
}
