use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::models::{Attributes, Participant};

/// key, name and seven scores
const COLUMNS: usize = 9;

const SCORE_COLUMNS: [&str; 7] = [
    "openness",
    "conscientiousness",
    "extraversion",
    "agreeableness",
    "neuroticism",
    "cleanliness",
    "noise",
];

/// Errors that can occur while loading a roster
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Failed to read roster {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Roster line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Duplicate participant key {key} on roster line {line}")]
    DuplicateKey { key: String, line: usize },
}

/// Load participants from a roster file
///
/// Each line is `key,name,openness,conscientiousness,extraversion,
/// agreeableness,neuroticism,cleanliness,noise`.
pub async fn load_roster<P: AsRef<Path>>(path: P, has_header: bool) -> Result<Vec<Participant>, RosterError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path).await.map_err(|source| RosterError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let participants = parse_roster(&text, has_header)?;
    tracing::info!("Loaded {} participants from {}", participants.len(), path.display());
    Ok(participants)
}

/// Parse roster text, skipping blank lines and `#` comments
pub fn parse_roster(text: &str, has_header: bool) -> Result<Vec<Participant>, RosterError> {
    let mut participants = Vec::new();
    let mut keys = HashSet::new();
    let mut header_pending = has_header;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if header_pending {
            header_pending = false;
            continue;
        }

        let participant = parse_line(trimmed, line)?;
        if !keys.insert(participant.key.clone()) {
            return Err(RosterError::DuplicateKey {
                key: participant.key,
                line,
            });
        }
        participants.push(participant);
    }

    Ok(participants)
}

fn parse_line(line_text: &str, line: usize) -> Result<Participant, RosterError> {
    let fields: Vec<&str> = line_text.split(',').map(str::trim).collect();
    if fields.len() != COLUMNS {
        return Err(RosterError::Parse {
            line,
            reason: format!("expected {} columns, found {}", COLUMNS, fields.len()),
        });
    }

    let key = fields[0];
    if key.is_empty() {
        return Err(RosterError::Parse {
            line,
            reason: "empty participant key".to_string(),
        });
    }

    let mut scores = [0.0; 7];
    for (slot, (column, raw)) in scores.iter_mut().zip(SCORE_COLUMNS.iter().zip(&fields[2..])) {
        *slot = raw.parse::<f64>().map_err(|e| RosterError::Parse {
            line,
            reason: format!("invalid {} score {:?}: {}", column, raw, e),
        })?;
    }

    Ok(Participant::new(key, fields[1], Attributes::from(scores)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roster_lines() {
        let text = "\
# suid,name,o,c,e,a,n,clean,noise
jdoe,Jane Doe,3,4,2,5,1,4,2

asmith, Alex Smith ,1.5,2,3,4,5,6,7
";
        let participants = parse_roster(text, false).unwrap();

        assert_eq!(participants.len(), 2);
        assert_eq!(participants[0].key, "jdoe");
        assert_eq!(participants[0].attributes.agreeableness, 5.0);
        assert_eq!(participants[1].name, "Alex Smith");
        assert_eq!(participants[1].attributes.openness, 1.5);
        assert_eq!(participants[1].attributes.noise, 7.0);
    }

    #[test]
    fn test_header_skipped_when_configured() {
        let text = "key,name,o,c,e,a,n,clean,noise\njdoe,Jane,1,1,1,1,1,1,1\n";
        assert_eq!(parse_roster(text, true).unwrap().len(), 1);
        assert!(matches!(parse_roster(text, false), Err(RosterError::Parse { line: 1, .. })));
    }

    #[test]
    fn test_wrong_column_count() {
        let err = parse_roster("jdoe,Jane,1,2,3\n", false).unwrap_err();
        assert_eq!(err.to_string(), "Roster line 1: expected 9 columns, found 5");
    }

    #[test]
    fn test_duplicate_key() {
        let text = "jdoe,Jane,1,1,1,1,1,1,1\njdoe,Jane,2,2,2,2,2,2,2\n";
        assert!(matches!(
            parse_roster(text, false),
            Err(RosterError::DuplicateKey { line: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = load_roster("does/not/exist.csv", false).await;
        assert!(matches!(result, Err(RosterError::Io { .. })));
    }
}
