use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::core::PreferenceInput;
use crate::models::{Matching, Participant};

/// Errors that can occur while delivering notifications
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Delivery to {recipient} failed: {reason}")]
    Delivery { recipient: String, reason: String },
}

/// A message addressed to one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Destination for composed notifications
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Sink that records deliveries in the log instead of sending them
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = %notification.recipient,
            subject = %notification.subject,
            "Notification delivered"
        );
        tracing::debug!("Notification body for {}: {}", notification.recipient, notification.body);
        Ok(())
    }
}

/// Deliver every notification, stopping at the first failure
pub fn deliver_all(sink: &dyn NotificationSink, notifications: &[Notification]) -> Result<usize, NotifyError> {
    for notification in notifications {
        sink.deliver(notification)?;
    }
    tracing::info!("All {} notifications delivered", notifications.len());
    Ok(notifications.len())
}

/// Builds participant-facing messages from solver output
#[derive(Debug, Clone)]
pub struct NotificationComposer {
    email_domain: String,
}

impl NotificationComposer {
    pub fn new(email_domain: impl Into<String>) -> Self {
        Self {
            email_domain: email_domain.into(),
        }
    }

    pub fn address(&self, key: &str) -> String {
        format!("{}@{}", key, self.email_domain)
    }

    /// One message per matched participant naming its roommate
    pub fn match_notifications(&self, matching: &Matching, roster: &[Participant]) -> Vec<Notification> {
        let names = display_names(roster);

        matching
            .participants()
            .filter_map(|key| matching.partner_of(key).map(|partner| (key, partner)))
            .map(|(key, partner)| Notification {
                recipient: self.address(key),
                subject: "Your roommate match".to_string(),
                body: format!(
                    "Hi {}. Your optimal match is {}. This matching is not officially affiliated \
                     with your university, so you'll have to reach out to them if you would like \
                     to room with them. Their email is {}",
                    name_of(&names, key),
                    name_of(&names, partner),
                    self.address(partner)
                ),
            })
            .collect()
    }

    /// One message per participant listing everyone else, most compatible first
    pub fn ranking_notifications(&self, preferences: &PreferenceInput, roster: &[Participant]) -> Vec<Notification> {
        let names = display_names(roster);

        preferences
            .iter()
            .map(|(key, ranking)| {
                let listed: Vec<String> = ranking
                    .iter()
                    .map(|other| format!("{} ({})", name_of(&names, other), self.address(other)))
                    .collect();

                Notification {
                    recipient: self.address(key),
                    subject: "Your ranked roommate list".to_string(),
                    body: format!(
                        "Hi {}.\nHere is everyone looking for a roommate, ordered from most \
                         compatible (left) to least (right).\n\n{}\n\nThis list is not officially \
                         affiliated with your university, so you'll have to reach out to anyone \
                         you would like to room with.",
                        name_of(&names, key),
                        listed.join(", ")
                    ),
                }
            })
            .collect()
    }
}

fn display_names(roster: &[Participant]) -> HashMap<&str, &str> {
    roster
        .iter()
        .filter(|p| !p.name.is_empty())
        .map(|p| (p.key.as_str(), p.name.as_str()))
        .collect()
}

fn name_of<'a>(names: &HashMap<&str, &'a str>, key: &'a str) -> &'a str {
    names.get(key).copied().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MatchingEngine;
    use crate::models::Attributes;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<String>>,
        fail_for: Option<String>,
    }

    impl NotificationSink for RecordingSink {
        fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
            if self.fail_for.as_deref() == Some(notification.recipient.as_str()) {
                return Err(NotifyError::Delivery {
                    recipient: notification.recipient.clone(),
                    reason: "mailbox full".to_string(),
                });
            }
            self.delivered.lock().unwrap().push(notification.recipient.clone());
            Ok(())
        }
    }

    fn roster() -> Vec<Participant> {
        vec![
            Participant::new("jdoe", "Jane", Attributes::default()),
            Participant::new("asmith", "Alex", Attributes::default()),
        ]
    }

    #[test]
    fn test_match_notifications_name_partner() {
        let matching = MatchingEngine::new()
            .solve(&[("jdoe", vec!["asmith"]), ("asmith", vec!["jdoe"])])
            .unwrap();
        let composer = NotificationComposer::new("stanford.edu");

        let notifications = composer.match_notifications(&matching, &roster());

        assert_eq!(notifications.len(), 2);
        let jane = notifications.iter().find(|n| n.recipient == "jdoe@stanford.edu").unwrap();
        assert!(jane.body.starts_with("Hi Jane. Your optimal match is Alex."));
        assert!(jane.body.ends_with("Their email is asmith@stanford.edu"));
    }

    #[test]
    fn test_ranking_notifications_fall_back_to_key() {
        let composer = NotificationComposer::new("example.org");
        let preferences = vec![("ghost".to_string(), vec!["jdoe".to_string()])];

        let notifications = composer.ranking_notifications(&preferences, &roster());

        assert_eq!(notifications[0].recipient, "ghost@example.org");
        assert!(notifications[0].body.starts_with("Hi ghost."));
        assert!(notifications[0].body.contains("Jane (jdoe@example.org)"));
    }

    #[test]
    fn test_deliver_all_stops_on_failure() {
        let composer = NotificationComposer::new("example.org");
        let notifications = vec![
            Notification { recipient: composer.address("a"), subject: String::new(), body: String::new() },
            Notification { recipient: composer.address("b"), subject: String::new(), body: String::new() },
        ];

        let ok = RecordingSink::default();
        assert_eq!(deliver_all(&ok, &notifications).unwrap(), 2);

        let failing = RecordingSink {
            fail_for: Some("a@example.org".to_string()),
            ..Default::default()
        };
        assert!(deliver_all(&failing, &notifications).is_err());
        assert!(failing.delivered.lock().unwrap().is_empty());
    }
}
