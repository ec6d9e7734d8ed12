// Service exports
pub mod notifier;
pub mod roster;

pub use notifier::{deliver_all, LogSink, Notification, NotificationComposer, NotificationSink, NotifyError};
pub use roster::{load_roster, parse_roster, RosterError};
