pub mod bus;
pub mod notification;

pub use bus::{Bus, BusEventDef, Subscription, THEME_CHANGED};
pub use notification::{Notification, Notifier, Severity, NOTIFICATION_PUBLISHED};
