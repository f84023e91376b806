//! Notifications for the purchase-request workflow.
//!
//! Engines publish [`WorkflowEvent`]s on the [`EventBus`] once their store
//! write has committed. The [`NotificationDispatcher`] turns each event into
//! zero or more emails rendered by [`Templates`] and hands them to a
//! [`Mailer`]. The [`ReminderScheduler`] runs the daily pending-request
//! sweep on its own schedule.

pub mod bus;
pub mod delivery;
pub mod dispatcher;
pub mod reminder;
pub mod templates;

#[cfg(test)]
mod testing;

pub use bus::{EventBus, PublishedEvent, WorkflowEvent};
pub use delivery::email::{EmailConfig, EmailError, LogMailer, Mailer, SmtpMailer};
pub use dispatcher::{DispatchReport, NotificationDispatcher, NotificationSettings};
pub use reminder::{ReminderScheduler, SweepReport};
pub use templates::{RenderedEmail, Template, Templates};
