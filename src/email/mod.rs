//! Email module for recap
//!
//! Delivers edited summaries over SMTP as plain text with an HTML alternative.

mod format;
mod mailer;

pub use format::{escape_html, render_html};
pub use mailer::{parse_recipients, MailError, Mailer, OutgoingEmail, SmtpMailer, SUMMARY_SUBJECT};
