//! Notifications Config

use clap::Args;
use vouchers_app::notifications::EmailSubjects;

/// Learner email settings.
#[derive(Debug, Args)]
pub struct NotificationsConfig {
    /// Mail worker endpoint; emails are only logged when unset
    #[arg(long, env = "NOTIFIER_URL")]
    pub notifier_url: Option<String>,

    /// Bearer token sent to the mail worker
    #[arg(long, env = "NOTIFIER_TOKEN", hide_env_values = true)]
    pub notifier_token: Option<String>,

    /// Mail worker request timeout in seconds
    #[arg(long, env = "NOTIFIER_TIMEOUT_SECONDS", default_value_t = 5_u64)]
    pub notifier_timeout_seconds: u64,

    /// Subject of assignment emails
    #[arg(long, env = "ASSIGN_EMAIL_SUBJECT", default_value = "New course assignment")]
    pub assign_email_subject: String,

    /// Subject of reminder emails
    #[arg(
        long,
        env = "REMIND_EMAIL_SUBJECT",
        default_value = "Reminder on course assignment"
    )]
    pub remind_email_subject: String,

    /// Subject of revocation emails
    #[arg(long, env = "REVOKE_EMAIL_SUBJECT", default_value = "Course assignment revoked")]
    pub revoke_email_subject: String,
}

impl NotificationsConfig {
    /// Subjects to render emails with.
    #[must_use]
    pub fn subjects(&self) -> EmailSubjects {
        EmailSubjects {
            assignment: self.assign_email_subject.clone(),
            reminder: self.remind_email_subject.clone(),
            revocation: self.revoke_email_subject.clone(),
        }
    }
}
