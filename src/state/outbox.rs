//! Mock outbox of held emails
//!
//! Nothing here is ever sent; the list only backs the outbox tab.

use serde::Serialize;
use tracing::info;

use crate::{
    error::{SettingsError, SettingsResult},
    utils::format_duration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelayedEmail {
    pub id: String,
    pub to: String,
    pub subject: String,
    pub preview: String,
    pub time_remaining: u32,
    pub formatted_remaining: String,
    pub priority: Priority,
    /// How many times the email was reopened for editing
    pub touches: u32,
}

impl DelayedEmail {
    pub fn new(
        id: &str,
        to: &str,
        subject: &str,
        preview: &str,
        time_remaining: u32,
        priority: Priority,
        touches: u32,
    ) -> Self {
        Self {
            id: id.to_string(),
            to: to.to_string(),
            subject: subject.to_string(),
            preview: preview.to_string(),
            time_remaining,
            formatted_remaining: format_duration(time_remaining as u64),
            priority,
            touches,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Outbox {
    emails: Vec<DelayedEmail>,
}

impl Outbox {
    pub fn new(emails: Vec<DelayedEmail>) -> Self {
        Self { emails }
    }

    /// The three demo messages the dashboard ships with
    pub fn with_demo_emails() -> Self {
        Self::new(vec![
            DelayedEmail::new(
                "1",
                "john.doe@company.com",
                "Important Project Update",
                "Hi John, I wanted to update you on the project status...",
                42,
                Priority::Normal,
                0,
            ),
            DelayedEmail::new(
                "2",
                "team@startup.com",
                "Weekly Team Sync Notes",
                "Hey team, here are the key points from today's meeting...",
                18,
                Priority::High,
                2,
            ),
            DelayedEmail::new(
                "3",
                "sarah.wilson@client.com",
                "Proposal Draft for Review",
                "Hi Sarah, Please find attached the proposal draft...",
                156,
                Priority::Normal,
                1,
            ),
        ])
    }

    pub fn list(&self) -> &[DelayedEmail] {
        &self.emails
    }

    /// Mean remaining hold time in whole seconds
    pub fn average_delay(&self) -> u32 {
        if self.emails.is_empty() {
            return 0;
        }
        let total: u64 = self.emails.iter().map(|e| e.time_remaining as u64).sum();
        (total / self.emails.len() as u64) as u32
    }

    pub fn edit(&mut self, id: &str) -> SettingsResult<&DelayedEmail> {
        let email = self
            .emails
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| SettingsError::UnknownEmail(id.to_string()))?;
        email.touches += 1;
        info!("Email {} opened for editing ({} touches)", id, email.touches);
        Ok(email)
    }

    pub fn cancel(&mut self, id: &str) -> SettingsResult<DelayedEmail> {
        let email = self.remove(id)?;
        info!("Email {} cancelled", id);
        Ok(email)
    }

    pub fn send_now(&mut self, id: &str) -> SettingsResult<DelayedEmail> {
        let email = self.remove(id)?;
        info!("Email {} released early", id);
        Ok(email)
    }

    fn remove(&mut self, id: &str) -> SettingsResult<DelayedEmail> {
        let index = self
            .emails
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| SettingsError::UnknownEmail(id.to_string()))?;
        Ok(self.emails.remove(index))
    }
}
