//! Learner notifications: reminders, completion messages and motivation.
//!
//! Reminder settings are persisted but no in-process scheduler runs; an
//! external trigger calls [`NotificationService::send_reminder`].

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::learning::completion_percentage;
use super::ServiceError;
use crate::capabilities::AdapterBindings;
use crate::interfaces::{
    Channel, DailyPlan, DeliveryReceipt, LearningPlan, NotificationKind, NotificationRecord,
    NotificationSettings, Progress,
};
use crate::utilities::validation::{validate_phone_number, validate_reminder_time};

/// Reminder preferences as submitted by a learner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderSettings {
    pub phone_number: String,
    #[serde(default, alias = "method")]
    pub channel: Channel,
    /// `HH:MM`, 24-hour.
    #[serde(default = "default_time")]
    pub time: String,
    /// ISO weekdays, 1 = Monday.
    #[serde(default = "default_weekdays", alias = "days")]
    pub weekdays: Vec<u8>,
}

fn default_time() -> String {
    "09:00".to_string()
}

fn default_weekdays() -> Vec<u8> {
    vec![1, 2, 3, 4, 5]
}

pub struct NotificationService {
    bindings: AdapterBindings,
}

impl NotificationService {
    pub fn new(bindings: AdapterBindings) -> Self {
        Self { bindings }
    }

    /// Validate and persist reminder preferences for a plan.
    pub async fn schedule_reminders(
        &self,
        user_id: &str,
        path_id: &str,
        settings: &ReminderSettings,
    ) -> Result<NotificationSettings, ServiceError> {
        check_phone(&settings.phone_number)?;
        if !validate_reminder_time(&settings.time) {
            return Err(ServiceError::validation(format!(
                "reminder time must be HH:MM, got {}",
                settings.time
            )));
        }
        if settings.weekdays.is_empty() || settings.weekdays.iter().any(|d| !(1..=7).contains(d)) {
            return Err(ServiceError::validation("weekdays must be non-empty and within 1..=7"));
        }
        self.plan(user_id, path_id).await?;

        let mut weekdays = settings.weekdays.clone();
        weekdays.sort_unstable();
        weekdays.dedup();
        let stored = NotificationSettings {
            path_id: path_id.to_string(),
            phone_number: settings.phone_number.trim().to_string(),
            channel: settings.channel,
            reminder_time: settings.time.clone(),
            weekdays,
            active: true,
        };
        self.bindings
            .storage
            .save_notification_settings(user_id, &stored)
            .await?;
        log::info!(
            "Reminders for {} scheduled at {} via {}",
            path_id,
            stored.reminder_time,
            stored.channel
        );
        Ok(stored)
    }

    /// Deactivate reminders for a plan. The stored settings are kept with
    /// `active: false` so they can be shown and re-enabled later.
    pub async fn cancel_reminders(
        &self,
        user_id: &str,
        path_id: &str,
    ) -> Result<NotificationSettings, ServiceError> {
        let profile = self
            .bindings
            .storage
            .get_user_profile(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", user_id)))?;
        let mut settings = profile
            .notification_settings
            .filter(|s| s.path_id == path_id)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("no reminders scheduled for {}", path_id))
            })?;
        settings.active = false;
        self.bindings
            .storage
            .save_notification_settings(user_id, &settings)
            .await?;
        log::info!("Reminders for {} cancelled", path_id);
        Ok(settings)
    }

    /// Send a fixed message to check that a number and channel work.
    /// Not recorded in the notification history.
    pub async fn send_test(
        &self,
        phone_number: &str,
        channel: Channel,
    ) -> Result<DeliveryReceipt, ServiceError> {
        check_phone(phone_number)?;
        let receipt = self
            .bindings
            .notify
            .send(channel, phone_number.trim(), &test_message(channel))
            .await?;
        log::info!("Test {} notification sent: {}", channel, receipt.id);
        Ok(receipt)
    }

    /// Remind the learner about the first incomplete day.
    pub async fn send_reminder(
        &self,
        user_id: &str,
        path_id: &str,
        phone_number: &str,
        channel: Channel,
    ) -> Result<DeliveryReceipt, ServiceError> {
        check_phone(phone_number)?;
        let plan = self.plan(user_id, path_id).await?;
        let progress = self.bindings.storage.get_progress(user_id, path_id).await?;
        let day = current_day(&progress, plan.duration_days);
        let today = plan
            .day(day)
            .ok_or_else(|| ServiceError::NotFound(format!("no plan for day {}", day)))?;
        let message = reminder_message(&plan.goal, today);
        self.deliver(user_id, path_id, NotificationKind::Reminder, channel, phone_number, &message)
            .await
    }

    pub async fn send_completion(
        &self,
        user_id: &str,
        path_id: &str,
        phone_number: &str,
        channel: Channel,
    ) -> Result<DeliveryReceipt, ServiceError> {
        check_phone(phone_number)?;
        let plan = self.plan(user_id, path_id).await?;
        let progress = self.bindings.storage.get_progress(user_id, path_id).await?;
        let rate = completion_percentage(&progress, plan.duration_days);
        let message = completion_message(&plan.goal, plan.duration_days, rate);
        self.deliver(user_id, path_id, NotificationKind::Completion, channel, phone_number, &message)
            .await
    }

    pub async fn send_motivation(
        &self,
        user_id: &str,
        path_id: &str,
        phone_number: &str,
        channel: Channel,
    ) -> Result<DeliveryReceipt, ServiceError> {
        check_phone(phone_number)?;
        let plan = self.plan(user_id, path_id).await?;
        let progress = self.bindings.storage.get_progress(user_id, path_id).await?;
        let rate = completion_percentage(&progress, plan.duration_days);
        let message = motivation_message(&plan.goal, rate, streak(&progress));
        self.deliver(user_id, path_id, NotificationKind::Motivation, channel, phone_number, &message)
            .await
    }

    pub async fn send(
        &self,
        kind: NotificationKind,
        user_id: &str,
        path_id: &str,
        phone_number: &str,
        channel: Channel,
    ) -> Result<DeliveryReceipt, ServiceError> {
        match kind {
            NotificationKind::Reminder => {
                self.send_reminder(user_id, path_id, phone_number, channel).await
            }
            NotificationKind::Completion => {
                self.send_completion(user_id, path_id, phone_number, channel).await
            }
            NotificationKind::Motivation => {
                self.send_motivation(user_id, path_id, phone_number, channel).await
            }
        }
    }

    /// Sent notifications, newest first.
    pub async fn history(&self, user_id: &str) -> Result<Vec<NotificationRecord>, ServiceError> {
        Ok(self.bindings.storage.notification_history(user_id).await?)
    }

    async fn plan(&self, user_id: &str, path_id: &str) -> Result<LearningPlan, ServiceError> {
        self.bindings
            .storage
            .get_learning_path(user_id, path_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("learning path {}", path_id)))
    }

    async fn deliver(
        &self,
        user_id: &str,
        path_id: &str,
        kind: NotificationKind,
        channel: Channel,
        to: &str,
        message: &str,
    ) -> Result<DeliveryReceipt, ServiceError> {
        let receipt = self.bindings.notify.send(channel, to.trim(), message).await?;
        let record = NotificationRecord {
            user_id: user_id.to_string(),
            path_id: path_id.to_string(),
            kind,
            channel,
            receipt_id: receipt.id.clone(),
            sent_at: Utc::now(),
        };
        // best effort once the message is sent
        if let Err(e) = self.bindings.storage.log_notification(&record).await {
            log::warn!("Failed to log notification {}: {}", receipt.id, e);
        }
        Ok(receipt)
    }
}

fn check_phone(phone_number: &str) -> Result<(), ServiceError> {
    if validate_phone_number(phone_number) {
        Ok(())
    } else {
        Err(ServiceError::validation(format!(
            "invalid phone number: {}",
            phone_number
        )))
    }
}

/// First incomplete day, or the last day once everything is done.
pub fn current_day(progress: &Progress, duration_days: u32) -> u32 {
    (1..=duration_days)
        .find(|day| !progress.is_completed(*day))
        .unwrap_or(duration_days)
        .max(1)
}

/// Trailing run of completed days, counted back from the highest recorded day.
pub fn streak(progress: &Progress) -> u32 {
    progress
        .completed_days
        .values()
        .rev()
        .take_while(|done| **done)
        .count() as u32
}

pub fn test_message(channel: Channel) -> String {
    match channel {
        Channel::Voice => "This is a test call from AI Learning Path Generator. \
                           Your voice notifications are working correctly!"
            .to_string(),
        Channel::Sms | Channel::WhatsApp => "Test Notification from AI Learning Path Generator\n\n\
             This is a test message to verify your notification settings are working correctly.\n\n\
             If you received this message, your notifications are configured properly!\n\n\
             Ready to start your learning journey?"
            .to_string(),
    }
}

pub fn reminder_message(goal: &str, today: &DailyPlan) -> String {
    let focus = today
        .objectives
        .first()
        .map(String::as_str)
        .unwrap_or("Continue your learning journey");
    let estimated = if today.estimated_time.is_empty() {
        "30-60 minutes"
    } else {
        today.estimated_time.as_str()
    };
    format!(
        "Learning Reminder: {goal}\n\n\
         Day {day}: {title}\n\n\
         It's time for your daily learning session!\n\n\
         Today's focus: {focus}\n\n\
         Estimated time: {estimated}\n\n\
         Keep up the great work! Consistency is key to achieving your learning goals.\n\n\
         Happy learning!",
        goal = goal,
        day = today.day,
        title = today.title,
        focus = focus,
        estimated = estimated,
    )
}

pub fn completion_message(goal: &str, total_days: u32, completion_rate: f64) -> String {
    format!(
        "Congratulations!\n\n\
         You've completed your learning path: {goal}\n\n\
         Your Achievement:\n\
         - Duration: {total_days} days\n\
         - Completion Rate: {rate:.0}%\n\n\
         You've shown amazing dedication and consistency in your learning journey!\n\n\
         Ready for your next challenge? Create a new learning path to continue growing!\n\n\
         Keep learning, keep growing!",
        goal = goal,
        total_days = total_days,
        rate = completion_rate,
    )
}

pub fn motivation_message(goal: &str, completion_rate: f64, streak_days: u32) -> String {
    let (headline, lead, closing) = if completion_rate >= 80.0 {
        (
            "Outstanding Progress!",
            format!("You're crushing your learning goal: {}", goal),
            "You're so close to the finish line! Keep up the incredible work!\n\n\
             Success is just around the corner!",
        )
    } else if completion_rate >= 50.0 {
        (
            "Great Progress!",
            format!("You're making solid progress on: {}", goal),
            "You're halfway there! Every day of learning brings you closer to your goal.\n\n\
             Keep going, you've got this!",
        )
    } else {
        (
            "Every Step Counts!",
            format!("Your learning journey for {} is underway!", goal),
            "Remember, consistency beats perfection. Small daily steps lead to big achievements!\n\n\
             You're building something amazing!",
        )
    };
    format!(
        "{}\n\n{}\n\nProgress: {:.0}%\nStreak: {} days\n\n{}",
        headline, lead, completion_rate, streak_days, closing
    )
}
