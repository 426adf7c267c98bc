//! Prompt wording.

use crate::types::{SnoozeCount, SnoozeLimit};

fn update_list(pending: &[String]) -> String {
    pending
        .iter()
        .map(|name| format!("• {}", name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn snooze_message(pending: &[String], count: SnoozeCount, limit: SnoozeLimit) -> String {
    format!(
        "The following updates are available for your Mac:\n\n{}\n\n\
         You have snoozed these updates {} of {} times. \
         Click UPDATE to install them now, or Snooze to be reminded later.",
        update_list(pending),
        count,
        limit
    )
}

pub fn final_warning_message(pending: &[String], count: SnoozeCount, limit: SnoozeLimit) -> String {
    format!(
        "FINAL WARNING\n\nThe following updates are available for your Mac:\n\n{}\n\n\
         You have snoozed these updates {} of {} times. This is your last chance to snooze. \
         Next time they will be installed automatically.",
        update_list(pending),
        count,
        limit
    )
}

pub fn forced_notice_message(pending: &[String], limit: SnoozeLimit) -> String {
    format!(
        "The snooze limit of {} has been reached. These updates are now being installed:\n\n{}\n\n\
         Please save your work. Your Mac may restart when installation finishes.",
        limit,
        update_list(pending)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_list_every_update_and_the_count() {
        let pending = vec!["Security Update".to_string(), "Safari 17.6".to_string()];

        let snooze = snooze_message(&pending, 1, 3);
        assert!(snooze.contains("• Security Update\n• Safari 17.6"));
        assert!(snooze.contains("1 of 3 times"));

        let last = final_warning_message(&pending, 2, 3);
        assert!(last.starts_with("FINAL WARNING"));
        assert!(last.contains("2 of 3 times"));

        let forced = forced_notice_message(&pending, 3);
        assert!(forced.contains("snooze limit of 3 has been reached"));
        assert!(forced.contains("• Safari 17.6"));
    }
}
