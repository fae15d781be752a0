use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::metrics::sanitize_count;
use crate::{Post, PostStatus, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowState {
    NotYetDue,
    DueAndFilled,
    DueAndMissing,
}

impl WindowState {
    /// Only a due window with no reach entered raises the bell.
    pub fn is_overdue(self) -> bool {
        matches!(self, WindowState::DueAndMissing)
    }
}

pub fn due_date(publish_date: NaiveDate, window: Window) -> Option<NaiveDate> {
    publish_date.checked_add_days(Days::new(window.days()))
}

/// Re-derived from `today` on every call; nothing is stored.
pub fn window_state(
    publish_date: NaiveDate,
    window: Window,
    reach: f64,
    today: NaiveDate,
    metrics_disabled: bool,
) -> WindowState {
    if metrics_disabled {
        return WindowState::NotYetDue;
    }
    let Some(due) = due_date(publish_date, window) else {
        return WindowState::NotYetDue;
    };
    if today < due {
        return WindowState::NotYetDue;
    }
    if sanitize_count(reach) > 0.0 {
        WindowState::DueAndFilled
    } else {
        WindowState::DueAndMissing
    }
}

pub fn post_window_state(post: &Post, window: Window, today: NaiveDate) -> WindowState {
    window_state(
        post.publish_date,
        window,
        post.metrics(window).reach,
        today,
        post.metrics_disabled(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueAlert {
    pub window: Window,
    pub due_date: NaiveDate,
    pub label: String,
}

/// First overdue window of a published post, 7-day before 30-day. Drafts and
/// scheduled posts never alert.
pub fn due_alert(post: &Post, today: NaiveDate) -> Option<DueAlert> {
    if post.status != PostStatus::Published {
        return None;
    }
    Window::ALL.into_iter().find_map(|window| {
        if !post_window_state(post, window, today).is_overdue() {
            return None;
        }
        let due = due_date(post.publish_date, window)?;
        Some(DueAlert {
            window,
            due_date: due,
            label: format!("{} ({})", window.label(), due.format("%m/%d")),
        })
    })
}
