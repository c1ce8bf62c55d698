use html_escape::encode_text;
use taskflow_domain::{Priority, ReminderCandidate};

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 60 * 24;

/// The email sent to one user, covering all of that user's due tasks
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderMessage {
    pub subject: String,
    pub html_body: String,
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Human readable reminder cadence, e.g. "45 minutes", "1 hour" or "2 days"
pub fn format_interval(minutes: i64) -> String {
    if minutes > 0 && minutes % MINUTES_PER_DAY == 0 {
        plural(minutes / MINUTES_PER_DAY, "day")
    } else if minutes > 0 && minutes % MINUTES_PER_HOUR == 0 {
        plural(minutes / MINUTES_PER_HOUR, "hour")
    } else {
        plural(minutes, "minute")
    }
}

fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "🔴",
        Priority::Medium => "🟡",
        Priority::Low => "🟢",
    }
}

fn pending_tasks(count: usize) -> String {
    plural(count as i64, "pending task")
}

fn render_task_line(task: &ReminderCandidate) -> String {
    let mut line = format!(
        "{} {}",
        priority_marker(task.priority),
        encode_text(&task.title)
    );
    if let Some(due_date) = task.due_date {
        line.push_str(&format!(" (Due: {})", due_date.format("%Y-%m-%d")));
    }
    if let Some(interval) = task.reminder_interval {
        line.push_str(&format!(" - Reminding every {}", format_interval(interval)));
    }
    format!(
        r#"<li style="padding:12px;margin-bottom:8px;background:#ffffff;border-left:4px solid #7c3aed;">{}</li>"#,
        line
    )
}

/// Renders the reminder email for one user. Never fails, whatever optional
/// task fields are missing.
pub fn render_reminder(display_name: &str, tasks: &[ReminderCandidate]) -> ReminderMessage {
    let pending = pending_tasks(tasks.len());
    let task_lines = tasks
        .iter()
        .map(render_task_line)
        .collect::<Vec<_>>()
        .join("\n");

    let html_body = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family:sans-serif;line-height:1.6;color:#333333;">
<div style="max-width:600px;margin:0 auto;padding:20px;">
<h1 style="font-size:24px;">⏰ Task Reminder</h1>
<p>You have {pending}</p>
<p>Hi {name}! 👋</p>
<p>Here are your pending tasks with reminders enabled:</p>
<ul style="list-style:none;margin:0;padding:0;">
{tasks}
</ul>
<p style="color:#64748b;font-size:14px;">Complete your tasks to stop receiving reminders.</p>
<p style="color:#64748b;font-size:14px;">TaskFlow</p>
</div>
</body>
</html>
"#,
        pending = pending,
        name = encode_text(display_name),
        tasks = task_lines,
    );

    ReminderMessage {
        subject: format!("⏰ Task Reminder: {}", pending),
        html_body,
    }
}
