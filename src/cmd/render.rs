//! Output formatting shared by the commands.

use anyhow::Result;
use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;
use taskboard_common::{
    Comment, Notification, Page, Priority, Project, Task, TaskFollower, TaskLog, TaskStatus, User,
};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print `value` as JSON, or through `human` when JSON was not requested.
pub fn emit<T: Serialize + ?Sized>(json: bool, value: &T, human: impl FnOnce(&T)) -> Result<()> {
    if json {
        print_json(value)
    } else {
        human(value);
        Ok(())
    }
}

pub fn success(message: impl std::fmt::Display) {
    println!("{} {}", style("✓").green(), message);
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn status_label(status: TaskStatus) -> String {
    let label = format!("{:<11}", status.as_str());
    match status {
        TaskStatus::Todo => style(label).dim().to_string(),
        TaskStatus::InProgress => style(label).cyan().to_string(),
        TaskStatus::Done => style(label).green().to_string(),
    }
}

fn priority_label(priority: Priority) -> String {
    let label = format!("{:<6}", priority.as_str());
    match priority {
        Priority::Low => style(label).dim().to_string(),
        Priority::Medium => label,
        Priority::High => style(label).yellow().to_string(),
        Priority::Urgent => style(label).red().bold().to_string(),
    }
}

pub fn user_name(user: Option<&User>) -> String {
    user.map(User::display_name)
        .unwrap_or_else(|| "-".to_string())
}

pub fn task_line(task: &Task, now: DateTime<Utc>) -> String {
    let pin = if task.is_pinned { "📌 " } else { "" };
    let due = match task.due_date {
        Some(due) if task.is_overdue(now) => {
            format!("  {}", style(format!("overdue {}", timestamp(&due))).red())
        }
        Some(due) => format!("  due {}", timestamp(&due)),
        None => String::new(),
    };
    format!(
        "{:>5}  {}  {}  {}{}  ({}){}",
        task.id,
        status_label(task.status),
        priority_label(task.priority),
        pin,
        task.title,
        user_name(task.assignee.as_ref()),
        due
    )
}

pub fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    let now = Utc::now();
    for task in tasks {
        println!("{}", task_line(task, now));
    }
}

pub fn print_task(task: &Task) {
    println!("{}", style(format!("#{} {}", task.id, task.title)).bold());
    println!("  Status:    {}", task.status);
    println!("  Priority:  {}", task.priority);
    if let Some(project) = &task.project {
        println!("  Project:   {} (#{})", project.title, project.id);
    }
    println!("  Assignee:  {}", user_name(task.assignee.as_ref()));
    println!("  Creator:   {}", user_name(task.created_by.as_ref()));
    if let Some(due) = &task.due_date {
        println!("  Due:       {}", timestamp(due));
    }
    if task.is_pinned {
        println!("  Pinned:    yes");
    }
    if let Some(count) = task.followers_count {
        println!("  Followers: {}", count);
    }
    println!("  Updated:   {}", timestamp(&task.updated_at));
    if !task.description.is_empty() {
        println!();
        println!("{}", task.description);
    }
}

pub fn project_line(project: &Project) -> String {
    let members = project
        .member_count
        .map(|n| n as usize)
        .unwrap_or(project.members.len());
    let archived = if project.is_active {
        String::new()
    } else {
        format!("  {}", style("archived").dim())
    };
    format!(
        "{:>5}  {}  (manager {}, {} members){}",
        project.id,
        project.title,
        user_name(project.manager.as_ref()),
        members,
        archived
    )
}

pub fn print_projects(projects: &[Project]) {
    if projects.is_empty() {
        println!("No projects.");
        return;
    }
    for project in projects {
        println!("{}", project_line(project));
    }
}

pub fn print_project(project: &Project) {
    println!(
        "{}",
        style(format!("#{} {}", project.id, project.title)).bold()
    );
    println!("  Manager: {}", user_name(project.manager.as_ref()));
    println!("  Active:  {}", if project.is_active { "yes" } else { "no" });
    println!("  Created: {}", timestamp(&project.created_at));
    if !project.members.is_empty() {
        println!("  Members:");
        for member in &project.members {
            println!("    - {} (#{})", member.display_name(), member.id);
        }
    }
    if !project.description.is_empty() {
        println!();
        println!("{}", project.description);
    }
}

pub fn print_comments(comments: &[Comment]) {
    if comments.is_empty() {
        println!("No comments.");
        return;
    }
    for comment in comments {
        println!(
            "{:>5}  {}  {} on #{}: {}",
            comment.id,
            style(timestamp(&comment.created_at)).dim(),
            user_name(comment.author.as_ref()),
            comment.task.id(),
            comment.content
        );
    }
}

pub fn notification_line(notification: &Notification) -> String {
    let marker = if notification.is_read {
        " ".to_string()
    } else {
        style("●").cyan().to_string()
    };
    let kind = notification
        .notification_type
        .as_ref()
        .map(|t| t.as_str())
        .unwrap_or("notice");
    format!(
        "{} {:>5}  {}  [{}] {}",
        marker,
        notification.id,
        style(timestamp(&notification.created_at)).dim(),
        kind,
        if notification.title.is_empty() {
            &notification.message
        } else {
            &notification.title
        }
    )
}

pub fn print_notifications(notifications: &[Notification]) {
    if notifications.is_empty() {
        println!("No notifications.");
        return;
    }
    for notification in notifications {
        println!("{}", notification_line(notification));
    }
}

pub fn print_logs(logs: &[TaskLog]) {
    if logs.is_empty() {
        println!("No history.");
        return;
    }
    for log in logs {
        let kind = log.log_type.as_ref().map(|t| t.as_str()).unwrap_or("changed");
        let change = match (&log.old_value, &log.new_value) {
            (Some(old), Some(new)) => format!("{} → {}", old, new),
            (None, Some(new)) => new.clone(),
            (Some(old), None) => format!("{} → (none)", old),
            (None, None) => String::new(),
        };
        println!(
            "{}  task #{}  {}  {} {}",
            style(timestamp(&log.created_at)).dim(),
            log.task.id(),
            user_name(log.user.as_ref()),
            kind,
            change
        );
    }
}

pub fn print_followers(followers: &[TaskFollower]) {
    if followers.is_empty() {
        println!("Not following any tasks.");
        return;
    }
    for follower in followers {
        let title = follower
            .task
            .detail()
            .map(|task| task.title.clone())
            .unwrap_or_default();
        println!(
            "{:>5}  task #{} {}  ({})",
            follower.id,
            follower.task.id(),
            title,
            user_name(follower.user.as_ref())
        );
    }
}

/// Footer for paginated listings.
pub fn page_footer<T>(page: &Page<T>) {
    if page.has_next() {
        println!(
            "{}",
            style(format!(
                "Showing {} of {}. Use --page for more.",
                page.results.len(),
                page.count
            ))
            .dim()
        );
    }
}
