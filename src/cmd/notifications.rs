//! Notification and history commands: `taskboard notifications`.

use std::time::Duration;

use anyhow::Result;
use taskboard::{ApiClient, ApiError};
use taskboard_common::{Notification, NotificationQuery, TaskLogQuery};

use super::super::NotificationsCommands;
use super::render;

pub async fn cmd_notifications(
    client: &ApiClient,
    command: NotificationsCommands,
    json: bool,
) -> Result<()> {
    match command {
        NotificationsCommands::List {
            unread,
            notification_type,
            page,
        } => {
            let query = NotificationQuery {
                notification_type,
                is_read: unread.then_some(false),
                page,
                ..Default::default()
            };
            let notifications = client.list_notifications(&query).await?;
            render::emit(json, &notifications, |page| {
                render::print_notifications(&page.results);
                render::page_footer(page);
            })?;
        }
        NotificationsCommands::Read { id } => {
            client.mark_notification_read(id).await?;
            render::success(format!("Marked notification #{} read", id));
        }
        NotificationsCommands::Unread { id } => {
            client.mark_notification_unread(id).await?;
            render::success(format!("Marked notification #{} unread", id));
        }
        NotificationsCommands::ReadAll => {
            client.mark_all_notifications_read().await?;
            render::success("Marked all notifications read");
        }
        NotificationsCommands::Count => {
            let count = client.unread_count().await?;
            if json {
                render::print_json(&serde_json::json!({ "unread_count": count }))?;
            } else {
                println!("{}", count);
            }
        }
        NotificationsCommands::Logs {
            task,
            user,
            log_type,
            page,
        } => {
            let query = TaskLogQuery {
                task,
                user,
                log_type,
                page,
                ..Default::default()
            };
            let logs = client.list_task_logs(&query).await?;
            render::emit(json, &logs, |page| {
                render::print_logs(&page.results);
                render::page_footer(page);
            })?;
        }
        NotificationsCommands::Watch { interval } => {
            watch(client, Duration::from_secs(interval.max(1)), json).await?;
        }
    }

    Ok(())
}

/// Unread notifications newer than `seen`, oldest first.
async fn poll_unread(client: &ApiClient, seen: i64) -> Result<Vec<Notification>, ApiError> {
    if client.unread_count().await? == 0 {
        return Ok(Vec::new());
    }
    let query = NotificationQuery {
        is_read: Some(false),
        ordering: Some("-created_at".to_string()),
        ..Default::default()
    };
    let page = client.list_notifications(&query).await?;
    let mut fresh: Vec<Notification> = page
        .results
        .into_iter()
        .filter(|n| n.id > seen)
        .collect();
    fresh.sort_by_key(|n| n.id);
    Ok(fresh)
}

async fn watch(client: &ApiClient, every: Duration, json: bool) -> Result<()> {
    if !json {
        println!(
            "Watching for notifications every {}s. Press Ctrl-C to stop.",
            every.as_secs()
        );
    }

    let mut ticker = tokio::time::interval(every);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut seen = 0;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::debug!("watch interrupted");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        match poll_unread(client, seen).await {
            Ok(fresh) => {
                for notification in &fresh {
                    if json {
                        println!("{}", serde_json::to_string(notification)?);
                    } else {
                        println!("{}", render::notification_line(notification));
                    }
                }
                if let Some(last) = fresh.last() {
                    seen = last.id;
                }
            }
            // The session is gone; polling again cannot succeed.
            Err(e) if e.ended_session() => return Err(e.into()),
            Err(e) => tracing::warn!(error = %e, "notification poll failed, retrying next tick"),
        }
    }
}
