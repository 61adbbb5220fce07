//! Task and follower commands: `taskboard tasks`.

use anyhow::{Result, bail};
use taskboard::ApiClient;
use taskboard_common::{FollowerQuery, NewTask, TaskQuery, TaskUpdate};

use super::super::TasksCommands;
use super::{confirm, render};

pub async fn cmd_tasks(client: &ApiClient, command: TasksCommands, json: bool) -> Result<()> {
    match command {
        TasksCommands::List {
            status,
            priority,
            project,
            assignee,
            pinned,
            search,
            ordering,
            page,
        } => {
            let query = TaskQuery {
                status,
                priority,
                project,
                assignee,
                is_pinned: pinned.then_some(true),
                search,
                ordering,
                page,
            };
            let tasks = client.list_tasks(&query).await?;
            render::emit(json, &tasks, |page| {
                render::print_tasks(&page.results);
                render::page_footer(page);
            })?;
        }
        TasksCommands::Show { id } => {
            let task = client.get_task(id).await?;
            render::emit(json, &task, render::print_task)?;
        }
        TasksCommands::Create {
            title,
            project,
            description,
            assignee,
            priority,
            due,
        } => {
            let task = client
                .create_task(&NewTask {
                    title,
                    description,
                    project,
                    assignee,
                    priority,
                    due_date: due,
                })
                .await?;
            render::emit(json, &task, |task| match task.project {
                Some(project) => render::success(format!(
                    "Created task '{}' in project #{}",
                    task.title, project
                )),
                None => render::success(format!("Created task '{}'", task.title)),
            })?;
        }
        TasksCommands::Update {
            id,
            title,
            description,
            assignee,
            status,
            priority,
            due,
        } => {
            let update = TaskUpdate {
                title,
                description,
                assignee,
                status,
                priority,
                due_date: due,
                is_pinned: None,
            };
            if update.is_empty() {
                bail!("Nothing to update. Pass at least one of --title, --description, --assignee, --status, --priority, --due.");
            }
            let task = client.update_task(id, &update).await?;
            render::emit(json, &task, |task| match task.status {
                Some(status) => render::success(format!("Updated task #{} ({})", id, status)),
                None => render::success(format!("Updated task #{}", id)),
            })?;
        }
        TasksCommands::Delete { id, force } => {
            if !confirm(format!("Delete task #{}?", id), force)? {
                println!("Cancelled.");
                return Ok(());
            }
            client.delete_task(id).await?;
            render::success(format!("Deleted task #{}", id));
        }
        TasksCommands::Mine => {
            let tasks = client.my_tasks().await?;
            render::emit(json, &tasks, |tasks| render::print_tasks(tasks))?;
        }
        TasksCommands::Created => {
            let tasks = client.created_tasks().await?;
            render::emit(json, &tasks, |tasks| render::print_tasks(tasks))?;
        }
        TasksCommands::Overdue => {
            let tasks = client.overdue_tasks().await?;
            render::emit(json, &tasks, |tasks| render::print_tasks(tasks))?;
        }
        TasksCommands::Pinned => {
            let tasks = client.pinned_tasks().await?;
            render::emit(json, &tasks, |tasks| render::print_tasks(tasks))?;
        }
        TasksCommands::Pin { id } => {
            client.pin_task(id).await?;
            render::success(format!("Pinned task #{}", id));
        }
        TasksCommands::Unpin { id } => {
            client.unpin_task(id).await?;
            render::success(format!("Unpinned task #{}", id));
        }
        TasksCommands::Follow { id } => {
            let follower = client.follow_task(id).await?;
            render::emit(json, &follower, |follower| {
                render::success(format!("Following task #{}", follower.task))
            })?;
        }
        TasksCommands::Unfollow { follower_id } => {
            client.unfollow_task(follower_id).await?;
            render::success(format!("Removed follower #{}", follower_id));
        }
        TasksCommands::Followers { task, user } => {
            let query = FollowerQuery {
                task,
                user,
                ..Default::default()
            };
            let followers = client.list_task_followers(&query).await?;
            render::emit(json, &followers, |page| {
                render::print_followers(&page.results);
                render::page_footer(page);
            })?;
        }
        TasksCommands::Followed => {
            let followers = client.my_followed_tasks().await?;
            render::emit(json, &followers, |followers| {
                render::print_followers(followers)
            })?;
        }
    }

    Ok(())
}
