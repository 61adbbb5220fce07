//! Comment commands: `taskboard comments`.

use anyhow::Result;
use taskboard::ApiClient;
use taskboard_common::{CommentQuery, CommentUpdate, NewComment};

use super::super::CommentsCommands;
use super::{confirm, render};

pub async fn cmd_comments(client: &ApiClient, command: CommentsCommands, json: bool) -> Result<()> {
    match command {
        CommentsCommands::List {
            task,
            author,
            search,
            page,
        } => {
            let query = CommentQuery {
                task,
                author,
                search,
                page,
                ..Default::default()
            };
            let comments = client.list_comments(&query).await?;
            render::emit(json, &comments, |page| {
                render::print_comments(&page.results);
                render::page_footer(page);
            })?;
        }
        CommentsCommands::Add { task, content } => {
            let comment = client.create_comment(&NewComment { task, content }).await?;
            render::emit(json, &comment, |_| {
                render::success(format!("Added comment on task #{}", task))
            })?;
        }
        CommentsCommands::Edit { id, content } => {
            let comment = client
                .update_comment(id, &CommentUpdate { content })
                .await?;
            render::emit(json, &comment, |_| render::success(format!("Updated comment #{}", id)))?;
        }
        CommentsCommands::Delete { id, force } => {
            if !confirm(format!("Delete comment #{}?", id), force)? {
                println!("Cancelled.");
                return Ok(());
            }
            client.delete_comment(id).await?;
            render::success(format!("Deleted comment #{}", id));
        }
    }

    Ok(())
}
