//! Project commands: `taskboard projects`.

use anyhow::Result;
use taskboard::ApiClient;
use taskboard_common::{NewProject, ProjectQuery, ProjectUpdate};

use super::super::ProjectsCommands;
use super::{confirm, render};

pub async fn cmd_projects(client: &ApiClient, command: ProjectsCommands, json: bool) -> Result<()> {
    match command {
        ProjectsCommands::List {
            search,
            active,
            manager,
            ordering,
            page,
        } => {
            let query = ProjectQuery {
                is_active: active,
                manager,
                search,
                ordering,
                page,
            };
            let projects = client.list_projects(&query).await?;
            render::emit(json, &projects, |page| {
                render::print_projects(&page.results);
                render::page_footer(page);
            })?;
        }
        ProjectsCommands::Show { id } => {
            let project = client.get_project(id).await?;
            render::emit(json, &project, render::print_project)?;
        }
        ProjectsCommands::Create {
            title,
            description,
            members,
        } => {
            let project = client
                .create_project(&NewProject {
                    title,
                    description,
                    members,
                })
                .await?;
            render::emit(json, &project, |project| {
                render::success(format!("Created project '{}'", project.title))
            })?;
        }
        ProjectsCommands::Update {
            id,
            title,
            description,
            active,
            members,
        } => {
            let update = ProjectUpdate {
                title,
                description,
                is_active: active,
                members: (!members.is_empty()).then_some(members),
            };
            let project = client.update_project(id, &update).await?;
            render::emit(json, &project, |project| {
                render::success(format!("Updated project #{} {}", id, project.title))
            })?;
        }
        ProjectsCommands::Delete { id, force } => {
            if !confirm(format!("Delete project #{} and all its tasks?", id), force)? {
                println!("Cancelled.");
                return Ok(());
            }
            client.delete_project(id).await?;
            render::success(format!("Deleted project #{}", id));
        }
        ProjectsCommands::AddMember {
            project_id,
            user_id,
        } => {
            client.add_project_member(project_id, user_id).await?;
            render::success(format!(
                "Added user #{} to project #{}",
                user_id, project_id
            ));
        }
        ProjectsCommands::RemoveMember {
            project_id,
            user_id,
        } => {
            client.remove_project_member(project_id, user_id).await?;
            render::success(format!(
                "Removed user #{} from project #{}",
                user_id, project_id
            ));
        }
        ProjectsCommands::Mine => {
            let projects = client.my_projects().await?;
            render::emit(json, &projects, |projects| render::print_projects(projects))?;
        }
        ProjectsCommands::Member => {
            let projects = client.member_projects().await?;
            render::emit(json, &projects, |projects| render::print_projects(projects))?;
        }
    }

    Ok(())
}
