//! Group management commands.

use connstore_core::{GroupNode, GroupRecord, GroupTree, ROOT_GROUP_ID};

use super::provider_filter;
use crate::cli::GroupCommands;
use crate::error::CliError;
use crate::util::{Session, describe};

/// Prints the group tree
pub async fn cmd_groups(
    session: &Session,
    without_connections: bool,
    providers: &[String],
) -> Result<(), CliError> {
    let tree = session
        .store
        .get_connection_profile_groups(without_connections, provider_filter(providers))
        .await?;

    if tree.is_empty() {
        println!("No groups found.");
        return Ok(());
    }
    for &root in tree.root_indices() {
        print_node(&tree, root);
    }
    Ok(())
}

fn print_node(tree: &GroupTree, index: usize) {
    let Some(node) = tree.node(index) else {
        return;
    };
    let indent = "  ".repeat(node.depth);
    println!("{indent}{}", display_name(node));
    for connection in &node.connections {
        println!("{indent}  - {}", describe(connection));
    }
    for &child in &node.children {
        print_node(tree, child);
    }
}

fn display_name(node: &GroupNode) -> String {
    match node.description.as_deref() {
        Some(description) if !description.is_empty() => format!("{} ({description})", node.name),
        _ => node.name.clone(),
    }
}

/// Group command handler
pub async fn cmd_group(session: &Session, subcmd: GroupCommands) -> Result<(), CliError> {
    match subcmd {
        GroupCommands::Add {
            name,
            parent,
            color,
            description,
        } => {
            let parent_id = match parent.as_deref() {
                Some(full_name) => find_group_id(session, full_name).await?,
                None => ROOT_GROUP_ID.to_string(),
            };
            let mut group = GroupRecord::with_parent(String::new(), name, parent_id);
            group.color = color;
            group.description = description;

            let id = session.store.save_profile_group(&group).await?;
            println!("Created group '{}' with ID {id}", group.name.trim());
            Ok(())
        }
        GroupCommands::Delete { full_name } => {
            let id = find_group_id(session, &full_name).await?;
            let group = session
                .store
                .get_group_from_id(&id)
                .await?
                .ok_or_else(|| CliError::Group(format!("Group not found: {full_name}")))?;
            session.store.delete_group_from_configuration(&group).await?;
            println!("Deleted group '{full_name}'");
            Ok(())
        }
    }
}

async fn find_group_id(session: &Session, full_name: &str) -> Result<String, CliError> {
    session
        .store
        .group_id(full_name)
        .await?
        .ok_or_else(|| CliError::Group(format!("Group not found: {full_name}")))
}
