//! Client management commands.
//!
//! - `macrum client create <name> --email <email>` - Create a client
//! - `macrum client list` - List clients
//! - `macrum client show <id>` - Show a client with their projects
//! - `macrum client update <id>` - Update client fields
//! - `macrum client delete <id>...` - Delete clients
//! - `macrum client export [--output FILE]` - Export clients as CSV

use super::{
    open_workspace, parse_sort, print_json, print_notices, print_problems, require_changes, today,
};
use crate::cli::{ClientCommands, ClientCreateArgs, ClientListArgs, ClientUpdateArgs};
use crate::error::Result;
use crate::model::{Client, ClientPatch, ClientStatus, Entity, NewClient, Project, format_date};
use crate::store::Workspace;
use crate::validate::{ValidationErrors, parse_client_status, validate_client};
use crate::view::{self, ClientFilter, ClientSort};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct ClientOutput<'a> {
    client: &'a Client,
}

#[derive(Serialize)]
struct ClientListOutput<'a> {
    clients: Vec<&'a Client>,
    count: usize,
}

#[derive(Serialize)]
struct ClientDetailOutput<'a> {
    client: &'a Client,
    projects: Vec<&'a Project>,
}

/// Execute a client command.
///
/// # Errors
///
/// Returns an error if the database is missing, input fails validation,
/// or a referenced record does not exist.
pub fn execute(command: &ClientCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut ws = open_workspace(db_path)?;

    match command {
        ClientCommands::Create(args) => create(&mut ws, args, json),
        ClientCommands::List(args) => list(&mut ws, args, json),
        ClientCommands::Show { id } => show(&mut ws, id, json),
        ClientCommands::Update(args) => update(&mut ws, args, json),
        ClientCommands::Delete { ids } => delete(&mut ws, ids, json),
        ClientCommands::Export { output, filter } => {
            export(&mut ws, filter, output.as_deref(), json)
        }
    }
}

fn status_label(status: ClientStatus) -> colored::ColoredString {
    match status {
        ClientStatus::Active => status.as_str().green(),
        ClientStatus::Inactive => status.as_str().dimmed(),
        ClientStatus::Prospect => status.as_str().cyan(),
    }
}

fn require_businesses(ws: &Workspace, ids: &[String]) -> Result<()> {
    for id in ids {
        ws.businesses().require(id)?;
    }
    Ok(())
}

fn create(ws: &mut Workspace, args: &ClientCreateArgs, json: bool) -> Result<()> {
    let status = args
        .status
        .as_deref()
        .map(parse_client_status)
        .transpose()?
        .unwrap_or_default();

    let draft = NewClient {
        name: args.name.clone(),
        email: args.email.clone(),
        phone: args.phone.clone(),
        company: args.company.clone(),
        address: args.address.clone(),
        notes: args.notes.clone(),
        business_ids: args.businesses.clone(),
        status,
    };
    ValidationErrors::check(validate_client(&draft))?;
    require_businesses(ws, &draft.business_ids)?;

    let client = ws.create_client(draft);
    let notices = ws.take_notices();

    if crate::is_silent() {
        print_problems(&notices);
        println!("{}", client.id);
    } else if json {
        print_json(&ClientOutput { client: &client }, &notices)?;
    } else {
        print_notices(&notices);
        println!("Created client: {} <{}>", client.name, client.email);
        println!("  ID: {}", client.id);
    }

    Ok(())
}

fn filtered<'a>(ws: &'a Workspace, args: &ClientListArgs) -> Result<Vec<&'a Client>> {
    let (key, order): (ClientSort, _) = parse_sort(&args.sort)?;
    let filter = ClientFilter {
        search: args.search.clone(),
        status: args.status.as_deref().map(parse_client_status).transpose()?,
        business_id: args.business.clone(),
    };
    Ok(view::query(
        ws.clients().all(),
        &filter,
        key,
        order,
        args.sort.limit,
        today(),
    ))
}

fn list(ws: &mut Workspace, args: &ClientListArgs, json: bool) -> Result<()> {
    let notices = ws.take_notices();
    let clients = filtered(ws, args)?;

    if crate::is_csv() {
        // CSV goes to stdout; notices stay on stderr
        print_notices(&notices);
        print!("{}", view::export::clients_to_csv(&clients));
    } else if json {
        let output = ClientListOutput {
            count: clients.len(),
            clients,
        };
        print_json(&output, &notices)?;
    } else {
        print_notices(&notices);
        if clients.is_empty() {
            println!("No clients found.");
            return Ok(());
        }
        println!("Clients ({}):\n", clients.len());
        for c in &clients {
            println!("  {} <{}> [{}]", c.name, c.email, status_label(c.status));
            println!("    ID:       {}", c.id);
            if let Some(company) = &c.company {
                println!("    Company:  {company}");
            }
            println!("    Projects: {}", c.project_ids.len());
        }
    }

    Ok(())
}

fn show(ws: &mut Workspace, id: &str, json: bool) -> Result<()> {
    let notices = ws.take_notices();
    let client = ws.clients().require(id)?;
    let projects: Vec<&Project> = client
        .project_ids
        .iter()
        .filter_map(|pid| ws.projects().get(pid))
        .collect();

    if json {
        return print_json(&ClientDetailOutput { client, projects }, &notices);
    }

    print_notices(&notices);
    println!("Client: {}", client.name);
    println!("  ID:       {}", client.id);
    println!("  Status:   {}", status_label(client.status));
    println!("  Email:    {}", client.email);
    println!("  Phone:    {}", client.phone.as_deref().unwrap_or("-"));
    println!("  Company:  {}", client.company.as_deref().unwrap_or("-"));
    println!("  Address:  {}", client.address.as_deref().unwrap_or("-"));
    if let Some(notes) = &client.notes {
        println!("  Notes:    {notes}");
    }
    println!();
    println!("Businesses ({}):", client.business_ids.len());
    for bid in &client.business_ids {
        let name = ws.businesses().get(bid).map_or("(deleted)", |b| b.name.as_str());
        println!("  [{bid}] {name}");
    }
    println!();
    println!("Projects ({}):", projects.len());
    for p in &projects {
        println!("  [{}] {} ({}, due {})", p.id, p.name, p.status, p.due_date);
    }
    println!();
    println!("Created: {}", format_date(client.created_at));

    Ok(())
}

fn update(ws: &mut Workspace, args: &ClientUpdateArgs, json: bool) -> Result<()> {
    let patch = ClientPatch {
        name: args.name.clone(),
        email: args.email.clone(),
        phone: args.phone.clone(),
        company: args.company.clone(),
        address: args.address.clone(),
        notes: args.notes.clone(),
        business_ids: args.businesses.clone(),
        status: args.status.as_deref().map(parse_client_status).transpose()?,
    };
    require_changes(patch.is_empty())?;
    if let Some(ids) = &patch.business_ids {
        require_businesses(ws, ids)?;
    }

    let mut merged = ws.clients().require(&args.id)?.clone();
    let now = merged.updated_at;
    merged.apply(patch.clone(), now);
    ValidationErrors::check(validate_client(&NewClient::from(&merged)))?;

    let updated = ws.update_client(&args.id, patch);
    let notices = ws.take_notices();
    let Some(client) = updated else {
        print_notices(&notices);
        return Ok(());
    };

    if json {
        print_json(&ClientOutput { client: &client }, &notices)?;
    } else {
        print_notices(&notices);
        println!("Updated client: {}", client.name);
        println!("  ID: {}", client.id);
    }

    Ok(())
}

fn delete(ws: &mut Workspace, ids: &[String], json: bool) -> Result<()> {
    for id in ids {
        ws.clients().require(id)?;
    }

    let deleted: Vec<&String> = ids.iter().filter(|id| ws.delete_client(id)).collect();
    let notices = ws.take_notices();

    if json {
        let output = serde_json::json!({
            "deleted": deleted,
            "count": deleted.len(),
        });
        print_json(&output, &notices)?;
    } else {
        print_notices(&notices);
        println!("Deleted {} client(s)", deleted.len());
    }

    Ok(())
}

fn export(ws: &mut Workspace, args: &ClientListArgs, output: Option<&Path>, json: bool) -> Result<()> {
    let notices = ws.take_notices();
    let clients = filtered(ws, args)?;

    let Some(path) = output else {
        print_notices(&notices);
        print!("{}", view::export::clients_to_csv(&clients));
        return Ok(());
    };

    let count = view::export::export_clients_csv(&clients, path)?;
    if json {
        let output = serde_json::json!({
            "path": path,
            "count": count,
        });
        print_json(&output, &notices)?;
    } else {
        print_notices(&notices);
        println!("Exported {count} client(s) to {}", path.display());
    }

    Ok(())
}
