//! Business management commands.
//!
//! - `macrum business create <name>` - Create a business
//! - `macrum business list` - List businesses
//! - `macrum business show <id>` - Show a business with its projects and clients
//! - `macrum business update <id>` - Update business fields
//! - `macrum business delete <id>...` - Delete businesses

use super::{
    open_workspace, parse_sort, print_json, print_notices, print_problems, require_changes, today, truncate,
};
use crate::cli::{BusinessCommands, BusinessCreateArgs, BusinessListArgs, BusinessUpdateArgs};
use crate::error::Result;
use crate::model::{Business, BusinessPatch, Client, Entity, NewBusiness, Project, format_timestamp};
use crate::store::Workspace;
use crate::validate::{ValidationErrors, validate_business};
use crate::view::{self, BusinessFilter, BusinessSort};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct BusinessOutput<'a> {
    business: &'a Business,
}

#[derive(Serialize)]
struct BusinessListOutput<'a> {
    businesses: Vec<&'a Business>,
    count: usize,
}

#[derive(Serialize)]
struct BusinessDetailOutput<'a> {
    business: &'a Business,
    projects: Vec<&'a Project>,
    clients: Vec<&'a Client>,
}

/// Execute a business command.
///
/// # Errors
///
/// Returns an error if the database is missing, input fails validation,
/// or the business does not exist.
pub fn execute(command: &BusinessCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut ws = open_workspace(db_path)?;

    match command {
        BusinessCommands::Create(args) => create(&mut ws, args, json),
        BusinessCommands::List(args) => list(&mut ws, args, json),
        BusinessCommands::Show { id } => show(&mut ws, id, json),
        BusinessCommands::Update(args) => update(&mut ws, args, json),
        BusinessCommands::Delete { ids } => delete(&mut ws, ids, json),
    }
}

fn create(ws: &mut Workspace, args: &BusinessCreateArgs, json: bool) -> Result<()> {
    let draft = NewBusiness {
        name: args.name.clone(),
        description: args.description.clone(),
        industry: args.industry.clone(),
        website: args.website.clone(),
        email: args.email.clone(),
        phone: args.phone.clone(),
        address: args.address.clone(),
    };
    ValidationErrors::check(validate_business(&draft))?;

    let business = ws.create_business(draft);
    let notices = ws.take_notices();

    if crate::is_silent() {
        print_problems(&notices);
        println!("{}", business.id);
    } else if json {
        print_json(&BusinessOutput { business: &business }, &notices)?;
    } else {
        print_notices(&notices);
        println!("Created business: {}", business.name);
        println!("  ID: {}", business.id);
    }

    Ok(())
}

fn list(ws: &mut Workspace, args: &BusinessListArgs, json: bool) -> Result<()> {
    let (key, order): (BusinessSort, _) = parse_sort(&args.sort)?;
    let filter = BusinessFilter {
        search: args.search.clone(),
        industry: args.industry.clone(),
    };

    let notices = ws.take_notices();
    let businesses = view::query(
        ws.businesses().all(),
        &filter,
        key,
        order,
        args.sort.limit,
        today(),
    );

    if crate::is_csv() {
        // CSV goes to stdout; notices stay on stderr
        print_notices(&notices);
        println!("id,name,industry,projects,active_projects");
        for b in &businesses {
            println!(
                "{},{},{},{},{}",
                b.id,
                crate::csv_escape(&b.name),
                crate::csv_escape(b.industry.as_deref().unwrap_or("")),
                b.project_count,
                b.active_projects
            );
        }
    } else if json {
        let output = BusinessListOutput {
            count: businesses.len(),
            businesses,
        };
        print_json(&output, &notices)?;
    } else {
        print_notices(&notices);
        if businesses.is_empty() {
            println!("No businesses found.");
            println!("\nCreate one with: macrum business create <name>");
            return Ok(());
        }
        println!("Businesses ({}):\n", businesses.len());
        for b in &businesses {
            println!(
                "  {} [{}] ({} projects, {} active)",
                b.name,
                b.industry.as_deref().unwrap_or("-"),
                b.project_count,
                b.active_projects
            );
            println!("    ID:   {}", b.id);
            if !b.description.is_empty() {
                println!("    Desc: {}", truncate(&b.description, 60));
            }
        }
    }

    Ok(())
}

fn show(ws: &mut Workspace, id: &str, json: bool) -> Result<()> {
    let notices = ws.take_notices();
    let business = ws.businesses().require(id)?;
    let projects: Vec<&Project> = ws
        .projects()
        .iter()
        .filter(|p| p.business_id == business.id)
        .collect();
    let clients: Vec<&Client> = ws
        .clients()
        .iter()
        .filter(|c| c.business_ids.contains(&business.id))
        .collect();

    if json {
        let output = BusinessDetailOutput {
            business,
            projects,
            clients,
        };
        return print_json(&output, &notices);
    }

    print_notices(&notices);
    println!("Business: {}", business.name);
    println!("  ID:          {}", business.id);
    println!("  Industry:    {}", business.industry.as_deref().unwrap_or("-"));
    println!("  Description: {}", if business.description.is_empty() { "-" } else { business.description.as_str() });
    println!("  Website:     {}", business.website.as_deref().unwrap_or("-"));
    println!("  Email:       {}", business.email.as_deref().unwrap_or("-"));
    println!("  Phone:       {}", business.phone.as_deref().unwrap_or("-"));
    println!("  Address:     {}", business.address.as_deref().unwrap_or("-"));
    println!();
    println!(
        "Projects ({} total, {} active):",
        business.project_count, business.active_projects
    );
    for p in &projects {
        println!("  [{}] {} ({}, {}%)", p.id, p.name, p.status, p.progress);
    }
    println!();
    println!("Clients ({}):", clients.len());
    for c in &clients {
        println!("  [{}] {} <{}>", c.id, c.name, c.email);
    }
    println!();
    println!("Created: {}", format_timestamp(business.created_at));
    println!("Updated: {}", format_timestamp(business.updated_at));

    Ok(())
}

fn update(ws: &mut Workspace, args: &BusinessUpdateArgs, json: bool) -> Result<()> {
    let patch = BusinessPatch {
        name: args.name.clone(),
        description: args.description.clone(),
        industry: args.industry.clone(),
        website: args.website.clone(),
        email: args.email.clone(),
        phone: args.phone.clone(),
        address: args.address.clone(),
    };
    require_changes(patch.is_empty())?;

    let mut merged = ws.businesses().require(&args.id)?.clone();
    merged.apply(patch.clone(), merged.updated_at);
    ValidationErrors::check(validate_business(&NewBusiness::from(&merged)))?;

    let updated = ws.update_business(&args.id, patch);
    let notices = ws.take_notices();
    let Some(business) = updated else {
        print_notices(&notices);
        return Ok(());
    };

    if json {
        print_json(&BusinessOutput { business: &business }, &notices)?;
    } else {
        print_notices(&notices);
        println!("Updated business: {}", business.name);
        println!("  ID: {}", business.id);
    }

    Ok(())
}

fn delete(ws: &mut Workspace, ids: &[String], json: bool) -> Result<()> {
    // Resolve every ID before deleting anything
    for id in ids {
        ws.businesses().require(id)?;
    }

    let deleted: Vec<&String> = ids.iter().filter(|id| ws.delete_business(id)).collect();
    let notices = ws.take_notices();

    if json {
        let output = serde_json::json!({
            "deleted": deleted,
            "count": deleted.len(),
        });
        print_json(&output, &notices)?;
    } else {
        print_notices(&notices);
        println!("Deleted {} business(es)", deleted.len());
    }

    Ok(())
}
