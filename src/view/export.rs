//! Client list export.

use crate::csv_escape;
use crate::error::Result;
use crate::model::{Client, format_date};
use std::path::Path;

pub const CLIENT_CSV_HEADER: [&str; 7] =
    ["Name", "Email", "Phone", "Company", "Status", "Projects", "Created"];

fn client_row(client: &Client) -> String {
    [
        csv_escape(&client.name),
        csv_escape(&client.email),
        csv_escape(client.phone.as_deref().unwrap_or("")),
        csv_escape(client.company.as_deref().unwrap_or("")),
        client.status.as_str().to_string(),
        client.project_ids.len().to_string(),
        format_date(client.created_at),
    ]
    .join(",")
}

/// Render clients as CSV: header line, then one line per client.
///
/// `Projects` is the number of linked projects and `Created` is the
/// creation date as `YYYY-MM-DD`.
#[must_use]
pub fn clients_to_csv(clients: &[&Client]) -> String {
    let mut out = CLIENT_CSV_HEADER.join(",");
    out.push('\n');
    for client in clients {
        out.push_str(&client_row(client));
        out.push('\n');
    }
    out
}

/// Write the CSV rendering of `clients` to `path`.
///
/// Returns the number of clients written.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn export_clients_csv(clients: &[&Client], path: &Path) -> Result<usize> {
    std::fs::write(path, clients_to_csv(clients))?;
    Ok(clients.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, NewClient};
    use chrono::NaiveDate;

    fn client(name: &str, email: &str) -> Client {
        // 2024-03-05T12:00:00Z
        Client::from_draft("cli_1".to_string(), NewClient::new(name, email), 1_709_640_000_000)
    }

    #[test]
    fn test_header_and_column_order() {
        let mut c = client("Jane Doe", "jane@example.com");
        c.phone = Some("555-0100".to_string());
        c.company = Some("Acme".to_string());
        c.project_ids = vec!["prj_1".to_string(), "prj_2".to_string()];

        let csv = clients_to_csv(&[&c]);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "Name,Email,Phone,Company,Status,Projects,Created");
        assert_eq!(lines[1], "Jane Doe,jane@example.com,555-0100,Acme,active,2,2024-03-05");
    }

    #[test]
    fn test_values_are_escaped() {
        let mut c = client("Doe, Jane", "jane@example.com");
        c.company = Some("The \"Best\" Co".to_string());
        let csv = clients_to_csv(&[&c]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("\"Doe, Jane\",jane@example.com,,\"The \"\"Best\"\" Co\","));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clients.csv");
        let c = client("Jane", "jane@example.com");

        let written = export_clients_csv(&[&c], &path).unwrap();
        assert_eq!(written, 1);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.ends_with(&format!("{}\n", NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())));
    }
}
