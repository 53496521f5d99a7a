use crate::model::CheckReport;
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct VulnRow {
    #[tabled(rename = "Vulnerability")]
    id: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Installed")]
    installed: String,
    #[tabled(rename = "Fixed In")]
    fixed_in: String,
}

pub fn print_cli_table(report: &CheckReport) -> Result<()> {
    println!("{}", render_table(report));
    Ok(())
}

pub(crate) fn render_table(report: &CheckReport) -> String {
    let header = format!(
        "{} {} ({})",
        report.package_name, report.installed_version, report.ecosystem
    );

    if report.vulnerabilities.is_empty() {
        return format!("{header}\n\nNo known vulnerabilities.");
    }

    let rows: Vec<VulnRow> = report
        .vulnerabilities
        .iter()
        .map(|v| VulnRow {
            id: v.vulnerability_id.clone(),
            package: truncate(&v.package_name, 40),
            installed: v.installed_version.clone(),
            fixed_in: format_fixed(&v.fixed_version),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    format!(
        "{header}\n\nFound {} vulnerabilities:\n\n{table}",
        report.vulnerabilities.len()
    )
}

fn format_fixed(fixed: &str) -> String {
    if fixed.is_empty() {
        "-".to_string()
    } else {
        truncate(fixed, 40)
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}
