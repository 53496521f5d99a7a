use crate::model::CheckReport;
use anyhow::Result;

pub fn print_json(report: &CheckReport) -> Result<()> {
    println!("{}", render_json(report)?);
    Ok(())
}

pub(crate) fn render_json(report: &CheckReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
