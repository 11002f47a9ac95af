use super::{json_pretty, EXIT_SUCCESS};
use std::path::Path;

pub fn run(dir: &Path, json: bool) -> Result<u8, String> {
    let report = dskit_schema::sync_registry(dir).map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&report)?);
    } else {
        println!(
            "synced {} components into {}",
            report.components.len(),
            report.registry_path.display()
        );
        for name in &report.components {
            println!("  {name}");
        }
    }
    Ok(EXIT_SUCCESS)
}
