use super::{
    is_interactive, json_pretty, make_backend, spin_fail, spin_ok, spinner, warning, EXIT_SUCCESS,
};
use dialoguer::{Confirm, MultiSelect};
use dskit_core::{Engine, InstallReport, PackageManager};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct AddOptions {
    pub all: bool,
    pub yes: bool,
    pub skip_deps: bool,
}

fn fetch_installable(engine: &Engine<'_>) -> Result<Vec<String>, String> {
    let pb = spinner("fetching available components…");
    let names = engine.installable_names().map_err(|e| {
        spin_fail(&pb, "could not fetch components");
        e.to_string()
    })?;
    spin_ok(&pb, &format!("found {} components", names.len()));
    Ok(names)
}

/// Work out what to install. `Ok(None)` means the user picked nothing.
fn select_names(
    engine: &Engine<'_>,
    names: &[String],
    all: bool,
    interactive: bool,
) -> Result<Option<Vec<String>>, String> {
    if all {
        return Ok(Some(fetch_installable(engine)?));
    }
    if !names.is_empty() {
        return Ok(Some(names.to_vec()));
    }
    if !interactive {
        return Err("no components given (pass component names or --all)".to_owned());
    }

    let available = fetch_installable(engine)?;
    let picked = MultiSelect::new()
        .with_prompt("Which components would you like to install?")
        .items(&available)
        .interact()
        .map_err(|e| format!("prompt failed: {e}"))?;
    if picked.is_empty() {
        return Ok(None);
    }
    Ok(Some(picked.into_iter().map(|i| available[i].clone()).collect()))
}

fn confirm(names: &[String]) -> Result<bool, String> {
    eprintln!("The following components will be installed:");
    for name in names {
        eprintln!("  - {name}");
    }
    Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()
        .map_err(|e| format!("prompt failed: {e}"))
}

/// `--yes` only skips the confirmation; the picker still runs on a terminal.
fn needs_confirmation(interactive: bool, yes: bool) -> bool {
    interactive && !yes
}

fn status_payload(status: &str) -> serde_json::Value {
    serde_json::json!({
        "status": status,
        "components": [],
    })
}

fn print_status(status: &str, message: &str, json: bool) -> Result<(), String> {
    if json {
        println!("{}", json_pretty(&status_payload(status))?);
    } else {
        println!("{message}");
    }
    Ok(())
}

fn install_packages(root: &Path, report: &InstallReport) -> Result<PackageManager, String> {
    let pm = PackageManager::detect(root);
    let deps: Vec<&str> = report.dependencies.iter().map(String::as_str).collect();
    let dev_deps: Vec<&str> = report.dev_dependencies.iter().map(String::as_str).collect();

    if !deps.is_empty() {
        eprintln!("installing dependencies with {pm}: {}", deps.join(" "));
        pm.install(root, &deps, false).map_err(|e| e.to_string())?;
    }
    if !dev_deps.is_empty() {
        eprintln!("installing dev dependencies with {pm}: {}", dev_deps.join(" "));
        pm.install(root, &dev_deps, true).map_err(|e| e.to_string())?;
    }
    Ok(pm)
}

fn print_report(
    report: &InstallReport,
    pm: Option<PackageManager>,
    json: bool,
) -> Result<(), String> {
    if json {
        let payload = serde_json::json!({
            "status": "installed",
            "components": report.components,
            "files": report.files,
            "dependencies": report.dependencies,
            "dev_dependencies": report.dev_dependencies,
            "fetch_failures": report.fetch_failures,
            "package_manager": pm,
        });
        println!("{}", json_pretty(&payload)?);
        return Ok(());
    }

    let ok = console::Style::new().green();
    println!("installed components:");
    for name in &report.components {
        println!("  {} {name}", ok.apply_to("✓"));
    }
    for failure in &report.fetch_failures {
        eprintln!(
            "{}",
            warning(&format!(
                "{}: could not fetch {} ({})",
                failure.component, failure.file, failure.reason
            ))
        );
    }
    let skipped = report.skipped().count();
    if skipped > 0 {
        let msg = format!("{skipped} file(s) skipped because no content was available");
        eprintln!("{}", warning(&msg));
    }
    if pm.is_none() && !(report.dependencies.is_empty() && report.dev_dependencies.is_empty()) {
        let deps: Vec<&str> = report
            .dependencies
            .iter()
            .chain(&report.dev_dependencies)
            .map(String::as_str)
            .collect();
        println!("dependencies not installed: {}", deps.join(" "));
    }
    Ok(())
}

pub fn run(
    root: &Path,
    registry: Option<&str>,
    names: &[String],
    opts: AddOptions,
    json: bool,
) -> Result<u8, String> {
    let backend = make_backend(registry)?;
    let engine = Engine::new(root, &backend);
    let config = engine.load_config().map_err(|e| e.to_string())?;
    let interactive = is_interactive();

    let Some(selected) = select_names(&engine, names, opts.all, interactive)? else {
        print_status("nothing_selected", "no components selected", json)?;
        return Ok(EXIT_SUCCESS);
    };

    if needs_confirmation(interactive, opts.yes) && !confirm(&selected)? {
        print_status("cancelled", "cancelled", json)?;
        return Ok(EXIT_SUCCESS);
    }

    let pb = spinner("resolving dependencies…");
    let report = engine.add(&selected, &config.aliases).map_err(|e| {
        spin_fail(&pb, "installation failed");
        e.to_string()
    })?;
    spin_ok(&pb, &format!("{} component(s) installed", report.components.len()));

    let pm = if opts.skip_deps {
        None
    } else {
        Some(install_packages(root, &report)?)
    };

    print_report(&report, pm, json)?;
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_skips_only_confirmation() {
        assert!(needs_confirmation(true, false));
        assert!(!needs_confirmation(true, true));
        assert!(!needs_confirmation(false, false));
    }

    #[test]
    fn yes_still_allows_picker_selection() {
        let backend = dskit_remote::MemoryBackend::new();
        let engine = Engine::new(Path::new("/unused"), &backend);
        let names = vec!["button".to_owned()];
        let picked = select_names(&engine, &names, false, true).unwrap();
        assert_eq!(picked, Some(names));
    }

    #[test]
    fn status_payload_is_json() {
        let payload = status_payload("cancelled");
        assert_eq!(payload["status"], "cancelled");
        assert!(payload["components"].as_array().unwrap().is_empty());

        let text = json_pretty(&status_payload("nothing_selected")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["status"], "nothing_selected");
    }
}
