use super::{json_pretty, make_backend, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use dskit_core::Engine;
use dskit_schema::{ComponentEntry, ItemKind};
use std::path::Path;

fn print_section(title: &str, entries: &[&ComponentEntry], bullet: &console::Style) {
    if entries.is_empty() {
        return;
    }
    let bold = console::Style::new().bold();
    let dim = console::Style::new().dim();
    println!("{}", bold.apply_to(title));
    for entry in entries {
        if entry.description.is_empty() {
            println!("  {} {}", bullet.apply_to("●"), bold.apply_to(&entry.name));
        } else {
            println!(
                "  {} {} - {}",
                bullet.apply_to("●"),
                bold.apply_to(&entry.name),
                dim.apply_to(&entry.description)
            );
        }
    }
    println!();
}

pub fn run(root: &Path, registry: Option<&str>, json: bool) -> Result<u8, String> {
    let backend = make_backend(registry)?;
    let engine = Engine::new(root, &backend);

    let pb = spinner("fetching registry…");
    let manifest = engine.manifest().map_err(|e| {
        spin_fail(&pb, "could not fetch registry");
        e.to_string()
    })?;
    spin_ok(&pb, &format!("{} entries", manifest.len()));

    let components: Vec<&ComponentEntry> = manifest.entries(ItemKind::Component).collect();
    let libraries: Vec<&ComponentEntry> = manifest.entries(ItemKind::Library).collect();

    if json {
        let describe = |e: &&ComponentEntry| {
            serde_json::json!({
                "name": e.name,
                "description": e.description,
                "registryDependencies": e.registry_dependencies,
            })
        };
        let payload = serde_json::json!({
            "components": components.iter().map(describe).collect::<Vec<_>>(),
            "lib": libraries.iter().map(describe).collect::<Vec<_>>(),
        });
        println!("{}", json_pretty(&payload)?);
    } else if manifest.is_empty() {
        println!("registry is empty");
    } else {
        print_section("UI components:", &components, &console::Style::new().green());
        print_section("Utilities:", &libraries, &console::Style::new().blue());
        println!("usage: dskit add button card");
    }
    Ok(EXIT_SUCCESS)
}
