use super::{is_interactive, json_pretty, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use dialoguer::{Confirm, Input, Select};
use dskit_core::{init_project, InitResult};
use dskit_schema::{Aliases, ProjectConfig, Style, TailwindConfig, COMPONENTS_JSON};
use std::path::Path;

const BASE_COLORS: [&str; 5] = ["slate", "gray", "zinc", "neutral", "stone"];

fn prompt_err(e: dialoguer::Error) -> String {
    format!("prompt failed: {e}")
}

/// Returns `false` when the user declined to overwrite.
fn confirm_overwrite(root: &Path, force: bool, interactive: bool) -> Result<bool, String> {
    if force || !ProjectConfig::path_in(root).exists() {
        return Ok(true);
    }
    if !interactive {
        return Err(format!(
            "config error: {COMPONENTS_JSON} already exists (pass --force to overwrite)"
        ));
    }
    Confirm::new()
        .with_prompt(format!("{COMPONENTS_JSON} already exists. Overwrite?"))
        .default(false)
        .interact()
        .map_err(prompt_err)
}

fn prompt_config() -> Result<ProjectConfig, String> {
    let styles = ["default", "new-york"];
    let style = Select::new()
        .with_prompt("Which style would you like to use?")
        .items(&styles)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    let base_color = Select::new()
        .with_prompt("Which base color would you like to use?")
        .items(&BASE_COLORS)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    let css_variables = Confirm::new()
        .with_prompt("Use CSS variables for colors?")
        .default(true)
        .interact()
        .map_err(prompt_err)?;

    let defaults = Aliases::default();
    let components: String = Input::new()
        .with_prompt("Import alias for components")
        .default(defaults.components)
        .interact_text()
        .map_err(prompt_err)?;
    let utils: String = Input::new()
        .with_prompt("Import alias for utils")
        .default(defaults.utils)
        .interact_text()
        .map_err(prompt_err)?;

    Ok(ProjectConfig {
        style: if style == 1 { Style::NewYork } else { Style::Default },
        tailwind: TailwindConfig {
            base_color: BASE_COLORS[base_color].to_owned(),
            css_variables,
            ..TailwindConfig::default()
        },
        aliases: Aliases::new(components.trim(), utils.trim()),
        ..ProjectConfig::default()
    })
}

fn print_result(result: &InitResult, config: &ProjectConfig, json: bool) -> Result<(), String> {
    if json {
        let payload = serde_json::json!({
            "status": "initialized",
            "config": config,
            "config_path": result.config_path,
            "created_dirs": result.created_dirs,
            "utils_file": result.utils_file,
        });
        println!("{}", json_pretty(&payload)?);
        return Ok(());
    }

    println!("wrote {}", result.config_path.display());
    for dir in &result.created_dirs {
        println!("created {}", dir.display());
    }
    if let Some(utils) = &result.utils_file {
        println!("wrote {}", utils.display());
    }
    println!();
    println!("Next steps:");
    println!("  1. install the base dependencies: npm install clsx tailwind-merge class-variance-authority");
    println!("  2. add components:                dskit add button");
    Ok(())
}

pub fn run(root: &Path, yes: bool, force: bool, json: bool) -> Result<u8, String> {
    let interactive = is_interactive() && !yes;

    if !confirm_overwrite(root, force, interactive)? {
        println!("cancelled");
        return Ok(EXIT_SUCCESS);
    }

    let config = if interactive {
        prompt_config()?
    } else {
        ProjectConfig::default()
    };

    let pb = spinner("writing configuration…");
    // Overwrite was already confirmed above.
    let result = init_project(root, &config, true).map_err(|e| {
        spin_fail(&pb, "initialization failed");
        e.to_string()
    })?;
    spin_ok(&pb, "project initialized");

    print_result(&result, &config, json)?;
    Ok(EXIT_SUCCESS)
}
