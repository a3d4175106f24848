//! `cft init` command - initialize a new CFT project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::core::project::{Project, ProjectError};
use crate::schema::template::TemplateGenerator;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Also initialize a git repository
    #[arg(long)]
    pub git: bool,

    /// Force initialization even if .cft/ already exists
    #[arg(long)]
    pub force: bool,

    /// Skip the starter catalog and form files
    #[arg(long)]
    pub bare: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("+").green(),
            style(path.display()).cyan()
        );
    }

    if args.git {
        init_git(&path)?;
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            if !args.bare {
                write_starter_files(&project)?;
            }

            println!(
                "{} Initialized CFT project at {}",
                style("+").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Created project structure:");
            print_structure(project.root());
            println!();
            println!("Next steps:");
            println!(
                "  {} List the starter catalog",
                style("cft catalog list").yellow()
            );
            println!(
                "  {} Run a submission interactively",
                style("cft submit address --interactive").yellow()
            );
            println!(
                "  {} Validate project files",
                style("cft validate").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} CFT project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("cft init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn write_starter_files(project: &Project) -> Result<()> {
    let generator = TemplateGenerator::new().map_err(|e| miette::miette!("{}", e))?;

    let project_name = project
        .root()
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "project".to_string());
    let context = TemplateGenerator::starter_context(&project_name);

    let files = [
        ("countries.yaml.tera", project.countries_file()),
        ("regions-us.yaml.tera", project.regions_dir().join("US.yaml")),
        ("regions-de.yaml.tera", project.regions_dir().join("DE.yaml")),
        ("form-address.yaml.tera", project.form_file("address")),
    ];

    for (template, dest) in files {
        if dest.exists() {
            continue;
        }
        let rendered = generator
            .render(template, &context)
            .map_err(|e| miette::miette!("{}", e))?;
        std::fs::write(&dest, rendered).into_diagnostic()?;
    }

    Ok(())
}

fn init_git(path: &Path) -> Result<()> {
    let git_dir = path.join(".git");
    if git_dir.exists() {
        println!("{} Git repository already exists", style("+").green());
        return Ok(());
    }

    let output = std::process::Command::new("git")
        .arg("init")
        .current_dir(path)
        .output()
        .into_diagnostic()?;

    if output.status.success() {
        println!("{} Initialized git repository", style("+").green());

        let gitignore_path = path.join(".gitignore");
        if !gitignore_path.exists() {
            std::fs::write(&gitignore_path, "# Editor backups\n*.swp\n*~\n")
                .into_diagnostic()?;
        }
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(miette::miette!("Failed to initialize git: {}", stderr))
    }
}

fn print_structure(root: &Path) {
    let entries = [
        ".cft/",
        ".cft/config.yaml",
        "catalog/countries.yaml",
        "catalog/regions/",
        "forms/",
    ];

    for entry in entries {
        if root.join(entry).exists() {
            println!("  {}", style(entry).dim());
        }
    }
}
