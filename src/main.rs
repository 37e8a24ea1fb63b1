use anyhow::{Context, Result};
use clap::Parser;
use class_deps::archive::{AnalysisReport, analyze_archive};
use class_deps::cli::{Cli, Commands, ModelPart, OutputFormat};
use class_deps::config::{clear_db, resolve_db_path, resolve_namespace};
use class_deps::logging::init_logging;
use class_deps::model::{ClassKind, DependencyModel};
use class_deps::store::ProjectStore;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command.clone() {
        Commands::Clear => {
            let db_path = resolve_db_path(&cli)?;
            clear_db(&db_path)?;
            info!("cleared store at {}", db_path.display());
        }
        Commands::Stats => {
            let store = ProjectStore::open(resolve_db_path(&cli)?)?;
            println!("{}", serde_json::to_string_pretty(&store.stats()?)?);
        }
        Commands::List => {
            let store = ProjectStore::open(resolve_db_path(&cli)?)?;
            println!("{}", serde_json::to_string_pretty(&store.projects()?)?);
        }
        Commands::Show { project_id, part } => {
            let store = ProjectStore::open(resolve_db_path(&cli)?)?;
            let Some(model) = store.model(&project_id)? else {
                anyhow::bail!("Unknown project: {project_id}");
            };
            println!("{}", render_part(&model, part)?);
        }
        Commands::Analyze {
            archive,
            namespace,
            save,
            format,
            output,
        } => {
            let namespace = resolve_namespace(namespace.as_deref())?;
            let start = Instant::now();
            let report = analyze_archive(&archive, &namespace)?;
            debug!(
                "analyzed {} in {} ms",
                archive.display(),
                start.elapsed().as_millis()
            );

            if save {
                let store = ProjectStore::open(resolve_db_path(&cli)?)?;
                let summary = store.save(&report)?;
                eprintln!(
                    "[class-deps] saved project {} ({} classes)",
                    summary.project_id, summary.class_count
                );
            }

            write_report(&report, format, output.as_deref())?;
        }
    }

    Ok(())
}

fn render_part(model: &DependencyModel, part: ModelPart) -> Result<String> {
    let rendered = match part {
        ModelPart::All => serde_json::to_string_pretty(model)?,
        ModelPart::Internal => serde_json::to_string_pretty(&model.classes)?,
        ModelPart::External => serde_json::to_string_pretty(&model.external_dependencies)?,
        ModelPart::Classes => serde_json::to_string_pretty(&model.class_names)?,
    };
    Ok(rendered)
}

fn kind_label(kind: ClassKind) -> &'static str {
    match kind {
        ClassKind::Normal => "normal",
        ClassKind::Abstract => "abstract",
        ClassKind::Interface => "interface",
    }
}

fn render_text(report: &AnalysisReport) -> String {
    let model = &report.model;
    let mut out = String::new();
    out.push_str(&format!("archive: {}\n", report.archive));
    out.push_str(&format!("namespace: {}\n", report.namespace));
    out.push_str(&format!("project_id: {}\n", report.project_id));
    out.push_str(&format!("classes: {}\n", model.class_names.len()));

    for class in &model.classes {
        out.push_str(&format!("- {} [{}]", class.name, kind_label(class.kind)));
        if !class.superclass.is_empty() {
            out.push_str(&format!(" extends {}", class.superclass));
        }
        if let Some(routes) = class.role.routes() {
            out.push_str(&format!(
                " routes {} {:?}",
                routes.base_path, routes.endpoints
            ));
        }
        if !class.nested_classes.is_empty() {
            out.push_str(&format!(" nested {:?}", class.nested_classes));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "external_dependencies: {}\n",
        model.external_dependencies.len()
    ));
    for dep in &model.external_dependencies {
        out.push_str(&format!(
            "- {}:{}:{}",
            dep.group_id, dep.artifact_id, dep.version
        ));
        if !dep.scope.is_empty() {
            out.push_str(&format!(" ({})", dep.scope));
        }
        out.push('\n');
    }

    if !report.skipped.is_empty() {
        out.push_str(&format!("skipped: {}\n", report.skipped.len()));
        for s in &report.skipped {
            out.push_str(&format!("- {}: {}\n", s.entry, s.reason));
        }
    }
    out
}

fn write_report(report: &AnalysisReport, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Text => render_text(report),
    };

    if let Some(path) = output {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write output: {}", path.display()))?;
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}
