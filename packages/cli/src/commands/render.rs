use crate::config::{self, Overrides};
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use stencil_engine::{Engine, RenderConfig, RenderReport};
use stencil_model::DataNode;
use stencil_text::TextDocument;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Template file, or a directory of templates
    pub template: PathBuf,

    /// JSON file holding the data model
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Directory holding stencil.config.json (defaults to current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output file, or output directory when rendering a directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Missing data policy (delete, keep, marker)
    #[arg(long)]
    pub missing: Option<String>,

    /// Fail on placeholders no command handles
    #[arg(long)]
    pub strict: bool,

    /// Template extension when rendering a directory
    #[arg(long, default_value = "tpl")]
    pub extension: String,
}

pub fn render(args: RenderArgs, cwd: &Path) -> Result<()> {
    let overrides = Overrides {
        missing_data: args.missing.clone(),
        strict: args.strict,
    };
    let config = config::load(cwd, args.config.as_deref(), &overrides)?;
    let model = load_model(args.model.as_deref())?;
    let template = cwd.join(&args.template);

    if template.is_file() {
        let (output, report) = render_file(&template, &config, &model)?;
        debug!(?report, "rendered");
        match &args.output {
            Some(out) => write_output(&cwd.join(out), &output)?,
            None => println!("{}", output),
        }
        return Ok(());
    }

    if !template.is_dir() {
        return Err(anyhow!("Template does not exist: {}", template.display()));
    }

    let out_dir = args
        .output
        .as_ref()
        .map(|out| cwd.join(out))
        .ok_or_else(|| anyhow!("Rendering a directory needs --output <dir>"))?;
    let files = find_templates(&template, &args.extension);
    if files.is_empty() {
        println!("{}", format!("No .{} templates found", args.extension).yellow());
        return Ok(());
    }

    println!("{}", "Rendering templates...".bright_blue().bold());
    let mut failures = 0;
    for file in &files {
        let relative = file.strip_prefix(&template).unwrap_or(file);
        match render_file(file, &config, &model) {
            Ok((output, report)) => {
                let target = out_dir.join(relative).with_extension("txt");
                write_output(&target, &output)?;
                println!(
                    "  {} {} → {} ({} commands)",
                    "✓".green(),
                    relative.display(),
                    target.display(),
                    report.commands
                );
            }
            Err(err) => {
                failures += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative.display(),
                    format!("{:#}", err).red()
                );
            }
        }
    }

    println!();
    if failures == 0 {
        println!("{} Rendered {} templates", "✓".green(), files.len());
        Ok(())
    } else {
        Err(anyhow!("{} of {} templates failed", failures, files.len()))
    }
}

pub fn render_file(path: &Path, config: &RenderConfig, model: &DataNode) -> Result<(String, RenderReport)> {
    let source = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut doc = TextDocument::parse(&source);
    let mut engine = Engine::with_core_commands(config.clone());
    let report = engine
        .render(&mut doc, model.clone())
        .with_context(|| format!("rendering {}", path.display()))?;
    Ok((doc.render(), report))
}

fn load_model(path: Option<&Path>) -> Result<DataNode> {
    let Some(path) = path else {
        return Ok(DataNode::new_map());
    };
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let json: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    Ok(DataNode::from_json(&json))
}

fn find_templates(dir: &Path, extension: &str) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension))
        .collect()
}

fn write_output(path: &Path, output: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, output).with_context(|| format!("writing {}", path.display()))
}
