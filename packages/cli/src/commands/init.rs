use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;
use stencil_engine::{MissingDataPolicy, RenderConfig, DEFAULT_CONFIG_NAME};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Default missing data policy (delete, keep, marker)
    #[arg(short, long, default_value = "delete")]
    pub missing: String,

    /// Also write an example template and data model
    #[arg(long)]
    pub example: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

const EXAMPLE_TEMPLATE: &str = r#"Dear ${Value *value:name},
${If *cond:orders}
your orders:
${For *value:orders @as:o}
- ${Value @value:"o.item"} (${Value @value:"o.qty"})
${EndFor}
${Else}
you have no open orders.
${EndIf}
Kind regards"#;

const EXAMPLE_MODEL: &str = r#"{
  "name": "Ada",
  "orders": [
    { "item": "pen", "qty": 2 },
    { "item": "ink", "qty": 1 }
  ]
}
"#;

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let missing_data = MissingDataPolicy::parse(&args.missing).ok_or_else(|| {
        anyhow::anyhow!("Unknown missing-data policy: {} (use delete, keep or marker)", args.missing)
    })?;
    let config = RenderConfig {
        missing_data,
        ..RenderConfig::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    if args.example {
        write_if_missing(&cwd.join("example.tpl"), EXAMPLE_TEMPLATE)?;
        write_if_missing(&cwd.join("example.json"), EXAMPLE_MODEL)?;
        println!();
        println!("Try: {}", "stencil render example.tpl --model example.json".bright_white());
    }

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if !path.exists() {
        fs::write(path, content)?;
        println!("  {} Created {}", "✓".green(), path.display());
    }
    Ok(())
}
