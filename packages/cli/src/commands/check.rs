use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use stencil_engine::{PlaceholderProvider, Scanner, TreeAdapter};
use stencil_text::TextDocument;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Template file to check
    pub template: PathBuf,
}

/// Block keys and the key closing them
const BLOCKS: &[(&str, &str)] = &[("If", "EndIf"), ("For", "EndFor")];

pub fn check(args: CheckArgs) -> Result<()> {
    let source = fs::read_to_string(&args.template)
        .with_context(|| format!("reading {}", args.template.display()))?;
    let doc = TextDocument::parse(&source);
    let problems = problems(&doc);

    let total = doc.placeholders().len();
    if problems.is_empty() {
        println!("{} {} placeholders OK", "✓".green(), total);
        return Ok(());
    }
    for problem in &problems {
        eprintln!("  {} {}", "✗".red(), problem);
    }
    Err(anyhow!("{} problems in {} placeholders", problems.len(), total))
}

/// Unparsable placeholders and unbalanced blocks, in document order
fn problems(doc: &TextDocument) -> Vec<String> {
    let mut problems = Vec::new();
    let mut open: Vec<(String, String)> = Vec::new();

    for node in Scanner::new(doc.root()).iter(doc) {
        let raw = doc.text(node);
        let data = match doc.parse(node) {
            Ok(data) => data,
            Err(err) => {
                let at = err.offset.map(|o| format!(" at offset {}", o)).unwrap_or_default();
                problems.push(format!("{}: {}{}", raw, err.message, at));
                continue;
            }
        };
        let key = data.key();
        if let Some((_, end)) = BLOCKS.iter().find(|(begin, _)| *begin == key) {
            open.push((end.to_string(), raw));
        } else if BLOCKS.iter().any(|(_, end)| *end == key) {
            match open.pop() {
                Some((expected, _)) if expected == key => {}
                Some((expected, opener)) => {
                    problems.push(format!("{}: expected {} to close {}", raw, expected, opener))
                }
                None => problems.push(format!("{}: nothing to close", raw)),
            }
        }
    }

    for (end, opener) in open {
        problems.push(format!("{}: no matching {}", opener, end));
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_template_has_no_problems() {
        let doc = TextDocument::parse("${For value:[1] as:x}\n${If cond:true}${Value $value:x}${EndIf}\n${EndFor}");
        assert!(problems(&doc).is_empty());
    }

    #[test]
    fn test_reports_syntax_and_nesting() {
        let doc = TextDocument::parse("${Value value:}\n${If cond:true}${EndFor}\n${For value:[]}");
        let found = problems(&doc);
        assert_eq!(found.len(), 3);
        assert!(found[0].contains("offset 14"));
        assert!(found[1].contains("expected EndIf"));
        assert!(found[2].contains("no matching EndFor"));
    }
}
