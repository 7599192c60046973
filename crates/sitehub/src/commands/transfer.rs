//! Bulk import and export of the site document.

use std::fmt::Write as _;

use sitehub_core::{DocumentStore, ImportMode, ImportReport};

use crate::cli::{ExportArgs, GlobalOpts, ImportArgs};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

use super::util;

fn report_detail(report: &ImportReport, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", output::label("Mode:", color), report.mode);
    let _ = writeln!(out, "{} {}", output::label("Imported:", color), report.imported_sites);
    let _ = writeln!(out, "{} {}", output::label("Created:", color), report.created_sites);
    let _ = write!(out, "{} {}", output::label("Updated:", color), report.updated_sites);
    if report.replaced {
        let _ = write!(out, "\n{}", output::label("Previous sites replaced", color));
    }
    out
}

pub async fn import(
    store: &DocumentStore,
    args: ImportArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mode = ImportMode::from(args.mode);
    let payload = util::read_json_input(&args.file)?;

    if mode == ImportMode::Replace {
        let existing = store.snapshot().sites.len();
        let prompt = format!(
            "Replace all {existing} existing sites with the contents of {}?",
            args.file
        );
        if !util::confirm(&prompt, global.yes, "import --mode replace")? {
            return Ok(());
        }
    }

    let report = store.import_data(&payload, mode).await?;
    let color = output::should_color(&global.color_mode());
    let out = output::render_single(
        &global.output_format(),
        &report,
        |r| report_detail(r, color),
        |r| r.imported_sites.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn export(
    store: &DocumentStore,
    args: &ExportArgs,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(), CliError> {
    let mut doc = store.export_data();
    if !(args.include_credentials || cfg.export.include_credentials) {
        doc.redact_credentials();
    }

    let json = output::render_json_pretty(&doc)?;
    if let Some(ref path) = args.file {
        std::fs::write(path, format!("{json}\n"))?;
        let color = output::should_color(&global.color_mode());
        output::status(
            &format!("Exported {} sites to {}", doc.sites.len(), path.display()),
            global.quiet,
            color,
        );
        return Ok(());
    }

    // The table view of a whole document is its JSON.
    let out = output::render_single(&global.output_format(), &doc, |_| json.clone(), |d| {
        d.sites
            .iter()
            .map(|s| s.id.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
