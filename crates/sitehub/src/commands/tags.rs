//! Tag listing.

use serde::Serialize;
use tabled::Tabled;

use sitehub_core::DocumentStore;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
#[serde(transparent)]
struct Tag(String);

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "Tag")]
    tag: String,
}

pub fn handle(store: &DocumentStore, global: &GlobalOpts) -> Result<(), CliError> {
    let tags: Vec<Tag> = store.list_tags().into_iter().map(Tag).collect();
    let out = output::render_list(
        &global.output_format(),
        &tags,
        |t| TagRow { tag: t.0.clone() },
        |t| t.0.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
