//! Site command handlers.

use std::fmt::Write as _;

use tabled::Tabled;

use sitehub_core::{DocumentStore, Site, SiteFilter, SiteInput, SitePatch, SiteType};

use crate::cli::{
    GlobalOpts, SiteCreateArgs, SiteListArgs, SiteUpdateArgs, SitesArgs, SitesCommand,
};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Type")]
    site_type: String,
    #[tabled(rename = "Check-in")]
    checkin: String,
    #[tabled(rename = "Benefit")]
    benefit: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<&Site> for SiteRow {
    fn from(s: &Site) -> Self {
        let flag = |on: bool| if on { "✓".to_owned() } else { String::new() };
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            url: s.url.clone(),
            site_type: s.site_type.to_string(),
            checkin: flag(s.is_checkin),
            benefit: flag(s.is_benefit),
            tags: s.tags.join(", "),
        }
    }
}

fn detail(site: &Site, color: bool) -> String {
    let mut out = String::new();
    let mut line = |name: &str, value: &str| {
        let _ = writeln!(out, "{:<13} {value}", output::label(&format!("{name}:"), color));
    };

    line("ID", site.id.as_str());
    line("Name", &site.name);
    line("URL", &site.url);
    line("Type", &site.site_type.to_string());
    if site.site_type == SiteType::NewApi {
        let credentials = if site.has_credentials() { "configured" } else { "missing" };
        line("Credentials", credentials);
    }
    line("Check-in", &output::yes_no(site.is_checkin, color));
    if let Some(link) = site.checkin_link() {
        line("Check-in URL", &link);
    }
    line("Benefit", &output::yes_no(site.is_benefit, color));
    if let Some(link) = site.benefit_link() {
        line("Benefit URL", link);
    }
    if !site.tags.is_empty() {
        line("Tags", &site.tags.join(", "));
    }
    if !site.notes.is_empty() {
        line("Notes", &site.notes);
    }
    for m in &site.maintainers {
        let contact = if m.contact_url.is_empty() {
            m.name.clone()
        } else {
            format!("{} <{}>", m.name, m.contact_url)
        };
        line("Maintainer", &contact);
    }
    line("Created", &site.created_at.to_string());
    line("Updated", &site.updated_at.to_string());

    out.trim_end().to_owned()
}

// ── Arg translation ─────────────────────────────────────────────────

fn filter_from(args: SiteListArgs) -> SiteFilter {
    SiteFilter {
        q: args.query,
        is_checkin: args.checkin,
        is_benefit: args.benefit,
        tag: args.tag,
    }
}

fn input_from(args: SiteCreateArgs) -> SiteInput {
    SiteInput {
        site_type: args.site_type.map(SiteType::from),
        api_key: args.api_key,
        api_user_id: args.api_user_id,
        is_checkin: Some(args.checkin),
        is_benefit: Some(args.benefit),
        checkin_url: args.checkin_url,
        benefit_url: args.benefit_url,
        tags: Some(args.tags),
        notes: args.notes,
        ..SiteInput::new(args.name, args.url)
    }
    .with_maintainers(&util::parse_maintainers(&args.maintainers))
}

fn patch_from(args: SiteUpdateArgs) -> Result<SitePatch, CliError> {
    let clear = args.clear_credentials;
    let tags = if args.clear_tags {
        Some(Vec::new())
    } else {
        Some(args.tags).filter(|t| !t.is_empty())
    };
    let maintainers = if args.clear_maintainers {
        Some(serde_json::Value::Array(Vec::new()))
    } else if args.maintainers.is_empty() {
        None
    } else {
        Some(serde_json::to_value(util::parse_maintainers(&args.maintainers))?)
    };

    Ok(SitePatch {
        name: args.name.map(Some),
        url: args.url.map(Some),
        site_type: args.site_type.map(SiteType::from),
        api_key: if clear { Some(None) } else { args.api_key.map(Some) },
        api_user_id: if clear { Some(None) } else { args.api_user_id.map(Some) },
        is_checkin: args.checkin,
        is_benefit: args.benefit,
        checkin_url: args.checkin_url.map(Some),
        benefit_url: args.benefit_url.map(Some),
        tags,
        notes: args.notes.map(Some),
        maintainers,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    store: &DocumentStore,
    args: SitesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let format = global.output_format();
    let color = output::should_color(&global.color_mode());

    match args.command {
        SitesCommand::List(list) => {
            let sites = store.list_sites(&filter_from(list));
            let out = output::render_list(
                &format,
                &sites,
                |s| SiteRow::from(s),
                |s| s.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Get { id } => {
            let site = store.get_site(&id).ok_or_else(|| CliError::site_not_found(&id))?;
            let out = output::render_single(&format, &site, |s| detail(s, color), |s| {
                s.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Create(create) => {
            let site = store.create_site(input_from(create)).await?;
            let out = output::render_single(&format, &site, |s| detail(s, color), |s| {
                s.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            output::status(&format!("Site created: {}", site.id), global.quiet, color);
            Ok(())
        }

        SitesCommand::Update(update) => {
            let id = update.id.clone();
            let patch = patch_from(update)?;
            if patch.is_empty() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "no fields to change; pass at least one option".into(),
                });
            }
            let site = store
                .update_site(&id, patch)
                .await?
                .ok_or_else(|| CliError::site_not_found(&id))?;
            let out = output::render_single(&format, &site, |s| detail(s, color), |s| {
                s.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            output::status("Site updated", global.quiet, color);
            Ok(())
        }

        SitesCommand::Delete { id } => {
            let Some(site) = store.get_site(&id) else {
                return Err(CliError::site_not_found(&id));
            };
            if !util::confirm(
                &format!("Delete site '{}' ({id})?", site.name),
                global.yes,
                "sites delete",
            )? {
                return Ok(());
            }
            if !store.delete_site(&id).await? {
                return Err(CliError::site_not_found(&id));
            }
            output::status("Site deleted", global.quiet, color);
            Ok(())
        }
    }
}
