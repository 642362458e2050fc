use tracing::{debug, warn};

use crate::api::model::{App, Droplet, Organization, Resource, Space};
use crate::api::{ApiError, DEFAULT_MAX_PAGES, Fetch, fetch_as, list_all};
use crate::catalog::BuildpackCatalog;
use crate::core::{Diagnostic, ReportRow};

pub const ORGANIZATIONS_PATH: &str = "/v2/organizations";

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub max_pages: usize,
    pub quiet: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            quiet: false,
        }
    }
}

pub struct Engine<'a, F: Fetch + ?Sized> {
    source: &'a F,
    opts: EngineOptions,
}

impl<'a, F: Fetch + ?Sized> Engine<'a, F> {
    pub fn new(source: &'a F, opts: EngineOptions) -> Self {
        Self { source, opts }
    }

    /// Builds the catalog, then walks orgs, spaces and apps depth first in
    /// server order. Any listing failure aborts; a missing droplet only marks
    /// its own row.
    pub fn report(&self) -> Result<Vec<ReportRow>, ApiError> {
        let catalog = BuildpackCatalog::build(self.source, self.opts.max_pages)?;
        self.report_with_catalog(&catalog)
    }

    pub fn report_with_catalog(&self, catalog: &BuildpackCatalog) -> Result<Vec<ReportRow>, ApiError> {
        let max_pages = self.opts.max_pages;
        let mut rows = Vec::new();

        list_all(self.source, ORGANIZATIONS_PATH, max_pages, |org: Resource<Organization>| {
            let org = org.entity;
            list_all(self.source, &org.spaces_url, max_pages, |space: Resource<Space>| {
                let space = space.entity;
                list_all(self.source, &space.apps_url, max_pages, |app: Resource<App>| {
                    let droplet = self.current_droplet(&app.metadata.guid);
                    if let Err(err) = &droplet {
                        if !self.opts.quiet {
                            warn!(
                                "droplet for {}/{}/{} unavailable: {err}",
                                org.name, space.name, app.entity.name
                            );
                        }
                    }
                    rows.push(classify(&org.name, &space.name, &app.entity, droplet, catalog));
                    Ok(())
                })
            })
        })?;

        debug!("report has {} row(s)", rows.len());
        Ok(rows)
    }

    fn current_droplet(&self, app_guid: &str) -> Result<Droplet, ApiError> {
        fetch_as(self.source, &format!("/v3/apps/{app_guid}/droplets/current"))
    }
}

/// Turns one application and the outcome of its droplet lookup into a row.
pub fn classify(
    organization: &str,
    space: &str,
    app: &App,
    droplet: Result<Droplet, ApiError>,
    catalog: &BuildpackCatalog,
) -> ReportRow {
    let mut buildpacks: Vec<String> = Vec::new();
    let mut messages: Vec<Diagnostic> = Vec::new();

    match droplet {
        Err(_) => messages.push(Diagnostic::DropletUnavailable),
        Ok(droplet) => {
            if droplet.buildpacks.is_empty() {
                messages.push(Diagnostic::NoBuildpacks);
            }
            for bp in &droplet.buildpacks {
                if !bp.name.is_empty() {
                    buildpacks.push(bp.name.clone());
                }
                let display = if bp.buildpack_name.is_empty() {
                    &bp.name
                } else {
                    &bp.buildpack_name
                };

                if bp.version.is_empty() {
                    if !bp.buildpack_name.is_empty() {
                        buildpacks.push(bp.buildpack_name.clone());
                    }
                    messages.push(Diagnostic::MissingVersion);
                    continue;
                }

                buildpacks.push(format!("{display} v{}", bp.version));
                match catalog.get(&bp.name) {
                    None => messages.push(Diagnostic::NotInCatalog),
                    Some(entry) if !entry.has_version(&bp.version) => {
                        messages.push(Diagnostic::VersionMismatch)
                    }
                    Some(_) => {}
                }
            }
        }
    }

    if buildpacks.is_empty() {
        if let Some(fallback) = app.fallback_buildpack() {
            buildpacks.push(fallback.to_string());
        }
    }

    ReportRow::new(
        organization,
        space,
        &app.name,
        buildpacks,
        app.total_memory(),
        messages,
    )
}
