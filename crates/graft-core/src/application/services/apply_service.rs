//! Apply Service - the module application orchestrator.
//!
//! One module is applied to one project in six fixed phases:
//! 1. Run pre-action hooks
//! 2. Place files
//! 3. Apply mandatory replacements
//! 4. Apply optional replacements
//! 5. Merge structured artifacts (dependencies, properties, manifest)
//! 6. Run post-action hooks
//!
//! Each phase completes before the next starts. A failure aborts the
//! remaining phases but never reverts the committed ones: the error names the
//! module and the phase so the caller can decide what to do with the project.

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{ArtifactRepository, Filesystem, ModuleEvents, TemplateStore, VersionCatalog},
        services::report::{ApplyReport, ModuleApplied, ModuleToApply, PhaseReport},
    },
    domain::{
        Module, ModuleHook, PlacementKind, Project, PropertyTarget, ReplacementSet,
        ResolvedDependency, VersionRef,
    },
    error::{ApplyPhase, GraftResult},
};

/// Applies modules to projects through injected ports.
///
/// The applier holds no per-project state; callers must not run two
/// applications against the same project root at once.
pub struct ModuleApplier {
    filesystem: Box<dyn Filesystem>,
    templates: Box<dyn TemplateStore>,
    catalog: Box<dyn VersionCatalog>,
    artifacts: Box<dyn ArtifactRepository>,
    events: Option<Box<dyn ModuleEvents>>,
}

impl ModuleApplier {
    /// Create an applier with the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use graft_core::application::ModuleApplier;
    ///
    /// let applier = ModuleApplier::new(
    ///     filesystem, // impl Filesystem
    ///     templates,  // impl TemplateStore
    ///     catalog,    // impl VersionCatalog
    ///     artifacts,  // impl ArtifactRepository
    /// );
    /// ```
    pub fn new(
        filesystem: Box<dyn Filesystem>,
        templates: Box<dyn TemplateStore>,
        catalog: Box<dyn VersionCatalog>,
        artifacts: Box<dyn ArtifactRepository>,
    ) -> Self {
        Self {
            filesystem,
            templates,
            catalog,
            artifacts,
            events: None,
        }
    }

    /// Notify `events` after every successful application.
    pub fn with_events(mut self, events: Box<dyn ModuleEvents>) -> Self {
        self.events = Some(events);
        self
    }

    /// Apply one module.
    ///
    /// # Errors
    ///
    /// - `ApplicationError::ProjectMismatch` before any phase runs
    /// - `GraftError::ModuleApplication` wrapping the unchanged cause of a
    ///   phase failure
    /// - `ApplicationError::EventDispatch` when all phases succeeded but the
    ///   event could not be recorded
    #[instrument(
        skip_all,
        fields(
            module = %request.slug,
            project = %request.project.root().display()
        )
    )]
    pub fn apply(&self, request: &ModuleToApply) -> GraftResult<ApplyReport> {
        let ModuleToApply {
            slug,
            project,
            module,
        } = request;

        if module.project_folder() != project.root() {
            return Err(ApplicationError::ProjectMismatch {
                module_folder: module.project_folder().to_path_buf(),
                project_root: project.root().to_path_buf(),
            }
            .into());
        }

        info!("Applying module");
        let mut report = ApplyReport::new(slug, project);

        for phase in ApplyPhase::ALL {
            debug!(%phase, "Phase started");
            self.run_phase(phase, module, project, &mut report)
                .map_err(|e| {
                    warn!(%phase, error = %e, "Phase failed, remaining phases skipped");
                    e.during(slug.as_str(), phase)
                })?;
            report.completed.push(phase);
            debug!(%phase, "Phase completed");
        }

        if let Some(events) = &self.events {
            events
                .dispatch(&ModuleApplied::new(slug.clone(), project))
                .map_err(|e| ApplicationError::EventDispatch {
                    reason: e.to_string(),
                })?;
        }

        info!(
            files = report.files_written().len(),
            dependencies = report.dependencies_merged,
            properties = report.properties_merged,
            manifest_entries = report.manifest_entries_merged,
            "Module applied"
        );
        Ok(report)
    }

    /// Apply modules strictly in order, stopping at the first failure.
    pub fn apply_all(&self, requests: &[ModuleToApply]) -> GraftResult<Vec<ApplyReport>> {
        requests.iter().map(|request| self.apply(request)).collect()
    }

    // -------------------------------------------------------------------------
    // Phases
    // -------------------------------------------------------------------------

    fn run_phase(
        &self,
        phase: ApplyPhase,
        module: &Module,
        project: &Project,
        report: &mut ApplyReport,
    ) -> GraftResult<()> {
        match phase {
            ApplyPhase::PreActions => {
                run_hooks(module.pre_actions(), project, &mut report.pre_actions)
            }
            ApplyPhase::FilePlacement => self.place_files(module, project, &mut report.placements),
            ApplyPhase::MandatoryReplacements => self.apply_replacements(
                module.mandatory_replacements(),
                project,
                &mut report.mandatory_replacements,
            ),
            ApplyPhase::OptionalReplacements => self.apply_replacements(
                module.optional_replacements(),
                project,
                &mut report.optional_replacements,
            ),
            ApplyPhase::ArtifactMerge => self.merge_artifacts(module, project, report),
            ApplyPhase::PostActions => {
                run_hooks(module.post_actions(), project, &mut report.post_actions)
            }
        }
    }

    fn place_files(
        &self,
        module: &Module,
        project: &Project,
        report: &mut PhaseReport,
    ) -> GraftResult<()> {
        for placement in module.placements() {
            let raw = self.templates.fetch(placement.source())?;
            let content = match placement.kind() {
                PlacementKind::Template => module.context().render(&raw),
                PlacementKind::Verbatim => raw,
            };

            let path = placement.destination().under(project.root());
            if let Some(parent) = path.parent() {
                self.filesystem.create_dir_all(parent)?;
            }
            self.filesystem.write_file(&path, &content)?;

            if placement.permissions().executable_flag() {
                self.filesystem.set_permissions(&path, true)?;
            }

            debug!(
                source = %placement.source(),
                destination = %placement.destination(),
                "File placed"
            );
            report.files.push(placement.destination().to_string());
        }
        Ok(())
    }

    /// Read each target file once, apply its entries in order, write once.
    fn apply_replacements(
        &self,
        set: &ReplacementSet,
        project: &Project,
        report: &mut PhaseReport,
    ) -> GraftResult<()> {
        for group in set.by_file() {
            let path = group.file().under(project.root());

            let Some(original) = self.filesystem.read_file(&path)? else {
                if group.kind().is_mandatory() {
                    return Err(ApplicationError::MissingProjectFile { path }.into());
                }
                debug!(file = %group.file(), "Optional replacements skipped, file absent");
                report.skipped.extend(
                    group
                        .entries()
                        .map(|e| format!("{}: {}", group.file(), e.matcher().describe())),
                );
                continue;
            };

            let outcome = group.apply(&original)?;
            report.applied += outcome.applied;
            for skipped in &outcome.skipped {
                debug!(file = %group.file(), matcher = %skipped, "Anchor absent, entry skipped");
                report.skipped.push(format!("{}: {}", group.file(), skipped));
            }

            if outcome.changed_from(&original) {
                self.filesystem.write_file(&path, &outcome.content)?;
                debug!(file = %group.file(), entries = group.len(), "File rewritten");
                report.files.push(group.file().to_string());
            }
        }
        Ok(())
    }

    fn merge_artifacts(
        &self,
        module: &Module,
        project: &Project,
        report: &mut ApplyReport,
    ) -> GraftResult<()> {
        if !module.dependencies().is_empty() {
            // Resolve everything before touching the artifact.
            let resolved = self.resolve_dependencies(module)?;
            let mut dependencies = self.artifacts.load_dependencies(project)?;
            report.dependencies_merged = dependencies.merge(resolved);
            self.artifacts.save_dependencies(project, &dependencies)?;
            debug!(count = report.dependencies_merged, "Dependencies merged");
        }

        for target in [PropertyTarget::Main, PropertyTarget::Test] {
            for (profile, block) in module.properties(target).non_empty_profiles() {
                let mut existing = self.artifacts.load_properties(project, target, profile)?;
                report.properties_merged += existing.merge(block);
                self.artifacts
                    .save_properties(project, target, profile, &existing)?;
                debug!(%target, %profile, count = block.len(), "Properties merged");
            }
        }

        if !module.manifest().is_empty() {
            let mut manifest = self.artifacts.load_manifest(project)?;
            report.manifest_entries_merged = manifest.merge(module.manifest());
            self.artifacts.save_manifest(project, &manifest)?;
            debug!(count = report.manifest_entries_merged, "Manifest merged");
        }

        Ok(())
    }

    fn resolve_dependencies(&self, module: &Module) -> GraftResult<Vec<ResolvedDependency>> {
        module
            .dependencies()
            .iter()
            .map(|record| {
                let version = match record.version_ref() {
                    Some(VersionRef::Slug(slug)) => {
                        Some(self.catalog.resolve(record.group(), record.artifact(), slug)?)
                    }
                    _ => None,
                };
                Ok(record.resolved(version))
            })
            .collect()
    }
}

/// Run hooks in order; a failing hook's error is returned unchanged.
fn run_hooks(hooks: &[ModuleHook], project: &Project, report: &mut PhaseReport) -> GraftResult<()> {
    for hook in hooks {
        debug!(hook = hook.name(), "Running hook");
        hook.execute(project)?;
        report.hooks.push(hook.name().to_string());
    }
    Ok(())
}
