// Converting every mapped cursor role of a config

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::PathBuf;

use super::converter::convert_file;
use super::cursor_types::ConvertedCursor;
use crate::config::Config;
use crate::model::mapping::RoleSource;

/// Result of converting one role, with the warnings it produced.
#[derive(Debug)]
pub struct RoleOutcome {
    pub role: String,
    pub path: PathBuf,
    pub warnings: Vec<String>,
    pub result: Result<ConvertedCursor>,
}

impl RoleOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

pub fn convert_role(config: &Config, role: &str, source: &RoleSource) -> RoleOutcome {
    let path = config.input_dir.join(&source.path);
    let filter = config.mapping.filter_for(role, &config.size_filter);

    let mut warnings = Vec::new();
    let result = convert_file(&path, filter, |msg| warnings.push(msg));

    RoleOutcome {
        role: role.to_string(),
        path,
        warnings,
        result,
    }
}

/// Convert all roles in parallel; `on_done` runs as each one finishes and
/// decides where the outcome's warnings go.
///
/// Outcomes are returned in role order regardless of completion order.
pub fn convert_roles_with<F>(config: &Config, on_done: F) -> Result<Vec<RoleOutcome>>
where
    F: Fn(&RoleOutcome) + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.thread_count)
        .build()
        .context("Failed to build conversion thread pool")?;

    let roles: Vec<(&String, &RoleSource)> = config.mapping.iter().collect();
    log::info!(
        "Converting {} roles on {} threads",
        roles.len(),
        pool.current_num_threads()
    );

    let outcomes: Vec<RoleOutcome> = pool.install(|| {
        roles
            .par_iter()
            .map(|(role, source)| {
                let outcome = convert_role(config, role, source);
                on_done(&outcome);
                outcome
            })
            .collect()
    });

    Ok(outcomes)
}

/// Like [`convert_roles_with`], sending warnings to `log::warn!`.
pub fn convert_roles(config: &Config) -> Result<Vec<RoleOutcome>> {
    convert_roles_with(config, |outcome| {
        for warning in &outcome.warnings {
            log::warn!("{}: {}", outcome.role, warning);
        }
    })
}
