//! Action execution against the host page.

use tracing::{debug, info, warn};

use super::surface::PageDriver;
use crate::agent::{Action, ActionKind};

/// Apply `action` to `page`.
///
/// Chained actions run in order; their own `confirmation_required` flags are
/// not consulted, the gate applies to the top-level action only. Unknown and
/// malformed actions are logged and skipped.
pub fn execute_action(action: &Action, page: &mut dyn PageDriver) {
    match &action.kind {
        ActionKind::FillForm { fields } => {
            info!(fields = fields.len(), "Filling form");
            page.fill_form(fields);
        }
        ActionKind::Navigate { route } => {
            info!(%route, "Navigating");
            page.navigate(route);
        }
        ActionKind::Click {
            target,
            target_name,
        } => {
            debug!(%target, name = target_name.as_deref().unwrap_or(""), "Clicking");
            page.click(target, target_name.as_deref());
        }
        ActionKind::EnsureOpen {
            target,
            class_name,
            target_name,
        } => {
            debug!(%target, %class_name, "Ensuring class");
            page.ensure_class(target, class_name, target_name.as_deref());
        }
        ActionKind::Chain { actions } => {
            debug!(steps = actions.len(), "Running action chain");
            for step in actions {
                execute_action(step, page);
            }
        }
        ActionKind::Malformed {
            action_type,
            reason,
        } => {
            warn!(%action_type, %reason, "Skipping malformed action");
        }
        ActionKind::Unknown { action_type } => {
            warn!(%action_type, "Skipping unsupported action type");
        }
    }
}
