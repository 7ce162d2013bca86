use assignments::{Mutation, MutationAction, MutationSummary};
use colored::Colorize;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Mutations
// ============================================================================

/// Marker shown in front of a mutation: `+` grant, `~` change, `-` revoke
fn marker(action: &MutationAction) -> &'static str {
    match action {
        MutationAction::Grant { previous: None, .. } => "+",
        MutationAction::Grant { .. } => "~",
        MutationAction::Revoke => "-",
    }
}

/// Print one mutation
pub fn mutation(mutation: &Mutation) {
    let sign = marker(&mutation.action);
    let sign = match mutation.action {
        MutationAction::Grant { previous: None, .. } => sign.green(),
        MutationAction::Grant { .. } => sign.yellow(),
        MutationAction::Revoke => sign.red(),
    };
    println!("  {sign} {mutation}");
}

/// One-line description of a summary, e.g. "2 to grant, 1 to change, 0 to revoke"
pub fn format_summary(summary: &MutationSummary, dry_run: bool) -> String {
    if dry_run {
        format!(
            "{} to grant, {} to change, {} to revoke",
            summary.grants, summary.changes, summary.revokes
        )
    } else {
        format!(
            "{} granted, {} changed, {} revoked",
            summary.grants, summary.changes, summary.revokes
        )
    }
}
