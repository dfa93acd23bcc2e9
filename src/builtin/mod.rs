//! Built-in commands installed by `register_defaults`.
//!
//! Groups: `commands` (guarded; command state management) and `util`.

pub mod disable;
pub mod enable;
pub mod groups;
pub mod help;
pub mod ping;
pub mod prefix;
pub mod unknown_command;

use crate::commands::{ArgumentInfo, CommandContext, GroupInfo, PermissionCheck};
use crate::types::ArgValue;
use commando_model::Permission;
use tracing::debug;

/// The built-in groups.
pub fn groups() -> [GroupInfo; 2] {
    [
        GroupInfo::new("commands", "Commands").guarded(),
        GroupInfo::new("util", "Utility"),
    ]
}

/// Whether the author is an administrator of the current guild.
pub(crate) async fn is_admin(ctx: &CommandContext) -> bool {
    let Some(guild) = ctx.guild() else {
        return false;
    };
    match ctx
        .framework()
        .client()
        .permissions_in(guild, ctx.channel(), ctx.author().id)
        .await
    {
        Ok(perms) => perms.contains(Permission::Administrator),
        Err(e) => {
            debug!(error = %e, "permission lookup failed");
            false
        }
    }
}

/// Administrators in guilds, owners everywhere.
pub(crate) async fn admin_or_owner(ctx: &CommandContext) -> PermissionCheck {
    if ctx.framework().is_owner(ctx.author().id) {
        return PermissionCheck::Granted;
    }
    if ctx.guild().is_none() {
        return PermissionCheck::OwnerOnly;
    }
    if is_admin(ctx).await {
        PermissionCheck::Granted
    } else {
        PermissionCheck::Missing(vec![Permission::Administrator])
    }
}

/// The `command/group` argument shared by `enable` and `disable`.
pub(crate) fn command_or_group_arg(verb: &str) -> ArgumentInfo {
    ArgumentInfo::new(
        "target",
        "group|command",
        format!("Which command or group would you like to {}?", verb),
    )
    .label("command/group")
}

/// Display name and noun of a command-or-group value.
pub(crate) fn describe(value: &ArgValue) -> Option<(String, &'static str)> {
    match value {
        ArgValue::Command(c) => Some((c.name.clone(), "command")),
        ArgValue::Group(g) => Some((g.name.clone(), "group")),
        _ => None,
    }
}
