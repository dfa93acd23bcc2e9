//! `help`: list commands or describe one.

use crate::commands::{
    ArgumentInfo, ArgumentValues, Command, CommandContext, CommandHandler, CommandInfo,
    CommandSource, guard,
};
use crate::error::CommandResult;
use crate::types::disambiguation;
use async_trait::async_trait;
use std::sync::Arc;

/// Above this many matches the reply asks for a narrower search.
const MAX_MATCHES: usize = 15;

pub fn info() -> CommandInfo {
    CommandInfo::new(
        "help",
        "util",
        "Displays a list of available commands, or detailed information for a specified command.",
    )
    .aliases(["commands"])
    .details("The command may be part of a command name or a whole command name. If it isn't specified, all available commands will be listed.")
    .example("help")
    .example("help prefix")
    .arg(
        ArgumentInfo::new("command", "string", "Which command would you like to view the help for?")
            .default_value(""),
    )
    .format("[command/all]")
    .guarded()
}

pub fn source() -> CommandSource {
    CommandSource::new(info(), Help)
}

pub struct Help;

fn describe(ctx: &CommandContext, command: &Command) -> String {
    let mut title = format!("__Command **{}**:__ {}", command.name, command.description);
    if command.guild_only {
        title.push_str(" (Usable only in servers)");
    }
    if command.nsfw {
        title.push_str(" (NSFW)");
    }

    let format = match &command.format {
        Some(f) => format!("{} {}", command.name, f),
        None => command.name.clone(),
    };
    let mut help = format!("{}\n\n**Format:** {}", title, ctx.any_usage(&format));
    if !command.aliases.is_empty() {
        help.push_str(&format!("\n**Aliases:** {}", command.aliases.join(", ")));
    }
    let group_name = command.group().map_or(command.group_id.as_str(), |g| g.name.as_str());
    help.push_str(&format!(
        "\n**Group:** {} (`{}:{}`)",
        group_name, command.group_id, command.member_name
    ));
    if let Some(details) = &command.details {
        help.push_str(&format!("\n**Details:** {}", details));
    }
    if !command.examples.is_empty() {
        help.push_str(&format!("\n**Examples:**\n{}", command.examples.join("\n")));
    }
    help
}

async fn listing(ctx: &CommandContext, show_all: bool) -> String {
    let framework = ctx.framework();
    let prefix = framework.prefix_for(ctx.guild_id());
    let bot = framework.client().current_user();
    let place = ctx.guild().map_or("any server".to_string(), |g| g.name.clone());

    let mut text = format!(
        "To run a command in {}, use {}. For example, {}.\nTo run a command in this DM, simply use {} with no prefix.\n\nUse {} to view detailed information about a specific command.\nUse {} to view a list of *all* commands, not just available ones.\n\n",
        place,
        guard::usage("command", prefix.as_deref(), Some(bot)),
        guard::usage("prefix", prefix.as_deref(), Some(bot)),
        guard::usage("command", None, None),
        guard::usage("help <command>", None, None),
        guard::usage("help all", None, None),
    );
    let heading = if show_all {
        "All commands".to_string()
    } else {
        format!(
            "Available commands in {}",
            ctx.guild().map_or("this DM", |g| g.name.as_str())
        )
    };
    text.push_str(&format!("__**{}**__\n", heading));

    let mut sections = Vec::new();
    for group in framework.registry().groups() {
        let mut lines = Vec::new();
        for command in group.commands() {
            if command.hidden || !(show_all || command.is_usable(ctx).await) {
                continue;
            }
            let nsfw = if command.nsfw { " (NSFW)" } else { "" };
            lines.push(format!("**{}:** {}{}", command.name, command.description, nsfw));
        }
        if !lines.is_empty() {
            sections.push(format!("\n__{}__\n{}", group.name, lines.join("\n")));
        }
    }
    text.push_str(&sections.join("\n"));
    text
}

#[async_trait]
impl CommandHandler for Help {
    async fn run(&self, ctx: &CommandContext, args: ArgumentValues) -> CommandResult {
        let search = args.str("command").unwrap_or("").trim();
        let show_all = search.eq_ignore_ascii_case("all");

        if search.is_empty() || show_all {
            ctx.say(&listing(ctx, show_all).await).await?;
            return Ok(());
        }

        let mut usable: Vec<Arc<Command>> = Vec::new();
        for command in ctx.framework().registry().find_commands(search, false) {
            if command.is_usable(ctx).await {
                usable.push(command);
            }
        }
        match usable.as_slice() {
            [one] => ctx.say(&describe(ctx, one)).await?,
            many if many.len() > MAX_MATCHES => {
                ctx.reply("Multiple commands found. Please be more specific.")
                    .await?
            }
            [] => {
                ctx.reply(&format!(
                    "Unable to identify command. Use {} to view the list of all commands.",
                    ctx.usage(None)
                ))
                .await?
            }
            many => {
                let names: Vec<String> = many.iter().map(|c| c.name.clone()).collect();
                ctx.reply(&disambiguation(&names, "commands")).await?
            }
        }
        Ok(())
    }
}
