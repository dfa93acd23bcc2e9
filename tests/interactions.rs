//! Integration tests for structured interactions.

mod common;

use async_trait::async_trait;
use commando::commands::{Argument, CommandSource};
use commando::model::{
    Interaction, InteractionId, InteractionKind, InteractionOption, OptionValue, RoleId, UserId,
};
use commando::registry::TypeSource;
use commando::{
    ArgValue, ArgumentInfo, ArgumentType, ArgumentValues, CommandContext, CommandHandler,
    CommandInfo, CommandResult, DispatchOutcome, FrameworkEvent, ResponseTarget, Validation,
};
use common::{MEMBER, TestBot};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Greet;

#[async_trait]
impl CommandHandler for Greet {
    async fn run(&self, ctx: &CommandContext, args: ArgumentValues) -> CommandResult {
        let times = args.integer("times").unwrap_or(1);
        let who = args.get("who").and_then(|v| v.as_user()).map(|u| u.username.clone());
        ctx.reply(&format!("hello {} x{}", who.unwrap_or_default(), times))
            .await?;
        Ok(())
    }
}

fn with_greet(bot: TestBot) -> TestBot {
    bot.framework
        .registry()
        .register_command(CommandSource::new(
            CommandInfo::new("greet", "util", "Greet someone.")
                .arg(ArgumentInfo::new("who", "user", "Who?"))
                .arg(
                    ArgumentInfo::new("times", "integer", "How often?")
                        .min(1.0)
                        .max(3.0)
                        .default_value(1i64),
                ),
            Greet,
        ))
        .unwrap();
    bot
}

fn interaction(bot: &TestBot, id: u64, name: &str, options: Vec<InteractionOption>) -> Interaction {
    Interaction {
        id: InteractionId(id),
        kind: InteractionKind::Command,
        command_name: name.to_string(),
        options,
        user: TestBot::user(MEMBER),
        channel: bot.text_channel(),
        guild: Some(bot.guild.clone()),
    }
}

fn option(name: &str, value: OptionValue) -> InteractionOption {
    InteractionOption {
        name: name.to_string(),
        value,
    }
}

#[tokio::test]
async fn test_typed_options_become_arguments() {
    let bot = with_greet(TestBot::new());
    let greet = interaction(
        &bot,
        77,
        "greet",
        vec![
            option("who", OptionValue::User(UserId(2))),
            option("times", OptionValue::Integer(2)),
        ],
    );

    assert_eq!(bot.framework.handle_interaction(greet).await, DispatchOutcome::Completed);
    let sent = bot.client.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, ResponseTarget::Interaction(InteractionId(77)));
    // Interaction responses are not prefixed with a mention.
    assert_eq!(sent[0].1, "hello admin x2");
}

#[tokio::test]
async fn test_missing_options_fall_back_to_defaults() {
    let bot = with_greet(TestBot::new());
    let greet = interaction(&bot, 78, "GREET", vec![option("who", OptionValue::User(UserId(2)))]);
    assert_eq!(bot.framework.handle_interaction(greet).await, DispatchOutcome::Completed);
    assert_eq!(bot.client.last().unwrap(), "hello admin x1");
}

#[tokio::test]
async fn test_invalid_options_never_prompt() {
    let bot = with_greet(TestBot::new());

    let out_of_range = interaction(
        &bot,
        79,
        "greet",
        vec![
            option("who", OptionValue::User(UserId(2))),
            option("times", OptionValue::Integer(9)),
        ],
    );
    assert_eq!(
        bot.framework.handle_interaction(out_of_range).await,
        DispatchOutcome::InvalidArguments
    );
    assert!(bot.client.last().unwrap().starts_with("Invalid command usage."));

    let missing = interaction(&bot, 80, "greet", Vec::new());
    assert_eq!(
        bot.framework.handle_interaction(missing).await,
        DispatchOutcome::InvalidArguments
    );
    assert!(!bot.framework.awaiting().is_awaiting(MEMBER, bot.text_channel().id));
}

#[tokio::test]
async fn test_unknown_and_non_command_interactions() {
    let bot = with_greet(TestBot::new());
    let mut events = bot.framework.events().subscribe();

    let unknown = interaction(&bot, 81, "frobnicate", Vec::new());
    assert_eq!(bot.framework.handle_interaction(unknown).await, DispatchOutcome::Unknown);
    assert!(matches!(
        events.try_recv(),
        Ok(FrameworkEvent::UnknownCommand { ref content, .. }) if content == "frobnicate"
    ));

    let mut click = interaction(&bot, 82, "greet", Vec::new());
    click.kind = InteractionKind::Component;
    assert_eq!(bot.framework.handle_interaction(click).await, DispatchOutcome::Ignored);
    assert!(bot.client.texts().is_empty());
}

/// Replies with whatever `target` resolved to.
struct Describe;

#[async_trait]
impl CommandHandler for Describe {
    async fn run(&self, ctx: &CommandContext, args: ArgumentValues) -> CommandResult {
        let text = match args.get("target") {
            Some(ArgValue::Role(role)) => format!("role {}", role.name),
            Some(ArgValue::String(s)) => format!("text {}", s),
            other => format!("{:?}", other),
        };
        ctx.reply(&text).await?;
        Ok(())
    }
}

fn with_describe(bot: &TestBot, kind: &str) {
    bot.framework
        .registry()
        .register_command(CommandSource::new(
            CommandInfo::new("describe", "util", "Describe a target.")
                .arg(ArgumentInfo::new("target", kind, "Which?")),
            Describe,
        ))
        .unwrap();
}

#[tokio::test]
async fn test_role_options_resolve_from_the_guild_cache() {
    let bot = TestBot::new();
    with_describe(&bot, "role");

    let admin = interaction(&bot, 83, "describe", vec![option("target", OptionValue::Role(RoleId(501)))]);
    assert_eq!(bot.framework.handle_interaction(admin).await, DispatchOutcome::Completed);
    assert_eq!(bot.client.last().unwrap(), "role Admin");

    let gone = interaction(&bot, 84, "describe", vec![option("target", OptionValue::Role(RoleId(999)))]);
    assert_eq!(
        bot.framework.handle_interaction(gone).await,
        DispatchOutcome::InvalidArguments
    );
}

/// Ticket numbers. Counts how often the text validator runs.
struct TicketType {
    validations: Arc<AtomicUsize>,
}

#[async_trait]
impl ArgumentType for TicketType {
    fn id(&self) -> &str {
        "ticket"
    }

    async fn validate(&self, value: &str, _ctx: &CommandContext, _arg: &Argument) -> Validation {
        self.validations.fetch_add(1, Ordering::SeqCst);
        Validation::from(value.trim_start_matches('#').parse::<u32>().is_ok())
    }

    async fn parse(&self, value: &str, _ctx: &CommandContext, _arg: &Argument) -> Result<ArgValue, String> {
        Ok(ArgValue::String(format!("ticket-{}", value.trim_start_matches('#'))))
    }

    fn coerce_option(&self, value: &OptionValue, _ctx: &CommandContext, _arg: &Argument) -> Option<ArgValue> {
        match value {
            OptionValue::Integer(n) if *n > 0 => Some(ArgValue::String(format!("ticket-{}", n))),
            _ => None,
        }
    }
}

#[tokio::test]
async fn test_typed_options_skip_text_validation() {
    let bot = TestBot::new();
    let validations = Arc::new(AtomicUsize::new(0));
    bot.framework
        .registry()
        .register_type(TypeSource::new(TicketType {
            validations: validations.clone(),
        }))
        .unwrap();
    with_describe(&bot, "ticket");

    let typed = interaction(&bot, 85, "describe", vec![option("target", OptionValue::Integer(42))]);
    assert_eq!(bot.framework.handle_interaction(typed).await, DispatchOutcome::Completed);
    assert_eq!(bot.client.last().unwrap(), "text ticket-42");
    assert_eq!(validations.load(Ordering::SeqCst), 0);

    // Values the type does not take directly go through the text path.
    let text = interaction(
        &bot,
        86,
        "describe",
        vec![option("target", OptionValue::String("#7".into()))],
    );
    assert_eq!(bot.framework.handle_interaction(text).await, DispatchOutcome::Completed);
    assert_eq!(bot.client.last().unwrap(), "text ticket-7");
    assert_eq!(validations.load(Ordering::SeqCst), 1);
}
