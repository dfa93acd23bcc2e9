//! Integration tests for argument collection and conversational prompting.

mod common;

use async_trait::async_trait;
use commando::commands::{
    ArgumentCollector, CollectMode, CommandSource, FailureReason, RejectionKind,
};
use commando::{
    ArgumentInfo, ArgumentValues, CommandContext, CommandHandler, CommandInfo, CommandResult,
    DispatchOutcome, FrameworkEvent,
};
use common::harness::test_config;
use common::{MEMBER, OWNER, TestBot};
use std::sync::Arc;

struct Roll;

#[async_trait]
impl CommandHandler for Roll {
    async fn run(&self, ctx: &CommandContext, args: ArgumentValues) -> CommandResult {
        ctx.say(&format!("rolled {}", args.integer("sides").unwrap_or(0)))
            .await?;
        Ok(())
    }
}

struct Tags;

#[async_trait]
impl CommandHandler for Tags {
    async fn run(&self, ctx: &CommandContext, args: ArgumentValues) -> CommandResult {
        let tags: Vec<&str> = args
            .get("tags")
            .and_then(|v| v.as_list())
            .unwrap_or(&[])
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        ctx.say(&format!("tags: {}", tags.join(","))).await?;
        Ok(())
    }
}

fn sides() -> ArgumentInfo {
    ArgumentInfo::new("sides", "integer", "How many sides?")
        .min(1.0)
        .max(10.0)
}

fn with_roll(bot: TestBot) -> TestBot {
    bot.framework
        .registry()
        .register_command(CommandSource::new(
            CommandInfo::new("roll", "util", "Roll a die.").arg(sides()),
            Roll,
        ))
        .unwrap();
    bot
}

#[tokio::test]
async fn test_integer_bounds_in_strict_mode() {
    let bot = TestBot::new();
    let collector =
        ArgumentCollector::new(bot.framework.registry(), vec![sides()], None, 30).unwrap();
    let ctx = CommandContext::for_message(bot.framework.clone(), bot.dm_message(MEMBER, "roll"));

    let collected = collector
        .obtain(&ctx, &["5".to_string()], CollectMode::Strict)
        .await
        .unwrap();
    assert_eq!(collected.values.integer("sides"), Some(5));

    let failure = collector
        .obtain(&ctx, &["11".to_string()], CollectMode::Strict)
        .await
        .unwrap_err();
    match failure.reason {
        FailureReason::Rejected(rejection) => {
            assert_eq!(rejection.kind, RejectionKind::Range);
            assert_eq!(
                rejection.message.as_deref(),
                Some("Please enter a number below or exactly 10.")
            );
        }
        other => panic!("expected a range rejection, got {:?}", other),
    }

    let failure = collector
        .obtain(&ctx, &["abc".to_string()], CollectMode::Strict)
        .await
        .unwrap_err();
    assert!(matches!(
        failure.reason,
        FailureReason::Rejected(ref r) if r.kind == RejectionKind::Type
    ));

    let failure = collector.obtain(&ctx, &[], CollectMode::Strict).await.unwrap_err();
    assert_eq!(failure.reason, FailureReason::Missing);
    assert_eq!(failure.key, "sides");
    assert!(bot.client.texts().is_empty());
}

#[tokio::test]
async fn test_schema_rules_are_enforced() {
    let bot = TestBot::new();
    let registry = bot.framework.registry();

    let optional_first = vec![
        ArgumentInfo::new("a", "string", "A?").default_value("x"),
        ArgumentInfo::new("b", "string", "B?"),
    ];
    assert!(ArgumentCollector::new(registry, optional_first, None, 30).is_err());

    let infinite_first = vec![
        ArgumentInfo::new("a", "string", "A?").infinite(),
        ArgumentInfo::new("b", "string", "B?"),
    ];
    assert!(ArgumentCollector::new(registry, infinite_first, None, 30).is_err());

    let unknown_type = vec![ArgumentInfo::new("a", "colour", "A?")];
    assert!(ArgumentCollector::new(registry, unknown_type, None, 30).is_err());
}

#[tokio::test]
async fn test_valid_argument_runs_without_prompt() {
    let bot = with_roll(TestBot::new());
    assert_eq!(bot.say_in_guild(MEMBER, "!roll 6").await, DispatchOutcome::Completed);
    assert_eq!(bot.client.texts(), vec!["rolled 6".to_string()]);
}

#[tokio::test]
async fn test_rejected_value_prompts_until_valid() {
    let bot = Arc::new(with_roll(TestBot::new()));

    let runner = {
        let bot = bot.clone();
        tokio::spawn(async move { bot.say_in_guild(MEMBER, "!roll 11").await })
    };

    let texts = bot.client.wait_for(1).await;
    assert_eq!(
        texts[0],
        "<@3>, Please enter a number below or exactly 10.\nRespond with `cancel` to cancel the command. The command will automatically be cancelled in 5 seconds."
    );

    // Another user's message in the same channel is not an answer.
    assert_eq!(bot.say_in_guild(OWNER, "7").await, DispatchOutcome::Ignored);
    assert_eq!(bot.say_in_guild(MEMBER, "7").await, DispatchOutcome::PromptAnswer);

    assert_eq!(runner.await.unwrap(), DispatchOutcome::Completed);
    assert_eq!(bot.client.last().unwrap(), "rolled 7");
    assert!(!bot.framework.awaiting().is_awaiting(MEMBER, bot.text_channel().id));
}

#[tokio::test]
async fn test_cancel_stops_the_command() {
    let bot = Arc::new(with_roll(TestBot::new()));
    let mut events = bot.framework.events().subscribe();

    let runner = {
        let bot = bot.clone();
        tokio::spawn(async move { bot.say_in_dm(MEMBER, "roll").await })
    };
    let texts = bot.client.wait_for(1).await;
    assert!(texts[0].starts_with("How many sides?\n"));

    assert_eq!(bot.say_in_dm(MEMBER, "CANCEL").await, DispatchOutcome::PromptAnswer);
    assert_eq!(runner.await.unwrap(), DispatchOutcome::Cancelled);
    assert_eq!(bot.client.last().unwrap(), "Cancelled command.");

    let mut cancelled = false;
    while let Ok(event) = events.try_recv() {
        if let FrameworkEvent::CommandCancel { command, reason, .. } = event {
            assert_eq!(command, "roll");
            assert_eq!(reason, "user");
            cancelled = true;
        }
    }
    assert!(cancelled);
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_prompt_times_out() {
    let bot = with_roll(TestBot::new());
    assert_eq!(bot.say_in_dm(MEMBER, "roll").await, DispatchOutcome::Cancelled);
    let texts = bot.client.texts();
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[1], "Cancelled command.");
}

#[tokio::test]
async fn test_prompt_limit_gives_usage_error() {
    let mut config = test_config();
    config.arguments.prompt_limit = Some(1);
    let bot = TestBot::bare(&config);
    bot.framework.register_defaults().unwrap();
    let bot = Arc::new(with_roll(bot));

    let runner = {
        let bot = bot.clone();
        tokio::spawn(async move { bot.say_in_dm(MEMBER, "roll abc").await })
    };
    let texts = bot.client.wait_for(1).await;
    assert!(texts[0].starts_with("You provided an invalid sides. Please try again.\n"));

    assert_eq!(bot.say_in_dm(MEMBER, "xyz").await, DispatchOutcome::PromptAnswer);
    assert_eq!(runner.await.unwrap(), DispatchOutcome::InvalidArguments);
    assert!(
        bot.client
            .last()
            .unwrap()
            .starts_with("Invalid command usage. The `roll` command's accepted format is: `roll <sides>`.")
    );
}

#[tokio::test]
async fn test_infinite_argument_with_finish() {
    let bot = TestBot::new();
    bot.framework
        .registry()
        .register_command(CommandSource::new(
            CommandInfo::new("tag", "util", "Tag things.")
                .arg(ArgumentInfo::new("tags", "string", "Which tags?").infinite()),
            Tags,
        ))
        .unwrap();

    assert_eq!(bot.say_in_dm(MEMBER, "tag red \"dark blue\"").await, DispatchOutcome::Completed);
    assert_eq!(bot.client.last().unwrap(), "tags: red,dark blue");

    let bot = Arc::new(bot);
    bot.client.clear();
    let runner = {
        let bot = bot.clone();
        tokio::spawn(async move { bot.say_in_dm(MEMBER, "tag").await })
    };
    let texts = bot.client.wait_for(1).await;
    assert!(texts[0].contains("or `finish` to finish entry up to this point"));

    assert_eq!(bot.say_in_dm(MEMBER, "green").await, DispatchOutcome::PromptAnswer);
    bot.client.wait_for(2).await;
    assert_eq!(bot.say_in_dm(MEMBER, "finish").await, DispatchOutcome::PromptAnswer);

    assert_eq!(runner.await.unwrap(), DispatchOutcome::Completed);
    assert_eq!(bot.client.last().unwrap(), "tags: green");
}

#[tokio::test]
async fn test_one_of_and_defaults() {
    struct Mode;

    #[async_trait]
    impl CommandHandler for Mode {
        async fn run(&self, ctx: &CommandContext, args: ArgumentValues) -> CommandResult {
            ctx.say(args.str("mode").unwrap_or("?")).await?;
            Ok(())
        }
    }

    let bot = TestBot::new();
    bot.framework
        .registry()
        .register_command(CommandSource::new(
            CommandInfo::new("mode", "util", "Pick a mode.").arg(
                ArgumentInfo::new("mode", "string", "Which mode?")
                    .one_of(["fast", "slow"])
                    .default_value("slow"),
            ),
            Mode,
        ))
        .unwrap();

    assert_eq!(bot.say_in_dm(MEMBER, "mode").await, DispatchOutcome::Completed);
    assert_eq!(bot.client.last().unwrap(), "slow");
    assert_eq!(bot.say_in_dm(MEMBER, "mode FAST").await, DispatchOutcome::Completed);
    assert_eq!(bot.client.last().unwrap(), "FAST");
}
