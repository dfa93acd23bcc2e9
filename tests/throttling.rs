//! Integration tests for per-user throttling.

mod common;

use async_trait::async_trait;
use commando::commands::{BlockReason, CommandSource};
use commando::{
    ArgumentValues, CommandContext, CommandHandler, CommandInfo, CommandResult, DispatchOutcome,
};
use common::{ADMIN, MEMBER, OWNER, TestBot};
use std::time::Duration;

struct Noop;

#[async_trait]
impl CommandHandler for Noop {
    async fn run(&self, _ctx: &CommandContext, _args: ArgumentValues) -> CommandResult {
        Ok(())
    }
}

fn with_limited(bot: TestBot) -> TestBot {
    bot.framework
        .registry()
        .register_command(CommandSource::new(
            CommandInfo::new("limited", "util", "Twice per ten seconds.").throttling(2, 10),
            Noop,
        ))
        .unwrap();
    bot
}

#[tokio::test(start_paused = true)]
async fn test_third_use_in_window_is_blocked() {
    let bot = with_limited(TestBot::new());

    assert_eq!(bot.say_in_dm(MEMBER, "limited").await, DispatchOutcome::Completed);
    tokio::time::advance(Duration::from_secs(3)).await;
    assert_eq!(bot.say_in_dm(MEMBER, "limited").await, DispatchOutcome::Completed);

    match bot.say_in_dm(MEMBER, "limited").await {
        DispatchOutcome::Blocked(BlockReason::Throttling { remaining }) => {
            assert!(remaining > Duration::ZERO);
            assert!(remaining <= Duration::from_secs(7));
        }
        other => panic!("expected a throttling block, got {:?}", other),
    }
    assert_eq!(
        bot.client.last().unwrap(),
        "You may not use the `limited` command again for another 7.0 seconds."
    );

    // Other users have their own window.
    assert_eq!(bot.say_in_dm(ADMIN, "limited").await, DispatchOutcome::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_window_resets_after_duration() {
    let bot = with_limited(TestBot::new());
    let limited = bot.framework.registry().resolve_command("limited").unwrap();

    bot.say_in_dm(MEMBER, "limited").await;
    bot.say_in_dm(MEMBER, "limited").await;
    assert!(limited.throttle_remaining(MEMBER).is_some());

    tokio::time::advance(Duration::from_secs(11)).await;
    tokio::task::yield_now().await;
    assert!(limited.throttle_remaining(MEMBER).is_none());
    assert_eq!(bot.say_in_dm(MEMBER, "limited").await, DispatchOutcome::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_owners_are_never_throttled() {
    let bot = with_limited(TestBot::new());
    for _ in 0..5 {
        assert_eq!(bot.say_in_dm(OWNER, "limited").await, DispatchOutcome::Completed);
    }
    let limited = bot.framework.registry().resolve_command("limited").unwrap();
    assert!(limited.throttle(OWNER).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_blocked_attempts_do_not_count() {
    let bot = with_limited(TestBot::new());
    bot.say_in_dm(MEMBER, "limited").await;
    bot.say_in_dm(MEMBER, "limited").await;
    bot.say_in_dm(MEMBER, "limited").await;

    let limited = bot.framework.registry().resolve_command("limited").unwrap();
    assert_eq!(limited.throttle(MEMBER).unwrap().usages, 2);
}

#[tokio::test(start_paused = true)]
async fn test_reregistering_clears_throttles() {
    let bot = with_limited(TestBot::new());
    bot.say_in_dm(MEMBER, "limited").await;
    bot.say_in_dm(MEMBER, "limited").await;

    let old = bot.framework.registry().resolve_command("limited").unwrap();
    let new = bot
        .framework
        .registry()
        .reregister_command(
            CommandSource::new(
                CommandInfo::new("limited", "util", "Twice per ten seconds.").throttling(2, 10),
                Noop,
            ),
            &old,
        )
        .unwrap();
    assert!(old.throttle_remaining(MEMBER).is_none());
    assert!(new.throttle_remaining(MEMBER).is_none());
    assert_eq!(bot.say_in_dm(MEMBER, "limited").await, DispatchOutcome::Completed);
}
