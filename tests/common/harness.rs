//! Framework fixtures.

use super::MockClient;
use commando::model::{
    Channel, Guild, GuildId, Member, Message, Permission, Permissions, Role, RoleId, User, UserId,
};
use commando::{Config, DispatchOutcome, Framework};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub const BOT: UserId = UserId(1000);
pub const OWNER: UserId = UserId(1);
pub const ADMIN: UserId = UserId(2);
pub const MEMBER: UserId = UserId(3);
pub const GUILD: GuildId = GuildId(500);

const ADMIN_ROLE: RoleId = RoleId(501);
const TEXT_CHANNEL: u64 = 600;
const NSFW_CHANNEL: u64 = 601;

static MESSAGE_IDS: AtomicU64 = AtomicU64::new(1);

/// A framework wired to a [`MockClient`] and a small guild.
pub struct TestBot {
    pub framework: Arc<Framework>,
    pub client: Arc<MockClient>,
    pub guild: Arc<Guild>,
}

#[allow(dead_code)]
impl TestBot {
    /// Default configuration with the built-ins registered.
    pub fn new() -> Self {
        let bot = Self::bare(&test_config());
        bot.framework.register_defaults().expect("defaults register");
        bot
    }

    /// No built-ins registered.
    pub fn bare(config: &Config) -> Self {
        let client = Arc::new(MockClient::new(User::new(BOT, "Commando").into_bot()));
        let framework = Framework::new(client.clone(), config);
        Self {
            framework,
            client,
            guild: Arc::new(guild()),
        }
    }

    pub fn user(id: UserId) -> User {
        let name = match id {
            OWNER => "owner",
            ADMIN => "admin",
            MEMBER => "member",
            _ => "someone",
        };
        User::new(id, name)
    }

    pub fn text_channel(&self) -> Channel {
        Channel::text(TEXT_CHANNEL, GUILD, "general")
    }

    pub fn nsfw_channel(&self) -> Channel {
        let mut channel = Channel::text(NSFW_CHANNEL, GUILD, "late-night");
        channel.nsfw = true;
        channel
    }

    pub fn dm_channel(author: UserId) -> Channel {
        Channel::dm(10_000 + author.get())
    }

    /// A message in the guild's text channel.
    pub fn guild_message(&self, author: UserId, content: &str) -> Message {
        Message::new(next_id(), Self::user(author), content, self.text_channel())
            .in_guild(self.guild.clone())
    }

    /// A message in the author's DM channel.
    pub fn dm_message(&self, author: UserId, content: &str) -> Message {
        Message::new(next_id(), Self::user(author), content, Self::dm_channel(author))
    }

    pub async fn say_in_guild(&self, author: UserId, content: &str) -> DispatchOutcome {
        self.framework
            .handle_message(self.guild_message(author, content))
            .await
    }

    pub async fn say_in_dm(&self, author: UserId, content: &str) -> DispatchOutcome {
        self.framework.handle_message(self.dm_message(author, content)).await
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.client.owners = vec![OWNER];
    config.arguments.wait_secs = 5;
    config
}

fn next_id() -> u64 {
    MESSAGE_IDS.fetch_add(1, Ordering::Relaxed)
}

fn guild() -> Guild {
    let mut guild = Guild::new(GUILD, "Test Guild", UserId(9999));
    guild.roles.push(Role {
        id: RoleId(GUILD.get()),
        name: "@everyone".into(),
        permissions: Permissions::from_iter([
            Permission::ViewChannel,
            Permission::SendMessages,
            Permission::ReadMessageHistory,
        ]),
    });
    guild.roles.push(Role {
        id: ADMIN_ROLE,
        name: "Admin".into(),
        permissions: Permissions::from_iter([Permission::Administrator]),
    });
    guild.channels.push(Channel::text(TEXT_CHANNEL, GUILD, "general"));
    let mut admin = Member::new(TestBot::user(ADMIN));
    admin.roles.push(ADMIN_ROLE);
    guild.members.push(admin);
    guild.members.push(Member::new(TestBot::user(MEMBER)));
    guild.members.push(Member::new(TestBot::user(OWNER)));
    guild.members.push(Member::new(User::new(BOT, "Commando").into_bot()));
    guild
}

/// Poll `check` until it holds, panicking after a second.
#[allow(dead_code)]
pub async fn eventually(mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while !check() {
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not reached within a second");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
