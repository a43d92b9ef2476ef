//! Atomic Lua scripts forming the wire contract with Redis.
//!
//! Each script runs as one indivisible unit on the server. Scripts are hashed
//! once and sent with `EVALSHA`, falling back to `EVAL` when the server's
//! script cache does not have them yet.

use once_cell::sync::Lazy;
use redis::Script;

/// KEYS: account key, feature key. ARGV: account, feature.
pub const LAUNCH_FEATURE_FOR_ONE_ACCOUNT: &str = r#"
redis.call('SADD', KEYS[1], ARGV[2])
redis.call('SADD', KEYS[2], ARGV[1])
return 1
"#;

/// KEYS: account key, feature key. ARGV: account, feature.
pub const REVOKE_FEATURE_FROM_ONE_ACCOUNT: &str = r#"
redis.call('SREM', KEYS[1], ARGV[2])
redis.call('SREM', KEYS[2], ARGV[1])
return 1
"#;

/// KEYS: global key, account key. ARGV: feature.
pub const IS_FEATURE_LAUNCHED_IN_ONE_ACCOUNT: &str = r#"
if redis.call('SISMEMBER', KEYS[1], ARGV[1]) == 1 then
    return 1
end
if redis.call('SISMEMBER', KEYS[2], ARGV[1]) == 1 then
    return 1
end
return 0
"#;

/// KEYS: global key, feature key. ARGV: feature, account key prefix.
///
/// Account keys are derived from the feature set while the script runs, so
/// this only works against a standalone server, not a cluster.
pub const REVOKE_FEATURE_FROM_ALL_ACCOUNTS: &str = r#"
redis.call('SREM', KEYS[1], ARGV[1])
local accounts = redis.call('SMEMBERS', KEYS[2])
for _, account in ipairs(accounts) do
    redis.call('SREM', ARGV[2] .. account, ARGV[1])
end
redis.call('DEL', KEYS[2])
return #accounts
"#;

/// KEYS: global key, feature key. ARGV: feature.
///
/// Replies `1` when the feature is global, otherwise the account list.
pub const ACCOUNTS_WHERE_FEATURE_IS_LAUNCHED: &str = r#"
if redis.call('SISMEMBER', KEYS[1], ARGV[1]) == 1 then
    return 1
end
return redis.call('SMEMBERS', KEYS[2])
"#;

pub static LAUNCH_FOR_ONE_ACCOUNT: Lazy<Script> =
    Lazy::new(|| Script::new(LAUNCH_FEATURE_FOR_ONE_ACCOUNT));

pub static REVOKE_FROM_ONE_ACCOUNT: Lazy<Script> =
    Lazy::new(|| Script::new(REVOKE_FEATURE_FROM_ONE_ACCOUNT));

pub static IS_LAUNCHED_IN_ONE_ACCOUNT: Lazy<Script> =
    Lazy::new(|| Script::new(IS_FEATURE_LAUNCHED_IN_ONE_ACCOUNT));

pub static REVOKE_FROM_ALL_ACCOUNTS: Lazy<Script> =
    Lazy::new(|| Script::new(REVOKE_FEATURE_FROM_ALL_ACCOUNTS));

pub static ACCOUNTS_WHERE_LAUNCHED: Lazy<Script> =
    Lazy::new(|| Script::new(ACCOUNTS_WHERE_FEATURE_IS_LAUNCHED));
