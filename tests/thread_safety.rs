//! Compile-time checks that ECS types can cross threads.

use static_assertions::assert_impl_all;
use spider_ai::{
    Actor, NetId, ReplicaState, ReplicatedSpider, ReplicationInbox, ReplicationOutbox,
    SimulationRole, Spider, SpiderConfig, SpiderAiPlugin,
};

assert_impl_all!(Spider: Send, Sync, Clone);
assert_impl_all!(Actor: Send, Sync, Copy);
assert_impl_all!(NetId: Send, Sync, Copy, Ord, std::hash::Hash);
assert_impl_all!(ReplicatedSpider: Send, Sync, Copy);
assert_impl_all!(SpiderConfig: Send, Sync, Clone);
assert_impl_all!(SimulationRole: Send, Sync, Copy);
assert_impl_all!(ReplicationOutbox: Send, Sync);
assert_impl_all!(ReplicationInbox: Send, Sync);
assert_impl_all!(ReplicaState: Send, Sync);
assert_impl_all!(SpiderAiPlugin: Send, Sync);
