use dashmap::DashSet;
use teloxide::types::UserId;

/// Users who were asked for a city name and have not answered yet.
///
/// A mark is consumed by the next free-text message from the same user.
#[derive(Debug, Default)]
pub struct AwaitingCity {
    users: DashSet<UserId>,
}

impl AwaitingCity {
    pub fn mark(&self, user: UserId) {
        self.users.insert(user);
    }

    /// Clears the mark and reports whether it was set.
    pub fn take(&self, user: UserId) -> bool {
        self.users.remove(&user).is_some()
    }
}
